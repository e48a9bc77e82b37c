//! Shared types for leaf-finder: hints, per-tier candidates, and the single
//! resolution each run produces.

pub mod candidate;
pub mod hint;
pub mod resolution;

pub use candidate::*;
pub use hint::*;
pub use resolution::*;
