//! leaf-finder resolver: library crate for the tiered plant identifier.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `lf-e2e-tests`) can reach `TieredResolver`, the sinks, and the
//! run pipeline.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod resolver;
pub mod sink;

pub use config::{AppConfig, HintMode, RunInputs, SinkConfig};
pub use resolver::{Providers, ResolveRequest, TieredResolver};
