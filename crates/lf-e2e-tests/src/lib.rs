//! End-to-end tests for leaf-finder.
//!
//! Empty library; the scenarios live in `tests/` and stand every external
//! provider up as a wiremock server.
