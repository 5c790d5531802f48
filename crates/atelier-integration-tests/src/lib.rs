//! Integration test crate for the Atelier share engine.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end sharing flows across the workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p atelier-integration-tests
//! ```
