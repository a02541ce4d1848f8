//! Crossrig Integration Test Infrastructure
//!
//! Shared fixtures for the integration tests:
//!
//! - **scenarios**: matching and retargeting behavior end to end, including
//!   the CLI command flow over files
//! - **persistence**: mapping documents on disk and the mapping library
//! - **properties**: `proptest` checks for injectivity, determinism,
//!   round-trips and channel conservation
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p crossrig-tests
//! ```

pub mod fixtures;
