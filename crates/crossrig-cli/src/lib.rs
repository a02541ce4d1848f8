//! Crossrig CLI library.
//!
//! Input loading (skeletons, animations, mappings), settings and logging, and
//! the command implementations behind the `crossrig` binary.

pub mod commands;
pub mod input;
pub mod settings;
