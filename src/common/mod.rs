//! Utilities shared across binaries.

pub mod logger;
