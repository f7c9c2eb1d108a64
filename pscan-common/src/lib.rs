//! # PediaScan Common Library
//!
//! Shared code for the PediaScan services:
//! - Service configuration (TOML file, environment, CLI overrides)
//! - Common error type

pub mod config;
pub mod error;

pub use error::{Error, Result};
