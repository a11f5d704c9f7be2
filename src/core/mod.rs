//! Configuration and shared error types.

pub mod config;
pub mod error;

pub use config::GeneratorConfig;
pub use error::Error;
