//! sdkforge turns OpenAPI 3.x documents into typed SDK artifacts.
//!
//! The engine in [`generation`] is pure: it takes a parsed
//! [`generation::Specification`] and returns request and DTO artifacts.
//! [`infrastructure`] holds the adapters around it (OpenAPI loaders and the
//! artifact manifest writer), and [`core`] holds configuration.
#![deny(unsafe_code)]

pub mod core;
pub mod generation;
pub mod infrastructure;

pub use crate::core::GeneratorConfig;
pub use generation::{Artifact, GenerationEngine, GenerationError, Specification};
