//! Generation domain module - the specification-to-artifact engine
//!
//! This module takes a parsed [`Specification`] and turns it into typed
//! artifacts: one request per endpoint and one DTO per distinct response or
//! nested object shape. It performs no I/O; loading specifications and
//! writing artifacts happen behind the ports in [`traits`].

pub mod cache;
pub mod dto;
pub mod errors;
pub mod orchestrator;
pub mod request;
pub mod resolver;
pub mod sanitizers;
pub mod traits;
pub mod types;
pub mod utils;

pub use cache::*;
pub use dto::*;
pub use errors::*;
pub use orchestrator::*;
pub use request::*;
pub use resolver::*;
pub use traits::*;
pub use types::*;
