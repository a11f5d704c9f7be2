//! Infrastructure layer - concrete implementations of domain ports

pub mod openapi;
pub mod output;

pub use openapi::*;
pub use output::*;
