//! Output implementations

pub mod manifest;
pub mod manifest_output;

pub use manifest::*;
pub use manifest_output::*;
