//! Port interfaces for the generation domain

use crate::generation::{GenerationError, Specification};
use crate::infrastructure::output::ArtifactManifest;
use async_trait::async_trait;

/// Loads API specifications
#[async_trait]
pub trait SpecificationLoader: Send + Sync {
    /// Load a specification from a source (file path or URL)
    async fn load(&self, source: &str) -> Result<Specification, GenerationError>;
}

/// Hands a finished artifact set to the outside world
#[async_trait]
pub trait ArtifactOutput: Send + Sync {
    /// Write the artifact manifest
    async fn write(&self, manifest: &ArtifactManifest) -> crate::core::error::Result<()>;
}
