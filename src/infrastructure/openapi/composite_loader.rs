//! Composite specification loader that picks a loading strategy per source

use async_trait::async_trait;

use super::{FileSpecLoader, HttpSpecLoader};
use crate::generation::{GenerationError, Specification, SpecificationLoader};

/// Dispatches to the HTTP loader for URLs and the file loader otherwise
pub struct CompositeSpecLoader {
    http: Box<dyn SpecificationLoader>,
    file: Box<dyn SpecificationLoader>,
}

impl CompositeSpecLoader {
    pub fn new() -> Result<Self, GenerationError> {
        Ok(Self {
            http: Box::new(HttpSpecLoader::new()?),
            file: Box::new(FileSpecLoader::new()),
        })
    }
}

#[async_trait]
impl SpecificationLoader for CompositeSpecLoader {
    async fn load(&self, source: &str) -> Result<Specification, GenerationError> {
        tracing::debug!("CompositeSpecLoader: Loading from source: {source}");

        if HttpSpecLoader::handles(source) {
            tracing::debug!("CompositeSpecLoader: Using HTTP loader");
            self.http.load(source).await
        } else {
            tracing::debug!("CompositeSpecLoader: Using file loader");
            self.file.load(source).await
        }
    }
}
