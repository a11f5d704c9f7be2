//! File-based specification loader
//!
//! This loader handles only file I/O. The actual parsing is done by the OpenApiParser.

use async_trait::async_trait;
use tokio::fs;

use super::parser::{DocumentFormat, OpenApiParser, decode_document};
use crate::generation::{GenerationError, Specification, SpecificationLoader};

/// Loads OpenAPI documents from local files
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSpecLoader;

impl FileSpecLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SpecificationLoader for FileSpecLoader {
    async fn load(&self, source: &str) -> Result<Specification, GenerationError> {
        let content = fs::read_to_string(source)
            .await
            .map_err(GenerationError::IoError)?;

        let document = decode_document(&content, DocumentFormat::from_path(source))?;
        OpenApiParser::new(document).parse()
    }
}
