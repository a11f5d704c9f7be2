//! Manifest output implementation

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::{ArtifactManifest, ManifestFormat};
use crate::core::error::Result;
use crate::generation::ArtifactOutput;

/// Writes the artifact manifest to a file, or to stdout when no path is set
#[derive(Debug, Clone, Default)]
pub struct ManifestOutput {
    destination: Option<PathBuf>,
    format: ManifestFormat,
}

impl ManifestOutput {
    pub fn new(destination: Option<PathBuf>, format: ManifestFormat) -> Self {
        Self {
            destination,
            format,
        }
    }
}

#[async_trait]
impl ArtifactOutput for ManifestOutput {
    async fn write(&self, manifest: &ArtifactManifest) -> Result<()> {
        let rendered = manifest.render(self.format)?;

        match &self.destination {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).await?;
                }
                fs::write(path, rendered.as_bytes()).await?;
                info!(
                    path = %path.display(),
                    artifacts = manifest.artifacts.len(),
                    "Wrote artifact manifest"
                );
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(rendered.as_bytes()).await?;
                if !rendered.ends_with('\n') {
                    stdout.write_all(b"\n").await?;
                }
                stdout.flush().await?;
            }
        }

        Ok(())
    }
}
