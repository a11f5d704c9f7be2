//! Artifact manifest handed to external code printers

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::GeneratorConfig;
use crate::generation::{Artifact, Specification, TypeMapping};

/// Serialization format of the manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    #[default]
    Json,
    Yaml,
}

/// Everything one generation run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub title: String,
    pub version: String,
    /// Name and version of the generator that produced the manifest
    pub generator: String,
    /// Type-mapping table the printer renders `TypeExpr`s with
    pub types: TypeMapping,
    pub artifacts: Vec<Artifact>,
}

impl ArtifactManifest {
    pub fn new(spec: &Specification, config: &GeneratorConfig, artifacts: Vec<Artifact>) -> Self {
        Self {
            title: spec.title.clone(),
            version: spec.version.clone(),
            generator: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            types: config.types.clone(),
            artifacts,
        }
    }

    pub fn dto_count(&self) -> usize {
        self.artifacts.iter().filter(|a| a.as_dto().is_some()).count()
    }

    pub fn request_count(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.as_request().is_some())
            .count()
    }

    /// Render the manifest in the given format
    pub fn render(&self, format: ManifestFormat) -> Result<String> {
        Ok(match format {
            ManifestFormat::Json => serde_json::to_string_pretty(self)?,
            ManifestFormat::Yaml => serde_yaml::to_string(self)?,
        })
    }
}
