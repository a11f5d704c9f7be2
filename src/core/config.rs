//! Generator configuration
//!
//! Everything the engine needs from the outside world besides the
//! specification itself: namespaces, the fallback resource group, parameter
//! ignore-lists, media-type preference and the type-mapping table.
//!
//! Configuration is usually read from an `sdkforge.toml` file. Every field is
//! optional; missing fields keep their defaults.
//!
//! ```toml
//! namespace = "Acme\\Sdk"
//! fallback_resource_name = "Misc"
//! ignored_header_params = ["Authorization"]
//! preferred_media_types = ["application/json"]
//!
//! [types]
//! integer = "i64"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::core::error::{Error, Result};
use crate::generation::TypeMapping;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "sdkforge.toml";

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base namespace; segments separated by `\`, `::` or `.`
    pub namespace: String,
    /// Namespace segment for request artifacts
    pub request_namespace_suffix: String,
    /// Namespace segment for response DTOs
    pub response_namespace_suffix: String,
    /// Namespace segment for nested and schema DTOs
    pub dto_namespace_suffix: String,
    /// Resource group for endpoints without a collection
    pub fallback_resource_name: String,
    pub ignored_body_params: Vec<String>,
    pub ignored_query_params: Vec<String>,
    pub ignored_header_params: Vec<String>,
    /// Media types consulted in order; empty means "first declared"
    pub preferred_media_types: Vec<String>,
    /// Also emit DTOs for registry schemas
    pub emit_schema_dtos: bool,
    pub types: TypeMapping,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: "App\\Sdk".to_string(),
            request_namespace_suffix: "Requests".to_string(),
            response_namespace_suffix: "Responses".to_string(),
            dto_namespace_suffix: "Dto".to_string(),
            fallback_resource_name: "Resource".to_string(),
            ignored_body_params: Vec::new(),
            ignored_query_params: Vec::new(),
            ignored_header_params: Vec::new(),
            preferred_media_types: Vec::new(),
            emit_schema_dtos: false,
            types: TypeMapping::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub async fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Reading generator configuration");
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!(
                "Failed to read configuration at {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `sdkforge.toml` from `dir` if present, defaults otherwise
    pub async fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if fs::try_exists(&path).await? {
            Self::load(&path).await
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the configuration for values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.namespace_segments().is_empty() {
            return Err(Error::config("namespace must not be empty"));
        }
        if self.fallback_resource_name.trim().is_empty() {
            return Err(Error::config("fallback_resource_name must not be empty"));
        }
        for (field, value) in [
            ("request_namespace_suffix", &self.request_namespace_suffix),
            ("response_namespace_suffix", &self.response_namespace_suffix),
            ("dto_namespace_suffix", &self.dto_namespace_suffix),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config(format!("{field} must not be empty")));
            }
        }
        if !self.types.array_of.contains("{item}") {
            return Err(Error::config("types.array_of must contain `{item}`"));
        }
        Ok(())
    }

    /// Base namespace split into segments
    pub fn namespace_segments(&self) -> Vec<String> {
        self.namespace
            .split(['\\', '.', ':'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Namespace for the request artifacts of a resource group
    pub fn request_namespace(&self, resource_group: &str) -> Vec<String> {
        let mut segments = self.namespace_segments();
        segments.push(self.request_namespace_suffix.clone());
        segments.push(resource_group.to_string());
        segments
    }

    /// Namespace for the response DTOs of a collection group
    pub fn response_namespace(&self, collection_group: &str) -> Vec<String> {
        let mut segments = self.namespace_segments();
        segments.push(self.response_namespace_suffix.clone());
        segments.push(collection_group.to_string());
        segments
    }

    /// Namespace for nested and schema DTOs
    pub fn dto_namespace(&self) -> Vec<String> {
        let mut segments = self.namespace_segments();
        segments.push(self.dto_namespace_suffix.clone());
        segments
    }
}
