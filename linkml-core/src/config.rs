//! Configuration types for `LinkML` schema resolution

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LinkMLError, Result};

/// Default registry the shared prefix maps are fetched from
pub const DEFAULT_PREFIX_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/prefixcommons/biocontext/master/registry";

/// Main configuration for `LinkML` schema resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkMLConfig {
    /// Schema loading configuration
    pub schema: SchemaConfig,

    /// Instance walker configuration
    pub walker: WalkerConfig,

    /// Namespace configuration
    pub namespaces: NamespaceConfig,
}

/// Schema loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Directories searched for bare import names after the importing
    /// document's own directory
    pub search_paths: Vec<PathBuf>,

    /// Extensions tried, in order, when resolving a bare import name
    pub extensions: Vec<String>,

    /// Timeout applied to every single document load
    #[serde(with = "humantime_serde")]
    pub import_timeout: Duration,

    /// Import reference to location overrides (local path or URL)
    pub import_map: IndexMap<String, String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            extensions: vec!["yaml".to_string(), "yml".to_string(), "json".to_string()],
            import_timeout: Duration::from_secs(30),
            import_map: IndexMap::new(),
        }
    }
}

/// Walker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    /// Raise structural mismatches instead of walking through them
    pub strict: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Namespace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Base URL of the shared prefix map registry
    pub prefix_registry_url: String,

    /// Timeout for fetching a prefix map
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            prefix_registry_url: DEFAULT_PREFIX_REGISTRY_URL.to_string(),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl LinkMLConfig {
    /// Load configuration from a TOML or YAML file, chosen by extension
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::ConfigError` if the file has an unsupported
    /// extension, cannot be decoded, or fails [`LinkMLConfig::validate`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let config: Self = match extension {
            "toml" => toml::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| LinkMLError::config(format!("{}: {e}", path.display())))?,
            other => {
                return Err(LinkMLError::config(format!(
                    "Unsupported configuration format '{other}' for {}",
                    path.display()
                )));
            }
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Check the configuration for values that cannot work
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::ConfigError` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.schema.extensions.is_empty() {
            return Err(LinkMLError::config("schema.extensions must not be empty"));
        }
        if let Some(ext) = self
            .schema
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(LinkMLError::config(format!(
                "schema.extensions entries are bare extensions, got '{ext}'"
            )));
        }
        if self.schema.import_timeout.is_zero() {
            return Err(LinkMLError::config("schema.import_timeout must be positive"));
        }
        if self.namespaces.fetch_timeout.is_zero() {
            return Err(LinkMLError::config(
                "namespaces.fetch_timeout must be positive",
            ));
        }
        if !self.namespaces.prefix_registry_url.starts_with("http://")
            && !self.namespaces.prefix_registry_url.starts_with("https://")
        {
            return Err(LinkMLError::config(format!(
                "namespaces.prefix_registry_url must be an http(s) URL, got '{}'",
                self.namespaces.prefix_registry_url
            )));
        }
        Ok(())
    }
}
