//! Shared prefix maps fetched from a remote registry

use dashmap::DashMap;
use indexmap::IndexMap;
use linkml_core::config::NamespaceConfig;
use linkml_core::error::{LinkMLError, Result};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A decoded JSON-LD context: prefix to namespace (string or `{"@id": ..}`)
pub type PrefixContext = IndexMap<String, Value>;

/// Process-wide cache keyed by prefix map name. Entries are never replaced.
static PREFIX_MAP_CACHE: Lazy<DashMap<String, Arc<PrefixContext>>> = Lazy::new(DashMap::new);

/// Client for a registry of named prefix maps (e.g. `semweb_context`)
#[derive(Debug, Clone)]
pub struct PrefixRegistry {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl Default for PrefixRegistry {
    fn default() -> Self {
        Self::new(&NamespaceConfig::default())
    }
}

impl PrefixRegistry {
    /// Create a registry client from configuration
    #[must_use]
    pub fn new(config: &NamespaceConfig) -> Self {
        Self {
            base_url: config.prefix_registry_url.trim_end_matches('/').to_string(),
            timeout: config.fetch_timeout,
            client: reqwest::Client::new(),
        }
    }

    /// URL the named map is fetched from
    #[must_use]
    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{name}.jsonld", self.base_url)
    }

    /// Cached context for `name`, if it was fetched or preloaded before
    #[must_use]
    pub fn cached(name: &str) -> Option<Arc<PrefixContext>> {
        PREFIX_MAP_CACHE.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Seed the cache with a context obtained elsewhere.
    ///
    /// Returns the entry that ends up cached, which is the existing one if
    /// `name` was already present.
    pub fn preload(name: &str, context: PrefixContext) -> Arc<PrefixContext> {
        Arc::clone(
            PREFIX_MAP_CACHE
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(context))
                .value(),
        )
    }

    /// Fetch the named map, consulting the process-wide cache first
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` on timeout, transport failure,
    /// a non-success status or a body that is not a JSON object.
    pub async fn fetch(&self, name: &str) -> Result<Arc<PrefixContext>> {
        if let Some(context) = Self::cached(name) {
            return Ok(context);
        }

        let url = self.url_for(name);
        tracing::debug!(%url, "fetching prefix map");

        let body = tokio::time::timeout(self.timeout, self.fetch_body(&url))
            .await
            .map_err(|_| {
                LinkMLError::namespace(format!(
                    "Timed out after {:?} fetching context for: {name}",
                    self.timeout
                ))
            })??;

        let context = match body {
            Value::Object(mut map) => match map.remove("@context") {
                Some(Value::Object(inner)) => inner.into_iter().collect(),
                _ => map.into_iter().collect(),
            },
            _ => {
                return Err(LinkMLError::namespace(format!(
                    "Context for {name} is not a JSON object"
                )));
            }
        };

        Ok(Self::preload(name, context))
    }

    async fn fetch_body(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LinkMLError::namespace(format!("Cannot fetch context {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(LinkMLError::namespace(format!(
                "Cannot fetch context {url}: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LinkMLError::namespace(format!("Invalid context {url}: {e}")))
    }
}
