//! Schema loader for loading schemas from files and URLs

use linkml_core::{
    error::{LinkMLError, Result},
    types::SchemaDefinition,
};
use std::sync::Arc;
use std::time::Duration;

use super::{DefaultSchemaSource, Parser, SchemaLocation, SchemaSource};

/// Loader for `LinkML` schemas from any [`SchemaSource`]
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    source: Arc<dyn SchemaSource>,
    parser: Parser,
    timeout: Duration,
}

impl SchemaLoader {
    /// Create a loader over the default file/HTTP source
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::with_source(Arc::new(DefaultSchemaSource::new()), timeout)
    }

    /// Create a loader over a custom source
    #[must_use]
    pub fn with_source(source: Arc<dyn SchemaSource>, timeout: Duration) -> Self {
        Self {
            source,
            parser: Parser::new(),
            timeout,
        }
    }

    /// The underlying document source
    #[must_use]
    pub fn source(&self) -> &Arc<dyn SchemaSource> {
        &self.source
    }

    /// Read and decode the document at `location`.
    ///
    /// The read is bounded by the loader timeout. The decoded schema records
    /// `location` as its `source_file`.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::ImportLoadError` on timeout, otherwise the
    /// source or parser error.
    pub async fn load(&self, location: &SchemaLocation) -> Result<SchemaDefinition> {
        tracing::debug!(%location, "loading schema document");

        let content = tokio::time::timeout(self.timeout, self.source.read(location))
            .await
            .map_err(|_| {
                LinkMLError::import(
                    location.to_string(),
                    format!("timed out after {:?}", self.timeout),
                )
            })??;

        let mut schema = self
            .parser
            .parse_str(&content, location.format())
            .map_err(|e| match e {
                LinkMLError::ParseError { message, location: at } => LinkMLError::ParseError {
                    message: format!("{message} in {location}"),
                    location: at,
                },
                other => other,
            })?;
        schema.source_file = Some(location.to_string());
        Ok(schema)
    }
}
