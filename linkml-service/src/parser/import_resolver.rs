//! Import resolution for `LinkML` schemas
//!
//! Turns an import reference into the location of the document to load.
//! Loading itself is left to [`super::SchemaLoader`].

use indexmap::IndexMap;
use linkml_core::{
    config::SchemaConfig,
    error::{LinkMLError, Result},
};
use std::path::PathBuf;

use super::{SchemaLocation, SchemaSource};
use crate::namespace::NamespaceResolver;

/// Import resolver for handling schema imports
#[derive(Debug, Clone)]
pub struct ImportResolver {
    /// Search paths tried after the importing document's directory
    search_paths: Vec<PathBuf>,
    /// Extensions tried for bare names
    extensions: Vec<String>,
    /// Reference overrides
    import_map: IndexMap<String, String>,
}

impl Default for ImportResolver {
    fn default() -> Self {
        Self::new(&SchemaConfig::default())
    }
}

impl ImportResolver {
    /// Create a resolver from the schema configuration
    #[must_use]
    pub fn new(config: &SchemaConfig) -> Self {
        Self {
            search_paths: config.search_paths.clone(),
            extensions: config.extensions.clone(),
            import_map: config.import_map.clone(),
        }
    }

    /// Resolve `reference` as imported by the document at `importer`.
    ///
    /// Order of precedence:
    /// 1. an `import_map` entry for the exact reference;
    /// 2. a CURIE or URI, expanded through `namespaces`, with the first
    ///    configured extension appended when the target has none;
    /// 3. a bare name, tried as `<name>.<ext>` beside the importer and then
    ///    in every search path.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::ImportLoadError` if a bare name is found nowhere
    /// or a CURIE cannot be expanded.
    pub async fn resolve(
        &self,
        reference: &str,
        importer: Option<&SchemaLocation>,
        namespaces: &dyn NamespaceResolver,
        source: &dyn SchemaSource,
    ) -> Result<SchemaLocation> {
        if let Some(mapped) = self.import_map.get(reference) {
            tracing::debug!(reference, mapped = %mapped, "import redirected by import_map");
            return SchemaLocation::parse(mapped);
        }

        if reference.contains(':') {
            let uri = namespaces
                .resolve(reference)
                .map_err(|e| LinkMLError::import(reference, e.to_string()))?;
            let location = SchemaLocation::parse(&uri)?;
            return Ok(if location.has_extension() {
                location
            } else {
                location.with_extension(self.default_extension())
            });
        }

        let mut tried = Vec::new();
        for candidate in self.candidates(reference, importer)? {
            if source.exists(&candidate).await {
                return Ok(candidate);
            }
            tried.push(candidate.to_string());
        }

        Err(LinkMLError::import(
            reference,
            format!("not found, tried: {}", tried.join(", ")),
        ))
    }

    fn default_extension(&self) -> &str {
        self.extensions.first().map_or("yaml", String::as_str)
    }

    fn file_names(&self, reference: &str) -> Vec<String> {
        let has_extension = self
            .extensions
            .iter()
            .any(|ext| reference.ends_with(&format!(".{ext}")));
        if has_extension {
            vec![reference.to_string()]
        } else {
            self.extensions
                .iter()
                .map(|ext| format!("{reference}.{ext}"))
                .collect()
        }
    }

    fn candidates(
        &self,
        reference: &str,
        importer: Option<&SchemaLocation>,
    ) -> Result<Vec<SchemaLocation>> {
        let names = self.file_names(reference);
        let mut candidates = Vec::new();

        match importer {
            Some(importer) => {
                for name in &names {
                    candidates.push(importer.sibling(name)?);
                }
            }
            None => {
                for name in &names {
                    candidates.push(SchemaLocation::File(PathBuf::from(name)));
                }
            }
        }

        for dir in &self.search_paths {
            for name in &names {
                candidates.push(SchemaLocation::File(dir.join(name)));
            }
        }
        Ok(candidates)
    }
}
