//! Namespace and CURIE management for LinkML
//!
//! This module provides the prefix table used to expand CURIE import
//! references and to contract URIs, plus the process-wide cache of shared
//! prefix maps.

pub mod namespaces;
pub mod prefix_registry;

pub use namespaces::{Namespace, Namespaces, is_ncname};
pub use prefix_registry::PrefixRegistry;

/// Lookup capability consumed by import resolution
pub trait NamespaceResolver: Send + Sync {
    /// Expand a CURIE (or pass through an absolute URI)
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` if the prefix is unknown or the
    /// input is not a valid CURIE.
    fn resolve(&self, curie_or_uri: &str) -> linkml_core::Result<String>;

    /// Contract a URI to a CURIE, if any registered namespace matches
    fn abbreviate(&self, uri: &str) -> Option<String>;
}
