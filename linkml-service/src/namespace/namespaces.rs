//! Prefix table with default and base namespaces

use indexmap::IndexMap;
use linkml_core::error::{LinkMLError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

use super::NamespaceResolver;
use super::prefix_registry::PrefixRegistry;

const DEFAULT_KEY: &str = "@default";
const BASE_KEY: &str = "@base";

static NCNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{N}_.\-\x{B7}\x{300}-\x{36F}\x{203F}-\x{2040}]*$")
        .expect("valid NCName regex pattern")
});

/// Check whether `key` is usable as a prefix name
#[must_use]
pub fn is_ncname(key: &str) -> bool {
    !key.is_empty() && NCNAME_REGEX.is_match(key)
}

/// A namespace URI that mints terms by appending a local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Create a namespace from its URI
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// URI of `local` within this namespace
    #[must_use]
    pub fn term(&self, local: &str) -> String {
        format!("{}{local}", self.0)
    }

    /// The namespace URI itself
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

impl From<String> for Namespace {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

/// Prefix to namespace table
///
/// Besides ordinary prefixes the table holds two reserved entries: the
/// default namespace (used for `:local`) and the base namespace (used for
/// bare `local` names).
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    store: IndexMap<String, Namespace>,
}

impl Namespaces {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `prefix` to `namespace`.
    ///
    /// Remapping an existing prefix to a different namespace is ignored with a
    /// warning; the first mapping stays.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` if `prefix` is not an NCName.
    pub fn set(&mut self, prefix: &str, namespace: impl Into<Namespace>) -> Result<()> {
        if !is_ncname(prefix) {
            return Err(LinkMLError::namespace(format!("Invalid NCName: {prefix}")));
        }
        let namespace = namespace.into();
        match self.store.get(prefix) {
            Some(existing) if *existing != namespace => {
                tracing::warn!(
                    prefix,
                    existing = %existing,
                    ignored = %namespace,
                    "prefix is already mapped, new mapping ignored"
                );
            }
            Some(_) => {}
            None => {
                self.store.insert(prefix.to_string(), namespace);
            }
        }
        Ok(())
    }

    /// Namespace registered for `prefix`
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` if the prefix is unknown.
    pub fn get(&self, prefix: &str) -> Result<&Namespace> {
        self.store
            .get(prefix)
            .ok_or_else(|| LinkMLError::namespace(format!("Key does not exist: {prefix}")))
    }

    /// Whether `prefix` is mapped
    #[must_use]
    pub fn contains(&self, prefix: &str) -> bool {
        self.store.contains_key(prefix)
    }

    /// Registered prefixes, reserved keys excluded
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &Namespace)> {
        self.store
            .iter()
            .filter(|(k, _)| !is_reserved(k))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// The default namespace
    #[must_use]
    pub fn default_namespace(&self) -> Option<&Namespace> {
        self.store.get(DEFAULT_KEY)
    }

    /// Set the default namespace
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` if a different default is set.
    pub fn set_default(&mut self, namespace: impl Into<Namespace>) -> Result<()> {
        self.set_reserved(DEFAULT_KEY, "Default", namespace.into())
    }

    /// Remove the default namespace
    pub fn clear_default(&mut self) {
        self.store.shift_remove(DEFAULT_KEY);
    }

    /// The base namespace
    #[must_use]
    pub fn base(&self) -> Option<&Namespace> {
        self.store.get(BASE_KEY)
    }

    /// Set the base namespace
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` if a different base is set.
    pub fn set_base(&mut self, namespace: impl Into<Namespace>) -> Result<()> {
        self.set_reserved(BASE_KEY, "Base", namespace.into())
    }

    /// Remove the base namespace
    pub fn clear_base(&mut self) {
        self.store.shift_remove(BASE_KEY);
    }

    fn set_reserved(&mut self, key: &str, label: &str, namespace: Namespace) -> Result<()> {
        if let Some(existing) = self.store.get(key)
            && *existing != namespace
        {
            return Err(LinkMLError::namespace(format!(
                "{label} is already set to {existing}"
            )));
        }
        self.store.insert(key.to_string(), namespace);
        Ok(())
    }

    /// Contract `uri` using the longest matching namespace.
    ///
    /// Default and base matches are only considered when `default_ok` is
    /// set; on equal length an ordinary prefix beats them. Returns `None`
    /// when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` if `uri` looks like a CURIE
    /// rather than a URI.
    pub fn curie_for(&self, uri: &str, default_ok: bool) -> Result<Option<String>> {
        if uri.contains(':') && !uri.contains(":/") {
            return Err(LinkMLError::namespace(format!("Not a valid URI: {uri}")));
        }

        let mut best: Option<(&str, &str)> = None;
        for (key, ns) in &self.store {
            let ns = ns.as_str();
            if !uri.starts_with(ns) || (!default_ok && is_reserved(key)) {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_key, best_ns)) => {
                    ns.len() > best_ns.len()
                        || (ns.len() == best_ns.len() && is_reserved(best_key) && !is_reserved(key))
                }
            };
            if better {
                best = Some((key.as_str(), ns));
            }
        }

        Ok(best.map(|(key, ns)| {
            let local = &uri[ns.len()..];
            match key {
                DEFAULT_KEY => format!(":{local}"),
                BASE_KEY => local.to_string(),
                prefix => format!("{prefix}:{local}"),
            }
        }))
    }

    /// Expand a CURIE, bare local name or URI to an absolute URI.
    ///
    /// `prefix:local` uses the registered prefix, `:local` the default
    /// namespace, a bare `local` the base namespace; anything containing
    /// `://` passes through unchanged.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` for invalid or unknown prefixes.
    pub fn uri_for(&self, curie_or_uri: &str) -> Result<String> {
        if curie_or_uri.contains("://") {
            return Ok(curie_or_uri.to_string());
        }

        let (prefix, local) = match curie_or_uri.split_once(':') {
            Some(("", local)) => (DEFAULT_KEY, local),
            Some((prefix, local)) => {
                if !is_ncname(prefix) {
                    return Err(LinkMLError::namespace(format!(
                        "Not a valid CURIE: {curie_or_uri}"
                    )));
                }
                (prefix, local)
            }
            None => (BASE_KEY, curie_or_uri),
        };

        self.store
            .get(prefix)
            .map(|ns| ns.term(local))
            .ok_or_else(|| LinkMLError::namespace(format!("Unknown CURIE prefix: {prefix}")))
    }

    /// Merge a JSON-LD style context into the table.
    ///
    /// An empty key names the default namespace and is only taken when
    /// `include_defaults` is set and no default exists yet. Existing prefixes
    /// are never overwritten and keys that are not NCNames are skipped.
    /// Values may be plain strings or objects carrying an `@id`.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` if setting the default fails.
    pub fn add_context(&mut self, context: &IndexMap<String, Value>, include_defaults: bool) -> Result<()> {
        for (key, value) in context {
            let Some(uri) = context_uri(value) else {
                continue;
            };
            if key.is_empty() {
                if include_defaults && self.default_namespace().is_none() {
                    self.set_default(uri)?;
                }
            } else if !self.store.contains_key(key) && is_ncname(key) {
                self.set(key, uri)?;
            }
        }
        Ok(())
    }

    /// Fetch the named shared prefix map and merge it into the table
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` if the map cannot be fetched.
    pub async fn add_prefix_map(
        &mut self,
        registry: &PrefixRegistry,
        name: &str,
        include_defaults: bool,
    ) -> Result<()> {
        let context = registry.fetch(name).await?;
        self.add_context(&context, include_defaults)
    }
}

impl NamespaceResolver for Namespaces {
    fn resolve(&self, curie_or_uri: &str) -> Result<String> {
        self.uri_for(curie_or_uri)
    }

    fn abbreviate(&self, uri: &str) -> Option<String> {
        self.curie_for(uri, true).ok().flatten()
    }
}

fn is_reserved(key: &str) -> bool {
    key == DEFAULT_KEY || key == BASE_KEY
}

fn context_uri(value: &Value) -> Option<&str> {
    match value {
        Value::String(uri) => Some(uri),
        Value::Object(map) => map.get("@id").and_then(Value::as_str),
        _ => None,
    }
}
