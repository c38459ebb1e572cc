//! Error types for `LinkML` schema resolution

use crate::types::ElementType;
use thiserror::Error;

/// Main error type for `LinkML` operations
#[derive(Error, Debug)]
pub enum LinkMLError {
    /// Document decoding errors
    #[error("Failed to parse schema: {message}")]
    ParseError {
        /// Error message
        message: String,
        /// Source location if available
        location: Option<String>,
    },

    /// A named element could not be found
    #[error("Unresolved {kind} reference '{name}'{}", .context.as_deref().map(|c| format!(" in {c}")).unwrap_or_default())]
    UnresolvedReference {
        /// Kind of element being looked up
        kind: ElementType,
        /// Name that failed to resolve
        name: String,
        /// Lookup context, e.g. the class an induced slot was requested for
        context: Option<String>,
    },

    /// An is-a/mixin/typeof graph loops back on itself
    #[error("Cyclic {kind} inheritance: {}", .cycle.join(" -> "))]
    CyclicInheritance {
        /// Kind of graph
        kind: ElementType,
        /// Names along the cycle, first name repeated at the end
        cycle: Vec<String>,
    },

    /// Instance data does not have the shape the schema declares
    #[error("Structural mismatch at '{path}': {message}")]
    StructuralMismatch {
        /// Error message
        message: String,
        /// Key path from the walk root
        path: String,
    },

    /// An imported document could not be fetched or decoded
    #[error("Failed to load import '{import}': {reason}")]
    ImportLoadError {
        /// Import reference that failed
        import: String,
        /// Reason for failure
        reason: String,
    },

    /// Prefix or URI mapping errors
    #[error("Namespace error: {0}")]
    NamespaceError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic errors with context
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for `LinkML` operations
pub type Result<T> = std::result::Result<T, LinkMLError>;

impl LinkMLError {
    /// Create a new parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location: None,
        }
    }

    /// Create a new parse error with location
    #[must_use]
    pub fn parse_at(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location: Some(location.into()),
        }
    }

    /// Create an unresolved reference error
    #[must_use]
    pub fn unresolved(kind: ElementType, name: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            kind,
            name: name.into(),
            context: None,
        }
    }

    /// Create an unresolved reference error with lookup context
    #[must_use]
    pub fn unresolved_in(
        kind: ElementType,
        name: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::UnresolvedReference {
            kind,
            name: name.into(),
            context: Some(context.into()),
        }
    }

    /// Create a cyclic inheritance error
    #[must_use]
    pub fn cycle(kind: ElementType, cycle: Vec<String>) -> Self {
        Self::CyclicInheritance { kind, cycle }
    }

    /// Create a structural mismatch error
    #[must_use]
    pub fn mismatch(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::StructuralMismatch {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a new import error
    #[must_use]
    pub fn import(import: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ImportLoadError {
            import: import.into(),
            reason: reason.into(),
        }
    }

    /// Create a namespace error
    #[must_use]
    pub fn namespace(message: impl Into<String>) -> Self {
        Self::NamespaceError(message.into())
    }

    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a generic error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for LinkMLError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for LinkMLError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for LinkMLError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<anyhow::Error> for LinkMLError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            message: err.to_string(),
            source: Some(Box::new(std::io::Error::other(err))),
        }
    }
}
