//! Schema parsing module for LinkML service
//!
//! This module decodes schema documents from YAML and JSON, locates them
//! (local files or remote URLs) and turns import references into
//! loadable locations.

use linkml_core::{
    error::{LinkMLError, Result},
    types::SchemaDefinition,
};

pub mod import_resolver;
pub mod json_parser;
pub mod schema_loader;
pub mod source;
pub mod yaml_parser;

pub use import_resolver::ImportResolver;
pub use json_parser::JsonParser;
pub use schema_loader::SchemaLoader;
pub use source::{DefaultSchemaSource, SchemaLocation, SchemaSource};
pub use yaml_parser::YamlParser;

/// Trait for schema parsers
pub trait SchemaParser: Send + Sync {
    /// Parse schema from string content
    ///
    /// The returned schema is normalized: names omitted inside keyed maps
    /// are filled from the keys.
    ///
    /// # Errors
    ///
    /// Returns a `LinkMLError` if parsing fails
    fn parse_str(&self, content: &str) -> Result<SchemaDefinition>;
}

/// Main parser that delegates to format-specific parsers
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser {
    yaml: YamlParser,
    json: JsonParser,
}

impl Parser {
    /// Create a new parser
    #[must_use]
    pub const fn new() -> Self {
        Self {
            yaml: YamlParser::new(),
            json: JsonParser::new(),
        }
    }

    /// Parse schema from string with specified format
    ///
    /// # Errors
    ///
    /// Returns a `LinkMLError` if:
    /// - Format is not supported
    /// - Parsing fails
    pub fn parse_str(&self, content: &str, format: &str) -> Result<SchemaDefinition> {
        match format {
            "yaml" | "yml" => self.yaml.parse_str(content),
            "json" => self.json.parse_str(content),
            _ => Err(LinkMLError::parse(format!("Unsupported format: {format}"))),
        }
    }
}
