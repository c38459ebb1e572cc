//! YAML parser for `LinkML` schemas

use linkml_core::{
    error::{LinkMLError, Result},
    types::SchemaDefinition,
};

use super::SchemaParser;

/// `YAML` parser implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlParser;

impl YamlParser {
    /// Create a new `YAML` parser
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SchemaParser for YamlParser {
    fn parse_str(&self, content: &str) -> Result<SchemaDefinition> {
        let mut schema: SchemaDefinition = serde_yaml::from_str(content).map_err(|e| {
            LinkMLError::parse_at(
                format!("YAML parsing error: {e}"),
                e.location().map_or_else(
                    || "unknown location".to_string(),
                    |l| format!("line {}, column {}", l.line(), l.column()),
                ),
            )
        })?;
        schema.normalize();
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_schema() -> linkml_core::Result<()> {
        let yaml = r"
id: https://example.org/test
name: test_schema
";

        let parser = YamlParser::new();
        let schema = parser.parse_str(yaml)?;

        assert_eq!(schema.id, "https://example.org/test");
        assert_eq!(schema.name, "test_schema");
        Ok(())
    }

    #[test]
    fn test_parse_schema_with_keyed_classes() -> linkml_core::Result<()> {
        let yaml = r"
id: https://example.org/test
name: test_schema
classes:
  Person:
    description: A human being
    slots:
      - name
      - age
slots:
  name:
  age:
    range: integer
";

        let parser = YamlParser::new();
        let schema = parser.parse_str(yaml)?;

        assert_eq!(schema.classes["Person"].name, "Person");
        assert_eq!(schema.classes["Person"].slots.len(), 2);
        assert_eq!(schema.slots["name"].name, "name");
        assert_eq!(schema.slots["age"].range.as_deref(), Some("integer"));
        Ok(())
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let yaml = "invalid: yaml: content:";

        let parser = YamlParser::new();
        let result = parser.parse_str(yaml);

        match result {
            Err(LinkMLError::ParseError { message, location }) => {
                assert!(message.contains("YAML parsing error"));
                assert!(location.is_some());
            }
            other => panic!("Expected ParseError, got {other:?}"),
        }
    }
}
