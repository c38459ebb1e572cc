//! `gen-linkml` end-to-end rendering

use clap::Parser;
use linkml_core::types::SchemaDefinition;
use linkml_service::cli::{self, Args};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn inputs() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("inputs")
}

/// Write a YAML config that maps `linkml:types` onto the local fixture
fn write_config(dir: &Path) -> std::io::Result<PathBuf> {
    let path = dir.join("linkml.yaml");
    let types = inputs().join("types.yaml");
    std::fs::write(
        &path,
        format!(
            "schema:\n  import_map:\n    'linkml:types': '{}'\n",
            types.display()
        ),
    )?;
    Ok(path)
}

fn args(extra: &[&str], config: &Path) -> Args {
    let schema = inputs().join("kitchen_sink.yaml");
    let mut argv = vec![
        "gen-linkml".to_string(),
        "-c".to_string(),
        config.display().to_string(),
    ];
    argv.extend(extra.iter().map(|s| (*s).to_string()));
    argv.push(schema.display().to_string());
    Args::parse_from(argv)
}

#[tokio::test]
async fn test_default_render_merges_and_materializes() -> TestResult {
    let dir = TempDir::new()?;
    let config = write_config(dir.path())?;

    let rendered = cli::render(&args(&[], &config)).await?;
    let schema: SchemaDefinition = serde_json::from_str(&rendered)?;

    assert_eq!(schema.name, "kitchen_sink");
    assert!(schema.imports.is_empty());
    assert!(schema.classes.contains_key("Activity"));
    assert!(schema.types.contains_key("string"));

    let person = &schema.classes["Person"];
    assert_eq!(person.attributes["name"].required, Some(true));
    assert_eq!(person.attributes["id"].identifier, Some(true));
    Ok(())
}

#[tokio::test]
async fn test_no_merge_keeps_imports() -> TestResult {
    let dir = TempDir::new()?;
    let config = write_config(dir.path())?;

    let rendered = cli::render(&args(&["--no-merge-imports", "-f", "yaml"], &config)).await?;
    let schema: SchemaDefinition = serde_yaml::from_str(&rendered)?;

    assert_eq!(schema.imports, ["linkml:types", "core"]);
    assert!(!schema.classes.contains_key("Activity"));
    // Induced attributes still reference slots from the imported documents.
    assert!(schema.classes["Person"].attributes.contains_key("id"));
    Ok(())
}

#[tokio::test]
async fn test_no_materialize_leaves_attributes() -> TestResult {
    let dir = TempDir::new()?;
    let config = write_config(dir.path())?;

    let rendered = cli::render(&args(&["--no-materialize-attributes"], &config)).await?;
    let schema: SchemaDefinition = serde_json::from_str(&rendered)?;

    let person = &schema.classes["Person"];
    assert_eq!(
        person.attributes.keys().collect::<Vec<_>>(),
        ["nickname"]
    );
    Ok(())
}

#[tokio::test]
async fn test_run_writes_output_file() -> TestResult {
    let dir = TempDir::new()?;
    let config = write_config(dir.path())?;
    let output = dir.path().join("flat.yaml");
    let output_arg = output.display().to_string();

    cli::run(args(&["-f", "yaml", "-o", &output_arg], &config)).await?;

    let written = std::fs::read_to_string(&output)?;
    let schema: SchemaDefinition = serde_yaml::from_str(&written)?;
    assert_eq!(schema.name, "kitchen_sink");
    Ok(())
}

#[tokio::test]
async fn test_missing_schema_is_an_error() -> TestResult {
    let dir = TempDir::new()?;
    let config = write_config(dir.path())?;
    let argv = [
        "gen-linkml".to_string(),
        "-c".to_string(),
        config.display().to_string(),
        dir.path().join("absent.yaml").display().to_string(),
    ];
    assert!(cli::render(&Args::parse_from(argv)).await.is_err());
    Ok(())
}
