//! Import closure loading, provenance and flattening

use async_trait::async_trait;
use linkml_core::{
    config::LinkMLConfig,
    error::{LinkMLError, Result},
    types::SchemaDefinition,
};
use linkml_service::parser::{SchemaLocation, SchemaParser, SchemaSource, YamlParser};
use linkml_service::schema_view::{OrderedBy, SchemaView};
use pretty_assertions::assert_eq;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

fn inputs() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("inputs")
}

/// Configuration that serves `linkml:types` from the local fixture
fn offline_config() -> LinkMLConfig {
    let mut config = LinkMLConfig::default();
    config.schema.import_map.insert(
        "linkml:types".to_string(),
        inputs().join("types.yaml").display().to_string(),
    );
    config
}

async fn kitchen_sink() -> Result<SchemaView> {
    SchemaView::load_with_config(inputs().join("kitchen_sink.yaml"), offline_config()).await
}

/// Documents held in memory, keyed by location string
#[derive(Debug, Default)]
struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    fn with(mut self, location: &str, text: &str) -> Self {
        self.documents.insert(location.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl SchemaSource for MemorySource {
    async fn read(&self, location: &SchemaLocation) -> Result<String> {
        self.documents
            .get(&location.to_string())
            .cloned()
            .ok_or_else(|| LinkMLError::import(location.to_string(), "not in memory"))
    }

    async fn exists(&self, location: &SchemaLocation) -> bool {
        self.documents.contains_key(&location.to_string())
    }
}

fn parse(text: &str) -> Result<SchemaDefinition> {
    YamlParser::new().parse_str(text)
}

#[tokio::test]
async fn test_load_without_imports() -> TestResult {
    let view = SchemaView::load(inputs().join("kitchen_sink_noimports.yaml")).await?;
    assert_eq!(view.schema().name, "kitchen_sink");
    assert!(!view.is_loaded());
    Ok(())
}

#[tokio::test]
async fn test_imports_closure_order_and_ownership() -> TestResult {
    let mut view = kitchen_sink().await?;
    assert_eq!(view.imports_closure(), ["kitchen_sink"]);

    view.load_imports_closure().await?;
    assert!(view.is_loaded());
    assert_eq!(view.imports_closure(), ["kitchen_sink", "core", "linkml:types"]);

    assert_eq!(view.in_schema("Person").as_deref(), Some("kitchen_sink"));
    assert_eq!(view.in_schema("nickname").as_deref(), Some("kitchen_sink"));
    assert_eq!(view.in_schema("id").as_deref(), Some("core"));
    assert_eq!(view.in_schema("name").as_deref(), Some("core"));
    assert_eq!(view.in_schema("activity").as_deref(), Some("core"));
    assert_eq!(view.in_schema("string").as_deref(), Some("types"));
    assert_eq!(view.in_schema("nothing"), None);
    Ok(())
}

#[tokio::test]
async fn test_load_is_idempotent() -> TestResult {
    let mut view = kitchen_sink().await?;
    view.load_imports_closure().await?;
    let closure = view.imports_closure();
    let epoch = view.epoch();

    view.load_imports_closure().await?;
    assert_eq!(view.imports_closure(), closure);
    assert_eq!(view.epoch(), epoch);
    Ok(())
}

#[tokio::test]
async fn test_provenance_is_tagged() -> TestResult {
    let mut view = kitchen_sink().await?;
    view.load_imports_closure().await?;

    let from = |e: Option<&linkml_core::types::ElementMetadata>| {
        e.and_then(|m| m.from_schema.clone())
    };
    assert_eq!(
        from(view.get_slot("id").map(|s| &s.meta)).as_deref(),
        Some("https://w3id.org/linkml/tests/core")
    );
    assert_eq!(
        from(view.get_type("string").map(|t| &t.meta)).as_deref(),
        Some("https://w3id.org/linkml/types")
    );
    assert_eq!(
        from(view.get_slot("nickname").map(|s| &s.meta)).as_deref(),
        Some("https://w3id.org/linkml/tests/kitchen_sink")
    );
    Ok(())
}

#[tokio::test]
async fn test_induction_across_documents() -> TestResult {
    let mut view = kitchen_sink().await?;
    view.load_imports_closure().await?;

    let name = view.induced_slot("name", Some("Person"))?;
    assert_eq!(name.required, Some(true));
    assert_eq!(name.range.as_deref(), Some("string"));

    let id = view.get_identifier_slot("Adult")?;
    assert_eq!(id.as_ref().map(|s| s.name.as_str()), Some("id"));

    let induced_id = view.induced_type("objectidentifier")?;
    assert_eq!(induced_id.uri.as_deref(), Some("xsd:anyURI"));

    assert_eq!(
        view.class_slots("Person")?,
        ["age_in_years", "has_employment_history", "nickname", "id", "name", "aliases"]
    );
    Ok(())
}

#[tokio::test]
async fn test_rank_ordering_over_imports() -> TestResult {
    let mut view = kitchen_sink().await?;
    view.load_imports_closure().await?;
    let ranked: Vec<String> = view
        .all_slots(true, OrderedBy::Rank)
        .into_keys()
        .take(2)
        .collect();
    assert_eq!(ranked, ["aliases", "age_in_years"]);
    Ok(())
}

#[tokio::test]
async fn test_merge_imports_is_neutral_for_all_classes() -> TestResult {
    let mut view = kitchen_sink().await?;
    view.load_imports_closure().await?;
    let before: BTreeSet<String> = view.all_classes(true, OrderedBy::Preserve).into_keys().collect();
    assert!(before.contains("Activity"));

    view.merge_imports().await?;
    let after_local: BTreeSet<String> =
        view.all_classes(false, OrderedBy::Preserve).into_keys().collect();
    let after_all: BTreeSet<String> =
        view.all_classes(true, OrderedBy::Preserve).into_keys().collect();

    assert_eq!(before, after_local);
    assert_eq!(after_local, after_all);
    assert_eq!(view.imports_closure(), ["kitchen_sink"]);
    assert!(view.schema().imports.is_empty());
    assert!(view.schema().prefixes.contains_key("xsd"));
    assert_eq!(view.in_schema("id").as_deref(), Some("kitchen_sink"));
    Ok(())
}

#[tokio::test]
async fn test_no_import_round_trip_for_all_slots() -> TestResult {
    let mut view = SchemaView::load(inputs().join("kitchen_sink_noimports.yaml")).await?;
    view.load_imports_closure().await?;
    assert_eq!(view.imports_closure(), ["kitchen_sink"]);

    let local: Vec<String> = view.all_slots(false, OrderedBy::Preserve).into_keys().collect();
    let all: Vec<String> = view.all_slots(true, OrderedBy::Preserve).into_keys().collect();
    assert_eq!(local, all);
    assert!(all.contains(&"nickname".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_collision_precedence() -> TestResult {
    let primary = parse(
        r"
name: primary
imports: [other]
classes:
  Shared:
    description: from primary
",
    )?;
    let source = MemorySource::default().with(
        "other.yaml",
        r"
id: https://example.org/other
name: other
classes:
  Shared:
    description: from other
  Extra: {}
",
    );
    let mut view = SchemaView::new(primary).with_source(Arc::new(source));
    view.load_imports_closure().await?;

    // Live lookups: the imported document shadows the primary.
    let describe = |view: &SchemaView| {
        view.get_class("Shared")
            .and_then(|c| c.meta.description.clone())
    };
    assert_eq!(describe(&view).as_deref(), Some("from other"));
    let classes = view.all_classes(true, OrderedBy::Preserve);
    assert_eq!(classes.keys().collect::<Vec<_>>(), ["Shared", "Extra"]);
    assert_eq!(classes["Shared"].meta.description.as_deref(), Some("from other"));

    // Flattening: the primary wins.
    view.merge_imports().await?;
    assert_eq!(describe(&view).as_deref(), Some("from primary"));
    assert!(view.get_class("Extra").is_some());
    Ok(())
}

#[tokio::test]
async fn test_cyclic_imports_terminate() -> TestResult {
    let primary = parse("name: a\nimports: [b]\n")?;
    let source = MemorySource::default()
        .with("b.yaml", "name: b\nimports: [c]\n")
        .with("c.yaml", "name: c\nimports: [a, b]\n")
        .with("a.yaml", "name: a_again\n");
    let mut view = SchemaView::new(primary).with_source(Arc::new(source));
    view.load_imports_closure().await?;
    assert_eq!(view.imports_closure(), ["a", "b", "c"]);
    Ok(())
}

#[tokio::test]
async fn test_imports_resolve_relative_to_importer() -> TestResult {
    let dir = TempDir::new()?;
    std::fs::create_dir_all(dir.path().join("sub"))?;
    std::fs::write(
        dir.path().join("main.yaml"),
        "name: main\nimports: [sub/child]\n",
    )?;
    std::fs::write(
        dir.path().join("sub").join("child.yaml"),
        "name: child\nimports: [grand]\n",
    )?;
    std::fs::write(
        dir.path().join("sub").join("grand.yaml"),
        "name: grand\nclasses:\n  Deep: {}\n",
    )?;

    let mut view = SchemaView::load(dir.path().join("main.yaml")).await?;
    view.load_imports_closure().await?;
    assert_eq!(view.imports_closure(), ["main", "sub/child", "grand"]);
    assert_eq!(view.in_schema("Deep").as_deref(), Some("grand"));
    Ok(())
}

#[tokio::test]
async fn test_missing_import_fails_and_stays_unloaded() -> TestResult {
    let primary = parse("name: lonely\nimports: [absent]\n")?;
    let mut view = SchemaView::new(primary).with_source(Arc::new(MemorySource::default()));

    let err = view.load_imports_closure().await.unwrap_err();
    match err {
        LinkMLError::ImportLoadError { import, reason } => {
            assert_eq!(import, "absent");
            assert!(reason.contains("absent.yaml"), "reason: {reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!view.is_loaded());
    Ok(())
}

#[tokio::test]
async fn test_curie_import_uses_declared_prefix() -> TestResult {
    let primary = parse(
        r"
name: main
prefixes:
  lib: https://example.org/lib/
imports: ['lib:shapes']
",
    )?;
    let source = MemorySource::default().with(
        "https://example.org/lib/shapes.yaml",
        "name: shapes\nclasses:\n  Circle: {}\n",
    );
    let mut view = SchemaView::new(primary).with_source(Arc::new(source));
    view.load_imports_closure().await?;
    assert_eq!(view.imports_closure(), ["main", "lib:shapes"]);
    assert_eq!(view.in_schema("Circle").as_deref(), Some("shapes"));
    Ok(())
}

#[tokio::test]
async fn test_malformed_prefix_does_not_block_bare_imports() -> TestResult {
    let primary = parse(
        r"
name: main
prefixes:
  1bad: http://x.org/
imports: [other]
",
    )?;
    let source = MemorySource::default().with("other.yaml", "name: other\nclasses:\n  Kept: {}\n");
    let mut view = SchemaView::new(primary).with_source(Arc::new(source));

    view.load_imports_closure().await?;
    assert_eq!(view.imports_closure(), ["main", "other"]);
    assert_eq!(view.in_schema("Kept").as_deref(), Some("other"));
    Ok(())
}

#[tokio::test]
async fn test_malformed_prefix_fails_curie_import_as_load_error() -> TestResult {
    let primary = parse(
        r"
name: main
prefixes:
  1bad: http://x.org/
  lib: https://example.org/lib/
imports: ['lib:shapes']
",
    )?;
    let mut view = SchemaView::new(primary).with_source(Arc::new(MemorySource::default()));

    match view.load_imports_closure().await.unwrap_err() {
        LinkMLError::ImportLoadError { import, reason } => {
            assert_eq!(import, "lib:shapes");
            assert!(reason.contains("1bad"), "reason: {reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!view.is_loaded());
    Ok(())
}

#[tokio::test]
async fn test_materialize_after_merge() -> TestResult {
    let mut view = kitchen_sink().await?;
    view.merge_imports().await?;
    view.materialize_induced_attributes()?;

    let person = view.get_class("Person").cloned().unwrap_or_default();
    let names: Vec<&str> = person.attributes.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        ["nickname", "age_in_years", "has_employment_history", "id", "name", "aliases"]
    );
    assert_eq!(person.attributes["name"].required, Some(true));
    Ok(())
}
