//! Closure, induction and aggregation tests over in-memory schemas

use linkml_core::{
    error::LinkMLError,
    types::{ClassDefinition, ElementType, SchemaDefinition},
};
use linkml_service::parser::{SchemaParser, YamlParser};
use linkml_service::schema_view::{OrderedBy, SchemaView, TraversalOptions};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const SCHEMA: &str = r"
id: t1
name: x
slots:
  s1:
    description: test
    is_a: s2
  s2:
    range: s2r
classes:
  m1: {}
  c1:
    is_a: c2
    mixins: [m1]
    slots: [s1]
  c2:
    is_a: c3
    slot_usage:
      s1:
        range: s1r_c2
  c3: {}
";

fn view() -> Result<SchemaView, LinkMLError> {
    Ok(SchemaView::new(YamlParser::new().parse_str(SCHEMA)?))
}

#[test]
fn test_constructor_keeps_schema() -> TestResult {
    let view = view()?;
    assert_eq!(view.schema().name, "x");
    assert_eq!(view.get_class("c1").map(|c| c.name.as_str()), Some("c1"));
    Ok(())
}

#[test]
fn test_ancestors_without_mixins() -> TestResult {
    let view = view()?;
    let opts = TraversalOptions::default().with_mixins(false);
    assert_eq!(view.class_ancestors("c1", &opts)?, ["c1", "c2", "c3"]);
    Ok(())
}

#[test]
fn test_ancestors_with_mixins() -> TestResult {
    let view = view()?;
    let opts = TraversalOptions::default();
    assert_eq!(view.class_ancestors("c1", &opts)?, ["c1", "c2", "m1", "c3"]);
    assert_eq!(
        view.class_ancestors("c1", &opts.with_reflexive(false))?,
        ["c2", "m1", "c3"]
    );
    Ok(())
}

#[test]
fn test_parents() -> TestResult {
    let view = view()?;
    let opts = TraversalOptions::default();
    assert_eq!(view.class_parents("c1", &opts)?, ["c2", "m1"]);
    assert_eq!(view.class_parents("c1", &opts.with_is_a(false))?, ["m1"]);
    assert_eq!(view.slot_parents("s1", &opts)?, ["s2"]);
    assert!(view.class_parents("c3", &opts)?.is_empty());
    Ok(())
}

#[test]
fn test_induced_slot_slot_usage_wins_over_slot_ancestor() -> TestResult {
    let view = view()?;
    let induced = view.induced_slot("s1", Some("c1"))?;
    assert_eq!(induced.name, "s1");
    assert_eq!(induced.range.as_deref(), Some("s1r_c2"));
    assert_eq!(induced.meta.description.as_deref(), Some("test"));
    Ok(())
}

#[test]
fn test_induced_slot_without_class_inherits_from_slot_ancestor() -> TestResult {
    let view = view()?;
    let induced = view.induced_slot("s1", None)?;
    assert_eq!(induced.range.as_deref(), Some("s2r"));
    assert_eq!(induced.is_a.as_deref(), Some("s2"));
    Ok(())
}

#[test]
fn test_induced_slot_is_idempotent() -> TestResult {
    let view = view()?;
    let first = view.induced_slot("s1", Some("c1"))?;
    let second = view.induced_slot("s1", Some("c1"))?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_descendants_roots_and_leaves() -> TestResult {
    let view = view()?;
    let opts = TraversalOptions::default();
    assert_eq!(view.class_children("c2", &opts)?, ["c1"]);
    assert_eq!(view.class_children("m1", &opts)?, ["c1"]);
    assert!(view.class_children("m1", &opts.with_mixins(false))?.is_empty());
    assert_eq!(view.class_descendants("c3", &opts)?, ["c3", "c2", "c1"]);
    assert_eq!(view.class_roots(&opts), ["m1", "c3"]);
    assert_eq!(view.class_leaves(&opts), ["c1"]);

    assert_eq!(view.slot_ancestors("s1", &opts)?, ["s1", "s2"]);
    assert_eq!(view.slot_children("s2", &opts)?, ["s1"]);
    assert_eq!(view.slot_descendants("s2", &opts.with_reflexive(false))?, ["s1"]);
    Ok(())
}

#[test]
fn test_unresolved_parent_is_an_error() -> TestResult {
    let mut schema = SchemaDefinition::new("broken");
    let mut class = ClassDefinition::new("Orphan");
    class.is_a = Some("Missing".to_string());
    schema.classes.insert("Orphan".to_string(), class);
    let view = SchemaView::new(schema);

    match view.class_ancestors("Orphan", &TraversalOptions::default()) {
        Err(LinkMLError::UnresolvedReference { kind, name, .. }) => {
            assert_eq!(kind, ElementType::Class);
            assert_eq!(name, "Missing");
        }
        other => panic!("expected unresolved reference, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_cyclic_inheritance_is_an_error() -> TestResult {
    let schema = YamlParser::new().parse_str(
        r"
name: cyclic
classes:
  a: {is_a: b}
  b: {mixins: [c]}
  c: {is_a: a}
slots:
  s: {is_a: s}
",
    )?;
    let view = SchemaView::new(schema);

    let err = view
        .class_ancestors("a", &TraversalOptions::default())
        .unwrap_err();
    assert_eq!(err.to_string(), "Cyclic class inheritance: a -> b -> c -> a");

    // Without mixin edges the chain ends at b.
    let opts = TraversalOptions::default().with_mixins(false);
    assert_eq!(view.class_ancestors("a", &opts)?, ["a", "b"]);

    assert!(matches!(
        view.induced_slot("s", None),
        Err(LinkMLError::CyclicInheritance { kind: ElementType::Slot, .. })
    ));
    Ok(())
}

#[test]
fn test_induced_type_chain() -> TestResult {
    let schema = YamlParser::new().parse_str(
        r"
name: types
types:
  string: {uri: 'xsd:string', base: str}
  uriorcurie: {uri: 'xsd:anyURI', typeof: string}
  objectidentifier: {typeof: uriorcurie, description: object id}
",
    )?;
    let view = SchemaView::new(schema);
    let opts = TraversalOptions::default();
    assert_eq!(
        view.type_ancestors("objectidentifier", &opts)?,
        ["objectidentifier", "uriorcurie", "string"]
    );
    assert_eq!(view.type_parents("string", &opts)?, Vec::<String>::new());

    let induced = view.induced_type("objectidentifier")?;
    assert_eq!(induced.uri.as_deref(), Some("xsd:anyURI"));
    assert_eq!(induced.base.as_deref(), Some("str"));
    assert_eq!(induced.meta.description.as_deref(), Some("object id"));
    Ok(())
}

#[test]
fn test_aggregation_orders() -> TestResult {
    let view = view()?;
    let preserve: Vec<String> = view.all_classes(true, OrderedBy::Preserve).into_keys().collect();
    assert_eq!(preserve, ["m1", "c1", "c2", "c3"]);
    let lexical: Vec<String> = view.all_classes(true, OrderedBy::Lexical).into_keys().collect();
    assert_eq!(lexical, ["c1", "c2", "c3", "m1"]);
    let slots: Vec<String> = view.all_slots(false, OrderedBy::Preserve).into_keys().collect();
    assert_eq!(slots, ["s1", "s2"]);
    Ok(())
}

/// Chain `k0 is_a k1 is_a ... kn`, every `ki` also carrying mixin `mi`
fn chain_schema(len: usize) -> SchemaDefinition {
    let mut schema = SchemaDefinition::new("chain");
    for i in 0..=len {
        let mut class = ClassDefinition::new(format!("k{i}"));
        if i < len {
            class.is_a = Some(format!("k{}", i + 1));
        }
        class.mixins = vec![format!("m{i}")];
        schema.classes.insert(class.name.clone(), class);

        let mut mixin = ClassDefinition::new(format!("m{i}"));
        mixin.mixin = Some(true);
        schema.classes.insert(mixin.name.clone(), mixin);
    }
    schema
}

proptest! {
    #[test]
    fn prop_is_a_ancestors_follow_the_chain(len in 0usize..24) {
        let view = SchemaView::new(chain_schema(len));
        let opts = TraversalOptions::default().with_mixins(false);
        let expected: Vec<String> = (0..=len).map(|i| format!("k{i}")).collect();
        prop_assert_eq!(view.class_ancestors("k0", &opts).unwrap(), expected);
    }

    #[test]
    fn prop_mixins_sit_next_to_their_is_a_successor(len in 0usize..24) {
        let view = SchemaView::new(chain_schema(len));
        let with_mixins = view.class_ancestors("k0", &TraversalOptions::default()).unwrap();
        let is_a_only = view
            .class_ancestors("k0", &TraversalOptions::default().with_mixins(false))
            .unwrap();

        // Superset, and the is-a projection keeps its order.
        let projected: Vec<String> = with_mixins.iter().filter(|n| n.starts_with('k')).cloned().collect();
        prop_assert_eq!(&projected, &is_a_only);
        prop_assert_eq!(with_mixins.len(), 2 * (len + 1));

        let position = |name: &str| with_mixins.iter().position(|n| n == name).unwrap();
        for i in 0..len {
            prop_assert_eq!(position(&format!("m{i}")), position(&format!("k{}", i + 1)) + 1);
        }
        prop_assert_eq!(with_mixins.last().cloned(), Some(format!("m{len}")));
    }

    #[test]
    fn prop_induced_slot_is_idempotent_across_cache_resets(len in 1usize..12) {
        let mut schema = chain_schema(len);
        schema.slots.insert("s".to_string(), linkml_core::types::SlotDefinition::new("s"));
        let usage_class = format!("k{len}");
        if let Some(class) = schema.classes.get_mut(&usage_class) {
            let mut usage = linkml_core::types::SlotDefinition::new("s");
            usage.range = Some("R".to_string());
            class.slot_usage.insert("s".to_string(), usage);
        }
        let mut view = SchemaView::new(schema);

        let first = view.induced_slot("s", Some("k0")).unwrap();
        prop_assert_eq!(first.range.as_deref(), Some("R"));
        view.schema_mut();
        let second = view.induced_slot("s", Some("k0")).unwrap();
        prop_assert_eq!(first, second);
    }
}
