//! Core type definitions for LinkML schemas
//!
//! Every definition kind is a plain record that embeds the shared
//! [`ElementMetadata`] block. Inheritance between definitions is expressed by
//! name (`is_a`, `mixins`, `typeof`) and resolved by the schema view, never by
//! Rust-level inheritance.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of a named schema element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// Class definition
    Class,
    /// Slot definition
    Slot,
    /// Type definition
    Type,
    /// Enum definition
    Enum,
    /// Subset definition
    Subset,
    /// A whole schema document (imports)
    Schema,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Class => "class",
            Self::Slot => "slot",
            Self::Type => "type",
            Self::Enum => "enum",
            Self::Subset => "subset",
            Self::Schema => "schema",
        };
        f.write_str(label)
    }
}

/// Metadata shared by every definition kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ElementMetadata {
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Human-readable title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Deprecation notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,

    /// Ordering hint used by rank ordering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,

    /// Identity of the document that declares this element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_schema: Option<String>,

    /// Alternative names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Subsets this element belongs to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub in_subset: Vec<String>,

    /// See also references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub see_also: Vec<String>,

    /// Comments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,

    /// Notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    /// Todos
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub todos: Vec<String>,

    /// Exact mappings to external terms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exact_mappings: Vec<String>,

    /// Close mappings to external terms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub close_mappings: Vec<String>,

    /// Related mappings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_mappings: Vec<String>,

    /// Narrow mappings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub narrow_mappings: Vec<String>,

    /// Broad mappings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub broad_mappings: Vec<String>,

    /// Free-form annotations
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: IndexMap<String, Value>,

    /// Metamodel fields without a dedicated field here (`inverse`, `any_of`,
    /// `unique_keys`, ...), carried through unchanged
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Schema definition - one schema document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaDefinition {
    /// Unique identifier for the schema
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Name of the schema
    #[serde(default)]
    pub name: String,

    /// Human-readable title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description of the schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Version of the schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// License information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Default prefix for the schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_prefix: Option<String>,

    /// Default range for slots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_range: Option<String>,

    /// Prefix declarations
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub prefixes: IndexMap<String, PrefixDefinition>,

    /// Shared prefix maps to pull into the namespace table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_curi_maps: Vec<String>,

    /// Import references (plain names or CURIEs)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    /// Subset definitions
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_named_map"
    )]
    pub subsets: IndexMap<String, SubsetDefinition>,

    /// Type definitions
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_named_map"
    )]
    pub types: IndexMap<String, TypeDefinition>,

    /// Enum definitions
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_named_map"
    )]
    pub enums: IndexMap<String, EnumDefinition>,

    /// Slot definitions
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_named_map"
    )]
    pub slots: IndexMap<String, SlotDefinition>,

    /// Class definitions
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_named_map"
    )]
    pub classes: IndexMap<String, ClassDefinition>,

    /// Location the document was decoded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    /// Document-level fields without a dedicated field here
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Class definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClassDefinition {
    /// Name of the class
    #[serde(default)]
    pub name: String,

    /// Parent class (single inheritance)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,

    /// Mixin classes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,

    /// Is this class abstract?
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_: Option<bool>,

    /// Is this a mixin?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixin: Option<bool>,

    /// Slots applicable to this class
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<String>,

    /// Class-local slot overrides
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_named_map"
    )]
    pub slot_usage: IndexMap<String, SlotDefinition>,

    /// Inline slots scoped to this class
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_named_map"
    )]
    pub attributes: IndexMap<String, SlotDefinition>,

    /// Class URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_uri: Option<String>,

    /// Tree root flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_root: Option<bool>,

    /// Shared metadata
    #[serde(flatten)]
    pub meta: ElementMetadata,
}

/// Slot definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlotDefinition {
    /// Name of the slot
    #[serde(default)]
    pub name: String,

    /// Parent slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,

    /// Mixin slots
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,

    /// Is this slot abstract?
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_: Option<bool>,

    /// Is this a mixin slot?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixin: Option<bool>,

    /// Name of the class, enum or type a value must conform to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    /// Class the slot is declared for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Is this slot required?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Is this slot recommended?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,

    /// Is this slot multivalued?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multivalued: Option<bool>,

    /// Is this slot an identifier?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<bool>,

    /// Is this slot a key (unique within its container)?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<bool>,

    /// Does the value designate the instance type?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designates_type: Option<bool>,

    /// Are values nested rather than referenced?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inlined: Option<bool>,

    /// Are inlined values serialized as a list?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inlined_as_list: Option<bool>,

    /// Slot URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_uri: Option<String>,

    /// Pattern for string values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Default value expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifabsent: Option<String>,

    /// Minimum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<Value>,

    /// Maximum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<Value>,

    /// Class that owns this slot after induction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Shared metadata
    #[serde(flatten)]
    pub meta: ElementMetadata,
}

/// Type definition - a linear `typeof` chain
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TypeDefinition {
    /// Name of the type
    #[serde(default)]
    pub name: String,

    /// Parent type
    #[serde(rename = "typeof", skip_serializing_if = "Option::is_none")]
    pub typeof_: Option<String>,

    /// Python base type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    /// Type URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Serialized representation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repr: Option<String>,

    /// Pattern constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Minimum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<Value>,

    /// Maximum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<Value>,

    /// Shared metadata
    #[serde(flatten)]
    pub meta: ElementMetadata,
}

/// Enum definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnumDefinition {
    /// Name of the enum
    #[serde(default)]
    pub name: String,

    /// Enum URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_uri: Option<String>,

    /// Code set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_set: Option<String>,

    /// Permissible values keyed by text
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_permissible_values"
    )]
    pub permissible_values: IndexMap<String, PermissibleValue>,

    /// Shared metadata
    #[serde(flatten)]
    pub meta: ElementMetadata,
}

/// Permissible value of an enum
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PermissibleValue {
    /// Text of the value
    #[serde(default)]
    pub text: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Meaning URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,

    /// Remaining fields, carried through unchanged
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Prefix definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PrefixDefinition {
    /// Simple string expansion
    Simple(String),
    /// Expanded form
    Complex {
        /// Prefix name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefix_prefix: Option<String>,
        /// Namespace the prefix expands to
        prefix_reference: String,
    },
}

impl PrefixDefinition {
    /// Namespace URI this prefix expands to
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            Self::Simple(uri) => uri,
            Self::Complex {
                prefix_reference, ..
            } => prefix_reference,
        }
    }
}

/// Subset definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubsetDefinition {
    /// Name of the subset
    #[serde(default)]
    pub name: String,

    /// Shared metadata
    #[serde(flatten)]
    pub meta: ElementMetadata,
}

/// A named definition carrying shared metadata
pub trait Element {
    /// Name of the element
    fn name(&self) -> &str;

    /// Shared metadata
    fn metadata(&self) -> &ElementMetadata;

    /// Mutable shared metadata
    fn metadata_mut(&mut self) -> &mut ElementMetadata;
}

/// An element that participates in an is-a/mixin graph
pub trait Inheritable: Element {
    /// Primary parent
    fn parent(&self) -> Option<&str>;

    /// Secondary parents
    fn mixin_parents(&self) -> &[String] {
        &[]
    }
}

/// Field-by-field "fill what is unset" merge.
///
/// Fields already set on `self` are never overwritten; empty collections
/// count as unset.
pub trait MergeUnset {
    /// Copy every field of `other` that is unset on `self`
    fn merge_unset_from(&mut self, other: &Self);
}

fn fill<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if target.is_none() {
        target.clone_from(source);
    }
}

fn fill_vec<T: Clone>(target: &mut Vec<T>, source: &[T]) {
    if target.is_empty() {
        target.extend_from_slice(source);
    }
}

fn fill_map<V: Clone>(target: &mut IndexMap<String, V>, source: &IndexMap<String, V>) {
    if target.is_empty() {
        target.clone_from(source);
    }
}

/// Key-by-key variant of [`fill_map`] for open-ended field maps
fn fill_entries(target: &mut IndexMap<String, Value>, source: &IndexMap<String, Value>) {
    for (key, value) in source {
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn fill_name(target: &mut String, source: &str) {
    if target.is_empty() {
        source.clone_into(target);
    }
}

impl MergeUnset for ElementMetadata {
    fn merge_unset_from(&mut self, other: &Self) {
        fill(&mut self.description, &other.description);
        fill(&mut self.title, &other.title);
        fill(&mut self.deprecated, &other.deprecated);
        fill(&mut self.rank, &other.rank);
        fill(&mut self.from_schema, &other.from_schema);
        fill_vec(&mut self.aliases, &other.aliases);
        fill_vec(&mut self.in_subset, &other.in_subset);
        fill_vec(&mut self.see_also, &other.see_also);
        fill_vec(&mut self.comments, &other.comments);
        fill_vec(&mut self.notes, &other.notes);
        fill_vec(&mut self.todos, &other.todos);
        fill_vec(&mut self.exact_mappings, &other.exact_mappings);
        fill_vec(&mut self.close_mappings, &other.close_mappings);
        fill_vec(&mut self.related_mappings, &other.related_mappings);
        fill_vec(&mut self.narrow_mappings, &other.narrow_mappings);
        fill_vec(&mut self.broad_mappings, &other.broad_mappings);
        fill_map(&mut self.annotations, &other.annotations);
        fill_entries(&mut self.extra, &other.extra);
    }
}

impl MergeUnset for SlotDefinition {
    fn merge_unset_from(&mut self, other: &Self) {
        fill_name(&mut self.name, &other.name);
        fill(&mut self.is_a, &other.is_a);
        fill_vec(&mut self.mixins, &other.mixins);
        fill(&mut self.abstract_, &other.abstract_);
        fill(&mut self.mixin, &other.mixin);
        fill(&mut self.range, &other.range);
        fill(&mut self.domain, &other.domain);
        fill(&mut self.required, &other.required);
        fill(&mut self.recommended, &other.recommended);
        fill(&mut self.multivalued, &other.multivalued);
        fill(&mut self.identifier, &other.identifier);
        fill(&mut self.key, &other.key);
        fill(&mut self.designates_type, &other.designates_type);
        fill(&mut self.inlined, &other.inlined);
        fill(&mut self.inlined_as_list, &other.inlined_as_list);
        fill(&mut self.slot_uri, &other.slot_uri);
        fill(&mut self.pattern, &other.pattern);
        fill(&mut self.ifabsent, &other.ifabsent);
        fill(&mut self.minimum_value, &other.minimum_value);
        fill(&mut self.maximum_value, &other.maximum_value);
        fill(&mut self.owner, &other.owner);
        self.meta.merge_unset_from(&other.meta);
    }
}

impl MergeUnset for TypeDefinition {
    fn merge_unset_from(&mut self, other: &Self) {
        fill_name(&mut self.name, &other.name);
        fill(&mut self.typeof_, &other.typeof_);
        fill(&mut self.base, &other.base);
        fill(&mut self.uri, &other.uri);
        fill(&mut self.repr, &other.repr);
        fill(&mut self.pattern, &other.pattern);
        fill(&mut self.minimum_value, &other.minimum_value);
        fill(&mut self.maximum_value, &other.maximum_value);
        self.meta.merge_unset_from(&other.meta);
    }
}

impl MergeUnset for ClassDefinition {
    fn merge_unset_from(&mut self, other: &Self) {
        fill_name(&mut self.name, &other.name);
        fill(&mut self.is_a, &other.is_a);
        fill_vec(&mut self.mixins, &other.mixins);
        fill(&mut self.abstract_, &other.abstract_);
        fill(&mut self.mixin, &other.mixin);
        fill_vec(&mut self.slots, &other.slots);
        fill_map(&mut self.slot_usage, &other.slot_usage);
        fill_map(&mut self.attributes, &other.attributes);
        fill(&mut self.class_uri, &other.class_uri);
        fill(&mut self.tree_root, &other.tree_root);
        self.meta.merge_unset_from(&other.meta);
    }
}

macro_rules! impl_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                fn name(&self) -> &str {
                    &self.name
                }

                fn metadata(&self) -> &ElementMetadata {
                    &self.meta
                }

                fn metadata_mut(&mut self) -> &mut ElementMetadata {
                    &mut self.meta
                }
            }
        )*
    };
}

impl_element!(
    ClassDefinition,
    SlotDefinition,
    TypeDefinition,
    EnumDefinition,
    SubsetDefinition,
);

impl Inheritable for ClassDefinition {
    fn parent(&self) -> Option<&str> {
        self.is_a.as_deref()
    }

    fn mixin_parents(&self) -> &[String] {
        &self.mixins
    }
}

impl Inheritable for SlotDefinition {
    fn parent(&self) -> Option<&str> {
        self.is_a.as_deref()
    }

    fn mixin_parents(&self) -> &[String] {
        &self.mixins
    }
}

impl Inheritable for TypeDefinition {
    fn parent(&self) -> Option<&str> {
        self.typeof_.as_deref()
    }
}

impl SchemaDefinition {
    /// Create a new schema definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: format!("https://example.org/{name}"),
            name,
            ..Default::default()
        }
    }

    /// Fill in element names omitted inside keyed maps.
    ///
    /// Documents commonly write `slots: {age: {range: integer}}` and rely on
    /// the key for the name; this copies the key into `name` wherever it is
    /// empty, including class attributes, slot usages and permissible values.
    pub fn normalize(&mut self) {
        fn name_from_keys<T: Element>(map: &mut IndexMap<String, T>, set: fn(&mut T, &str)) {
            for (key, element) in map.iter_mut() {
                if element.name().is_empty() {
                    set(element, key);
                }
            }
        }

        name_from_keys(&mut self.subsets, |e, k| k.clone_into(&mut e.name));
        name_from_keys(&mut self.types, |e, k| k.clone_into(&mut e.name));
        name_from_keys(&mut self.slots, |e, k| k.clone_into(&mut e.name));
        name_from_keys(&mut self.enums, |e, k| k.clone_into(&mut e.name));
        name_from_keys(&mut self.classes, |e, k| k.clone_into(&mut e.name));

        for enum_def in self.enums.values_mut() {
            for (text, pv) in &mut enum_def.permissible_values {
                if pv.text.is_empty() {
                    text.clone_into(&mut pv.text);
                }
            }
        }
        for class in self.classes.values_mut() {
            name_from_keys(&mut class.attributes, |e, k| k.clone_into(&mut e.name));
            name_from_keys(&mut class.slot_usage, |e, k| k.clone_into(&mut e.name));
        }
    }

    /// Tag every element without provenance with `from_schema`.
    ///
    /// Class attributes are tagged as well. Elements that already carry a
    /// `from_schema` keep it.
    pub fn tag_provenance(&mut self, from_schema: &str) {
        fn tag<T: Element>(map: &mut IndexMap<String, T>, from_schema: &str) {
            for element in map.values_mut() {
                let meta = element.metadata_mut();
                if meta.from_schema.is_none() {
                    meta.from_schema = Some(from_schema.to_string());
                }
            }
        }

        tag(&mut self.subsets, from_schema);
        tag(&mut self.types, from_schema);
        tag(&mut self.enums, from_schema);
        tag(&mut self.slots, from_schema);
        tag(&mut self.classes, from_schema);
        for class in self.classes.values_mut() {
            tag(&mut class.attributes, from_schema);
        }
    }
}

impl ClassDefinition {
    /// Create a new class definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl SlotDefinition {
    /// Create a new slot definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl TypeDefinition {
    /// Create a new type definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl EnumDefinition {
    /// Create a new enum definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Deserialize a keyed map whose entries may be `null`
fn deserialize_named_map<'de, D, T>(deserializer: D) -> std::result::Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let raw: Option<IndexMap<String, Option<T>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

/// Accept permissible values as a map (`{A: {description: ..}, B: }`) or a
/// plain list of strings
fn deserialize_permissible_values<'de, D>(
    deserializer: D,
) -> std::result::Result<IndexMap<String, PermissibleValue>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct PermissibleValuesVisitor;

    impl<'de> Visitor<'de> for PermissibleValuesVisitor {
        type Value = IndexMap<String, PermissibleValue>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a sequence or map of permissible values")
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(IndexMap::new())
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut values = IndexMap::new();
            while let Some(text) = seq.next_element::<String>()? {
                let pv = PermissibleValue {
                    text: text.clone(),
                    ..Default::default()
                };
                values.insert(text, pv);
            }
            Ok(values)
        }

        fn visit_map<M>(self, mut map: M) -> std::result::Result<Self::Value, M::Error>
        where
            M: de::MapAccess<'de>,
        {
            let mut values = IndexMap::new();
            while let Some((text, value)) = map.next_entry::<String, Option<PermissibleValue>>()? {
                let mut pv = value.unwrap_or_default();
                if pv.text.is_empty() {
                    pv.text.clone_from(&text);
                }
                values.insert(text, pv);
            }
            Ok(values)
        }
    }

    deserializer.deserialize_any(PermissibleValuesVisitor)
}
