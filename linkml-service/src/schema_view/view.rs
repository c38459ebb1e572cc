//! Main `SchemaView` API for schema introspection

use indexmap::IndexMap;
use linkml_core::{
    config::LinkMLConfig,
    error::{LinkMLError, Result},
    types::{
        ClassDefinition, Element, EnumDefinition, SchemaDefinition, SlotDefinition,
        SubsetDefinition, TypeDefinition,
    },
};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::NavigationCache;
use crate::namespace::{NamespaceResolver, Namespaces, PrefixRegistry};
use crate::parser::{ImportResolver, SchemaLoader, SchemaLocation, SchemaSource};

/// Prefix table of a view, built on first use.
///
/// Bare import names never touch the prefix table, so a malformed prefix
/// only matters to CURIE imports.
struct ViewNamespaces<'a>(&'a SchemaView);

impl NamespaceResolver for ViewNamespaces<'_> {
    fn resolve(&self, curie_or_uri: &str) -> Result<String> {
        self.0.namespaces()?.uri_for(curie_or_uri)
    }

    fn abbreviate(&self, uri: &str) -> Option<String> {
        self.0.namespaces().ok()?.curie_for(uri, true).ok().flatten()
    }
}

/// Ordering of aggregated element maps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderedBy {
    /// Registry order; a later document replaces an earlier definition in place
    #[default]
    Preserve,
    /// Sorted by element name
    Lexical,
    /// Ascending `rank`, unranked elements last in registry order
    Rank,
}

/// High-level `API` for `LinkML` schema introspection and navigation
///
/// A view owns the primary document and, once [`load_imports_closure`] has
/// run, every document it transitively imports. Documents are keyed by the
/// reference that pulled them in (the primary by its name) and kept in
/// discovery order, primary first.
///
/// Derived results are cached against an epoch counter. Every mutation
/// bumps the epoch, so cached results never outlive the data they came
/// from.
///
/// [`load_imports_closure`]: SchemaView::load_imports_closure
#[derive(Debug)]
pub struct SchemaView {
    /// Loaded documents, primary first
    pub(super) schema_map: IndexMap<String, SchemaDefinition>,

    /// Registry key of the primary document
    pub(super) primary: String,

    loaded: bool,
    epoch: u64,
    config: LinkMLConfig,
    loader: SchemaLoader,
    import_resolver: ImportResolver,
    prefix_registry: PrefixRegistry,

    /// Navigation cache for efficient lookups
    pub(super) cache: RwLock<NavigationCache>,
}

impl SchemaView {
    /// Create a view over `schema` with the default configuration
    #[must_use]
    pub fn new(schema: SchemaDefinition) -> Self {
        Self::build(schema, LinkMLConfig::default())
    }

    /// Create a view over `schema` with an explicit configuration
    /// Returns an error if the operation fails
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::ConfigError` if the configuration is invalid.
    pub fn with_config(schema: SchemaDefinition, config: LinkMLConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(schema, config))
    }

    /// Load the primary document from a file path
    /// Returns an error if the operation fails
    ///
    /// # Errors
    ///
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_config(path, LinkMLConfig::default()).await
    }

    /// Load the primary document from a file path with an explicit configuration
    /// Returns an error if the operation fails
    ///
    /// # Errors
    ///
    pub async fn load_with_config(path: impl AsRef<Path>, config: LinkMLConfig) -> Result<Self> {
        config.validate()?;
        let loader = SchemaLoader::new(config.schema.import_timeout);
        let schema = loader
            .load(&SchemaLocation::File(path.as_ref().to_path_buf()))
            .await?;
        Ok(Self::build(schema, config))
    }

    /// Serve imported documents from `source` instead of files and HTTP
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn SchemaSource>) -> Self {
        self.loader = SchemaLoader::with_source(source, self.config.schema.import_timeout);
        self
    }

    fn build(mut schema: SchemaDefinition, config: LinkMLConfig) -> Self {
        schema.normalize();
        let primary = if !schema.name.is_empty() {
            schema.name.clone()
        } else if !schema.id.is_empty() {
            schema.id.clone()
        } else {
            "schema".to_string()
        };

        let mut schema_map = IndexMap::new();
        schema_map.insert(primary.clone(), schema);

        Self {
            schema_map,
            primary,
            loaded: false,
            epoch: 0,
            loader: SchemaLoader::new(config.schema.import_timeout),
            import_resolver: ImportResolver::new(&config.schema),
            prefix_registry: PrefixRegistry::new(&config.namespaces),
            config,
            cache: RwLock::new(NavigationCache::new(0)),
        }
    }

    // === Registry Access ===

    /// The primary document
    #[must_use]
    pub fn schema(&self) -> &SchemaDefinition {
        // The primary entry is inserted by the constructor and never removed.
        &self.schema_map[&self.primary]
    }

    /// Mutable access to the primary document; invalidates every cache
    pub fn schema_mut(&mut self) -> &mut SchemaDefinition {
        self.bump_epoch();
        &mut self.schema_map[&self.primary]
    }

    /// A loaded document by registry key
    #[must_use]
    pub fn document(&self, reference: &str) -> Option<&SchemaDefinition> {
        self.schema_map.get(reference)
    }

    /// The configuration this view was built with
    #[must_use]
    pub fn config(&self) -> &LinkMLConfig {
        &self.config
    }

    /// Current registry epoch
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether the import closure has been loaded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(super) fn bump_epoch(&mut self) {
        self.epoch += 1;
    }

    /// Read from the cache if it belongs to the current epoch
    pub(super) fn cached<T>(&self, read: impl FnOnce(&NavigationCache) -> Option<T>) -> Option<T> {
        let cache = self.cache.read();
        if cache.epoch() == self.epoch {
            read(&cache)
        } else {
            None
        }
    }

    /// Write to the cache, dropping entries from older epochs first
    pub(super) fn store(&self, write: impl FnOnce(&mut NavigationCache)) {
        let mut cache = self.cache.write();
        cache.sync(self.epoch);
        write(&mut cache);
    }

    /// Documents in registry order; only the primary when `imports` is false
    #[must_use]
    pub fn all_schema(&self, imports: bool) -> Vec<&SchemaDefinition> {
        if imports {
            self.schema_map.values().collect()
        } else {
            vec![self.schema()]
        }
    }

    // === Element Lookup ===

    /// Search the registry newest-first
    fn lookup<T>(
        &self,
        name: &str,
        select: impl Fn(&SchemaDefinition) -> &IndexMap<String, T>,
    ) -> Option<&T> {
        self.schema_map
            .values()
            .rev()
            .find_map(|document| select(document).get(name))
    }

    /// Get a class definition by name
    #[must_use]
    pub fn get_class(&self, name: &str) -> Option<&ClassDefinition> {
        self.lookup(name, |d| &d.classes)
    }

    /// Get a top-level slot definition by name, ignoring attributes
    pub(super) fn get_registry_slot(&self, name: &str) -> Option<&SlotDefinition> {
        self.lookup(name, |d| &d.slots)
    }

    /// Get a slot definition by name, falling back to any class attribute
    #[must_use]
    pub fn get_slot(&self, name: &str) -> Option<&SlotDefinition> {
        self.get_registry_slot(name).or_else(|| {
            self.schema_map.values().rev().find_map(|document| {
                document
                    .classes
                    .values()
                    .find_map(|class| class.attributes.get(name))
            })
        })
    }

    /// Get a type definition by name
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.lookup(name, |d| &d.types)
    }

    /// Get an enum definition by name
    #[must_use]
    pub fn get_enum(&self, name: &str) -> Option<&EnumDefinition> {
        self.lookup(name, |d| &d.enums)
    }

    /// Get a subset definition by name
    #[must_use]
    pub fn get_subset(&self, name: &str) -> Option<&SubsetDefinition> {
        self.lookup(name, |d| &d.subsets)
    }

    // === Imports ===

    /// Load every document transitively imported by the primary.
    ///
    /// Imports are followed depth-first from a LIFO frontier. Each reference
    /// resolves relative to the document that most recently pushed it. A
    /// reference already in the registry is never loaded twice, so import
    /// cycles terminate. On success every element of every document is
    /// tagged with its document's `id` (unless it carries a `from_schema`
    /// already). Calling this again after success is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::ImportLoadError` for the first import that
    /// cannot be resolved, read or decoded. The view is left unloaded.
    pub async fn load_imports_closure(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut importer_of: HashMap<String, String> = HashMap::new();
        let mut todo = vec![self.primary.clone()];

        while let Some(reference) = todo.pop() {
            if !visited.insert(reference.clone()) {
                continue;
            }

            if !self.schema_map.contains_key(&reference) {
                let importer = importer_of
                    .get(&reference)
                    .and_then(|key| self.schema_map.get(key));
                let document = self.load_import(&reference, importer).await?;
                self.schema_map.insert(reference.clone(), document);
                // Prefixes of the new document may be needed by its imports.
                self.bump_epoch();
            }

            if let Some(document) = self.schema_map.get(&reference) {
                for import in &document.imports {
                    if !visited.contains(import) {
                        importer_of.insert(import.clone(), reference.clone());
                        todo.push(import.clone());
                    }
                }
            }
        }

        for document in self.schema_map.values_mut() {
            let from_schema = if document.id.is_empty() {
                document.name.clone()
            } else {
                document.id.clone()
            };
            document.tag_provenance(&from_schema);
        }

        self.loaded = true;
        self.bump_epoch();
        info!(
            schema = %self.primary,
            documents = self.schema_map.len(),
            "import closure loaded"
        );
        Ok(())
    }

    async fn load_import(
        &self,
        reference: &str,
        importer: Option<&SchemaDefinition>,
    ) -> Result<SchemaDefinition> {
        let importer_location = importer
            .and_then(|document| document.source_file.as_deref())
            .map(SchemaLocation::parse)
            .transpose()
            .map_err(|e| LinkMLError::import(reference, e.to_string()))?;
        let location = self
            .import_resolver
            .resolve(
                reference,
                importer_location.as_ref(),
                &ViewNamespaces(self),
                self.loader.source().as_ref(),
            )
            .await
            .map_err(|e| match e {
                LinkMLError::ImportLoadError { .. } => e,
                other => LinkMLError::import(reference, other.to_string()),
            })?;
        debug!(reference, %location, "loading import");

        self.loader.load(&location).await.map_err(|e| match e {
            LinkMLError::ImportLoadError { reason, .. } => {
                LinkMLError::import(reference, format!("{location}: {reason}"))
            }
            other => LinkMLError::import(reference, format!("{location}: {other}")),
        })
    }

    /// Registry keys in discovery order, primary first
    #[must_use]
    pub fn imports_closure(&self) -> Vec<String> {
        if !self.loaded {
            warn!(
                schema = %self.primary,
                "imports_closure called before load_imports_closure completed"
            );
        }
        self.schema_map.keys().cloned().collect()
    }

    /// Fold every imported document into the primary.
    ///
    /// Elements and prefixes are copied only where the primary has no entry
    /// of the same name, so the primary wins every collision. Afterwards the
    /// primary has no imports and the registry holds only the primary.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::load_imports_closure`].
    pub async fn merge_imports(&mut self) -> Result<()> {
        self.load_imports_closure().await?;

        let mut documents = std::mem::take(&mut self.schema_map);
        let Some(mut primary) = documents.shift_remove(&self.primary) else {
            return Err(LinkMLError::other(format!(
                "primary schema '{}' missing from registry",
                self.primary
            )));
        };

        let mut added = 0;
        let merged = documents.len();
        for document in documents.into_values() {
            added += merge_absent(&mut primary.classes, document.classes);
            added += merge_absent(&mut primary.slots, document.slots);
            added += merge_absent(&mut primary.types, document.types);
            added += merge_absent(&mut primary.enums, document.enums);
            added += merge_absent(&mut primary.subsets, document.subsets);
            merge_absent(&mut primary.prefixes, document.prefixes);
        }
        primary.imports.clear();

        self.schema_map.insert(self.primary.clone(), primary);
        self.bump_epoch();
        info!(
            schema = %self.primary,
            documents = merged,
            elements = added,
            "merged imports into primary schema"
        );
        Ok(())
    }

    // === Aggregation ===

    fn aggregate<T: Clone>(
        &self,
        imports: bool,
        select: impl Fn(&SchemaDefinition) -> &IndexMap<String, T>,
    ) -> IndexMap<String, T> {
        let mut all = IndexMap::new();
        for document in self.all_schema(imports) {
            for (name, element) in select(document) {
                all.insert(name.clone(), element.clone());
            }
        }
        all
    }

    /// All classes, keyed by name
    #[must_use]
    pub fn all_classes(&self, imports: bool, ordered_by: OrderedBy) -> IndexMap<String, ClassDefinition> {
        order(self.aggregate(imports, |d| &d.classes), ordered_by)
    }

    /// All slots, keyed by name, including class attributes whose names are
    /// not top-level slots
    #[must_use]
    pub fn all_slots(&self, imports: bool, ordered_by: OrderedBy) -> IndexMap<String, SlotDefinition> {
        let mut slots = self.aggregate(imports, |d| &d.slots);
        for class in self.aggregate(imports, |d| &d.classes).values() {
            for (name, attribute) in &class.attributes {
                if !slots.contains_key(name) {
                    slots.insert(name.clone(), attribute.clone());
                }
            }
        }
        order(slots, ordered_by)
    }

    /// All types, keyed by name
    #[must_use]
    pub fn all_types(&self, imports: bool, ordered_by: OrderedBy) -> IndexMap<String, TypeDefinition> {
        order(self.aggregate(imports, |d| &d.types), ordered_by)
    }

    /// All enums, keyed by name
    #[must_use]
    pub fn all_enums(&self, imports: bool, ordered_by: OrderedBy) -> IndexMap<String, EnumDefinition> {
        order(self.aggregate(imports, |d| &d.enums), ordered_by)
    }

    /// All subsets, keyed by name
    #[must_use]
    pub fn all_subsets(&self, imports: bool, ordered_by: OrderedBy) -> IndexMap<String, SubsetDefinition> {
        order(self.aggregate(imports, |d| &d.subsets), ordered_by)
    }

    // === Provenance ===

    /// Map every element name (attributes included) to the name of the
    /// document defining it. A later document wins a collision.
    #[must_use]
    pub fn element_by_schema_map(&self) -> Arc<IndexMap<String, String>> {
        if let Some(index) = self.cached(|c| c.element_index().cloned()) {
            return index;
        }

        let mut index = IndexMap::new();
        for document in self.all_schema(true) {
            let names = document
                .classes
                .keys()
                .chain(document.slots.keys())
                .chain(document.types.keys())
                .chain(document.enums.keys())
                .chain(document.subsets.keys())
                .chain(document.classes.values().flat_map(|c| c.attributes.keys()));
            for name in names {
                index.insert(name.clone(), document.name.clone());
            }
        }

        let index = Arc::new(index);
        self.store(|c| c.cache_element_index(Arc::clone(&index)));
        index
    }

    /// Name of the document defining `element`
    #[must_use]
    pub fn in_schema(&self, element: &str) -> Option<String> {
        self.element_by_schema_map().get(element).cloned()
    }

    // === Namespaces ===

    /// Prefix table built from every loaded document.
    ///
    /// The primary's `default_prefix` becomes the default namespace when it
    /// names a declared prefix. Prefix maps listed in `default_curi_maps` are
    /// merged only once fetched by [`Self::load_prefix_maps`]; declared
    /// prefixes take precedence over them.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` if a declared prefix is not a
    /// valid NCName.
    pub fn namespaces(&self) -> Result<Arc<Namespaces>> {
        if let Some(namespaces) = self.cached(|c| c.namespaces().cloned()) {
            return Ok(namespaces);
        }

        let mut namespaces = Namespaces::new();
        for document in self.schema_map.values() {
            for (prefix, definition) in &document.prefixes {
                namespaces.set(prefix, definition.reference())?;
            }
        }

        let primary = self.schema();
        if let Some(default_prefix) = &primary.default_prefix
            && let Ok(namespace) = namespaces.get(default_prefix)
        {
            let namespace = namespace.clone();
            namespaces.set_default(namespace)?;
        }

        for name in &primary.default_curi_maps {
            match PrefixRegistry::cached(name) {
                Some(context) => namespaces.add_context(&context, false)?,
                None => warn!(map = %name, "prefix map not loaded yet, skipping"),
            }
        }

        let namespaces = Arc::new(namespaces);
        self.store(|c| c.cache_namespaces(Arc::clone(&namespaces)));
        Ok(namespaces)
    }

    /// Fetch every prefix map named in the primary's `default_curi_maps`
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::NamespaceError` if a map cannot be fetched.
    pub async fn load_prefix_maps(&mut self) -> Result<()> {
        let names = self.schema().default_curi_maps.clone();
        for name in &names {
            self.prefix_registry.fetch(name).await?;
        }
        self.bump_epoch();
        Ok(())
    }

    /// Mutable access to the document owning class `name` (newest first)
    pub(super) fn class_mut(&mut self, name: &str) -> Option<&mut ClassDefinition> {
        self.schema_map
            .values_mut()
            .rev()
            .find_map(|document| document.classes.get_mut(name))
    }
}

/// Insert every entry of `source` whose key `target` lacks; returns the count
fn merge_absent<T>(target: &mut IndexMap<String, T>, source: IndexMap<String, T>) -> usize {
    let mut added = 0;
    for (name, element) in source {
        if !target.contains_key(&name) {
            target.insert(name, element);
            added += 1;
        }
    }
    added
}

fn order<T: Element>(mut elements: IndexMap<String, T>, ordered_by: OrderedBy) -> IndexMap<String, T> {
    match ordered_by {
        OrderedBy::Preserve => {}
        OrderedBy::Lexical => elements.sort_keys(),
        OrderedBy::Rank => {
            elements.sort_by(|_, a, _, b| by_rank(a.metadata().rank, b.metadata().rank));
        }
    }
    elements
}

fn by_rank(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
