//! Slot, type and class induction
//!
//! An induced definition is the element as seen from a particular context:
//! every unset field is filled from the nearest definition that sets it.
//! Class-scoped refinements come before inherited slot definitions, and
//! within each group the closure order decides.

use indexmap::IndexSet;
use linkml_core::{
    error::{LinkMLError, Result},
    types::{
        ClassDefinition, ElementType, EnumDefinition, MergeUnset, SlotDefinition, TypeDefinition,
    },
};
use tracing::debug;

use super::closure::TraversalOptions;
use super::view::{OrderedBy, SchemaView};

/// What a value is an instance of, as determined by a slot range
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceOf {
    /// Instance of a class
    Class(ClassDefinition),
    /// Value of a slot
    Slot(SlotDefinition),
    /// Permissible value of an enum
    Enum(EnumDefinition),
    /// Value of a type
    Type(TypeDefinition),
}

impl InstanceOf {
    /// Name of the underlying element
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Class(c) => &c.name,
            Self::Slot(s) => &s.name,
            Self::Enum(e) => &e.name,
            Self::Type(t) => &t.name,
        }
    }

    /// Kind of the underlying element
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Class(_) => ElementType::Class,
            Self::Slot(_) => ElementType::Slot,
            Self::Enum(_) => ElementType::Enum,
            Self::Type(_) => ElementType::Type,
        }
    }

    /// The class, if this is a class context
    #[must_use]
    pub fn as_class(&self) -> Option<&ClassDefinition> {
        match self {
            Self::Class(c) => Some(c),
            _ => None,
        }
    }
}

impl SchemaView {
    /// Induce slot `slot_name`, optionally in the context of `class_name`.
    ///
    /// Starting from an empty record, unset fields are filled from:
    /// 1. the slot's own definition: the top-level slot, else an attribute
    ///    on one of the class's ancestors, else any class's attribute;
    /// 2. for each class ancestor in closure order, its `attributes` entry
    ///    and then its `slot_usage` entry for the slot;
    /// 3. each ancestor of the own definition in closure order.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the slot, the class or
    /// any ancestor is unknown, `LinkMLError::CyclicInheritance` on a cycle.
    pub fn induced_slot(&self, slot_name: &str, class_name: Option<&str>) -> Result<SlotDefinition> {
        let key = (slot_name.to_string(), class_name.map(str::to_string));
        if let Some(slot) = self.cached(|c| c.induced_slot(&key).cloned()) {
            return Ok(slot);
        }

        let opts = TraversalOptions::default();
        let class_ancestors = match class_name {
            Some(class_name) => self.class_ancestors(class_name, &opts)?,
            None => Vec::new(),
        };

        let own = self.own_slot_definition(slot_name, class_name, &class_ancestors)?;
        let mut induced = SlotDefinition::default();
        induced.merge_unset_from(own);

        for ancestor in &class_ancestors {
            let Some(class) = self.get_class(ancestor) else {
                continue;
            };
            if let Some(attribute) = class.attributes.get(slot_name) {
                induced.merge_unset_from(attribute);
            }
            if let Some(usage) = class.slot_usage.get(slot_name) {
                induced.merge_unset_from(usage);
            }
        }

        for ancestor in self.slot_ancestors_of(slot_name, own, &opts.with_reflexive(false))? {
            if let Some(slot) = self.get_slot(&ancestor) {
                induced.merge_unset_from(slot);
            }
        }

        debug!(slot = slot_name, class = ?class_name, "induced slot");
        self.store(|c| c.cache_induced_slot(key, induced.clone()));
        Ok(induced)
    }

    fn own_slot_definition(
        &self,
        slot_name: &str,
        class_name: Option<&str>,
        class_ancestors: &[String],
    ) -> Result<&SlotDefinition> {
        if let Some(slot) = self.get_registry_slot(slot_name) {
            return Ok(slot);
        }
        let scoped = class_ancestors.iter().find_map(|ancestor| {
            self.get_class(ancestor)
                .and_then(|class| class.attributes.get(slot_name))
        });
        scoped
            .or_else(|| self.get_slot(slot_name))
            .ok_or_else(|| match class_name {
                Some(class_name) => {
                    LinkMLError::unresolved_in(ElementType::Slot, slot_name, class_name)
                }
                None => LinkMLError::unresolved(ElementType::Slot, slot_name),
            })
    }

    /// Induce type `type_name` by filling unset fields along its `typeof` chain
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if any type in the chain is
    /// unknown, `LinkMLError::CyclicInheritance` on a cycle.
    pub fn induced_type(&self, type_name: &str) -> Result<TypeDefinition> {
        if let Some(type_def) = self.cached(|c| c.induced_type(type_name).cloned()) {
            return Ok(type_def);
        }

        let mut induced = TypeDefinition::default();
        for ancestor in self.type_ancestors(type_name, &TraversalOptions::default())? {
            if let Some(type_def) = self.get_type(&ancestor) {
                induced.merge_unset_from(type_def);
            }
        }

        self.store(|c| c.cache_induced_type(type_name.to_string(), induced.clone()));
        Ok(induced)
    }

    /// Names of all slots applicable to a class: its own `slots` and
    /// `attributes` followed by those of its ancestors, first occurrence kept
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::class_ancestors`].
    pub fn class_slots(&self, class_name: &str) -> Result<Vec<String>> {
        let mut slots: IndexSet<String> = IndexSet::new();
        for ancestor in self.class_ancestors(class_name, &TraversalOptions::default())? {
            if let Some(class) = self.get_class(&ancestor) {
                slots.extend(class.slots.iter().cloned());
                slots.extend(class.attributes.keys().cloned());
            }
        }
        Ok(slots.into_iter().collect())
    }

    /// Every applicable slot of a class, induced in that class's context
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::class_slots`] or [`Self::induced_slot`].
    pub fn class_induced_slots(&self, class_name: &str) -> Result<Vec<SlotDefinition>> {
        self.class_slots(class_name)?
            .iter()
            .map(|slot| self.induced_slot(slot, Some(class_name)))
            .collect()
    }

    /// A class whose `attributes` are its induced slots.
    ///
    /// `slots` lists every applicable slot name and `slot_usage` is emptied,
    /// since its refinements are already folded into the attributes.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the class is unknown,
    /// or any error from [`Self::class_induced_slots`].
    pub fn induced_class(&self, class_name: &str) -> Result<ClassDefinition> {
        if let Some(class) = self.cached(|c| c.induced_class(class_name).cloned()) {
            return Ok(class);
        }

        let mut class = self
            .get_class(class_name)
            .cloned()
            .ok_or_else(|| LinkMLError::unresolved(ElementType::Class, class_name))?;
        let induced = self.class_induced_slots(class_name)?;

        class.slots = induced.iter().map(|slot| slot.name.clone()).collect();
        class.slot_usage.clear();
        class.attributes = induced
            .into_iter()
            .map(|slot| (slot.name.clone(), slot))
            .collect();

        self.store(|c| c.cache_induced_class(class_name.to_string(), class.clone()));
        Ok(class)
    }

    /// What values of `slot` are instances of.
    ///
    /// Uses the slot's `range`, else the primary document's `default_range`.
    /// Returns `None` when neither is set.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the range names no
    /// class, enum or type.
    pub fn slot_range(&self, slot: &SlotDefinition) -> Result<Option<InstanceOf>> {
        let Some(range) = slot
            .range
            .as_deref()
            .or(self.schema().default_range.as_deref())
        else {
            return Ok(None);
        };

        if let Some(class) = self.get_class(range) {
            return Ok(Some(InstanceOf::Class(class.clone())));
        }
        if let Some(enum_def) = self.get_enum(range) {
            return Ok(Some(InstanceOf::Enum(enum_def.clone())));
        }
        if let Some(type_def) = self.get_type(range) {
            return Ok(Some(InstanceOf::Type(type_def.clone())));
        }

        Err(LinkMLError::unresolved_in(
            ElementType::Type,
            range,
            format!("range of slot '{}'", slot.name),
        ))
    }

    /// The induced slot marked `identifier: true` for a class, if any
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::class_induced_slots`].
    pub fn get_identifier_slot(&self, class_name: &str) -> Result<Option<SlotDefinition>> {
        Ok(self
            .class_induced_slots(class_name)?
            .into_iter()
            .find(|slot| slot.identifier == Some(true)))
    }

    /// Replace every class's `attributes` with its induced slots.
    ///
    /// Each class is rewritten in the document that defines it. Classes are
    /// induced against the unmodified registry before any is written.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::class_induced_slots`].
    pub fn materialize_induced_attributes(&mut self) -> Result<()> {
        let mut induced = Vec::new();
        for class_name in self.all_classes(true, OrderedBy::Preserve).into_keys() {
            let slots = self.class_induced_slots(&class_name)?;
            induced.push((class_name, slots));
        }

        let classes = induced.len();
        for (class_name, slots) in induced {
            if let Some(class) = self.class_mut(&class_name) {
                for slot in slots {
                    class.attributes.insert(slot.name.clone(), slot);
                }
            }
        }

        self.bump_epoch();
        debug!(classes, "materialized induced attributes");
        Ok(())
    }
}
