//! Schema-driven traversal of instance data
//!
//! The walker descends through a JSON/YAML value using induced slots to
//! decide, at every key, which element governs the child and whether a
//! collection is expected there. Nodes are handed to a [`Visitor`] in
//! post-order and the visitor's return values are assembled into the
//! result.

mod state;

pub use state::WalkerState;

use linkml_core::error::{LinkMLError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::schema_view::{InstanceOf, SchemaView};

/// Callback invoked once per visited node
pub trait Visitor {
    /// Visit `node`, already rebuilt from its visited children, and return
    /// its replacement
    ///
    /// # Errors
    ///
    /// Any error aborts the walk and is returned from [`Walker::walk`].
    fn visit(&mut self, node: Value, state: &WalkerState<'_>) -> Result<Value>;
}

impl<F> Visitor for F
where
    F: FnMut(Value, &WalkerState<'_>) -> Result<Value>,
{
    fn visit(&mut self, node: Value, state: &WalkerState<'_>) -> Result<Value> {
        self(node, state)
    }
}

/// Walks instance data against a [`SchemaView`]
#[derive(Debug, Clone, Copy)]
pub struct Walker<'a> {
    view: &'a SchemaView,
    strict: bool,
}

impl<'a> Walker<'a> {
    /// Create a walker; strictness comes from the view's configuration
    #[must_use]
    pub fn new(view: &'a SchemaView) -> Self {
        Self {
            view,
            strict: view.config().walker.strict,
        }
    }

    /// Override strictness
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Walk `node` from `state` and return the visitor-rebuilt value.
    ///
    /// - A sequence is only accepted where a collection is expected (or when
    ///   not strict); its elements are walked outside collection context.
    /// - A mapping where a collection is expected is a keyed collection of
    ///   records: each value is walked with the same type context.
    /// - Any other mapping is a record: every key is resolved to its slot
    ///   induced in the current class context, and the value is walked with
    ///   the slot's range as context.
    /// - Scalars where a collection is expected are rejected when strict.
    ///   `null` is always accepted.
    ///
    /// Sequences are not passed to the visitor; every other node is.
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::StructuralMismatch` for shape errors in strict
    /// mode, `LinkMLError::UnresolvedReference` for keys that resolve to no
    /// slot, or any error raised by the visitor.
    pub fn walk<V: Visitor + ?Sized>(
        &self,
        node: Value,
        visitor: &mut V,
        state: WalkerState<'_>,
    ) -> Result<Value> {
        self.walk_node(&node, visitor, &state)
    }

    fn walk_node<'n, V: Visitor + ?Sized>(
        &self,
        node: &'n Value,
        visitor: &mut V,
        state: &WalkerState<'n>,
    ) -> Result<Value> {
        match node {
            Value::Array(items) => {
                if !state.in_collection && self.strict {
                    return Err(LinkMLError::mismatch(
                        format!("array in non-multivalued context{}", describe(state)),
                        state.pointer(),
                    ));
                }
                let mut element_state = state.clone();
                element_state.in_collection = false;

                let mut walked = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    walked.push(self.walk_node(item, visitor, &element_state.at(index.to_string()))?);
                }
                Ok(Value::Array(walked))
            }
            Value::Object(mapping) if state.in_collection => {
                let mut member_state = state.clone();
                member_state.in_collection = false;

                let mut walked = Map::new();
                for (key, value) in mapping {
                    let child = member_state.at(key.clone());
                    walked.insert(key.clone(), self.walk_node(value, visitor, &child)?);
                }
                visitor.visit(Value::Object(walked), state)
            }
            Value::Object(mapping) => {
                let deeper = state.deepen(node);
                let class_name = state
                    .instance_of
                    .as_deref()
                    .and_then(InstanceOf::as_class)
                    .map(|class| class.name.as_str());

                let mut walked = Map::new();
                for (key, value) in mapping {
                    let slot = self.view.induced_slot(key, class_name)?;
                    let mut child = deeper.at(key.clone());
                    child.instance_of = self.view.slot_range(&slot)?.map(Arc::new);
                    child.in_collection = slot.multivalued.unwrap_or(false);
                    walked.insert(key.clone(), self.walk_node(value, visitor, &child)?);
                }
                visitor.visit(Value::Object(walked), state)
            }
            Value::Null => visitor.visit(Value::Null, state),
            scalar => {
                if state.in_collection && self.strict {
                    return Err(LinkMLError::mismatch(
                        format!("expected array, found {scalar}{}", describe(state)),
                        state.pointer(),
                    ));
                }
                visitor.visit(scalar.clone(), state)
            }
        }
    }
}

fn describe(state: &WalkerState<'_>) -> String {
    state
        .instance_of
        .as_ref()
        .map(|i| format!(" (instance of {} '{}')", i.element_type(), i.name()))
        .unwrap_or_default()
}
