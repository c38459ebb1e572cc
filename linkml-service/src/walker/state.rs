//! Per-node traversal state

use serde_json::Value;
use std::sync::Arc;

use crate::schema_view::InstanceOf;

/// State handed to the visitor with every node.
///
/// `object_path` holds the mappings entered so far (not the sequences, and
/// not mappings walked as keyed collections), so `depth()` counts record
/// nesting rather than JSON nesting.
///
/// The path borrows from the value being walked, and the type context is
/// shared between sibling states, so stepping to a child never copies a
/// subtree or a definition.
#[derive(Debug, Clone, Default)]
pub struct WalkerState<'n> {
    /// Whether the current node sits where a multivalued slot's value goes
    pub in_collection: bool,

    /// Element the current node is an instance of, if known
    pub instance_of: Option<Arc<InstanceOf>>,

    object_path: Vec<&'n Value>,
    segments: Vec<String>,
}

impl<'n> WalkerState<'n> {
    /// Empty state at the root, no type context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root state whose node is an instance of `instance_of`
    #[must_use]
    pub fn instance_of(instance_of: InstanceOf) -> Self {
        Self {
            instance_of: Some(Arc::new(instance_of)),
            ..Self::default()
        }
    }

    /// Number of records entered on the way to this node
    #[must_use]
    pub fn depth(&self) -> usize {
        self.object_path.len()
    }

    /// Records entered on the way to this node, outermost first
    #[must_use]
    pub fn object_path(&self) -> &[&'n Value] {
        &self.object_path
    }

    /// Copy of this state with `object` appended to the path
    #[must_use]
    pub fn deepen(&self, object: &'n Value) -> Self {
        let mut deeper = self.clone();
        deeper.object_path.push(object);
        deeper
    }

    /// Slash-separated key path of the current node, `/` at the root
    #[must_use]
    pub fn pointer(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        self.segments
            .iter()
            .map(|s| format!("/{}", s.replace('~', "~0").replace('/', "~1")))
            .collect()
    }

    /// Copy of this state positioned at child `segment`
    pub(crate) fn at(&self, segment: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.segments.push(segment.into());
        child
    }
}
