//! Ancestor and descendant closures over is-a/mixin graphs

use indexmap::IndexSet;
use linkml_core::{
    error::{LinkMLError, Result},
    types::{ElementType, Inheritable, SlotDefinition},
};
use std::collections::{HashMap, HashSet};

use super::view::{OrderedBy, SchemaView};

/// Which edges a closure follows and what it returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalOptions {
    /// Follow `is_a` (and `typeof` for types)
    pub is_a: bool,
    /// Follow `mixins`
    pub mixins: bool,
    /// Include the start element in the result
    pub reflexive: bool,
    /// Consider imported documents when scanning for children
    pub imports: bool,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            is_a: true,
            mixins: true,
            reflexive: true,
            imports: true,
        }
    }
}

impl TraversalOptions {
    /// All edges, reflexive, imports included
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `is_a` edges
    #[must_use]
    pub fn with_is_a(mut self, is_a: bool) -> Self {
        self.is_a = is_a;
        self
    }

    /// Toggle mixin edges
    #[must_use]
    pub fn with_mixins(mut self, mixins: bool) -> Self {
        self.mixins = mixins;
        self
    }

    /// Toggle inclusion of the start element
    #[must_use]
    pub fn with_reflexive(mut self, reflexive: bool) -> Self {
        self.reflexive = reflexive;
        self
    }

    /// Toggle imported documents
    #[must_use]
    pub fn with_imports(mut self, imports: bool) -> Self {
        self.imports = imports;
        self
    }
}

/// Direct parents of `element`: `is_a` first, then mixins in declared order
pub fn direct_parents<T: Inheritable + ?Sized>(element: &T, opts: &TraversalOptions) -> Vec<String> {
    let mut parents = Vec::new();
    if opts.is_a
        && let Some(parent) = element.parent()
    {
        parents.push(parent.to_string());
    }
    if opts.mixins {
        parents.extend(element.mixin_parents().iter().cloned());
    }
    parents
}

/// Stack-based closure from `start`.
///
/// The frontier is LIFO: pop the most recently pushed node, mark it visited
/// and push each of its not yet visited parents. A node enters the result
/// when it is first discovered. Parents pushed together are therefore
/// expanded last-first, so a node's mixins are explored before the
/// ancestors of its `is_a` parent. The resulting order is what slot
/// induction merges by.
///
/// The primitive itself does not guard against cycles beyond skipping
/// visited nodes; callers run [`check_acyclic`] first.
///
/// # Errors
///
/// Propagates the first error returned by `parents`.
pub fn closure<F>(start: &str, mut parents: F, reflexive: bool) -> Result<Vec<String>>
where
    F: FnMut(&str) -> Result<Vec<String>>,
{
    let mut result: IndexSet<String> = IndexSet::new();
    if reflexive {
        result.insert(start.to_string());
    }
    let mut visited: HashSet<String> = HashSet::new();
    let mut todo = vec![start.to_string()];

    while let Some(node) = todo.pop() {
        if !visited.insert(node.clone()) {
            continue;
        }
        for parent in parents(&node)? {
            if !visited.contains(&parent) {
                result.insert(parent.clone());
                todo.push(parent);
            }
        }
    }

    Ok(result.into_iter().collect())
}

#[derive(Clone, Copy)]
enum Mark {
    OnPath,
    Done,
}

/// Depth-first cycle check over everything reachable from `start`
///
/// # Errors
///
/// Returns `LinkMLError::CyclicInheritance` with the offending path (first
/// name repeated at the end), or the first error returned by `parents`.
pub fn check_acyclic<F>(start: &str, kind: ElementType, mut parents: F) -> Result<()>
where
    F: FnMut(&str) -> Result<Vec<String>>,
{
    let mut marks: HashMap<String, Mark> = HashMap::new();
    let mut stack: Vec<(String, std::vec::IntoIter<String>)> = Vec::new();

    marks.insert(start.to_string(), Mark::OnPath);
    stack.push((start.to_string(), parents(start)?.into_iter()));

    loop {
        let next = match stack.last_mut() {
            Some((_, pending)) => pending.next(),
            None => break,
        };

        match next {
            Some(next) => match marks.get(&next).copied() {
                Some(Mark::OnPath) => {
                    let from = stack
                        .iter()
                        .position(|(name, _)| *name == next)
                        .unwrap_or_default();
                    let mut cycle: Vec<String> =
                        stack[from..].iter().map(|(name, _)| name.clone()).collect();
                    cycle.push(next);
                    return Err(LinkMLError::cycle(kind, cycle));
                }
                Some(Mark::Done) => {}
                None => {
                    let pending = parents(&next)?.into_iter();
                    marks.insert(next.clone(), Mark::OnPath);
                    stack.push((next, pending));
                }
            },
            None => {
                if let Some((name, _)) = stack.pop() {
                    marks.insert(name, Mark::Done);
                }
            }
        }
    }

    Ok(())
}

impl SchemaView {
    // === Class Hierarchy Methods ===

    /// Direct parent classes
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the class is unknown.
    pub fn class_parents(&self, name: &str, opts: &TraversalOptions) -> Result<Vec<String>> {
        let class = self
            .get_class(name)
            .ok_or_else(|| LinkMLError::unresolved(ElementType::Class, name))?;
        Ok(direct_parents(class, opts))
    }

    /// All ancestor classes in closure order
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the class or any parent
    /// is unknown, `LinkMLError::CyclicInheritance` on a cycle.
    pub fn class_ancestors(&self, name: &str, opts: &TraversalOptions) -> Result<Vec<String>> {
        let parents = |n: &str| self.class_parents(n, opts);
        check_acyclic(name, ElementType::Class, parents)?;
        closure(name, parents, opts.reflexive)
    }

    /// Direct child classes, in registry order
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the class is unknown.
    pub fn class_children(&self, name: &str, opts: &TraversalOptions) -> Result<Vec<String>> {
        if self.get_class(name).is_none() {
            return Err(LinkMLError::unresolved(ElementType::Class, name));
        }
        Ok(self
            .all_classes(opts.imports, OrderedBy::Preserve)
            .into_iter()
            .filter(|(_, class)| direct_parents(class, opts).iter().any(|p| p == name))
            .map(|(child, _)| child)
            .collect())
    }

    /// All descendant classes in closure order
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the class is unknown,
    /// `LinkMLError::CyclicInheritance` on a cycle.
    pub fn class_descendants(&self, name: &str, opts: &TraversalOptions) -> Result<Vec<String>> {
        let children = |n: &str| self.class_children(n, opts);
        check_acyclic(name, ElementType::Class, children)?;
        closure(name, children, opts.reflexive)
    }

    /// Classes without parents under `opts`
    #[must_use]
    pub fn class_roots(&self, opts: &TraversalOptions) -> Vec<String> {
        self.all_classes(opts.imports, OrderedBy::Preserve)
            .into_iter()
            .filter(|(_, class)| direct_parents(class, opts).is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// Classes without children under `opts`
    #[must_use]
    pub fn class_leaves(&self, opts: &TraversalOptions) -> Vec<String> {
        let classes = self.all_classes(opts.imports, OrderedBy::Preserve);
        let parents: HashSet<String> = classes
            .values()
            .flat_map(|class| direct_parents(class, opts))
            .collect();
        classes
            .into_keys()
            .filter(|name| !parents.contains(name))
            .collect()
    }

    // === Slot Hierarchy Methods ===

    /// Direct parent slots
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the slot is unknown.
    pub fn slot_parents(&self, name: &str, opts: &TraversalOptions) -> Result<Vec<String>> {
        let slot = self
            .get_slot(name)
            .ok_or_else(|| LinkMLError::unresolved(ElementType::Slot, name))?;
        Ok(direct_parents(slot, opts))
    }

    /// All ancestor slots in closure order
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the slot or any parent
    /// is unknown, `LinkMLError::CyclicInheritance` on a cycle.
    pub fn slot_ancestors(&self, name: &str, opts: &TraversalOptions) -> Result<Vec<String>> {
        let slot = self
            .get_slot(name)
            .ok_or_else(|| LinkMLError::unresolved(ElementType::Slot, name))?;
        self.slot_ancestors_of(name, slot, opts)
    }

    /// Ancestors of a specific definition of `name`, which may be a
    /// class-scoped attribute rather than the registry slot
    pub(super) fn slot_ancestors_of(
        &self,
        name: &str,
        slot: &SlotDefinition,
        opts: &TraversalOptions,
    ) -> Result<Vec<String>> {
        let parents = |n: &str| {
            if n == name {
                Ok(direct_parents(slot, opts))
            } else {
                self.slot_parents(n, opts)
            }
        };
        check_acyclic(name, ElementType::Slot, parents)?;
        closure(name, parents, opts.reflexive)
    }

    /// Direct child slots, in registry order
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the slot is unknown.
    pub fn slot_children(&self, name: &str, opts: &TraversalOptions) -> Result<Vec<String>> {
        if self.get_slot(name).is_none() {
            return Err(LinkMLError::unresolved(ElementType::Slot, name));
        }
        Ok(self
            .all_slots(opts.imports, OrderedBy::Preserve)
            .into_iter()
            .filter(|(_, slot)| direct_parents(slot, opts).iter().any(|p| p == name))
            .map(|(child, _)| child)
            .collect())
    }

    /// All descendant slots in closure order
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the slot is unknown,
    /// `LinkMLError::CyclicInheritance` on a cycle.
    pub fn slot_descendants(&self, name: &str, opts: &TraversalOptions) -> Result<Vec<String>> {
        let children = |n: &str| self.slot_children(n, opts);
        check_acyclic(name, ElementType::Slot, children)?;
        closure(name, children, opts.reflexive)
    }

    // === Type Hierarchy Methods ===

    /// Direct parent type (`typeof`), if any
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if the type is unknown.
    pub fn type_parents(&self, name: &str, opts: &TraversalOptions) -> Result<Vec<String>> {
        let type_def = self
            .get_type(name)
            .ok_or_else(|| LinkMLError::unresolved(ElementType::Type, name))?;
        Ok(direct_parents(type_def, &opts.with_mixins(false)))
    }

    /// The `typeof` chain from `name` to its root
    ///
    /// # Errors
    ///
    /// Returns `LinkMLError::UnresolvedReference` if any type in the chain is
    /// unknown, `LinkMLError::CyclicInheritance` on a cycle.
    pub fn type_ancestors(&self, name: &str, opts: &TraversalOptions) -> Result<Vec<String>> {
        let parents = |n: &str| self.type_parents(n, opts);
        check_acyclic(name, ElementType::Type, parents)?;
        closure(name, parents, opts.reflexive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(edges: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        edges
            .iter()
            .map(|(node, parents)| {
                (
                    (*node).to_string(),
                    parents.iter().map(|p| (*p).to_string()).collect(),
                )
            })
            .collect()
    }

    fn parents_in(g: &HashMap<String, Vec<String>>) -> impl Fn(&str) -> Result<Vec<String>> + '_ {
        move |n: &str| Ok(g.get(n).cloned().unwrap_or_default())
    }

    #[test]
    fn test_mixins_expand_before_is_a_ancestors() -> Result<()> {
        let g = graph(&[("c1", &["c2", "m1"]), ("c2", &["c3"]), ("m1", &[]), ("c3", &[])]);
        assert_eq!(closure("c1", parents_in(&g), true)?, ["c1", "c2", "m1", "c3"]);
        assert_eq!(closure("c1", parents_in(&g), false)?, ["c2", "m1", "c3"]);
        Ok(())
    }

    #[test]
    fn test_diamond_is_deduplicated() -> Result<()> {
        let g = graph(&[("d", &["b", "c"]), ("b", &["a"]), ("c", &["a"]), ("a", &[])]);
        assert_eq!(closure("d", parents_in(&g), true)?, ["d", "b", "c", "a"]);
        Ok(())
    }

    #[test]
    fn test_cycle_is_reported_with_path() {
        let g = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        let err = check_acyclic("a", ElementType::Class, parents_in(&g)).unwrap_err();
        match err {
            LinkMLError::CyclicInheritance { kind, cycle } => {
                assert_eq!(kind, ElementType::Class);
                assert_eq!(cycle, ["a", "b", "c", "a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let g = graph(&[("a", &["a"])]);
        assert!(check_acyclic("a", ElementType::Slot, parents_in(&g)).is_err());
    }

    #[test]
    fn test_shared_ancestor_is_not_a_cycle() -> Result<()> {
        let g = graph(&[("d", &["b", "c"]), ("b", &["a"]), ("c", &["a"]), ("a", &[])]);
        check_acyclic("d", ElementType::Class, parents_in(&g))
    }

    #[test]
    fn test_parent_errors_propagate() {
        let err = closure("x", |n: &str| Err(LinkMLError::unresolved(ElementType::Class, n)), true)
            .unwrap_err();
        assert!(matches!(err, LinkMLError::UnresolvedReference { .. }));
    }
}
