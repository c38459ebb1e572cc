//! SchemaView - High-level API for LinkML schema introspection and navigation
//!
//! This module provides a "denormalized view" of LinkML schemas: a registry
//! of the primary document and everything it imports, with inheritance
//! closures and induced slot, type and class definitions computed on demand.

mod cache;
pub mod closure;
pub mod induction;
pub mod view;

pub use cache::NavigationCache;
pub use closure::{TraversalOptions, check_acyclic, closure};
pub use induction::InstanceOf;
pub use view::{OrderedBy, SchemaView};
