//! # `LinkML` Service
//!
//! Schema resolution for `LinkML`: a registry of a schema and everything it
//! imports, inheritance closures over is-a and mixin graphs, induced slot,
//! type and class definitions, import flattening, and a walker that routes
//! traversal of instance data through induced slots.
//!
//! ## Quick Start
//!
//! ```no_run
//! use linkml_service::schema_view::{SchemaView, TraversalOptions};
//!
//! # async fn example() -> linkml_core::Result<()> {
//! let mut view = SchemaView::load("schema.yaml").await?;
//! view.load_imports_closure().await?;
//!
//! let ancestors = view.class_ancestors("Person", &TraversalOptions::default())?;
//! let name = view.induced_slot("name", Some("Person"))?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Command-line interface for `gen-linkml`
pub mod cli;

/// Prefix tables and CURIE expansion
pub mod namespace;

/// Document decoding, sources and import resolution
pub mod parser;

/// Registry, closures and induction
pub mod schema_view;

/// Schema-driven traversal of instance data
pub mod walker;

pub use schema_view::{InstanceOf, OrderedBy, SchemaView, TraversalOptions};
pub use walker::{Visitor, Walker, WalkerState};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::namespace::{Namespace, NamespaceResolver, Namespaces};
    pub use crate::schema_view::{InstanceOf, OrderedBy, SchemaView, TraversalOptions};
    pub use crate::walker::{Visitor, Walker, WalkerState};
    pub use linkml_core::prelude::*;
}
