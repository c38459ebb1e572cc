//! # `LinkML` Core
//!
//! Core types for resolving `LinkML` schemas in Rust.
//!
//! This crate holds the schema data model shared by every resolution step,
//! the "fill what is unset" merge rules used by slot and type induction,
//! error handling and configuration.
//!
//! ## Design Principles
//!
//! - **Composition Over Inheritance**: every definition embeds one shared
//!   [`types::ElementMetadata`] block instead of extending a base type
//! - **Per-variant merging**: induction merges are field-by-field functions,
//!   never generic key iteration

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Core error types for `LinkML` operations
pub mod error;

/// Type definitions for `LinkML` schemas
pub mod types;

/// Configuration types for `LinkML` schema resolution
pub mod config;

pub use config::LinkMLConfig;
pub use error::{LinkMLError, Result};
pub use serde_json::Value;
pub use types::{
    ClassDefinition, Element, ElementMetadata, ElementType, EnumDefinition, Inheritable,
    MergeUnset, PermissibleValue, PrefixDefinition, SchemaDefinition, SlotDefinition,
    SubsetDefinition, TypeDefinition,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::LinkMLConfig;
    pub use crate::error::{LinkMLError, Result};
    pub use crate::types::{
        ClassDefinition, Element, ElementType, EnumDefinition, Inheritable, MergeUnset,
        PrefixDefinition, SchemaDefinition, SlotDefinition, SubsetDefinition, TypeDefinition,
    };
}
