//! The HL7 v2 Schema Registry (spec.md §4.B).
//!
//! Per-version tables enumerating message structures, groups, segments,
//! fields, composite data types and their cardinalities. Lookups are pure
//! functions over immutable data (spec.md §5): a `Registry` is loaded once
//! per `Version` and freely shareable across trees and threads of control.

mod datatypes;
pub mod messages;
pub mod registry;
pub mod version;

pub use registry::{
    registry_for, BaseConstraints, ChildDef, Charset, ConstraintViolation, Kind, Registry,
    StaticRegistry, StructureDef,
};
pub use version::{UnsupportedVersion, Version};
