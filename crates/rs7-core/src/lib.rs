//! The core data model for HL7 v2 ER7 message processing (spec.md §2).
//!
//! A single tagged [`Node`] type stands in for the six node kinds the
//! wire format distinguishes (Message, Group, Segment, Field, Component,
//! SubComponent); [`Delimiters`] and [`Encoding`] implement the
//! delimiter/escape-sequence handling spec.md §4.A describes;
//! [`ValidationLevel`] selects between the STRICT (fail-fast,
//! schema-conformant) and LENIENT (permissive, audit-on-demand)
//! disciplines spec.md §4.C names. Version identity and the schema
//! content itself live in `rs7-schema`, re-exported here as [`Version`].

pub mod delimiters;
pub mod encoding;
pub mod error;
pub mod node;
pub(crate) mod parse;
pub mod validation;

pub use delimiters::Delimiters;
pub use encoding::Encoding;
pub use error::{Error, Result};
pub use node::{Node, NodeKind, SetValue, Violation, ViolationKind};
pub use parse::{parse_component, parse_field, parse_segment};
pub use rs7_schema::Version;
pub use validation::ValidationLevel;
