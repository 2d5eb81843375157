//! # rs7 - HL7 v2.x Library for Rust
//!
//! A schema-driven HL7 v2.x message library: an Element Tree data model
//! shared by every node kind, an ER7 wire-format codec, a Schema
//! Registry holding per-version structure/cardinality data, and a
//! Terser-style path API for convenient field access.
//!
//! ## Features
//!
//! - **Parsing and encoding**: `parser::parse_message` decodes ER7 text
//!   into a tree; `Node::to_er7` encodes it back.
//! - **Multiple HL7 versions**: `Version::all()` enumerates the
//!   versions the registry ships schema data for.
//! - **Structural validation**: `validator::validate` walks a tree and
//!   reports every schema violation it finds.
//! - **Terser API**: `terser::Terser` for `"PID-5-1"`-style field access.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs7::parser::parse_message;
//! use rs7::terser::Terser;
//!
//! let hl7 = "MSH|^~\\&|SendApp|SendFac|RecApp|RecFac|20240315143000||ADT^A01|12345|P|2.5.1\r\
//!            PID|1|12345|67890^^^MRN||DOE^JOHN^A||19800101|M";
//!
//! let message = parse_message(hl7).unwrap();
//!
//! let terser = Terser::new(&message);
//! let family_name = terser.get("PID-5-1").unwrap();
//! assert_eq!(family_name, Some("DOE"));
//! ```

pub use rs7_core as core;
pub use rs7_parser as parser;
pub use rs7_terser as terser;
pub use rs7_validator as validator;

pub use rs7_core::{
    delimiters::Delimiters,
    encoding::Encoding,
    error::{Error, Result},
    node::{Node, NodeKind, SetValue, Violation, ViolationKind},
    validation::ValidationLevel,
    Version,
};
