//! Error kinds for HL7 message processing (spec.md §7).
//!
//! Every mutating tree operation and every parser entry point returns
//! this error type. STRICT mode surfaces these per-operation; LENIENT
//! mode defers structural/cardinality/data-type violations to
//! `validate()` and only raises this type for truly unrecoverable input
//! (malformed delimiter headers, unparsable segment names).

use thiserror::Error;

/// Result type alias for rs7 operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `UNSUPPORTED_VERSION` - version not in the supported set.
    #[error("unsupported HL7 version: {0}")]
    UnsupportedVersion(String),

    /// `INVALID_NAME` - name neither in the schema nor a legal anonymous
    /// pattern.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// `CHILD_NOT_VALID` - child's name is not a schema-legal child of
    /// the parent.
    #[error("`{child}` is not a schema-legal child of `{parent}`")]
    ChildNotValid { parent: String, child: String },

    /// `CHILD_NOT_FOUND` - requested lookup name is schema-illegal for
    /// this parent.
    #[error("`{name}` is not a schema-legal child of `{parent}`")]
    ChildNotFound { parent: String, name: String },

    /// `MAX_CHILD_LIMIT_REACHED` - cardinality maximum exceeded.
    #[error("`{parent}` already has the maximum {max} occurrence(s) of `{child}`")]
    MaxChildLimitReached { parent: String, child: String, max: usize },

    /// `MAX_LENGTH_REACHED` - scalar value longer than the data type's
    /// `max_length`.
    #[error("value for `{name}` exceeds max length {max_length} ({actual} chars)")]
    MaxLengthReached { name: String, max_length: usize, actual: usize },

    /// `INVALID_VALUE` - scalar value fails regex/charset (e.g. ill-formed
    /// DTM).
    #[error("value `{value}` is not a valid {data_type} for `{name}`")]
    InvalidValue { name: String, data_type: String, value: String },

    /// `INVALID_ENCODING_CHARS` - delimiter header malformed.
    #[error("invalid MSH encoding characters: {0}")]
    InvalidEncodingChars(String),

    /// `OPERATION_NOT_ALLOWED` - e.g. assigning a value to a composite
    /// scalar-less node.
    #[error("operation not allowed: {0}")]
    OperationNotAllowed(String),

    /// Raised by the escape codec on an unrecognised `\X..\`/`\Z..\`
    /// sequence or malformed hex payload. Not one of spec.md §7's named
    /// kinds on its own; surfaces to callers as a decode-time variant of
    /// `INVALID_VALUE`.
    #[error("invalid escape sequence: {0}")]
    InvalidEscape(String),
}

impl Error {
    pub fn child_not_valid(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Error::ChildNotValid { parent: parent.into(), child: child.into() }
    }

    pub fn child_not_found(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Error::ChildNotFound { parent: parent.into(), name: name.into() }
    }

    /// A malformed terser path string. Not one of spec.md §7's named
    /// kinds on its own; surfaces as a decode-time `OPERATION_NOT_ALLOWED`.
    pub fn terser_path(message: impl Into<String>) -> Self {
        Error::OperationNotAllowed(message.into())
    }
}
