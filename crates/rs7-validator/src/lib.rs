//! Validation for HL7 v2.x Element Trees (spec.md §4.F).
//!
//! `rs7_core::Node::validate` already walks a tree and reports every
//! unknown name, schema-illegal child, cardinality miss, data-type
//! violation, and MSH-integrity problem it finds - that is the audit
//! pass LENIENT trees rely on and STRICT trees can run as a second
//! opinion. This crate is a thin façade over it: it maps
//! [`rs7_core::Violation`] onto a `ValidationResult`/`ValidationError`
//! shape callers can collect, log, and report on, without re-walking
//! the tree themselves.

use rs7_core::node::{Node, ViolationKind};
use tracing::warn;

/// The outcome of validating a tree: a flat list of errors plus an
/// `is_valid` summary flag. There is no separate warnings channel - the
/// underlying `validate()` pass reports violations, not advisory notes,
/// so every finding here is an error (spec.md §4.F has no warning
/// category).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// One violation, positioned at the dotted path `Node::validate` built
/// for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub location: String,
    pub message: String,
    pub error_type: ValidationErrorType,
}

impl ValidationError {
    pub fn new(location: String, message: String, error_type: ValidationErrorType) -> Self {
        Self { location, message, error_type }
    }
}

/// `rs7_core::ViolationKind` renamed to this crate's public vocabulary
/// (spec.md §4.F's five check kinds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorType {
    UnknownName,
    ChildNotValid,
    Cardinality,
    DataType,
    MshIntegrity,
}

impl From<ViolationKind> for ValidationErrorType {
    fn from(kind: ViolationKind) -> Self {
        match kind {
            ViolationKind::UnknownName => ValidationErrorType::UnknownName,
            ViolationKind::ChildNotValid => ValidationErrorType::ChildNotValid,
            ViolationKind::Cardinality => ValidationErrorType::Cardinality,
            ViolationKind::DataType => ValidationErrorType::DataType,
            ViolationKind::MshIntegrity => ValidationErrorType::MshIntegrity,
        }
    }
}

/// Validates an Element Tree against the schema its own version
/// resolves to. Stateless - there is nothing to configure beyond the
/// tree itself, since the tree already carries its version and
/// validation level (spec.md §4.C).
#[derive(Debug, Default, Clone, Copy)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Run the full structural audit (spec.md §4.F) and collect every
    /// violation into a `ValidationResult`.
    pub fn validate(&self, root: &Node) -> ValidationResult {
        let mut result = ValidationResult::new();
        for violation in root.validate() {
            if root.validation_level().is_lenient() {
                warn!(path = %violation.path, kind = ?violation.kind, "validation violation");
            }
            result.add_error(ValidationError::new(violation.path, violation.message, violation.kind.into()));
        }
        result
    }
}

/// Convenience free function equivalent to `Validator::new().validate(root)`.
pub fn validate(root: &Node) -> ValidationResult {
    Validator::new().validate(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rs7_core::validation::ValidationLevel;
    use rs7_core::Version;
    use rs7_parser::parse_message;

    const ADT: &str = "MSH|^~\\&|SendApp|SendFac|RecApp|RecFac|20240315143000||ADT^A01|12345|P|2.5.1\r\
                        EVN|A01|20240315143000\r\
                        PID|1|12345|67890^^^MRN||DOE^JOHN^A||19800101|M\r\
                        PV1|1|I|ER^101^1";

    #[test]
    fn well_formed_message_has_no_violations() {
        let msg = parse_message(ADT).unwrap();
        let result = validate(&msg);
        assert!(result.is_valid());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn unknown_segment_reports_a_violation() {
        let mut msg = Node::message("ADT_A01", Version::V2_5_1, ValidationLevel::Lenient).unwrap();
        msg.add_segment("ZZZ").unwrap();
        let result = validate(&msg);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| {
            matches!(e.error_type, ValidationErrorType::ChildNotValid | ValidationErrorType::UnknownName)
        }));
    }

    #[test]
    fn missing_mandatory_segment_reports_cardinality_violation() {
        let mut msg = Node::message("ADT_A01", Version::V2_5_1, ValidationLevel::Lenient).unwrap();
        msg.add_segment("MSH").unwrap();
        let result = validate(&msg);
        assert!(result.errors.iter().any(|e| e.error_type == ValidationErrorType::Cardinality));
    }

    #[test]
    fn missing_msh_reports_integrity_violation() {
        let msg = Node::message("ADT_A01", Version::V2_5_1, ValidationLevel::Lenient).unwrap();
        let result = validate(&msg);
        assert!(result.errors.iter().any(|e| e.error_type == ValidationErrorType::MshIntegrity));
    }
}
