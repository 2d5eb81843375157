//! Validation level (spec.md §4.C "Validation level").
//!
//! Set once at root construction and inherited by every descendant node.
//! STRICT refuses to construct nodes whose name is unknown to the schema
//! and pre-checks schema-legality/cardinality/data-type on every mutating
//! call; LENIENT accepts anonymous nodes, tolerates unknown names, and
//! defers every check to an explicit `validate()` call.

/// The two validation disciplines spec.md §4.C names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationLevel {
    Strict,
    Lenient,
}

impl ValidationLevel {
    pub fn is_strict(self) -> bool {
        matches!(self, ValidationLevel::Strict)
    }

    pub fn is_lenient(self) -> bool {
        matches!(self, ValidationLevel::Lenient)
    }
}

/// spec.md §6: "validation_level ∈ {STRICT, LENIENT} - default LENIENT".
impl Default for ValidationLevel {
    fn default() -> Self {
        ValidationLevel::Lenient
    }
}
