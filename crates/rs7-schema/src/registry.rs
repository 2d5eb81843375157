//! The Schema Registry (spec.md §4.B).
//!
//! The registry is read-only data queried through a small set of pure
//! functions. It holds no per-tree state and is freely shareable across
//! trees and threads of control (spec.md §5).

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::version::Version;

/// The six node kinds of spec.md §3.1, plus `Unknown` for a name the
/// registry has never heard of (spec.md §4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Message,
    Group,
    Segment,
    Field,
    Component,
    SubComponent,
    Unknown,
}

/// One entry in a parent's ordered child list: `(child_name, min, max,
/// data_type?)` per spec.md §4.B. `max == -1` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildDef {
    pub name: String,
    pub min: i32,
    pub max: i32,
    pub data_type: Option<String>,
}

impl ChildDef {
    pub fn is_unbounded(&self) -> bool {
        self.max < 0
    }

    pub fn max_occurs(&self) -> Option<usize> {
        if self.max < 0 {
            None
        } else {
            Some(self.max as usize)
        }
    }
}

/// What `lookup_structure` returns for a schema name: its kind, its
/// ordered children (empty for scalar kinds), and, for
/// Field/Component/SubComponent, the data type code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureDef {
    pub name: String,
    pub kind: Kind,
    pub long_name: Option<String>,
    pub data_type: Option<String>,
    pub children: Vec<ChildDef>,
}

impl StructureDef {
    fn unknown(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: Kind::Unknown,
            long_name: None,
            data_type: None,
            children: Vec::new(),
        }
    }
}

/// Character-class constraint on a base data type's textual value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Numeric,
    Alphanumeric,
}

impl Charset {
    pub fn allows(&self, s: &str) -> bool {
        match self {
            Charset::Numeric => s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '+' || c == '-'),
            Charset::Alphanumeric => s.chars().all(|c| c.is_ascii_alphanumeric()),
        }
    }
}

/// Length/regex/charset constraints on a base data type (spec.md §4.B
/// `base_constraints`).
#[derive(Debug)]
pub struct BaseConstraints {
    pub max_length: Option<usize>,
    pub regex: Option<Arc<Regex>>,
    pub allowed_charset: Option<Charset>,
}

impl Default for BaseConstraints {
    fn default() -> Self {
        Self {
            max_length: None,
            regex: None,
            allowed_charset: None,
        }
    }
}

impl BaseConstraints {
    /// Check a decoded scalar value against the constraints, returning the
    /// first violated constraint if any (spec.md §4.F item 4).
    pub fn check(&self, value: &str) -> Result<(), ConstraintViolation> {
        if let Some(max) = self.max_length {
            if value.chars().count() > max {
                return Err(ConstraintViolation::TooLong {
                    max_length: max,
                    actual: value.chars().count(),
                });
            }
        }
        if let Some(re) = &self.regex {
            if !re.is_match(value) {
                return Err(ConstraintViolation::PatternMismatch);
            }
        }
        if let Some(charset) = self.allowed_charset {
            if !value.is_empty() && !charset.allows(value) {
                return Err(ConstraintViolation::CharsetMismatch);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    TooLong { max_length: usize, actual: usize },
    PatternMismatch,
    CharsetMismatch,
}

/// The registry interface spec.md §4.B enumerates. Implementations are
/// pure functions over immutable data - no interior mutability, so any
/// `Arc<dyn Registry>` is trivially `Send + Sync`.
pub trait Registry: Send + Sync {
    fn version(&self) -> Version;

    /// `lookup_structure(name) -> Kind x Children x DataType?`
    fn lookup_structure(&self, name: &str) -> StructureDef;

    /// `children_of(parent_name) -> ordered list of (child_name, min, max, data_type?)`
    fn children_of(&self, parent_name: &str) -> &[ChildDef] {
        // Default impl delegates to lookup_structure's owned data; registries
        // that keep structures in a stable table override this to avoid the
        // allocation/leak such a default would otherwise require.
        let _ = parent_name;
        &[]
    }

    /// `data_type_of(name) -> code`
    fn data_type_of(&self, name: &str) -> Option<String> {
        self.lookup_structure(name).data_type
    }

    /// `is_base(code) -> bool`
    fn is_base(&self, code: &str) -> bool;

    /// `base_constraints(code) -> {max_length?, regex?, allowed_charset?}`
    fn base_constraints(&self, code: &str) -> BaseConstraints;

    /// `resolve_long_name(parent_name, long_name) -> child_name`, case
    /// insensitive.
    fn resolve_long_name(&self, parent_name: &str, long_name: &str) -> Option<String>;
}

/// A registry backed entirely by static, in-memory tables - the shape
/// spec.md §9 recommends for "ownership-disciplined targets": static
/// tables shared by reference, built once and never mutated.
pub struct StaticRegistry {
    version: Version,
    structures: HashMap<String, StructureDef>,
    base_types: HashMap<String, BaseConstraints>,
    long_names: HashMap<(String, String), String>,
}

impl StaticRegistry {
    pub fn new(
        version: Version,
        structures: HashMap<String, StructureDef>,
        base_types: HashMap<String, BaseConstraints>,
        long_names: HashMap<(String, String), String>,
    ) -> Self {
        Self {
            version,
            structures,
            base_types,
            long_names,
        }
    }
}

impl Registry for StaticRegistry {
    fn version(&self) -> Version {
        self.version
    }

    fn lookup_structure(&self, name: &str) -> StructureDef {
        self.structures
            .get(name)
            .cloned()
            .unwrap_or_else(|| StructureDef::unknown(name))
    }

    fn children_of(&self, parent_name: &str) -> &[ChildDef] {
        self.structures
            .get(parent_name)
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
    }

    fn is_base(&self, code: &str) -> bool {
        self.base_types.contains_key(code)
    }

    fn base_constraints(&self, code: &str) -> BaseConstraints {
        self.base_types
            .get(code)
            .cloned()
            .unwrap_or_default()
    }

    fn resolve_long_name(&self, parent_name: &str, long_name: &str) -> Option<String> {
        self.long_names
            .get(&(parent_name.to_string(), long_name.to_lowercase()))
            .cloned()
    }
}

impl Clone for BaseConstraints {
    fn clone(&self) -> Self {
        Self {
            max_length: self.max_length,
            regex: self.regex.clone(),
            allowed_charset: self.allowed_charset,
        }
    }
}

static REGISTRIES: Lazy<HashMap<Version, Arc<dyn Registry>>> = Lazy::new(|| {
    let mut map: HashMap<Version, Arc<dyn Registry>> = HashMap::new();
    for &version in Version::all() {
        map.insert(version, crate::messages::build_registry(version));
    }
    map
});

/// Look up the shared registry for a version. The registry is loaded once
/// per version and reused for the lifetime of the process (spec.md §5).
pub fn registry_for(version: Version) -> Arc<dyn Registry> {
    REGISTRIES
        .get(&version)
        .cloned()
        .unwrap_or_else(|| crate::messages::build_registry(version))
}
