//! The Element Tree (spec.md §4.C).
//!
//! A single tagged type, [`Node`], stands in for the six kinds spec.md
//! §3.1 names (`Message ⊃ Group* ⊃ Segment ⊃ Field ⊃ Component ⊃
//! SubComponent`): one shared header (name, long name, data type,
//! version, validation level) plus either a scalar value or an ordered
//! list of children, never both. There is no parent back-pointer -
//! moving a `Node` out of one tree and into another (`take` then `set`)
//! is how spec.md §9's detach-and-reattach semantics fall out of plain
//! Rust ownership, with no extra bookkeeping required.
//!
//! Delimiters are not stored on the node: they are threaded explicitly
//! through every call that needs them (`set`, `to_er7`), resolved once
//! at the root from the tree's own MSH-1/MSH-2 when the caller doesn't
//! supply an override (spec.md §9).

use std::collections::{BTreeMap, HashMap};

use rs7_schema::{registry_for, Kind as SchemaKind, Registry};

use crate::delimiters::Delimiters;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::parse;
use crate::validation::ValidationLevel;

pub use rs7_schema::Version;

/// The six node kinds of spec.md §3.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Message,
    Group,
    Segment,
    Field,
    Component,
    SubComponent,
}

/// One violation surfaced by [`Node::validate`] (spec.md §4.F).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub kind: ViolationKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    UnknownName,
    ChildNotValid,
    Cardinality,
    DataType,
    MshIntegrity,
}

/// What may be assigned through [`Node::set`]: a raw wire-form string
/// (decoded, or sub-parsed, depending on the target's scalar-ness), or
/// an already-built `Node` moved in wholesale (detach-and-reattach).
pub enum SetValue {
    Node(Node),
    Str(String),
}

impl From<Node> for SetValue {
    fn from(n: Node) -> Self {
        SetValue::Node(n)
    }
}

impl From<String> for SetValue {
    fn from(s: String) -> Self {
        SetValue::Str(s)
    }
}

impl From<&str> for SetValue {
    fn from(s: &str) -> Self {
        SetValue::Str(s.to_string())
    }
}

/// A single node of the Element Tree.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    name: Option<String>,
    long_name: Option<String>,
    data_type: Option<String>,
    value: Option<String>,
    children: Vec<Node>,
    version: Version,
    level: ValidationLevel,
}

impl Node {
    /// Build a node of `kind` named `name`, looking up its schema entry.
    ///
    /// STRICT refuses a name the schema doesn't recognize
    /// (`INVALID_NAME`) and refuses a name whose schema kind disagrees
    /// with `kind`. LENIENT accepts either, storing the name verbatim
    /// with no long name / data type.
    pub fn construct(kind: NodeKind, name: &str, version: Version, level: ValidationLevel) -> Result<Node> {
        let reg = registry_for(version);
        let def = reg.lookup_structure(name);
        if def.kind != SchemaKind::Unknown {
            if !kind_matches(def.kind, kind) {
                return Err(Error::InvalidName(format!(
                    "`{name}` names a {:?} in the schema, not a {kind:?}",
                    def.kind
                )));
            }
            return Ok(Node {
                kind,
                name: Some(name.to_string()),
                long_name: def.long_name,
                data_type: def.data_type,
                value: None,
                children: Vec::new(),
                version,
                level,
            });
        }
        if level.is_strict() {
            return Err(Error::InvalidName(name.to_string()));
        }
        Ok(Node {
            kind,
            name: Some(name.to_string()),
            long_name: None,
            data_type: None,
            value: None,
            children: Vec::new(),
            version,
            level,
        })
    }

    /// Build a nameless node. Only permitted in LENIENT (spec.md §4.C:
    /// "STRICT ... rejects anonymous nodes").
    pub fn anonymous(kind: NodeKind, version: Version, level: ValidationLevel) -> Result<Node> {
        if level.is_strict() {
            return Err(Error::InvalidName(
                "anonymous nodes are not permitted in STRICT mode".to_string(),
            ));
        }
        Ok(Node {
            kind,
            name: None,
            long_name: None,
            data_type: None,
            value: None,
            children: Vec::new(),
            version,
            level,
        })
    }

    pub fn message(name: &str, version: Version, level: ValidationLevel) -> Result<Node> {
        Node::construct(NodeKind::Message, name, version, level)
    }

    pub fn segment(name: &str, version: Version, level: ValidationLevel) -> Result<Node> {
        Node::construct(NodeKind::Segment, name, version, level)
    }

    pub fn group(name: &str, version: Version, level: ValidationLevel) -> Result<Node> {
        Node::construct(NodeKind::Group, name, version, level)
    }

    pub fn field(name: &str, version: Version, level: ValidationLevel) -> Result<Node> {
        Node::construct(NodeKind::Field, name, version, level)
    }

    pub fn component(name: &str, version: Version, level: ValidationLevel) -> Result<Node> {
        Node::construct(NodeKind::Component, name, version, level)
    }

    pub fn subcomponent(name: &str, version: Version, level: ValidationLevel) -> Result<Node> {
        Node::construct(NodeKind::SubComponent, name, version, level)
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn validation_level(&self) -> ValidationLevel {
        self.level
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// A node is scalar (holds a value, never children) when its kind is
    /// `SubComponent`, or its data type is known to the registry as a
    /// base type. An unknown data type (custom/Z field in LENIENT) is
    /// assumed scalar, the common case for such fields (spec.md §9).
    pub fn is_scalar(&self) -> bool {
        match self.kind {
            NodeKind::Message | NodeKind::Group | NodeKind::Segment => false,
            NodeKind::SubComponent => true,
            NodeKind::Field | NodeKind::Component => match &self.data_type {
                Some(dt) => registry_for(self.version).is_base(dt),
                None => true,
            },
        }
    }

    /// Add an already-built child. STRICT checks schema-legality and
    /// cardinality before accepting it (`CHILD_NOT_VALID` /
    /// `MAX_CHILD_LIMIT_REACHED`); LENIENT accepts unconditionally and
    /// defers to `validate()`.
    pub fn add(&mut self, child: Node) -> Result<()> {
        if self.level.is_strict() {
            let parent_name = self.name.clone().unwrap_or_default();
            let child_name = child
                .name
                .clone()
                .ok_or_else(|| Error::InvalidName("<anonymous>".to_string()))?;
            let reg = registry_for(self.version);
            let def = reg
                .children_of(&parent_name)
                .iter()
                .find(|cd| cd.name == child_name)
                .cloned()
                .ok_or_else(|| Error::child_not_valid(parent_name.clone(), child_name.clone()))?;
            if let Some(max) = def.max_occurs() {
                let existing = self
                    .children
                    .iter()
                    .filter(|c| c.name.as_deref() == Some(child_name.as_str()))
                    .count();
                if existing >= max {
                    return Err(Error::MaxChildLimitReached {
                        parent: parent_name,
                        child: child_name,
                        max,
                    });
                }
            }
        }
        self.children.push(child);
        Ok(())
    }

    /// Construct and append a new Segment child.
    pub fn add_segment(&mut self, name: &str) -> Result<&mut Node> {
        let child = Node::construct(NodeKind::Segment, name, self.version, self.level)?;
        self.add(child)?;
        Ok(self.children.last_mut().expect("just pushed"))
    }

    /// Construct and append a new Group child.
    pub fn add_group(&mut self, name: &str) -> Result<&mut Node> {
        let child = Node::construct(NodeKind::Group, name, self.version, self.level)?;
        self.add(child)?;
        Ok(self.children.last_mut().expect("just pushed"))
    }

    /// Construct and append a new Field child.
    pub fn add_field(&mut self, name: &str) -> Result<&mut Node> {
        let child = Node::construct(NodeKind::Field, name, self.version, self.level)?;
        self.add(child)?;
        Ok(self.children.last_mut().expect("just pushed"))
    }

    /// Detach the `index`-th occurrence of `name` (default 0 at the call
    /// site), returning the owned node so the caller can reattach it
    /// elsewhere (spec.md §9 "take_child").
    pub fn remove_at(&mut self, name: &str, index: usize) -> Option<Node> {
        let resolved = self.resolve_child_name(name);
        let mut seen = 0usize;
        let mut target = None;
        for (i, c) in self.children.iter().enumerate() {
            if c.name.as_deref() == Some(resolved.as_str()) {
                if seen == index {
                    target = Some(i);
                    break;
                }
                seen += 1;
            }
        }
        target.map(|i| self.children.remove(i))
    }

    /// Detach every occurrence of `name`.
    pub fn remove_all(&mut self, name: &str) -> Vec<Node> {
        let resolved = self.resolve_child_name(name);
        let mut kept = Vec::with_capacity(self.children.len());
        let mut removed = Vec::new();
        for child in std::mem::take(&mut self.children) {
            if child.name.as_deref() == Some(resolved.as_str()) {
                removed.push(child);
            } else {
                kept.push(child);
            }
        }
        self.children = kept;
        removed
    }

    /// Retrieve the sequence of children matching `name_or_long_name`
    /// (attribute-style resolution: short schema name first, then
    /// data-type-aliased positional form, then long name, spec.md §4.C).
    /// A schema-legal but absent child resolves to an empty sequence;
    /// a schema-illegal one fails with `CHILD_NOT_FOUND`.
    pub fn get(&self, name_or_long_name: &str) -> Result<Vec<&Node>> {
        let resolved = self.resolve_child_name(name_or_long_name);
        let matches: Vec<&Node> = self
            .children
            .iter()
            .filter(|c| c.name.as_deref() == Some(resolved.as_str()))
            .collect();
        if !matches.is_empty() {
            return Ok(matches);
        }
        if self.is_schema_legal_child(&resolved) {
            return Ok(Vec::new());
        }
        Err(Error::child_not_found(self.name.clone().unwrap_or_default(), resolved))
    }

    /// `get` narrowed to a single index (defaulting to 0 at call sites).
    pub fn get_at(&self, name_or_long_name: &str, index: usize) -> Result<Option<&Node>> {
        Ok(self.get(name_or_long_name)?.into_iter().nth(index))
    }

    /// Get-or-autovivify the first child matching `name` (spec.md §3.3:
    /// "a node is autovivified ... only when an assignment targets it").
    pub fn get_or_create(&mut self, name: &str) -> Result<&mut Node> {
        let resolved = self.resolve_child_name(name);
        if let Some(pos) = self.children.iter().position(|c| c.name.as_deref() == Some(resolved.as_str())) {
            return Ok(&mut self.children[pos]);
        }
        let kind = self.expected_child_kind(&resolved);
        let child = Node::construct(kind, &resolved, self.version, self.level)?;
        self.add(child)?;
        Ok(self.children.last_mut().expect("just pushed"))
    }

    /// Assign `value` to the (possibly autovivified) child named `name`.
    /// A `Node` value replaces the child outright (detach-and-reattach);
    /// a string value is decoded-and-stored for a scalar target, or
    /// sub-parsed into fresh children for a composite one (spec.md
    /// §3.3).
    pub fn set(&mut self, name: &str, value: impl Into<SetValue>, delimiters: &Delimiters) -> Result<()> {
        let resolved = self.resolve_child_name(name);
        {
            let _ = self.get_or_create(name)?;
        }
        let idx = self
            .children
            .iter()
            .position(|c| c.name.as_deref() == Some(resolved.as_str()))
            .expect("get_or_create just ensured this child exists");
        match value.into() {
            SetValue::Node(n) => {
                self.children[idx] = n;
                Ok(())
            }
            SetValue::Str(s) => {
                if self.children[idx].is_scalar() {
                    self.children[idx].assign_scalar(&s, delimiters)
                } else {
                    parse::sub_parse_into(&mut self.children[idx], &s, delimiters)
                }
            }
        }
    }

    /// Dotted-path sugar over repeated `get_or_create`/`set`, e.g.
    /// `"PID.PID_5.PID_5_1"` (spec.md §8 S4's attribute-style chain,
    /// expressed as explicit method calls per spec.md §9).
    pub fn set_path(&mut self, path: &str, value: &str, delimiters: &Delimiters) -> Result<()> {
        let parts: Vec<&str> = path.split('.').collect();
        let (init, last) = parts.split_at(parts.len() - 1);
        let mut current = self;
        for part in init {
            current = current.get_or_create(part)?;
        }
        current.set(last[0], value, delimiters)
    }

    /// Dotted-path sugar over repeated `get`, returning the sequence at
    /// the final path segment.
    pub fn get_path(&self, path: &str) -> Result<Vec<&Node>> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.len() == 1 {
            return self.get(parts[0]);
        }
        let first = self.get(parts[0])?;
        let head = first
            .into_iter()
            .next()
            .ok_or_else(|| Error::child_not_found(self.name.clone().unwrap_or_default(), parts[0].to_string()))?;
        head.get_path(&parts[1..].join("."))
    }

    /// Decode-and-store a raw wire-form scalar value. STRICT also checks
    /// the data type's length/regex/charset constraints
    /// (`MAX_LENGTH_REACHED` / `INVALID_VALUE`).
    pub fn assign_scalar(&mut self, raw: &str, delimiters: &Delimiters) -> Result<()> {
        let decoded = Encoding::decode(raw, delimiters)?;
        if self.level.is_strict() {
            if let Some(dt) = &self.data_type {
                let reg = registry_for(self.version);
                let bc = reg.base_constraints(dt);
                if let Err(violation) = bc.check(&decoded) {
                    let name = self.name.clone().unwrap_or_default();
                    return Err(match violation {
                        rs7_schema::ConstraintViolation::TooLong { max_length, actual } => {
                            Error::MaxLengthReached { name, max_length, actual }
                        }
                        _ => Error::InvalidValue { name, data_type: dt.clone(), value: decoded },
                    });
                }
            }
        }
        self.value = Some(decoded);
        self.children.clear();
        Ok(())
    }

    /// Store a raw value with no escape-decoding or constraint checking,
    /// used only for MSH-1/MSH-2 (spec.md §4.D step 1: those two fields
    /// carry the delimiter characters themselves, not escaped text).
    pub(crate) fn assign_scalar_raw(&mut self, raw: String) {
        self.value = Some(raw);
        self.children.clear();
    }

    pub(crate) fn clear_children(&mut self) {
        self.children.clear();
    }

    pub(crate) fn replace_children(&mut self, children: Vec<Node>) {
        self.children = children;
    }

    pub(crate) fn into_children(self) -> Vec<Node> {
        self.children
    }

    fn get_child_value(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
            .and_then(|c| c.value.as_deref())
    }

    /// Resolve a requested name into the canonical schema key used as
    /// the child's `name`, per spec.md §4.C's precedence: (1) exact
    /// short name, (2) short name case-insensitively, (3) the data-type-
    /// aliased positional form (`PID_5_1` -> `XPN_1`), (4) long name.
    /// Short name wins over long name on a collision (spec.md §9).
    fn resolve_child_name(&self, query: &str) -> String {
        let reg = registry_for(self.version);
        let parent_name = self.name.clone().unwrap_or_default();
        let children = reg.children_of(&parent_name);
        let query_lc = query.to_lowercase();

        if let Some(cd) = children.iter().find(|cd| cd.name == query) {
            return cd.name.clone();
        }
        if let Some(cd) = children.iter().find(|cd| cd.name.to_lowercase() == query_lc) {
            return cd.name.clone();
        }

        if !parent_name.is_empty() {
            let prefix = format!("{}_", parent_name.to_lowercase());
            if let Some(rest) = query_lc.strip_prefix(&prefix) {
                if let Ok(idx) = rest.parse::<u32>() {
                    if let Some(dt) = reg.data_type_of(&parent_name) {
                        let canonical = format!("{dt}_{idx}");
                        if reg.lookup_structure(&canonical).kind != SchemaKind::Unknown {
                            return canonical;
                        }
                    }
                }
            }
        }

        if let Some(resolved) = reg.resolve_long_name(&parent_name, query) {
            return resolved;
        }

        query.to_string()
    }

    fn is_schema_legal_child(&self, resolved_name: &str) -> bool {
        let reg = registry_for(self.version);
        let parent_name = self.name.clone().unwrap_or_default();
        reg.children_of(&parent_name).iter().any(|cd| cd.name == resolved_name)
    }

    fn expected_child_kind(&self, resolved: &str) -> NodeKind {
        let reg = registry_for(self.version);
        match reg.lookup_structure(resolved).kind {
            SchemaKind::Message => NodeKind::Message,
            SchemaKind::Group => NodeKind::Group,
            SchemaKind::Segment => NodeKind::Segment,
            SchemaKind::Field => NodeKind::Field,
            SchemaKind::Component => NodeKind::Component,
            SchemaKind::SubComponent => NodeKind::SubComponent,
            SchemaKind::Unknown => self.default_child_kind(),
        }
    }

    fn default_child_kind(&self) -> NodeKind {
        match self.kind {
            NodeKind::Message | NodeKind::Group => NodeKind::Segment,
            NodeKind::Segment => NodeKind::Field,
            NodeKind::Field => NodeKind::Component,
            NodeKind::Component | NodeKind::SubComponent => NodeKind::SubComponent,
        }
    }

    /// Render this subtree back to ER7 wire format. `override_delims`,
    /// when given, is used as-is; otherwise, for a `Message` root, the
    /// effective delimiter set is read back from the tree's own MSH-1/
    /// MSH-2 (so mutating them re-points every subsequent encode with no
    /// separate propagation step, spec.md §9); any other root falls back
    /// to the HL7 default delimiters.
    pub fn to_er7(&self, override_delims: Option<Delimiters>) -> String {
        let delimiters = override_delims.unwrap_or_else(|| self.effective_delimiters());
        self.encode(&delimiters)
    }

    fn effective_delimiters(&self) -> Delimiters {
        if self.kind == NodeKind::Message {
            if let Some(msh) = self.children.iter().find(|c| c.name.as_deref() == Some("MSH")) {
                if let (Some(f1), Some(f2)) = (
                    msh.children.iter().find(|c| c.name.as_deref() == Some("MSH_1")),
                    msh.children.iter().find(|c| c.name.as_deref() == Some("MSH_2")),
                ) {
                    if let (Some(fs), Some(enc)) = (f1.value.as_deref(), f2.value.as_deref()) {
                        if let Some(fs_char) = fs.chars().next() {
                            if let Ok(d) = Delimiters::from_encoding_characters(fs_char, enc) {
                                return d;
                            }
                        }
                    }
                }
            }
        }
        Delimiters::default()
    }

    fn encode(&self, delimiters: &Delimiters) -> String {
        match self.kind {
            NodeKind::Message | NodeKind::Group => self
                .children
                .iter()
                .map(|c| c.encode(delimiters))
                .collect::<Vec<_>>()
                .join("\r"),
            NodeKind::Segment => self.encode_segment(delimiters),
            NodeKind::Field => {
                if self.is_scalar() {
                    self.encode_scalar(delimiters)
                } else {
                    self.encode_positional(delimiters, delimiters.component_separator, self.data_type.as_deref().unwrap_or(""))
                }
            }
            NodeKind::Component => {
                if self.is_scalar() {
                    self.encode_scalar(delimiters)
                } else {
                    self.encode_positional(delimiters, delimiters.subcomponent_separator, self.data_type.as_deref().unwrap_or(""))
                }
            }
            NodeKind::SubComponent => self.encode_scalar(delimiters),
        }
    }

    fn encode_scalar(&self, delimiters: &Delimiters) -> String {
        match &self.value {
            Some(v) => Encoding::encode(v, delimiters),
            None => String::new(),
        }
    }

    fn encode_segment(&self, delimiters: &Delimiters) -> String {
        let seg_name = self.name.clone().unwrap_or_default();
        if seg_name == "MSH" {
            // MSH-2 always mirrors the delimiters actually used to encode
            // this call, not whatever literal value is stored on the
            // node - otherwise printing under `override_delims` would
            // write encoding characters that don't match the separators
            // used for the rest of the message.
            let mut out = format!("MSH{}{}", delimiters.field_separator, delimiters.encoding_characters());
            for slot in self.field_slots_from(&seg_name, 3, delimiters) {
                out.push(delimiters.field_separator);
                out.push_str(&slot);
            }
            out
        } else {
            let slots = self.field_slots_from(&seg_name, 1, delimiters);
            if slots.is_empty() {
                seg_name
            } else {
                format!("{seg_name}{}{}", delimiters.field_separator, slots.join(&delimiters.field_separator.to_string()))
            }
        }
    }

    /// Positional field slots `start..=highest_present`, each slot the
    /// `~`-joined text of every repetition at that index, with trailing
    /// empty slots trimmed (spec.md §4.D/§4.E trailing-empty policy).
    fn field_slots_from(&self, seg_name: &str, start: u32, delimiters: &Delimiters) -> Vec<String> {
        let prefix = format!("{seg_name}_");
        let mut by_index: BTreeMap<u32, Vec<&Node>> = BTreeMap::new();
        for c in &self.children {
            if let Some(n) = &c.name {
                if let Some(rest) = n.strip_prefix(prefix.as_str()) {
                    if let Ok(idx) = rest.parse::<u32>() {
                        by_index.entry(idx).or_default().push(c);
                    }
                }
            }
        }
        let max_idx = by_index.keys().copied().max().unwrap_or(0).max(start.saturating_sub(1));
        let mut slots = Vec::new();
        for i in start..=max_idx {
            let text = match by_index.get(&i) {
                Some(reps) => reps
                    .iter()
                    .map(|n| n.encode(delimiters))
                    .collect::<Vec<_>>()
                    .join(&delimiters.repetition_separator.to_string()),
                None => String::new(),
            };
            slots.push(text);
        }
        while slots.last().map(|s| s.is_empty()).unwrap_or(false) {
            slots.pop();
        }
        slots
    }

    fn encode_positional(&self, delimiters: &Delimiters, sep: char, prefix_type: &str) -> String {
        let prefix = format!("{prefix_type}_");
        let mut by_index: BTreeMap<u32, Vec<&Node>> = BTreeMap::new();
        for c in &self.children {
            if let Some(n) = &c.name {
                if let Some(rest) = n.strip_prefix(prefix.as_str()) {
                    if let Ok(idx) = rest.parse::<u32>() {
                        by_index.entry(idx).or_default().push(c);
                    }
                }
            }
        }
        let max_idx = by_index.keys().copied().max().unwrap_or(0);
        let mut slots = Vec::new();
        for i in 1..=max_idx {
            let text = match by_index.get(&i) {
                Some(reps) => reps
                    .iter()
                    .map(|n| n.encode(delimiters))
                    .collect::<Vec<_>>()
                    .join(&delimiters.repetition_separator.to_string()),
                None => String::new(),
            };
            slots.push(text);
        }
        while slots.last().map(|s| s.is_empty()).unwrap_or(false) {
            slots.pop();
        }
        slots.join(&sep.to_string())
    }

    /// Walk the whole subtree and report every violation of spec.md
    /// §4.F's five checks: unknown names, schema-illegal children,
    /// cardinality, scalar data-type conformance, and (at the Message
    /// root) MSH integrity. Always available, regardless of validation
    /// level - it's the LENIENT-mode audit path, and a useful second
    /// opinion in STRICT mode too.
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        self.validate_into(String::new(), &mut out);
        out
    }

    fn validate_into(&self, path: String, out: &mut Vec<Violation>) {
        let reg = registry_for(self.version);
        let node_path = if path.is_empty() {
            self.name.clone().unwrap_or_else(|| "<anonymous>".to_string())
        } else {
            path
        };

        match &self.name {
            Some(name) => {
                if reg.lookup_structure(name).kind == SchemaKind::Unknown {
                    out.push(Violation {
                        path: node_path.clone(),
                        kind: ViolationKind::UnknownName,
                        message: format!("`{name}` is not known to the schema"),
                    });
                }
            }
            None => out.push(Violation {
                path: node_path.clone(),
                kind: ViolationKind::UnknownName,
                message: "anonymous node".to_string(),
            }),
        }

        if let Some(name) = &self.name {
            let expected = reg.children_of(name);
            let mut seen_counts: HashMap<&str, usize> = HashMap::new();
            for child in &self.children {
                if let Some(cn) = &child.name {
                    *seen_counts.entry(cn.as_str()).or_insert(0) += 1;
                    if !expected.iter().any(|cd| &cd.name == cn) {
                        out.push(Violation {
                            path: format!("{node_path}.{cn}"),
                            kind: ViolationKind::ChildNotValid,
                            message: format!("`{cn}` is not a schema-legal child of `{name}`"),
                        });
                    }
                }
            }
            for cd in expected {
                let count = seen_counts.get(cd.name.as_str()).copied().unwrap_or(0);
                let max_ok = cd.max < 0 || count <= cd.max as usize;
                if count < cd.min as usize || !max_ok {
                    let max_desc = if cd.max < 0 { "unbounded".to_string() } else { cd.max.to_string() };
                    out.push(Violation {
                        path: format!("{node_path}.{}", cd.name),
                        kind: ViolationKind::Cardinality,
                        message: format!("`{}` occurs {count} time(s), expected [{}, {}]", cd.name, cd.min, max_desc),
                    });
                }
            }
        }

        if self.is_scalar() {
            if let (Some(dt), Some(v)) = (&self.data_type, &self.value) {
                let bc = reg.base_constraints(dt);
                if let Err(violation) = bc.check(v) {
                    out.push(Violation {
                        path: node_path.clone(),
                        kind: ViolationKind::DataType,
                        message: format!("{violation:?}"),
                    });
                }
            }
        }

        if self.kind == NodeKind::Message {
            match self.children.iter().find(|c| c.name.as_deref() == Some("MSH")) {
                None => out.push(Violation {
                    path: node_path.clone(),
                    kind: ViolationKind::MshIntegrity,
                    message: "message has no MSH segment".to_string(),
                }),
                Some(msh) => {
                    let version_ok = msh.get_child_value("MSH_12").map(|v| v == self.version.as_str()).unwrap_or(false);
                    if !version_ok {
                        out.push(Violation {
                            path: format!("{node_path}.MSH.MSH_12"),
                            kind: ViolationKind::MshIntegrity,
                            message: "MSH-12 does not match the tree's version".to_string(),
                        });
                    }
                }
            }
        }

        for child in &self.children {
            let child_label = child.name.clone().unwrap_or_else(|| "<anonymous>".to_string());
            child.validate_into(format!("{node_path}.{child_label}"), out);
        }
    }
}

fn kind_matches(schema_kind: SchemaKind, node_kind: NodeKind) -> bool {
    matches!(
        (schema_kind, node_kind),
        (SchemaKind::Message, NodeKind::Message)
            | (SchemaKind::Group, NodeKind::Group)
            | (SchemaKind::Segment, NodeKind::Segment)
            | (SchemaKind::Field, NodeKind::Field)
            | (SchemaKind::Component, NodeKind::Component)
            | (SchemaKind::SubComponent, NodeKind::SubComponent)
    )
}
