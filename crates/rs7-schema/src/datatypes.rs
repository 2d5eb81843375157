//! Base data-type constraint tables (spec.md §4.B `base_constraints`).
//!
//! The embedded dataset is a representative subset, not a full per-version
//! table set: spec.md §1 scopes the full schema *content* out of the core
//! ("data the core consumes via a fixed interface"). These are the base
//! types referenced by the segments/composites this crate ships.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::registry::{BaseConstraints, Charset};

fn bc(max_length: Option<usize>, regex: Option<&str>, charset: Option<Charset>) -> BaseConstraints {
    BaseConstraints {
        max_length,
        regex: regex.map(|p| Arc::new(Regex::new(p).expect("static base-type regex"))),
        allowed_charset: charset,
    }
}

/// Every base (scalar) data type code this crate ships constraints for.
pub fn base_type_table() -> HashMap<String, BaseConstraints> {
    let mut m = HashMap::new();
    m.insert("ST".to_string(), bc(Some(200), None, None));
    m.insert("TX".to_string(), bc(None, None, None));
    m.insert("FT".to_string(), bc(None, None, None));
    m.insert("NM".to_string(), bc(Some(16), Some(r"^[+-]?\d+(\.\d+)?$"), None));
    m.insert("SI".to_string(), bc(Some(4), Some(r"^\d+$"), Some(Charset::Numeric)));
    m.insert("ID".to_string(), bc(Some(20), None, None));
    m.insert("IS".to_string(), bc(Some(20), None, None));
    m.insert("DT".to_string(), bc(Some(8), Some(r"^\d{4}(\d{2}(\d{2})?)?$"), Some(Charset::Numeric)));
    m.insert(
        "TM".to_string(),
        bc(Some(16), Some(r"^\d{2}(\d{2}(\d{2}(\.\d{1,4})?)?)?([+-]\d{4})?$"), None),
    );
    m.insert(
        "DTM".to_string(),
        bc(
            Some(24),
            Some(r"^\d{4}(\d{2}(\d{2}(\d{2}(\d{2}(\d{2}(\.\d{1,4})?)?)?)?)?)?([+-]\d{4})?$"),
            None,
        ),
    );
    m
}

/// One child slot of a composite data type, expressed the way
/// `children_of` expresses a parent's children: `(suffix, long_name,
/// data_type)`. Used to build both Component-of-Field and
/// SubComponent-of-Component structures, since this crate's tree is a
/// fixed six-level containment order (spec.md §3.1) and never nests a
/// composite deeper than SubComponent.
#[derive(Clone, Copy)]
pub struct CompositeSlot {
    pub index: u32,
    pub long_name: &'static str,
    pub data_type: &'static str,
}

const fn slot(index: u32, long_name: &'static str, data_type: &'static str) -> CompositeSlot {
    CompositeSlot { index, long_name, data_type }
}

/// `CX` - extended composite ID. `CX_4` (assigning authority) is itself
/// composite (`HD`), giving the test fixtures a real three-level
/// Field/Component/SubComponent chain to exercise.
pub fn cx_slots() -> Vec<CompositeSlot> {
    vec![
        slot(1, "id_number", "ST"),
        slot(2, "check_digit", "ST"),
        slot(3, "check_digit_scheme", "ID"),
        slot(4, "assigning_authority", "HD"),
        slot(5, "identifier_type_code", "ID"),
    ]
}

/// `HD` - hierarchic designator. Always used as a nested (SubComponent)
/// shape in this dataset (inside `CX_4`).
pub fn hd_slots() -> Vec<CompositeSlot> {
    vec![
        slot(1, "namespace_id", "IS"),
        slot(2, "universal_id", "ST"),
        slot(3, "universal_id_type", "ID"),
    ]
}

/// `XPN` - extended person name, simplified to scalar family/given name
/// components (real HL7 nests `FN` at `XPN_1`; flattened here so
/// `pid_5_1`/`pid_5_2` address family/given name directly, matching
/// spec.md §8 S4).
pub fn xpn_slots() -> Vec<CompositeSlot> {
    vec![
        slot(1, "family_name", "ST"),
        slot(2, "given_name", "ST"),
        slot(3, "second_and_further_given_names", "ST"),
        slot(4, "suffix", "ST"),
        slot(5, "prefix", "ST"),
        slot(7, "name_type_code", "ID"),
    ]
}

/// `XAD` - extended address.
pub fn xad_slots() -> Vec<CompositeSlot> {
    vec![
        slot(1, "street_address", "ST"),
        slot(2, "other_designation", "ST"),
        slot(3, "city", "ST"),
        slot(4, "state_or_province", "ST"),
        slot(5, "zip_or_postal_code", "ST"),
        slot(6, "country", "ID"),
        slot(7, "address_type", "ID"),
    ]
}

/// `CWE` - coded with exceptions (covers `CE` usage in this dataset too).
pub fn cwe_slots() -> Vec<CompositeSlot> {
    vec![
        slot(1, "identifier", "ST"),
        slot(2, "text", "ST"),
        slot(3, "name_of_coding_system", "ID"),
        slot(4, "alternate_identifier", "ST"),
        slot(5, "alternate_text", "ST"),
        slot(6, "name_of_alternate_coding_system", "ID"),
    ]
}

/// `MSG` - message type (MSH-9).
pub fn msg_slots() -> Vec<CompositeSlot> {
    vec![
        slot(1, "message_code", "ID"),
        slot(2, "trigger_event", "ID"),
        slot(3, "message_structure", "ID"),
    ]
}

/// `PL` - person location, simplified.
pub fn pl_slots() -> Vec<CompositeSlot> {
    vec![
        slot(1, "point_of_care", "IS"),
        slot(2, "room", "IS"),
        slot(3, "bed", "IS"),
        slot(4, "facility", "HD"),
    ]
}

/// Component slot tables keyed by composite code, used by
/// `messages::register_composite` to expand a field's data type into its
/// Component (and, where nested, SubComponent) structure entries.
pub fn composite_slot_table() -> HashMap<&'static str, Vec<CompositeSlot>> {
    let mut m: HashMap<&'static str, Vec<CompositeSlot>> = HashMap::new();
    m.insert("CX", cx_slots());
    m.insert("HD", hd_slots());
    m.insert("XPN", xpn_slots());
    m.insert("XAD", xad_slots());
    m.insert("CWE", cwe_slots());
    m.insert("CE", cwe_slots());
    m.insert("MSG", msg_slots());
    m.insert("PL", pl_slots());
    m
}
