//! Segment and message-structure tables (spec.md §4.B).
//!
//! Ships a representative subset of the real HL7 v2 schema content: enough
//! segments, composite data types, and message structures (flat, grouped,
//! and nested-group) to exercise every invariant and scenario in spec.md
//! §8. Adding a real per-version schema means adding more tables here, not
//! touching the registry, tree, parser, or validator (spec.md §1's "schema
//! content is data" boundary).

use std::collections::HashMap;
use std::sync::Arc;

use crate::datatypes::{base_type_table, composite_slot_table, CompositeSlot};
use crate::registry::{BaseConstraints, ChildDef, Kind, Registry, StaticRegistry, StructureDef};
use crate::version::Version;

struct FieldSpec {
    idx: u32,
    long_name: &'static str,
    data_type: &'static str,
    min: i32,
    max: i32,
}

const fn f(idx: u32, long_name: &'static str, data_type: &'static str, min: i32, max: i32) -> FieldSpec {
    FieldSpec { idx, long_name, data_type, min, max }
}

type CompositeTable = HashMap<&'static str, Vec<CompositeSlot>>;

/// Expand a composite data type's component slots into `structures`
/// entries (and, for a nested composite slot, the SubComponent entries
/// one level further down - this crate's tree never nests past
/// SubComponent, spec.md §3.1). Returns the `ChildDef`s a Field of this
/// data type should carry.
fn register_composite(
    structures: &mut HashMap<String, StructureDef>,
    code: &str,
    composites: &CompositeTable,
    base_types: &HashMap<String, BaseConstraints>,
) -> Vec<ChildDef> {
    let slots = composites
        .get(code)
        .unwrap_or_else(|| panic!("unknown composite data type `{code}`"))
        .clone();

    let mut children = Vec::with_capacity(slots.len());
    for slot in &slots {
        let comp_name = format!("{code}_{}", slot.index);
        let sub_children = if base_types.contains_key(slot.data_type) {
            Vec::new()
        } else {
            let nested = composites
                .get(slot.data_type)
                .unwrap_or_else(|| panic!("unknown nested composite `{}`", slot.data_type))
                .clone();
            let mut subs = Vec::with_capacity(nested.len());
            for ns in &nested {
                let sub_name = format!("{}_{}", slot.data_type, ns.index);
                structures.entry(sub_name.clone()).or_insert_with(|| StructureDef {
                    name: sub_name.clone(),
                    kind: Kind::SubComponent,
                    long_name: Some(ns.long_name.to_string()),
                    data_type: Some(ns.data_type.to_string()),
                    children: Vec::new(),
                });
                subs.push(ChildDef {
                    name: sub_name,
                    min: 0,
                    max: 1,
                    data_type: Some(ns.data_type.to_string()),
                });
            }
            subs
        };

        structures.insert(
            comp_name.clone(),
            StructureDef {
                name: comp_name.clone(),
                kind: Kind::Component,
                long_name: Some(slot.long_name.to_string()),
                data_type: Some(slot.data_type.to_string()),
                children: sub_children,
            },
        );
        children.push(ChildDef {
            name: comp_name,
            min: 0,
            max: 1,
            data_type: Some(slot.data_type.to_string()),
        });
    }
    children
}

// Field-name-derived component aliases (spec.md §4.B: `PID_5_1` resolves
// to the same entry as `XPN_1`) are not pre-registered as separate table
// entries: `rs7_core::Node::resolve_child_name` derives the canonical
// name algorithmically from the naming convention itself (parent field's
// data type + positional suffix), so no alias table is needed here.

fn build_segment(
    structures: &mut HashMap<String, StructureDef>,
    long_names: &mut HashMap<(String, String), String>,
    base_types: &HashMap<String, BaseConstraints>,
    composites: &CompositeTable,
    seg_name: &str,
    fields: &[FieldSpec],
) {
    let mut children = Vec::with_capacity(fields.len());
    for spec in fields {
        let field_name = format!("{seg_name}_{}", spec.idx);
        long_names.insert((seg_name.to_string(), spec.long_name.to_lowercase()), field_name.clone());

        let field_children = if base_types.contains_key(spec.data_type) {
            Vec::new()
        } else {
            register_composite(structures, spec.data_type, composites, base_types)
        };

        structures.insert(
            field_name.clone(),
            StructureDef {
                name: field_name.clone(),
                kind: Kind::Field,
                long_name: Some(spec.long_name.to_string()),
                data_type: Some(spec.data_type.to_string()),
                children: field_children,
            },
        );
        children.push(ChildDef {
            name: field_name,
            min: spec.min,
            max: spec.max,
            data_type: Some(spec.data_type.to_string()),
        });
    }

    structures.insert(
        seg_name.to_string(),
        StructureDef {
            name: seg_name.to_string(),
            kind: Kind::Segment,
            long_name: None,
            data_type: None,
            children,
        },
    );
}

fn cd(name: &str, min: i32, max: i32) -> ChildDef {
    ChildDef { name: name.to_string(), min, max, data_type: None }
}

fn insert_container(structures: &mut HashMap<String, StructureDef>, name: &str, kind: Kind, children: Vec<ChildDef>) {
    structures.insert(
        name.to_string(),
        StructureDef { name: name.to_string(), kind, long_name: None, data_type: None, children },
    );
}

fn register_segments(
    structures: &mut HashMap<String, StructureDef>,
    long_names: &mut HashMap<(String, String), String>,
    base_types: &HashMap<String, BaseConstraints>,
    composites: &CompositeTable,
) {
    build_segment(structures, long_names, base_types, composites, "MSH", &[
        f(1, "field_separator", "ST", 1, 1),
        f(2, "encoding_characters", "ST", 1, 1),
        f(3, "sending_application", "HD", 0, 1),
        f(4, "sending_facility", "HD", 0, 1),
        f(5, "receiving_application", "HD", 0, 1),
        f(6, "receiving_facility", "HD", 0, 1),
        f(7, "date_time_of_message", "DTM", 1, 1),
        f(8, "security", "ST", 0, 1),
        f(9, "message_type", "MSG", 1, 1),
        f(10, "message_control_id", "ST", 1, 1),
        f(11, "processing_id", "ID", 1, 1),
        f(12, "version_id", "ID", 1, 1),
        f(13, "sequence_number", "NM", 0, 1),
        f(14, "continuation_pointer", "ST", 0, 1),
        f(15, "accept_acknowledgment_type", "ID", 0, 1),
        f(16, "application_acknowledgment_type", "ID", 0, 1),
        f(17, "country_code", "ID", 0, 1),
        f(18, "character_set", "ID", 0, -1),
    ]);

    build_segment(structures, long_names, base_types, composites, "EVN", &[
        f(1, "event_type_code", "ID", 0, 1),
        f(2, "recorded_date_time", "DTM", 1, 1),
        f(3, "date_time_planned_event", "DTM", 0, 1),
        f(4, "event_reason_code", "IS", 0, 1),
        f(5, "operator_id", "ST", 0, -1),
        f(6, "event_occurred", "DTM", 0, 1),
        f(7, "event_facility", "HD", 0, 1),
    ]);

    build_segment(structures, long_names, base_types, composites, "PID", &[
        f(1, "set_id", "SI", 0, 1),
        f(2, "patient_id", "CX", 0, 1),
        f(3, "patient_identifier_list", "CX", 1, -1),
        f(4, "alternate_patient_id", "CX", 0, -1),
        f(5, "patient_name", "XPN", 1, -1),
        f(6, "mother_maiden_name", "XPN", 0, -1),
        f(7, "date_time_of_birth", "DTM", 0, 1),
        f(8, "administrative_sex", "IS", 0, 1),
        f(9, "patient_alias", "XPN", 0, -1),
        f(10, "race", "CWE", 0, -1),
        f(11, "patient_address", "XAD", 0, -1),
        f(12, "county_code", "IS", 0, 1),
        f(13, "phone_home", "ST", 0, -1),
        f(18, "patient_account_number", "CX", 0, 1),
        f(19, "ssn_number", "ST", 0, 1),
    ]);

    build_segment(structures, long_names, base_types, composites, "PD1", &[
        f(1, "living_dependency", "IS", 0, -1),
        f(3, "patient_primary_facility", "XAD", 0, 1),
    ]);

    build_segment(structures, long_names, base_types, composites, "NK1", &[
        f(1, "set_id", "SI", 1, 1),
        f(2, "name", "XPN", 0, -1),
        f(3, "relationship", "CWE", 0, 1),
        f(4, "address", "XAD", 0, -1),
        f(5, "phone_number", "ST", 0, -1),
    ]);

    build_segment(structures, long_names, base_types, composites, "PV1", &[
        f(1, "set_id", "SI", 0, 1),
        f(2, "patient_class", "IS", 1, 1),
        f(3, "assigned_patient_location", "PL", 0, 1),
        f(4, "admission_type", "IS", 0, 1),
        f(7, "attending_doctor", "CWE", 0, -1),
        f(19, "visit_number", "CX", 0, 1),
        f(44, "admit_date_time", "DTM", 0, 1),
        f(45, "discharge_date_time", "DTM", 0, 1),
    ]);

    build_segment(structures, long_names, base_types, composites, "MSA", &[
        f(1, "acknowledgment_code", "ID", 1, 1),
        f(2, "message_control_id", "ST", 1, 1),
        f(3, "text_message", "ST", 0, 1),
        f(4, "expected_sequence_number", "NM", 0, 1),
        f(6, "error_condition", "CWE", 0, 1),
    ]);

    build_segment(structures, long_names, base_types, composites, "ERR", &[
        f(1, "error_code_and_location", "ST", 0, -1),
        f(2, "error_location", "ST", 0, 1),
        f(3, "hl7_error_code", "CWE", 0, 1),
        f(4, "severity", "ID", 0, 1),
    ]);

    build_segment(structures, long_names, base_types, composites, "ORC", &[
        f(1, "order_control", "ID", 1, 1),
        f(2, "placer_order_number", "ST", 0, 1),
        f(3, "filler_order_number", "ST", 0, 1),
        f(5, "order_status", "ID", 0, 1),
        f(9, "date_time_of_transaction", "DTM", 0, 1),
    ]);

    build_segment(structures, long_names, base_types, composites, "OBR", &[
        f(1, "set_id", "SI", 0, 1),
        f(2, "placer_order_number", "ST", 0, 1),
        f(3, "filler_order_number", "ST", 0, 1),
        f(4, "universal_service_id", "CWE", 1, 1),
        f(7, "observation_date_time", "DTM", 0, 1),
        f(16, "ordering_provider", "CWE", 0, -1),
        f(25, "result_status", "ID", 0, 1),
    ]);

    build_segment(structures, long_names, base_types, composites, "OBX", &[
        f(1, "set_id", "SI", 0, 1),
        f(2, "value_type", "ID", 0, 1),
        f(3, "observation_identifier", "CWE", 1, 1),
        f(4, "observation_sub_id", "ST", 0, 1),
        f(5, "observation_value", "ST", 0, -1),
        f(6, "units", "CWE", 0, 1),
        f(7, "references_range", "ST", 0, 1),
        f(8, "abnormal_flags", "IS", 0, -1),
        f(11, "observation_result_status", "ID", 1, 1),
        f(14, "date_time_of_observation", "DTM", 0, 1),
    ]);

    build_segment(structures, long_names, base_types, composites, "NTE", &[
        f(1, "set_id", "SI", 0, 1),
        f(2, "source_of_comment", "ID", 0, 1),
        f(3, "comment", "FT", 0, -1),
    ]);
}

fn register_message_structures(structures: &mut HashMap<String, StructureDef>) {
    // ADT_A01: flat, no groups - the spec.md §8 S2-S6 tutorial message
    // (MSH, EVN, PID, PV1) plus the repeating NK1 the tutorial's "next of
    // kin" extension uses.
    insert_container(structures, "ADT_A01", Kind::Message, vec![
        cd("MSH", 1, 1),
        cd("EVN", 1, 1),
        cd("PID", 1, 1),
        cd("PD1", 0, 1),
        cd("NK1", 0, -1),
        cd("PV1", 1, 1),
    ]);
    // Every ADT trigger event in this dataset shares ADT_A01's structure,
    // as the real HL7 ADT chapter does for most A0x/A1x events.
    for trigger in ["ADT_A04", "ADT_A08", "ADT_A02", "ADT_A03"] {
        let def = structures.get("ADT_A01").unwrap().clone();
        structures.insert(trigger.to_string(), StructureDef { name: trigger.to_string(), ..def });
    }

    // ACK: MSH, MSA, ERR* (spec.md §4.B dataset list).
    insert_container(structures, "ACK", Kind::Message, vec![
        cd("MSH", 1, 1),
        cd("MSA", 1, 1),
        cd("ERR", 0, -1),
    ]);

    // ORU_R01: PATIENT_RESULT* > PATIENT{PID,[PV1]}, ORDER_OBSERVATION*{OBR,OBX*,NTE*}
    insert_container(structures, "ORU_R01_PATIENT", Kind::Group, vec![
        cd("PID", 1, 1),
        cd("PD1", 0, 1),
        cd("PV1", 0, 1),
    ]);
    insert_container(structures, "ORU_R01_ORDER_OBSERVATION", Kind::Group, vec![
        cd("ORC", 0, 1),
        cd("OBR", 1, 1),
        cd("OBX", 0, -1),
        cd("NTE", 0, -1),
    ]);
    insert_container(structures, "ORU_R01_PATIENT_RESULT", Kind::Group, vec![
        cd("ORU_R01_PATIENT", 1, 1),
        cd("ORU_R01_ORDER_OBSERVATION", 1, -1),
    ]);
    insert_container(structures, "ORU_R01", Kind::Message, vec![
        cd("MSH", 1, 1),
        cd("ORU_R01_PATIENT_RESULT", 1, -1),
    ]);

    // ORM_O01: PATIENT{PID,[PV1]}?, ORDER+{ORC,[OBR]}
    insert_container(structures, "ORM_O01_PATIENT", Kind::Group, vec![
        cd("PID", 1, 1),
        cd("PV1", 0, 1),
    ]);
    insert_container(structures, "ORM_O01_ORDER", Kind::Group, vec![
        cd("ORC", 1, 1),
        cd("OBR", 0, 1),
        cd("NTE", 0, -1),
    ]);
    insert_container(structures, "ORM_O01", Kind::Message, vec![
        cd("MSH", 1, 1),
        cd("ORM_O01_PATIENT", 0, 1),
        cd("ORM_O01_ORDER", 1, -1),
    ]);
}

/// Build the static registry for a version. This representative dataset
/// does not vary across versions (spec.md §1 scopes the real per-version
/// schema content out of the core); see DESIGN.md for the open-question
/// resolution.
pub fn build_registry(version: Version) -> Arc<dyn Registry> {
    let base_types = base_type_table();
    let composites = composite_slot_table();
    let mut structures = HashMap::new();
    let mut long_names = HashMap::new();

    register_segments(&mut structures, &mut long_names, &base_types, &composites);
    register_message_structures(&mut structures);

    Arc::new(StaticRegistry::new(version, structures, base_types, long_names))
}
