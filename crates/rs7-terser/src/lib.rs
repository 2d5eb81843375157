//! Terser-style path access over the Element Tree (spec.md §4.C's
//! dotted-path sugar, laid out in HAPI's path notation).
//!
//! Path format examples:
//! - `PID-5-1` - PID segment, field 5, component 1
//! - `PID-5-1-2` - PID segment, field 5, component 1, subcomponent 2
//! - `OBX(2)-5` - second OBX segment, field 5
//! - `PID-11(2)-1` - PID segment, field 11, second repetition, component 1

mod path;
pub mod bulk;
pub mod cache;
pub mod iterator;

use rs7_core::error::Result;
use rs7_core::node::{Node, NodeKind};

pub use bulk::BulkTerser;
pub use cache::CachedTerser;
pub use iterator::FieldIterator;
use path::TerserPath;

/// Read-only path access over a single Element Tree. The tree is
/// searched for the `segment_index`-th occurrence of the path's segment
/// name wherever it appears in the tree - inside a Group as readily as
/// directly under the Message root, since grouping is a parsing detail
/// a terser consumer shouldn't have to know about (spec.md §4.D step 4
/// builds the groups; this crate just reads through them).
pub struct Terser<'a> {
    root: &'a Node,
}

impl<'a> Terser<'a> {
    pub fn new(root: &'a Node) -> Self {
        Self { root }
    }

    /// Get a value using path notation, e.g. `get("PID-5-1")`.
    pub fn get(&self, path: &str) -> Result<Option<&'a str>> {
        let parsed = TerserPath::parse(path)?;
        let segments = find_segments(self.root, &parsed.segment_id);
        let Some(segment) = segments.get(parsed.segment_index) else {
            return Ok(None);
        };

        let field_name = format!("{}_{}", parsed.segment_id, parsed.field_index);
        let reps = segment.get(&field_name)?;
        let Some(field) = reps.get(parsed.repetition_index) else {
            return Ok(None);
        };

        Ok(field_value(field, parsed.component_index, parsed.subcomponent_index))
    }

    /// Iterate every value of `field_index` across every occurrence of
    /// `segment_id`, in document order.
    pub fn iter_field(&self, segment_id: &str, field_index: usize) -> FieldIterator<'a> {
        FieldIterator::new(self.root, segment_id, field_index)
    }
}

/// Collect every Segment node named `name`, searching through Message
/// and Group containers but never descending into a Segment's own
/// fields (a segment name cannot recur inside a field).
fn find_segments<'a>(node: &'a Node, name: &str) -> Vec<&'a Node> {
    let mut out = Vec::new();
    collect_segments(node, name, &mut out);
    out
}

fn collect_segments<'a>(node: &'a Node, name: &str, out: &mut Vec<&'a Node>) {
    match node.kind() {
        NodeKind::Segment if node.name() == Some(name) => out.push(node),
        NodeKind::Message | NodeKind::Group => {
            for child in node.children() {
                collect_segments(child, name, out);
            }
        }
        _ => {}
    }
}

/// Resolve a field node down to a scalar value, defaulting to the first
/// component/subcomponent when the path under-specifies a composite
/// (HAPI Terser's "get the primitive" convention).
fn field_value<'a>(field: &'a Node, comp_idx: Option<usize>, sub_idx: Option<usize>) -> Option<&'a str> {
    if field.is_scalar() {
        return field.value();
    }
    let comp = indexed_child(field, comp_idx.unwrap_or(1))?;
    match sub_idx {
        Some(idx) => indexed_child(comp, idx)?.value(),
        None if comp.is_scalar() => comp.value(),
        None => indexed_child(comp, 1)?.value(),
    }
}

/// Fetch `parent`'s `idx`-th positional child by its own canonical name
/// (e.g. a `PID_5` field's first component resolves through the same
/// data-type-aliasing `Node::get` already implements for `PID_5_1`).
fn indexed_child(parent: &Node, idx: usize) -> Option<&Node> {
    let key = format!("{}_{idx}", parent.name()?);
    parent.get(&key).ok()?.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rs7_parser::parse_message;

    const HL7: &str = "MSH|^~\\&|SendApp|SendFac|RecApp|RecFac|20240315143000||ADT^A01|12345|P|2.5.1\r\
                        EVN|A01|20240315143000\r\
                        PID|1|12345|67890^^^MRN||DOE^JOHN^A||19800101|M\r\
                        PV1|1|I|ER^101^1";

    #[test]
    fn gets_a_scalar_field() {
        let msg = parse_message(HL7).unwrap();
        let terser = Terser::new(&msg);
        assert_eq!(terser.get("PID-7").unwrap(), Some("19800101"));
    }

    #[test]
    fn gets_a_component_of_a_composite_field() {
        let msg = parse_message(HL7).unwrap();
        let terser = Terser::new(&msg);
        assert_eq!(terser.get("PID-5-1").unwrap(), Some("DOE"));
        assert_eq!(terser.get("PID-5-2").unwrap(), Some("JOHN"));
    }

    #[test]
    fn composite_field_without_component_defaults_to_the_first() {
        let msg = parse_message(HL7).unwrap();
        let terser = Terser::new(&msg);
        assert_eq!(terser.get("PID-5").unwrap(), Some("DOE"));
    }

    #[test]
    fn absent_segment_is_none_not_an_error() {
        let msg = parse_message(HL7).unwrap();
        let terser = Terser::new(&msg);
        assert_eq!(terser.get("NK1-1").unwrap(), None);
    }

    #[test]
    fn finds_segments_nested_under_a_group() {
        let oru = "MSH|^~\\&|LAB|Hospital|RecApp|RecFac|20240315143000||ORU^R01|MSG001|P|2.5.1\r\
                   PID|1|12345|67890^^^MRN||DOE^JOHN^A\r\
                   OBR|1|ORD123|LAB456|CBC^Complete Blood Count^LN\r\
                   OBX|1|NM|WBC^White Blood Count^LN||7.5\r\
                   OBX|2|NM|RBC^Red Blood Count^LN||4.8";
        let msg = parse_message(oru).unwrap();
        let terser = Terser::new(&msg);
        assert_eq!(terser.get("OBX(1)-5").unwrap(), Some("7.5"));
        assert_eq!(terser.get("OBX(2)-5").unwrap(), Some("4.8"));
    }

    #[test]
    fn invalid_path_is_an_error() {
        let msg = parse_message(HL7).unwrap();
        let terser = Terser::new(&msg);
        assert!(terser.get("PID").is_err());
    }
}
