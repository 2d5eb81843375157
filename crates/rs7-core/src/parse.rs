//! Low-level, non-grouping ER7 decomposition (spec.md §4.D steps 1-3).
//!
//! These are the primitives [`crate::node::Node::set`] uses for a
//! string-assignment sub-parse, and that `rs7-parser` wraps/re-exports
//! as its public `parse_segment`/`parse_field`/`parse_component` entry
//! points. They live here, rather than in `rs7-parser`, so `rs7-core`
//! never has to depend on the crate that in turn depends on it; step 4
//! (schema-directed grouping into Message/Group) is `rs7-parser`'s alone.

use crate::delimiters::Delimiters;
use crate::error::{Error, Result};
use crate::node::{Node, NodeKind};
use crate::validation::ValidationLevel;
use rs7_schema::Version;

/// Parse one ER7 segment line (no trailing terminator) into a Segment
/// node, MSH special-cased per spec.md §4.D step 1.
pub fn parse_segment(text: &str, version: Version, level: ValidationLevel, delimiters: &Delimiters) -> Result<Node> {
    if text.chars().count() < 3 {
        return Err(Error::InvalidName(text.to_string()));
    }
    let seg_name: String = text.chars().take(3).collect();
    validate_segment_name(&seg_name)?;
    let mut node = Node::construct(NodeKind::Segment, &seg_name, version, level)?;

    if seg_name == "MSH" {
        populate_msh(&mut node, text, version, level, delimiters)?;
    } else {
        let after = &text[3..];
        let after = after.strip_prefix(delimiters.field_separator).unwrap_or(after);
        let mut field_texts: Vec<&str> = if text.len() == 3 {
            Vec::new()
        } else {
            after.split(delimiters.field_separator).collect()
        };
        while field_texts.last() == Some(&"") {
            field_texts.pop();
        }
        for (i, ft) in field_texts.iter().enumerate() {
            populate_field_slot(&mut node, &seg_name, i as u32 + 1, ft, version, level, delimiters)?;
        }
    }
    Ok(node)
}

/// Parse a single field's wire text (no repetition splitting beyond
/// plain component decomposition - spec.md §3.3's sub-parse targets one
/// occurrence, not a repetition group) into a Field node.
pub fn parse_field(text: &str, name: &str, version: Version, level: ValidationLevel, delimiters: &Delimiters) -> Result<Node> {
    let mut node = Node::construct(NodeKind::Field, name, version, level)?;
    fill_node(&mut node, text, delimiters)?;
    Ok(node)
}

/// Parse a single component's wire text into a Component node.
pub fn parse_component(text: &str, name: &str, version: Version, level: ValidationLevel, delimiters: &Delimiters) -> Result<Node> {
    let mut node = Node::construct(NodeKind::Component, name, version, level)?;
    fill_node(&mut node, text, delimiters)?;
    Ok(node)
}

/// Re-populate `node`'s children (or scalar value) by parsing `text`
/// under `node`'s own kind/name/version/level. Used by `Node::set` when
/// a string is assigned to a non-scalar target (spec.md §3.3).
pub fn sub_parse_into(node: &mut Node, text: &str, delimiters: &Delimiters) -> Result<()> {
    match node.kind() {
        NodeKind::Segment => {
            let seg_name = node.name().unwrap_or_default().to_string();
            let parsed = parse_segment(text, node.version(), node.validation_level(), delimiters)?;
            let _ = seg_name;
            node.replace_children(parsed.into_children());
            Ok(())
        }
        NodeKind::Field | NodeKind::Component => fill_node(node, text, delimiters),
        _ => Err(Error::OperationNotAllowed(format!("{:?} cannot be sub-parsed from a string", node.kind()))),
    }
}

/// Split `text` by the separator appropriate to `node`'s kind (component
/// or subcomponent) and fill `node`'s children one level down, or decode
/// `text` directly if `node` is scalar. Recurses at most Field ->
/// Component -> SubComponent (spec.md §3.1's fixed containment order).
fn fill_node(node: &mut Node, text: &str, delimiters: &Delimiters) -> Result<()> {
    if node.is_scalar() {
        return node.assign_scalar(text, delimiters);
    }
    node.clear_children();

    let sep = match node.kind() {
        NodeKind::Field => delimiters.component_separator,
        NodeKind::Component => delimiters.subcomponent_separator,
        other => return Err(Error::OperationNotAllowed(format!("{other:?} cannot decompose a string"))),
    };
    let mut parts: Vec<&str> = if text.is_empty() { Vec::new() } else { text.split(sep).collect() };
    while parts.last() == Some(&"") {
        parts.pop();
    }

    let prefix = node.data_type().unwrap_or("").to_string();
    let child_kind = match node.kind() {
        NodeKind::Field => NodeKind::Component,
        NodeKind::Component => NodeKind::SubComponent,
        _ => unreachable!(),
    };
    let version = node.version();
    let level = node.validation_level();

    for (i, part) in parts.into_iter().enumerate() {
        let child_name = format!("{prefix}_{}", i + 1);
        let mut child = Node::construct(child_kind, &child_name, version, level)?;
        fill_node(&mut child, part, delimiters)?;
        node.add(child)?;
    }
    Ok(())
}

/// Split one field slot's text on the repetition separator and append
/// one Field child per repetition (spec.md §3.2 "repetitions").
fn populate_field_slot(
    node: &mut Node,
    seg_name: &str,
    idx: u32,
    field_text: &str,
    version: Version,
    level: ValidationLevel,
    delimiters: &Delimiters,
) -> Result<()> {
    let field_name = format!("{seg_name}_{idx}");
    let rep_texts: Vec<&str> = if field_text.is_empty() {
        vec![""]
    } else {
        field_text.split(delimiters.repetition_separator).collect()
    };
    for rep_text in rep_texts {
        let mut field_node = Node::construct(NodeKind::Field, &field_name, version, level)?;
        fill_node(&mut field_node, rep_text, delimiters)?;
        node.add(field_node)?;
    }
    Ok(())
}

/// MSH is special: MSH-1 is the field separator character itself and
/// MSH-2 is the four-character encoding-characters string, neither
/// escape-decoded (spec.md §4.D step 1); the rest parse like any other
/// segment's fields, starting at index 3.
fn populate_msh(node: &mut Node, text: &str, version: Version, level: ValidationLevel, delimiters: &Delimiters) -> Result<()> {
    let fs = delimiters.field_separator;
    let mut f1 = Node::construct(NodeKind::Field, "MSH_1", version, level)?;
    f1.assign_scalar_raw(fs.to_string());
    node.add(f1)?;

    let after_name = &text[3..];
    let after_fs = after_name
        .strip_prefix(fs)
        .ok_or_else(|| Error::InvalidEncodingChars(text.to_string()))?;
    let msh2_end = after_fs.find(fs).unwrap_or(after_fs.len());
    let enc_chars = &after_fs[..msh2_end];
    if enc_chars.chars().count() != 4 {
        return Err(Error::InvalidEncodingChars(format!(
            "expected 4 encoding characters, got `{enc_chars}`"
        )));
    }
    let mut f2 = Node::construct(NodeKind::Field, "MSH_2", version, level)?;
    f2.assign_scalar_raw(enc_chars.to_string());
    node.add(f2)?;

    let remainder = after_fs.get(msh2_end..).unwrap_or("");
    let remainder = remainder.strip_prefix(fs).unwrap_or("");
    let mut field_texts: Vec<&str> = if remainder.is_empty() { Vec::new() } else { remainder.split(fs).collect() };
    while field_texts.last() == Some(&"") {
        field_texts.pop();
    }
    for (i, ft) in field_texts.iter().enumerate() {
        populate_field_slot(node, "MSH", i as u32 + 3, ft, version, level, delimiters)?;
    }
    Ok(())
}

fn validate_segment_name(name: &str) -> Result<()> {
    if name.len() == 3 && name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delims() -> Delimiters {
        Delimiters::default()
    }

    #[test]
    fn parses_msh_segment() {
        let d = delims();
        let node = parse_segment(
            "MSH|^~\\&|SENDER|FAC|RECEIVER|FAC2|20240101120000||ADT^A01|MSG001|P|2.5.1",
            Version::V2_5_1,
            ValidationLevel::Lenient,
            &d,
        )
        .unwrap();
        assert_eq!(node.name(), Some("MSH"));
        let msh1 = node.get("MSH_1").unwrap();
        assert_eq!(msh1[0].value(), Some("|"));
        let msh9 = node.get("MSH_9").unwrap();
        assert_eq!(msh9[0].get("MSG_1").unwrap()[0].value(), Some("ADT"));
    }

    #[test]
    fn parses_repeated_fields() {
        let d = delims();
        let node = parse_segment("NK1|1|Doe^Jane~Doe^Jill", Version::V2_5_1, ValidationLevel::Lenient, &d).unwrap();
        let reps = node.get("NK1_2").unwrap();
        assert_eq!(reps.len(), 2);
    }

    #[test]
    fn drops_trailing_empty_fields() {
        let d = delims();
        let node = parse_segment("EVN|A01|20240101000000||||", Version::V2_5_1, ValidationLevel::Lenient, &d).unwrap();
        assert_eq!(node.get("EVN_2").unwrap()[0].value(), Some("20240101000000"));
        assert!(node.get("EVN_7").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_segment_name() {
        let d = delims();
        assert!(parse_segment("pid|1", Version::V2_5_1, ValidationLevel::Lenient, &d).is_err());
    }
}
