//! ER7 parser (spec.md §4.D): wire text -> Element Tree.
//!
//! `rs7-core::parse` already implements steps 1-3 of the algorithm
//! (delimiter extraction, segment/field/component/subcomponent
//! decomposition, MSH's field-1/field-2 special case) one segment at a
//! time; this crate owns the message-level control flow around it -
//! segment splitting, version/message-structure inference from MSH, and
//! step 4, schema-directed grouping.

mod grouping;

use std::str::FromStr;

use rs7_core::delimiters::Delimiters;
use rs7_core::error::{Error, Result};
use rs7_core::node::{Node, NodeKind};
use rs7_core::validation::ValidationLevel;
pub use rs7_core::{parse_component, parse_field, parse_segment};
use rs7_schema::Version;
use tracing::trace;

use grouping::group_into;

/// Parser configuration (spec.md §6): `version`, `validation_level`,
/// `find_groups`. Default matches spec.md's documented default: LENIENT,
/// grouping on, version inferred from MSH-12.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub version: Option<Version>,
    pub validation_level: ValidationLevel,
    pub find_groups: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            version: None,
            validation_level: ValidationLevel::Lenient,
            find_groups: true,
        }
    }
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self { validation_level: ValidationLevel::Strict, ..Self::default() }
    }

    pub fn lenient() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_validation_level(mut self, level: ValidationLevel) -> Self {
        self.validation_level = level;
        self
    }

    pub fn with_find_groups(mut self, find_groups: bool) -> Self {
        self.find_groups = find_groups;
        self
    }
}

/// Parse a complete ER7 message under the default options (LENIENT,
/// grouping on, version inferred from MSH-12).
pub fn parse_message(text: &str) -> Result<Node> {
    parse_message_with(text, ParseOptions::default())
}

/// Parse a complete ER7 message (spec.md §4.D `parse_message`).
///
/// Builds a fresh tree and only returns it on full success - no partial
/// mutation of a caller-supplied tree is possible, since there is none
/// (spec.md §7's "parsers never partially mutate").
pub fn parse_message_with(text: &str, opts: ParseOptions) -> Result<Node> {
    let normalized = normalize_terminators(text.trim());
    let seg_texts: Vec<&str> = normalized.split('\r').filter(|s| !s.is_empty()).collect();
    if seg_texts.is_empty() {
        return Err(Error::InvalidEncodingChars("message has no segments".to_string()));
    }
    if !seg_texts[0].starts_with("MSH") {
        return Err(Error::InvalidEncodingChars("message must start with an MSH segment".to_string()));
    }

    let delimiters = extract_delimiters(seg_texts[0])?;

    // Probe MSH under a placeholder version to read MSH-9/MSH-12 before the
    // real version is known (spec.md §6: "default: inferred from MSH").
    let probe = rs7_core::parse_segment(seg_texts[0], Version::common(), ValidationLevel::Lenient, &delimiters)?;
    let version = match opts.version {
        Some(v) => v,
        None => infer_version(&probe).unwrap_or_else(Version::common),
    };

    let mut segments = Vec::with_capacity(seg_texts.len());
    for seg_text in &seg_texts {
        segments.push(rs7_core::parse_segment(seg_text, version, opts.validation_level, &delimiters)?);
    }

    let msg_name = message_structure_name(&segments[0]).unwrap_or_else(|| "UNKNOWN".to_string());
    trace!(%msg_name, %version, find_groups = opts.find_groups, "resolved message structure");

    let mut message = Node::construct(NodeKind::Message, &msg_name, version, opts.validation_level)?;

    if opts.find_groups {
        group_into(&mut message, segments)?;
    } else {
        for seg in segments {
            message.add(seg)?;
        }
    }

    Ok(message)
}

fn normalize_terminators(text: &str) -> String {
    text.replace("\r\n", "\r").replace('\n', "\r")
}

/// Read the field separator and four encoding characters straight off the
/// MSH line (spec.md §4.D step 1).
fn extract_delimiters(msh_text: &str) -> Result<Delimiters> {
    if msh_text.len() < 8 {
        return Err(Error::InvalidEncodingChars(msh_text.to_string()));
    }
    let field_sep = msh_text
        .chars()
        .nth(3)
        .ok_or_else(|| Error::InvalidEncodingChars(msh_text.to_string()))?;
    let encoding_chars: String = msh_text.chars().skip(4).take(4).collect();
    Delimiters::from_encoding_characters(field_sep, &encoding_chars)
}

fn infer_version(msh: &Node) -> Option<Version> {
    let field = msh.get("MSH_12").ok()?.into_iter().next()?;
    Version::from_str(field.value()?).ok()
}

/// MSH-9 (the `MSG` composite) names the message structure directly in
/// its third component when present, else as `{code}_{trigger}` (spec.md
/// §4.B naming conventions, applied at the message level).
fn message_structure_name(msh: &Node) -> Option<String> {
    let msh9 = msh.get("MSH_9").ok()?.into_iter().next()?;
    if let Some(structure) = msh9.get("MSG_3").ok().and_then(|v| v.into_iter().next()) {
        if let Some(v) = structure.value() {
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }
    let code = msh9.get("MSG_1").ok().and_then(|v| v.into_iter().next()).and_then(Node::value)?;
    let trigger = msh9.get("MSG_2").ok().and_then(|v| v.into_iter().next()).and_then(Node::value)?;
    Some(format!("{code}_{trigger}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADT: &str = "MSH|^~\\&|SendApp|SendFac|RecApp|RecFac|20240315143000||ADT^A01|12345|P|2.5.1\r\
                        EVN|A01|20240315143000\r\
                        PID|1|12345|67890^^^MRN||DOE^JOHN^A||19800101|M\r\
                        PV1|1|I|ER^101^1";

    const ORU: &str = "MSH|^~\\&|LAB|Hospital|RecApp|RecFac|20240315143000||ORU^R01|MSG001|P|2.5.1\r\
                        PID|1|12345|67890^^^MRN||DOE^JOHN^A\r\
                        OBR|1|ORD123|LAB456|CBC^Complete Blood Count^LN\r\
                        OBX|1|NM|WBC^White Blood Count^LN||7.5\r\
                        OBX|2|NM|RBC^Red Blood Count^LN||4.8\r\
                        OBR|2|ORD124|LAB457|BMP^Basic Metabolic Panel^LN\r\
                        OBX|1|NM|GLU^Glucose^LN||98";

    #[test]
    fn parses_delimiters_from_msh() {
        let msg = parse_message(ADT).unwrap();
        assert_eq!(msg.name(), Some("ADT_A01"));
    }

    #[test]
    fn flat_message_direct_children() {
        let msg = parse_message(ADT).unwrap();
        let names: Vec<_> = msg.children().iter().map(|c| c.kind()).collect();
        assert!(names.iter().all(|k| *k == NodeKind::Segment));
        assert_eq!(msg.children().len(), 4);
    }

    #[test]
    fn groups_nested_repeating_structure() {
        let msg = parse_message(ORU).unwrap();
        assert_eq!(msg.name(), Some("ORU_R01"));
        let results = msg.get("ORU_R01_PATIENT_RESULT").unwrap();
        assert_eq!(results.len(), 1);
        let orders = results[0].get("ORU_R01_ORDER_OBSERVATION").unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].get("OBX").unwrap().len(), 2);
        assert_eq!(orders[1].get("OBX").unwrap().len(), 1);
    }

    #[test]
    fn find_groups_false_keeps_flat_segment_order() {
        let opts = ParseOptions::default().with_find_groups(false);
        let msg = parse_message_with(ORU, opts).unwrap();
        let seg_names: Vec<_> = msg.children().iter().map(|c| c.name().unwrap_or("")).collect();
        assert_eq!(seg_names, vec!["MSH", "PID", "OBR", "OBX", "OBX", "OBR", "OBX"]);
    }

    #[test]
    fn grouping_idempotence_flattens_to_same_segment_sequence() {
        let grouped = parse_message(ORU).unwrap();
        let flat = parse_message_with(ORU, ParseOptions::default().with_find_groups(false)).unwrap();

        fn flatten_segments<'a>(n: &'a Node, out: &mut Vec<&'a str>) {
            match n.kind() {
                NodeKind::Segment => out.push(n.name().unwrap_or("")),
                _ => {
                    for c in n.children() {
                        flatten_segments(c, out);
                    }
                }
            }
        }

        let mut grouped_names = Vec::new();
        flatten_segments(&grouped, &mut grouped_names);
        let mut flat_names = Vec::new();
        flatten_segments(&flat, &mut flat_names);
        assert_eq!(grouped_names, flat_names);
    }

    #[test]
    fn rejects_message_not_starting_with_msh() {
        assert!(parse_message("PID|1|12345").is_err());
    }

    #[test]
    fn version_inferred_from_msh_12() {
        let msg = parse_message(ADT).unwrap();
        assert_eq!(msg.version(), Version::V2_5_1);
    }

    #[test]
    fn explicit_version_overrides_inference() {
        let opts = ParseOptions::default().with_version(Version::V2_4);
        let msg = parse_message_with(ADT, opts).unwrap();
        assert_eq!(msg.version(), Version::V2_4);
    }

    #[test]
    fn strict_rejects_unmatched_segment() {
        let bad = "MSH|^~\\&|A|B|C|D|20240315||ADT^A01|1|P|2.5.1\r\
                   ZZZ|unexpected";
        let err = parse_message_with(bad, ParseOptions::strict()).unwrap_err();
        assert!(matches!(err, Error::InvalidName(_) | Error::ChildNotValid { .. }));
    }
}
