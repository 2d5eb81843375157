//! Field iteration across repeating segments.

use rs7_core::node::Node;

/// Iterates one field's value across every occurrence of a segment
/// name in document order.
///
/// ```
/// use rs7_terser::Terser;
/// use rs7_parser::parse_message;
///
/// # fn main() -> rs7_core::Result<()> {
/// let hl7 = "MSH|^~\\&|APP|FAC|||20250115||ORU^R01|123|P|2.5.1\r\
///            OBX|1|NM|GLU||98|mg/dL\r\
///            OBX|2|NM|NA||140|mmol/L\r\
///            OBX|3|NM|K||4.2|mmol/L";
///
/// let message = parse_message(hl7)?;
/// let terser = Terser::new(&message);
///
/// let values: Vec<&str> = terser.iter_field("OBX", 5).collect();
/// assert_eq!(values, vec!["98", "140", "4.2"]);
/// # Ok(())
/// # }
/// ```
pub struct FieldIterator<'a> {
    segments: std::vec::IntoIter<&'a Node>,
    field_index: usize,
}

impl<'a> FieldIterator<'a> {
    pub(crate) fn new(root: &'a Node, segment_id: &str, field_index: usize) -> Self {
        Self {
            segments: crate::find_segments(root, segment_id).into_iter(),
            field_index,
        }
    }
}

impl<'a> Iterator for FieldIterator<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        for segment in self.segments.by_ref() {
            let field_name = format!("{}_{}", segment.name()?, self.field_index);
            if let Ok(reps) = segment.get(&field_name) {
                if let Some(field) = reps.first() {
                    if let Some(value) = crate::field_value(field, None, None) {
                        return Some(value);
                    }
                }
            }
        }
        None
    }
}
