//! Bulk field extraction for efficient access to multiple fields at once.

use std::collections::HashMap;

use rs7_core::error::Result;
use rs7_core::node::Node;

use crate::Terser;

/// Extracts multiple field values in a single pass over a list of
/// paths, collecting results into a map keyed by the path string.
///
/// ```
/// use rs7_terser::BulkTerser;
/// use rs7_parser::parse_message;
///
/// # fn main() -> rs7_core::Result<()> {
/// let hl7 = "MSH|^~\\&|APP|FAC|||20250115||ADT^A01|123|P|2.5.1\r\
///            PID|1||PAT001||DOE^JOHN^A||19800101|M";
///
/// let message = parse_message(hl7)?;
/// let bulk = BulkTerser::new(&message);
///
/// let values = bulk.get_multiple(&["PID-5-1", "PID-5-2", "PID-7", "PID-8"])?;
/// assert_eq!(values.get("PID-5-1"), Some(&Some("DOE")));
/// assert_eq!(values.get("PID-5-2"), Some(&Some("JOHN")));
/// assert_eq!(values.get("PID-7"), Some(&Some("19800101")));
/// assert_eq!(values.get("PID-8"), Some(&Some("M")));
/// # Ok(())
/// # }
/// ```
pub struct BulkTerser<'a> {
    terser: Terser<'a>,
}

impl<'a> BulkTerser<'a> {
    pub fn new(root: &'a Node) -> Self {
        Self { terser: Terser::new(root) }
    }

    /// Resolve every path in `paths`. An invalid or unmatched path maps
    /// to `None` rather than failing the whole batch - a malformed
    /// single path in a large extraction list shouldn't lose the rest.
    pub fn get_multiple<'p>(&self, paths: &[&'p str]) -> Result<HashMap<&'p str, Option<&'a str>>> {
        let mut out = HashMap::with_capacity(paths.len());
        for &path in paths {
            let value = self.terser.get(path).unwrap_or(None);
            out.insert(path, value);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rs7_parser::parse_message;

    const HL7: &str = "MSH|^~\\&|APP|FAC|||20250115||ADT^A01|123|P|2.5.1\r\
                        PID|1||PAT001||DOE^JOHN^A||19800101|M";

    #[test]
    fn extracts_several_paths_at_once() {
        let message = parse_message(HL7).unwrap();
        let bulk = BulkTerser::new(&message);
        let values = bulk.get_multiple(&["PID-5-1", "PID-5-2", "PID-7", "PID-8"]).unwrap();
        assert_eq!(values.get("PID-5-1"), Some(&Some("DOE")));
        assert_eq!(values.get("PID-5-2"), Some(&Some("JOHN")));
        assert_eq!(values.get("PID-7"), Some(&Some("19800101")));
        assert_eq!(values.get("PID-8"), Some(&Some("M")));
    }

    #[test]
    fn an_invalid_path_resolves_to_none_not_an_error() {
        let message = parse_message(HL7).unwrap();
        let bulk = BulkTerser::new(&message);
        let values = bulk.get_multiple(&["PID", "PID-7"]).unwrap();
        assert_eq!(values.get("PID"), Some(&None));
        assert_eq!(values.get("PID-7"), Some(&Some("19800101")));
    }
}
