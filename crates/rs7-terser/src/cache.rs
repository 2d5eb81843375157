//! Caching layer for [`crate::Terser`] to speed up repeated field access
//! over the same tree: parsed paths are memoized, so a hot loop over
//! the same small set of paths only pays `TerserPath::parse` once each.

use std::collections::HashMap;

use rs7_core::error::Result;
use rs7_core::node::Node;

use crate::path::TerserPath;

/// A terser that memoizes parsed paths (not resolved values - the tree
/// itself doesn't change shape between calls in the expected usage, but
/// values still have to be re-read so a mutated tree is always
/// reflected correctly).
pub struct CachedTerser<'a> {
    root: &'a Node,
    cache: HashMap<String, TerserPath>,
}

impl<'a> CachedTerser<'a> {
    pub fn new(root: &'a Node) -> Self {
        Self { root, cache: HashMap::new() }
    }

    pub fn with_capacity(root: &'a Node, capacity: usize) -> Self {
        Self { root, cache: HashMap::with_capacity(capacity) }
    }

    pub fn get(&mut self, path: &str) -> Result<Option<&'a str>> {
        if !self.cache.contains_key(path) {
            let parsed = TerserPath::parse(path)?;
            self.cache.insert(path.to_string(), parsed);
        }
        let parsed = self.cache.get(path).expect("just inserted");

        let segments = crate::find_segments(self.root, &parsed.segment_id);
        let Some(segment) = segments.get(parsed.segment_index) else {
            return Ok(None);
        };
        let field_name = format!("{}_{}", parsed.segment_id, parsed.field_index);
        let reps = segment.get(&field_name)?;
        let Some(field) = reps.get(parsed.repetition_index) else {
            return Ok(None);
        };
        Ok(crate::field_value(field, parsed.component_index, parsed.subcomponent_index))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Pre-parse a batch of paths that will be read repeatedly.
    pub fn warm_cache(&mut self, paths: &[&str]) -> Result<()> {
        for path in paths {
            let _ = self.get(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rs7_parser::parse_message;

    const HL7: &str = "MSH|^~\\&|SendApp|SendFac|RecApp|RecFac|20240315||ADT^A01|12345|P|2.5.1\r\
                        PID|1||MRN123||DOE^JOHN||19800101|M";

    #[test]
    fn matches_plain_terser_and_caches_the_path() {
        let msg = parse_message(HL7).unwrap();
        let expected = crate::Terser::new(&msg).get("PID-5-1").unwrap();

        let mut terser = CachedTerser::new(&msg);
        assert_eq!(terser.get("PID-5-1").unwrap(), expected);
        assert_eq!(terser.cache_size(), 1);
        assert_eq!(terser.get("PID-5-1").unwrap(), expected);
        assert_eq!(terser.cache_size(), 1);
    }

    #[test]
    fn warm_cache_populates_every_path() {
        let msg = parse_message(HL7).unwrap();
        let mut terser = CachedTerser::new(&msg);
        terser.warm_cache(&["PID-5", "PID-5-1", "PID-7", "PID-8"]).unwrap();
        assert_eq!(terser.cache_size(), 4);
    }
}
