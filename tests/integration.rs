//! End-to-end tests across the public facade: parse, validate, and
//! read fields back out through the Terser API in one pass.

use proptest::prelude::*;
use rs7::core::ValidationLevel;
use rs7::parser::{parse_message, parse_message_with, ParseOptions};
use rs7::terser::Terser;
use rs7::validator::validate;

const ADT_A01: &str = "MSH|^~\\&|SendApp|SendFac|RecApp|RecFac|20240315143000||ADT^A01|12345|P|2.5.1\r\
                        EVN|A01|20240315143000\r\
                        PID|1|12345|67890^^^MRN||DOE^JOHN^A||19800101|M\r\
                        PV1|1|I|ER^101^1";

#[test]
fn parses_validates_and_reads_fields_through_the_public_facade() {
    let message = parse_message(ADT_A01).unwrap();

    let result = validate(&message);
    assert!(result.is_valid, "{:?}", result.errors);

    let terser = Terser::new(&message);
    assert_eq!(terser.get("PID-5-1").unwrap(), Some("DOE"));
    assert_eq!(terser.get("PID-5-2").unwrap(), Some("JOHN"));
    assert_eq!(terser.get("PV1-2").unwrap(), Some("I"));
}

#[test]
fn a_strict_tree_with_an_unknown_segment_is_rejected_at_construction() {
    let bad = "MSH|^~\\&|A|B|C|D|20240315||ADT^A01|1|P|2.5.1\r\
               ZZZ|unexpected";
    let opts = ParseOptions::strict();
    assert!(parse_message_with(bad, opts).is_err());
}

#[test]
fn a_lenient_tree_with_an_unknown_segment_parses_but_fails_validation() {
    let bad = "MSH|^~\\&|A|B|C|D|20240315||ADT^A01|1|P|2.5.1\r\
               ZZZ|unexpected";
    let opts = ParseOptions::default().with_validation_level(ValidationLevel::Lenient);
    let message = parse_message_with(bad, opts).unwrap();
    let result = validate(&message);
    assert!(!result.is_valid);
}

proptest! {
    #[test]
    fn reading_a_field_that_was_never_assigned_is_always_none(field_name in "[A-Z]{2,3}-[0-9]{1,2}") {
        let message = parse_message(ADT_A01).unwrap();
        let terser = Terser::new(&message);
        // An unparseable/unmatched path resolves to an error or None, never panics.
        let _ = terser.get(&field_name);
    }
}
