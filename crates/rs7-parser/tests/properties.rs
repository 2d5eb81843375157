//! Property and scenario tests for spec.md §8: property 1 (parse/print
//! round-trip), property 3 (delimiter override) and scenarios S2/S3.

use proptest::prelude::*;
use rs7_core::delimiters::Delimiters;
use rs7_parser::parse_message;

const ADT_A01: &str = "MSH|^~\\&|SendApp|SendFac|RecApp|RecFac|20240315143000||ADT^A01|12345|P|2.5.1\r\
                        EVN|A01|20240315143000\r\
                        PID|1|12345|67890^^^MRN||DOE^JOHN^A||19800101|M\r\
                        PV1|1|I|ER^101^1";

#[test]
fn s2_canonical_message_round_trips_byte_for_byte() {
    let message = parse_message(ADT_A01).unwrap();
    assert_eq!(message.to_er7(None), ADT_A01);
}

#[test]
fn s3_printing_under_custom_delimiters_then_reparsing_is_stable() {
    let message = parse_message(ADT_A01).unwrap();
    let custom = Delimiters {
        field_separator: '!',
        component_separator: '@',
        subcomponent_separator: '%',
        repetition_separator: '~',
        escape_character: '$',
    };

    let printed = message.to_er7(Some(custom));
    assert!(printed.starts_with("MSH!@~$%!"));

    let reparsed = rs7_parser::parse_message_with(
        &printed,
        rs7_parser::ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(reparsed.to_er7(None), ADT_A01);
}

fn arb_delimiters() -> impl Strategy<Value = Delimiters> {
    let pool = vec!['!', '@', '%', '$', '#', '*', '+', '=', '?', ':', ';', '/'];
    proptest::sample::subsequence(pool, 5).prop_map(|chosen| Delimiters {
        field_separator: chosen[0],
        component_separator: chosen[1],
        repetition_separator: chosen[2],
        escape_character: chosen[3],
        subcomponent_separator: chosen[4],
    })
}

proptest! {
    #[test]
    fn delimiter_override_round_trips_under_any_valid_delimiter_set(delims in arb_delimiters()) {
        let message = parse_message(ADT_A01).unwrap();
        let printed = message.to_er7(Some(delims));
        let reparsed = rs7_parser::parse_message_with(&printed, rs7_parser::ParseOptions::default()).unwrap();
        prop_assert_eq!(reparsed.to_er7(None), ADT_A01);
    }
}
