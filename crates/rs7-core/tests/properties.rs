//! Property tests for spec.md §8's universal property 2 (escape
//! round-trip): for every value and every valid delimiter set,
//! `decode(encode(v)) == v`.

use proptest::prelude::*;
use rs7_core::delimiters::Delimiters;
use rs7_core::encoding::Encoding;

fn arb_delimiters() -> impl Strategy<Value = Delimiters> {
    let pool = vec!['|', '^', '~', '&', '\\', '!', '@', '%', '$', '#', '*', '+'];
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
    fn escape_round_trip(s in "[ -~]{0,60}", delims in arb_delimiters()) {
        let encoded = Encoding::encode(&s, &delims);
        let decoded = Encoding::decode(&encoded, &delims).unwrap();
        prop_assert_eq!(decoded, s);
    }

    #[test]
    fn encoding_never_produces_a_bare_delimiter_or_carriage_return(s in "[ -~\r]{0,60}", delims in arb_delimiters()) {
        let encoded = Encoding::encode(&s, &delims);
        for ch in encoded.chars() {
            if delims.is_delimiter(ch) || ch == '\r' {
                prop_assert!(false, "encoded output leaked a raw delimiter/CR: {encoded:?}");
            }
        }
    }
}
