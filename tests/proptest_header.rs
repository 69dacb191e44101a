//! Property tests for the header codec round trip.

use pohead::catalog::reader::MessageReader;
use pohead::catalog::writer::render;
use pohead::catalog::CatalogEntry;
use pohead::header::codec::{decode, encode, fresh_header};
use pohead::header::fields::HeaderFields;
use proptest::prelude::*;

/// Keys as decode leaves them: no colon, no newline, no surrounding whitespace.
fn key_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_.-]{0,20}"
}

/// Values as decode leaves them: no newline, no surrounding whitespace.
fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[^\\s]([^\n\r]{0,30}[^\\s])?",
    ]
}

fn pairs_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((key_strategy(), value_strategy()), 0..12).prop_map(|pairs| {
        // unique keys, first occurrence wins
        let mut seen = std::collections::HashSet::new();
        pairs.into_iter().filter(|(k, _)| seen.insert(k.clone())).collect()
    })
}

proptest! {
    #[test]
    fn decode_inverts_encode(pairs in pairs_strategy()) {
        let fields: HeaderFields = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let (decoded, diagnostics) = decode(&encode(&fields));

        prop_assert!(diagnostics.is_empty());
        let got: Vec<(String, String)> =
            decoded.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        prop_assert_eq!(got, pairs);
    }

    #[test]
    fn encode_is_idempotent_on_well_formed_text(pairs in pairs_strategy(), pad in "[ \t]{0,3}") {
        let text: String = pairs
            .iter()
            .map(|(k, v)| format!("{pad}{k}{pad}:{pad}{v}{pad}\n"))
            .collect();
        let once = encode(&decode(&text).0);
        let twice = encode(&decode(&once).0);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.lines().count(), pairs.len());
    }

    #[test]
    fn decode_never_panics(payload in "(?s).{0,200}") {
        let (fields, diagnostics) = decode(&payload);
        let lines = payload.strip_suffix('\n').unwrap_or(&payload);
        if !payload.is_empty() {
            prop_assert!(fields.len() + diagnostics.len() >= 1);
            prop_assert!(diagnostics.len() <= lines.split('\n').count());
        }
    }

    #[test]
    fn header_survives_catalog_serialization(pairs in pairs_strategy()) {
        let fields: HeaderFields = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let header = fresh_header(&fields);
        let text = render(&header);

        let read_back = MessageReader::new(&text).next().unwrap().unwrap();
        prop_assert_eq!(read_back.text(), header.text());
        prop_assert_eq!(decode(read_back.text()).0, fields);
    }
}
