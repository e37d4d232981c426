use proptest::prelude::*;

use txwire_script::{Script, ScriptError, ScriptReader};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut reader = ScriptReader::new(&data);
        let results: Vec<_> = reader.operations().collect();
        // Either everything decodes or the last item is the only error.
        if let Some((last, prefix)) = results.split_last() {
            prop_assert!(prefix.iter().all(|r| r.is_ok()));
            match last {
                Ok(_) => prop_assert_eq!(reader.position(), data.len()),
                Err(err) => {
                    let is_truncated = matches!(err, ScriptError::TruncatedScript { .. });
                    prop_assert!(is_truncated);
                }
            }
        }
        prop_assert!(reader.position() <= data.len());
    }

    #[test]
    fn second_pass_matches_first(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut reader = ScriptReader::new(&data);
        let first: Vec<_> = reader.operations().collect();
        let position = reader.position();
        let cached = reader.cached().len();

        let second: Vec<_> = reader.operations().collect();
        prop_assert_eq!(first, second);
        prop_assert_eq!(reader.position(), position);
        prop_assert_eq!(reader.cached().len(), cached);
    }

    #[test]
    fn built_pushes_decode_back(pushes in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 0..8)) {
        let mut script = Script::new();
        for push in &pushes {
            script.append_push_data(push).unwrap();
        }
        let ops = script.operations().unwrap();
        prop_assert_eq!(ops.len(), pushes.len());
        for (op, push) in ops.iter().zip(&pushes) {
            prop_assert_eq!(op.push_data(), Some(&push[..]));
        }
    }

    #[test]
    fn script_hex_roundtrip(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let script = Script::from_bytes(&data);
        let script2 = Script::from_hex(&script.to_hex()).unwrap();
        prop_assert_eq!(script.as_bytes(), script2.as_bytes());
    }
}
