use proptest::prelude::*;

use txwire_primitives::chainhash::Hash;
use txwire_primitives::util::{VarInt, WireReader, WireWriter};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn varint_encode_decode_roundtrip(value in any::<u64>()) {
        let bytes = VarInt(value).to_bytes();
        prop_assert_eq!(bytes.len(), VarInt(value).length());
        let mut reader = WireReader::new(&bytes);
        prop_assert_eq!(reader.read_varint().unwrap(), VarInt(value));
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn reader_never_panics_on_arbitrary_input(
        data in prop::collection::vec(any::<u8>(), 0..64),
        lens in prop::collection::vec(any::<usize>(), 0..8)
    ) {
        let mut reader = WireReader::new(&data);
        if reader.read_varint().is_err() {
            prop_assert_eq!(reader.position(), 0);
        }
        for n in lens {
            let before = reader.position();
            if reader.read_bytes(n).is_err() {
                prop_assert_eq!(reader.position(), before);
            }
        }
        prop_assert!(reader.position() <= data.len());
    }

    #[test]
    fn var_bytes_roundtrip(data in prop::collection::vec(any::<u8>(), 0..600)) {
        let mut writer = WireWriter::new();
        writer.write_var_bytes(&data);
        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        let len = reader.read_varint().unwrap().value() as usize;
        prop_assert_eq!(reader.read_bytes(len).unwrap(), &data[..]);
    }

    #[test]
    fn hash_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::new(bytes);
        let hash2 = Hash::from_hex(&hash.to_string()).unwrap();
        prop_assert_eq!(hash, hash2);
    }
}
