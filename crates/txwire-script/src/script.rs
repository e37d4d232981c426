//! Owned script bytes as carried by transaction inputs and outputs.
//!
//! A `Script` is an opaque byte string; it is never validated on
//! construction. Decoding into operations happens on request through
//! [`Script::reader`].

use std::fmt;

use crate::opcodes::*;
use crate::operation::{push_data_prefix, Operation, PushKind};
use crate::reader::ScriptReader;
use crate::ScriptError;

/// A script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string (e.g. "76a914...88ac").
    ///
    /// # Returns
    /// A `Script` wrapping the decoded bytes, or an error if the hex is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Ok(Script(hex::decode(hex_str)?))
    }

    /// Create a script from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Encode the script as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length of the script in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    /// A fresh lazy reader over the script bytes.
    pub fn reader(&self) -> ScriptReader<'_> {
        ScriptReader::new(&self.0)
    }

    /// Decode every operation in the script.
    ///
    /// # Returns
    /// The operations in order, or `TruncatedScript` if any push runs past
    /// the end of the bytes.
    pub fn operations(&self) -> Result<Vec<Operation<'_>>, ScriptError> {
        self.reader().operations().collect()
    }

    /// Render the script as space-separated hex pushes and opcode names.
    ///
    /// # Returns
    /// The rendered string (empty for an empty script), or an error for a
    /// malformed script.
    pub fn to_asm(&self) -> Result<String, ScriptError> {
        self.reader().human_readable()
    }

    /// Whether the script is a data carrier: `OP_RETURN ...` or
    /// `OP_FALSE OP_RETURN ...`.
    pub fn is_data(&self) -> bool {
        match self.0.as_slice() {
            [OP_RETURN, ..] => true,
            [OP_FALSE, OP_RETURN, ..] => true,
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Append data bytes with the minimal push prefix.
    ///
    /// # Returns
    /// `Ok(())` on success, or `DataTooBig` if the data cannot be described
    /// by OP_PUSHDATA4.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append bare opcodes.
    ///
    /// Push opcodes (OP_DATA_1 through OP_PUSHDATA4) are rejected since they
    /// need a payload; use [`append_push_data`](Self::append_push_data).
    /// OP_0 is accepted as it pushes nothing.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<(), ScriptError> {
        if let Some(&op) = opcodes
            .iter()
            .find(|&&op| matches!(PushKind::of(op), PushKind::Direct(_) | PushKind::Prefixed { .. }))
        {
            return Err(ScriptError::InvalidOpcodeType(opcode_to_string(op).into_owned()));
        }
        self.0.extend_from_slice(opcodes);
        Ok(())
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Script {
    /// Display the script as a lowercase hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    //! Tests for the Script container: hex handling, building and decoding.

    use super::*;

    const P2PKH_HEX: &str = "76a914e2a623699e81b291c0327f408fea765d534baa2a88ac";

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn test_from_hex_roundtrip() {
        let script = Script::from_hex(P2PKH_HEX).expect("valid hex should parse");
        assert_eq!(script.to_hex(), P2PKH_HEX);
        assert_eq!(script.len(), 25);
        assert_eq!(script.to_string(), P2PKH_HEX);
    }

    #[test]
    fn test_from_hex_invalid() {
        assert!(matches!(Script::from_hex("ZZZZ"), Err(ScriptError::InvalidHex(_))));
        assert!(Script::from_hex("abc").is_err());
    }

    #[test]
    fn test_malformed_bytes_are_kept() {
        // Construction never validates; decoding reports the problem.
        let script = Script::from_bytes(&[OP_PUSHDATA1, 0x05, 0x00]);
        assert_eq!(script.len(), 3);
        assert!(matches!(
            script.to_asm(),
            Err(ScriptError::TruncatedScript { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    #[test]
    fn test_to_asm_p2pkh() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(
            script.to_asm().unwrap(),
            "OP_DUP OP_HASH160 e2a623699e81b291c0327f408fea765d534baa2a OP_EQUALVERIFY OP_CHECKSIG"
        );
        assert_eq!(script.operations().unwrap().len(), 5);
    }

    #[test]
    fn test_to_asm_empty() {
        assert_eq!(Script::new().to_asm().unwrap(), "");
    }

    #[test]
    fn test_is_data() {
        assert!(Script::from_hex("6a0a6f6d000000468000002a").unwrap().is_data());
        assert!(Script::from_hex("006a0401020304").unwrap().is_data());
        assert!(!Script::from_hex(P2PKH_HEX).unwrap().is_data());
        assert!(!Script::new().is_data());
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    #[test]
    fn test_build_p2pkh() {
        let mut script = Script::new();
        script.append_opcodes(&[OP_DUP, OP_HASH160]).unwrap();
        script
            .append_push_data(&hex::decode("e2a623699e81b291c0327f408fea765d534baa2a").unwrap())
            .unwrap();
        script.append_opcodes(&[OP_EQUALVERIFY, OP_CHECKSIG]).unwrap();
        assert_eq!(script.to_hex(), P2PKH_HEX);
    }

    #[test]
    fn test_append_push_data_uses_pushdata1() {
        let mut script = Script::new();
        script.append_push_data(&[0x11; 80]).unwrap();
        assert_eq!(&script.as_bytes()[..2], &[OP_PUSHDATA1, 80]);
        let ops = script.operations().unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].push_data().unwrap(), &[0x11; 80][..]);
    }

    #[test]
    fn test_append_opcodes_rejects_pushes() {
        let mut script = Script::new();
        assert!(matches!(
            script.append_opcodes(&[OP_DUP, OP_DATA_20]),
            Err(ScriptError::InvalidOpcodeType(_))
        ));
        assert!(script.append_opcodes(&[OP_PUSHDATA2]).is_err());
        assert!(script.is_empty());
        script.append_opcodes(&[OP_0, OP_RETURN]).unwrap();
        assert!(script.is_data());
    }

    #[test]
    fn test_serde_hex_string() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        let json = serde_json::to_string(&script).unwrap();
        assert_eq!(json, format!("\"{}\"", P2PKH_HEX));
        let back: Script = serde_json::from_str(&json).unwrap();
        assert_eq!(back, script);
    }
}
