/// Unified error type for wire-level reads and identifier parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrimitivesError {
    /// A read needed more bytes than the buffer has left.
    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A CompactSize integer used a wider form than its value requires.
    #[error("non-canonical varint: value {value} encoded in {encoded_len} bytes")]
    NonCanonicalVarInt { value: u64, encoded_len: usize },

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
