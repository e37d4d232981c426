use std::fmt;

/// The piece of an operation a truncated read was trying to consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPart {
    /// The opcode byte itself.
    Opcode,
    /// The 1, 2 or 4 byte length that follows OP_PUSHDATA1/2/4.
    LengthPrefix,
    /// The pushed bytes.
    Payload,
}

impl fmt::Display for ScriptPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScriptPart::Opcode => "opcode",
            ScriptPart::LengthPrefix => "length prefix",
            ScriptPart::Payload => "push payload",
        })
    }
}

/// Error types for script operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    /// A decode step would read past the end of the script. The whole
    /// script is invalid.
    #[error("truncated script: {part} at offset {offset} needs {needed} bytes, {remaining} remaining")]
    TruncatedScript {
        part: ScriptPart,
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// The reader's cursor is beyond the buffer end. Unreachable through the
    /// public API; reported instead of computing a negative remainder.
    #[error("script cursor {position} is past the end of a {end}-byte script")]
    CursorOverrun { position: usize, end: usize },

    /// Push data exceeds what OP_PUSHDATA4 can describe.
    #[error("data too big: {0} bytes")]
    DataTooBig(usize),

    /// Attempted to append a push opcode without its data.
    #[error("use append_push_data for push data opcodes: {0}")]
    InvalidOpcodeType(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for ScriptError {
    fn from(err: hex::FromHexError) -> Self {
        ScriptError::InvalidHex(err.to_string())
    }
}
