//! Script operations and the push-data classification of opcode bytes.
//!
//! An operation is either a bare opcode (like OP_DUP) or a push that carries
//! the bytes it places on the stack. How many bytes a push carries, and where
//! its length comes from, is decided by a single table: [`PushKind::of`].

use std::borrow::Cow;
use std::fmt;

use crate::opcodes::*;
use crate::{OpcodeNames, ScriptError};

/// How an opcode byte encodes its push payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushKind {
    /// OP_0: pushes the empty byte string, consumes nothing.
    Empty,
    /// OP_DATA_1..=OP_DATA_75: the opcode value is the payload length.
    Direct(u8),
    /// OP_PUSHDATA1/2/4: a little-endian length of `width` bytes follows.
    Prefixed { width: usize },
    /// Any other opcode: no payload.
    Bare,
}

impl PushKind {
    /// Classify an opcode byte.
    pub const fn of(opcode: u8) -> PushKind {
        match opcode {
            OP_0 => PushKind::Empty,
            OP_DATA_1..=OP_DATA_75 => PushKind::Direct(opcode),
            OP_PUSHDATA1 => PushKind::Prefixed { width: 1 },
            OP_PUSHDATA2 => PushKind::Prefixed { width: 2 },
            OP_PUSHDATA4 => PushKind::Prefixed { width: 4 },
            _ => PushKind::Bare,
        }
    }

    /// Whether operations of this kind carry push data.
    pub const fn is_push(&self) -> bool {
        !matches!(self, PushKind::Bare)
    }
}

/// One decoded script operation, borrowing its payload from the script.
///
/// `push_data` is `Some` exactly when the opcode is a push (0..=OP_PUSHDATA4);
/// for OP_0 it is the empty slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation<'a> {
    opcode: u8,
    push_data: Option<&'a [u8]>,
}

impl<'a> Operation<'a> {
    /// A push operation. `None` if `opcode` is not a push opcode.
    pub fn push(opcode: u8, data: &'a [u8]) -> Option<Self> {
        PushKind::of(opcode).is_push().then_some(Operation {
            opcode,
            push_data: Some(data),
        })
    }

    /// A bare opcode. `None` if `opcode` is a push opcode.
    pub fn bare(opcode: u8) -> Option<Self> {
        (!PushKind::of(opcode).is_push()).then_some(Operation {
            opcode,
            push_data: None,
        })
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn push_data(&self) -> Option<&'a [u8]> {
        self.push_data
    }

    pub fn is_push(&self) -> bool {
        self.push_data.is_some()
    }

    pub fn kind(&self) -> PushKind {
        PushKind::of(self.opcode)
    }

    /// The token this operation contributes to a parsed script.
    ///
    /// Push opcodes (OP_0 through OP_PUSHDATA4) yield their bytes and every
    /// other opcode its name. OP_0 yields the single byte `00` rather than an
    /// empty string so it stays visible in human-readable output.
    pub fn to_token(&self, names: &dyn OpcodeNames) -> ScriptToken<'a> {
        const OP_0_BYTES: &[u8] = &[OP_0];
        match (self.opcode, self.push_data) {
            (OP_0, _) => ScriptToken::Data(OP_0_BYTES),
            (_, Some(data)) => ScriptToken::Data(data),
            (op, None) => ScriptToken::Opcode(names.name(op)),
        }
    }
}

/// An element of a parsed script: pushed bytes or an opcode name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptToken<'a> {
    Data(&'a [u8]),
    Opcode(Cow<'static, str>),
}

impl fmt::Display for ScriptToken<'_> {
    /// Data renders as lowercase hex, opcodes by name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptToken::Data(data) => f.write_str(&hex::encode(data)),
            ScriptToken::Opcode(name) => f.write_str(name),
        }
    }
}

/// Compute the minimal push prefix for a payload of the given length.
///
/// The encoding-side mirror of [`PushKind::of`]: a direct push for up to 75
/// bytes, then OP_PUSHDATA1, OP_PUSHDATA2 and OP_PUSHDATA4.
///
/// # Returns
/// The prefix bytes, or `DataTooBig` above `u32::MAX` bytes.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= OP_DATA_75 as usize {
        Ok(vec![data_len as u8])
    } else if let Ok(len) = u8::try_from(data_len) {
        Ok(vec![OP_PUSHDATA1, len])
    } else if let Ok(len) = u16::try_from(data_len) {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&len.to_le_bytes());
        Ok(buf)
    } else if let Ok(len) = u32::try_from(data_len) {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&len.to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig(data_len))
    }
}
