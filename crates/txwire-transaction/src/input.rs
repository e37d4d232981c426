//! Transaction input referencing a previous output.

use log::trace;
use serde::{Deserialize, Serialize};
use txwire_primitives::chainhash::{Hash, HASH_SIZE};
use txwire_primitives::util::{WireReader, WireWriter};
use txwire_script::Script;

use crate::error::{Field, Malformed};
use crate::transaction::read_len;

/// Default sequence number indicating a finalized input.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// Reference to one output of a previous transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Id of the previous transaction, internal byte order.
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    /// Output index used by coinbase inputs.
    pub const NULL_INDEX: u32 = u32::MAX;

    pub fn new(hash: Hash, index: u32) -> Self {
        OutPoint { hash, index }
    }

    /// The outpoint a coinbase input refers to: zero hash, maximum index.
    pub fn null() -> Self {
        OutPoint {
            hash: Hash::ZERO,
            index: Self::NULL_INDEX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash.is_zero() && self.index == Self::NULL_INDEX
    }
}

/// A single input of a transaction.
///
/// # Wire format
///
/// | Field          | Size          |
/// |----------------|---------------|
/// | prevout hash   | 32 bytes      |
/// | prevout index  | 4 bytes (LE)  |
/// | script length  | VarInt        |
/// | script         | variable      |
/// | sequence       | 4 bytes (LE)  |
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxInput {
    pub prevout: OutPoint,
    /// Unlocking script, kept as opaque bytes.
    pub script: Script,
    pub sequence: u32,
}

impl TxInput {
    /// Smallest possible encoding: empty script, one-byte length.
    pub const MIN_ENCODED_LEN: usize = HASH_SIZE + 4 + 1 + 4;

    pub fn new(prevout: OutPoint, script: Script, sequence: u32) -> Self {
        TxInput {
            prevout,
            script,
            sequence,
        }
    }

    /// A coinbase input carrying `script` as its free-form data.
    pub fn coinbase(script: Script, sequence: u32) -> Self {
        TxInput::new(OutPoint::null(), script, sequence)
    }

    /// Whether this input spends the null outpoint.
    ///
    /// Decided from the outpoint alone; the input's position in the
    /// transaction plays no part.
    pub fn is_coinbase(&self) -> bool {
        self.prevout.is_null()
    }

    /// Deserialize an input from a `WireReader`.
    ///
    /// # Returns
    /// The input, or `TruncatedField` naming the first field that ran past
    /// the end of the buffer.
    pub fn read_from(reader: &mut WireReader<'_>) -> Result<Self, Malformed> {
        let hash = reader
            .read_array::<HASH_SIZE>()
            .map_err(Malformed::at(Field::PrevoutHash))?;
        let index = reader
            .read_u32_le()
            .map_err(Malformed::at(Field::PrevoutIndex))?;
        let script_len = read_len(reader, Field::ScriptLength)?;
        let script = reader
            .read_bytes(script_len)
            .map_err(Malformed::at(Field::Script))?;
        let sequence = reader
            .read_u32_le()
            .map_err(Malformed::at(Field::Sequence))?;

        trace!("input {}:{} script {} bytes, sequence {:#x}", Hash::new(hash), index, script_len, sequence);
        Ok(TxInput {
            prevout: OutPoint::new(Hash::new(hash), index),
            script: Script::from_bytes(script),
            sequence,
        })
    }

    /// Serialize this input into a `WireWriter`.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_bytes(self.prevout.hash.as_bytes());
        writer.write_u32_le(self.prevout.index);
        writer.write_var_bytes(self.script.as_bytes());
        writer.write_u32_le(self.sequence);
    }
}
