//! Transaction output with a value and a locking script.

use log::trace;
use serde::{Deserialize, Serialize};
use txwire_primitives::util::{WireReader, WireWriter};
use txwire_script::Script;

use crate::error::{Field, Malformed};
use crate::transaction::read_len;

/// A single output of a transaction.
///
/// # Wire format
///
/// | Field          | Size          |
/// |----------------|---------------|
/// | value          | 8 bytes (LE)  |
/// | script length  | VarInt        |
/// | script         | variable      |
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxOutput {
    /// Amount in the smallest unit.
    pub value: u64,
    /// Locking script, kept as opaque bytes.
    pub script: Script,
}

impl TxOutput {
    /// Smallest possible encoding: value plus an empty script.
    pub const MIN_ENCODED_LEN: usize = 8 + 1;

    pub fn new(value: u64, script: Script) -> Self {
        TxOutput { value, script }
    }

    /// Deserialize an output from a `WireReader`.
    pub fn read_from(reader: &mut WireReader<'_>) -> Result<Self, Malformed> {
        let value = reader.read_u64_le().map_err(Malformed::at(Field::Value))?;
        let script_len = read_len(reader, Field::ScriptLength)?;
        let script = reader
            .read_bytes(script_len)
            .map_err(Malformed::at(Field::Script))?;

        trace!("output value {} script {} bytes", value, script_len);
        Ok(TxOutput {
            value,
            script: Script::from_bytes(script),
        })
    }

    /// Serialize this output into a `WireWriter`.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_u64_le(self.value);
        writer.write_var_bytes(self.script.as_bytes());
    }
}
