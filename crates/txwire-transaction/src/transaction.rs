//! Core transaction type.
//!
//! A transaction is an immutable value: version word, inputs, outputs, lock
//! time and, for special types, an extra payload. Field validity is checked
//! when a transaction is constructed or decoded, so encoding never fails.
//! "Setting" a field returns a new transaction.

use std::fmt;
use std::sync::Arc;

use log::{debug, trace, warn};
use txwire_primitives::chainhash::Hash;
use txwire_primitives::util::{WireReader, WireWriter};
use txwire_primitives::PrimitivesError;

use crate::config::DecodeConfig;
use crate::error::{Collection, Field, Malformed};
use crate::input::TxInput;
use crate::output::TxOutput;
use crate::version::{default_scheme, SpecialTxScheme, VersionFields, VersionScheme};
use crate::TransactionError;

/// Version given to transactions built without one.
pub const DEFAULT_VERSION: u32 = 1;

/// A transaction with an optional type-dependent extra payload.
///
/// # Wire format
///
/// | Field          | Size                                  |
/// |----------------|---------------------------------------|
/// | version        | 4 bytes (LE)                          |
/// | input count    | VarInt                                |
/// | inputs         | variable (per input)                  |
/// | output count   | VarInt                                |
/// | outputs        | variable (per output)                 |
/// | lock_time      | 4 bytes (LE)                          |
/// | payload length | VarInt, special types only            |
/// | extra payload  | variable, special types only          |
///
/// Equality compares every field; the version scheme is not part of it.
#[derive(Clone, Debug)]
pub struct Transaction {
    raw_version: u32,
    fields: VersionFields,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    lock_time: u32,
    extra_payload: Option<Vec<u8>>,
    scheme: Arc<dyn VersionScheme>,
}

impl Transaction {
    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    /// Build a transaction, interpreting `version` with the default scheme.
    ///
    /// # Arguments
    /// * `version` - Raw version word; must fit in 32 bits.
    /// * `lock_time` - Must fit in 32 bits.
    /// * `extra_payload` - Required exactly when the version word marks a
    ///   special type.
    ///
    /// Under the default scheme any word whose low 16 bits are 3 or more and
    /// whose high 16 bits are non-zero is special. That includes `u32::MAX`
    /// (version 0xffff, type 0xffff), which therefore needs a payload; use
    /// [`with_scheme`](Self::with_scheme) and [`PlainVersionScheme`] to
    /// build a maximum version without one.
    ///
    /// # Returns
    /// The transaction, or `FieldOutOfRange`, `MissingExtraPayload` or
    /// `UnexpectedExtraPayload`.
    ///
    /// [`PlainVersionScheme`]: crate::PlainVersionScheme
    pub fn new(
        version: u64,
        inputs: Vec<TxInput>,
        outputs: Vec<TxOutput>,
        lock_time: u64,
        extra_payload: Option<Vec<u8>>,
    ) -> Result<Self, TransactionError> {
        Self::with_scheme(default_scheme(), version, inputs, outputs, lock_time, extra_payload)
    }

    /// Like [`new`](Self::new) with an explicit version scheme.
    pub fn with_scheme(
        scheme: Arc<dyn VersionScheme>,
        version: u64,
        inputs: Vec<TxInput>,
        outputs: Vec<TxOutput>,
        lock_time: u64,
        extra_payload: Option<Vec<u8>>,
    ) -> Result<Self, TransactionError> {
        let raw_version = u32::try_from(version).map_err(|_| Malformed::FieldOutOfRange {
            field: Field::Version,
            value: version,
        })?;
        let lock_time = u32::try_from(lock_time).map_err(|_| Malformed::FieldOutOfRange {
            field: Field::LockTime,
            value: lock_time,
        })?;

        let fields = scheme.split(raw_version);
        match (fields.is_special(), &extra_payload) {
            (true, None) => {
                return Err(Malformed::MissingExtraPayload {
                    tx_type: fields.tx_type,
                }
                .into())
            }
            (false, Some(_)) => return Err(Malformed::UnexpectedExtraPayload.into()),
            _ => {}
        }

        Ok(Transaction {
            raw_version,
            fields,
            inputs,
            outputs,
            lock_time,
            extra_payload,
            scheme,
        })
    }

    /// Copy with a different version word.
    ///
    /// The extra payload is kept; changing between special and standard
    /// types therefore needs [`with_extra_payload`](Self::with_extra_payload)
    /// or a fresh construction.
    pub fn with_version(&self, version: u64) -> Result<Self, TransactionError> {
        Self::with_scheme(
            Arc::clone(&self.scheme),
            version,
            self.inputs.clone(),
            self.outputs.clone(),
            u64::from(self.lock_time),
            self.extra_payload.clone(),
        )
    }

    /// Copy with a different lock time.
    pub fn with_lock_time(&self, lock_time: u64) -> Result<Self, TransactionError> {
        Self::with_scheme(
            Arc::clone(&self.scheme),
            u64::from(self.raw_version),
            self.inputs.clone(),
            self.outputs.clone(),
            lock_time,
            self.extra_payload.clone(),
        )
    }

    /// Copy with a different extra payload.
    pub fn with_extra_payload(&self, extra_payload: Option<Vec<u8>>) -> Result<Self, TransactionError> {
        Self::with_scheme(
            Arc::clone(&self.scheme),
            u64::from(self.raw_version),
            self.inputs.clone(),
            self.outputs.clone(),
            u64::from(self.lock_time),
            extra_payload,
        )
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from a hex-encoded string.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)?;
        Self::decode(&bytes)
    }

    /// Decode exactly one transaction with the default scheme and a strict
    /// trailing-bytes policy.
    ///
    /// # Returns
    /// The transaction, or a `Malformed` error naming the field that could
    /// not be read.
    pub fn decode(bytes: &[u8]) -> Result<Self, TransactionError> {
        Self::decode_with(bytes, default_scheme(), DecodeConfig::default())
    }

    /// Decode with an explicit version scheme and decoder options.
    pub fn decode_with(
        bytes: &[u8],
        scheme: Arc<dyn VersionScheme>,
        config: DecodeConfig,
    ) -> Result<Self, TransactionError> {
        let mut reader = WireReader::new(bytes);
        let tx = Self::read_from(&mut reader, scheme)?;
        let trailing = reader.remaining();
        if trailing != 0 {
            if !config.allow_trailing_bytes {
                return Err(Malformed::TrailingBytes(trailing).into());
            }
            warn!("ignoring {} trailing bytes after transaction", trailing);
        }
        Ok(tx)
    }

    /// Deserialize one transaction from a `WireReader`, leaving the reader
    /// positioned after it.
    ///
    /// Reads, in order: version, input count and inputs, output count and
    /// outputs, lock time, and for special types the extra payload length
    /// and bytes. On error the reader is left where it was.
    pub fn read_from(
        reader: &mut WireReader<'_>,
        scheme: Arc<dyn VersionScheme>,
    ) -> Result<Self, TransactionError> {
        let mut cursor = reader.clone();
        let tx = Self::read_fields(&mut cursor, scheme)?;
        *reader = cursor;
        Ok(tx)
    }

    fn read_fields(
        reader: &mut WireReader<'_>,
        scheme: Arc<dyn VersionScheme>,
    ) -> Result<Self, TransactionError> {
        let start = reader.position();

        let raw_version = reader
            .read_u32_le()
            .map_err(Malformed::at(Field::Version))?;
        let fields = scheme.split(raw_version);
        trace!(
            "version word {:#010x}: version {}, type {}",
            raw_version,
            fields.version,
            fields.tx_type
        );

        let input_count = read_count(reader, Field::InputCount, TxInput::MIN_ENCODED_LEN)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TxInput::read_from(reader)?);
        }

        let output_count = read_count(reader, Field::OutputCount, TxOutput::MIN_ENCODED_LEN)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TxOutput::read_from(reader)?);
        }

        let lock_time = reader
            .read_u32_le()
            .map_err(Malformed::at(Field::LockTime))?;

        let extra_payload = if fields.is_special() {
            let len = read_len(reader, Field::ExtraPayloadLength)?;
            let payload = reader
                .read_bytes(len)
                .map_err(Malformed::at(Field::ExtraPayload))?;
            trace!("extra payload {} bytes", len);
            Some(payload.to_vec())
        } else {
            None
        };

        debug!(
            "decoded transaction: {} bytes, {} inputs, {} outputs, type {}",
            reader.position() - start,
            inputs.len(),
            outputs.len(),
            fields.tx_type
        );

        Ok(Transaction {
            raw_version,
            fields,
            inputs,
            outputs,
            lock_time,
            extra_payload,
            scheme,
        })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Serialize into a `WireWriter`, field for field in decode order.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_u32_le(self.raw_version);

        writer.write_varint(self.inputs.len().into());
        for input in &self.inputs {
            input.write_to(writer);
        }

        writer.write_varint(self.outputs.len().into());
        for output in &self.outputs {
            output.write_to(writer);
        }

        writer.write_u32_le(self.lock_time);
        if let Some(payload) = &self.extra_payload {
            writer.write_var_bytes(payload);
        }
    }

    /// Serialize to raw bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(256);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Serialize to a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.encode())
    }

    // -----------------------------------------------------------------
    // Identifier
    // -----------------------------------------------------------------

    /// Double SHA-256 of the serialized bytes.
    ///
    /// Displays byte-reversed, the conventional txid form.
    pub fn tx_id(&self) -> Hash {
        Hash::sha256d(&self.encode())
    }

    /// Apply a caller-provided digest to the serialized bytes.
    pub fn id_with<D>(&self, digest: impl FnOnce(&[u8]) -> D) -> D {
        digest(&self.encode())
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// The version part of the version word.
    pub fn version(&self) -> u32 {
        self.fields.version
    }

    /// The type part of the version word, 0 for standard transactions.
    pub fn tx_type(&self) -> u16 {
        self.fields.tx_type
    }

    /// The version word as it appears on the wire.
    pub fn raw_version(&self) -> u32 {
        self.raw_version
    }

    pub fn is_special(&self) -> bool {
        self.fields.is_special()
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    /// The input at `index`, or `IndexOutOfRange`.
    pub fn input(&self, index: usize) -> Result<&TxInput, TransactionError> {
        self.inputs.get(index).ok_or_else(|| {
            Malformed::IndexOutOfRange {
                kind: Collection::Input,
                index,
                len: self.inputs.len(),
            }
            .into()
        })
    }

    /// The output at `index`, or `IndexOutOfRange`.
    pub fn output(&self, index: usize) -> Result<&TxOutput, TransactionError> {
        self.outputs.get(index).ok_or_else(|| {
            Malformed::IndexOutOfRange {
                kind: Collection::Output,
                index,
                len: self.outputs.len(),
            }
            .into()
        })
    }

    pub fn lock_time(&self) -> u32 {
        self.lock_time
    }

    /// Present exactly when the transaction is special.
    pub fn extra_payload(&self) -> Option<&[u8]> {
        self.extra_payload.as_deref()
    }

    /// A coinbase transaction has exactly one input, and that input spends
    /// the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        matches!(self.inputs.as_slice(), [input] if input.is_coinbase())
    }

    /// Sum of output values, `None` on overflow.
    pub fn value_out(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |total, output| total.checked_add(output.value))
    }

    /// Length of the serialized transaction in bytes.
    pub fn size(&self) -> usize {
        self.encode().len()
    }
}

impl Default for Transaction {
    /// Version 1, no inputs or outputs, lock time 0.
    fn default() -> Self {
        Transaction {
            raw_version: DEFAULT_VERSION,
            fields: SpecialTxScheme.split(DEFAULT_VERSION),
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
            extra_payload: None,
            scheme: default_scheme(),
        }
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.raw_version == other.raw_version
            && self.fields == other.fields
            && self.lock_time == other.lock_time
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.extra_payload == other.extra_payload
    }
}

impl Eq for Transaction {}

impl fmt::Display for Transaction {
    /// Display the transaction as its hex-encoded serialization.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// -----------------------------------------------------------------
// Size prefixes
// -----------------------------------------------------------------

/// Read a CompactSize byte length for `field`.
///
/// A length that does not fit `usize` cannot fit the buffer either and is
/// reported as truncation.
pub(crate) fn read_len(reader: &mut WireReader<'_>, field: Field) -> Result<usize, Malformed> {
    let len = reader.read_varint().map_err(Malformed::at(field))?.value();
    usize::try_from(len).map_err(|_| Malformed::TruncatedField {
        field,
        source: PrimitivesError::UnexpectedEof {
            needed: usize::MAX,
            remaining: reader.remaining(),
        },
    })
}

/// Read an element count whose records each take at least `min_record`
/// bytes, rejecting counts the remaining bytes cannot hold before anything
/// is allocated.
fn read_count(reader: &mut WireReader<'_>, field: Field, min_record: usize) -> Result<usize, Malformed> {
    let count = reader.read_varint().map_err(Malformed::at(field))?.value();
    let remaining = reader.remaining();
    match usize::try_from(count) {
        Ok(count) if count <= remaining / min_record => Ok(count),
        _ => Err(Malformed::TruncatedField {
            field,
            source: PrimitivesError::UnexpectedEof {
                needed: usize::try_from(count)
                    .unwrap_or(usize::MAX)
                    .saturating_mul(min_record),
                remaining,
            },
        }),
    }
}
