use std::fmt;

use txwire_primitives::PrimitivesError;

/// A field of the transaction wire format, named in decode errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Version,
    InputCount,
    PrevoutHash,
    PrevoutIndex,
    ScriptLength,
    Script,
    Sequence,
    OutputCount,
    Value,
    LockTime,
    ExtraPayloadLength,
    ExtraPayload,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Version => "version",
            Field::InputCount => "input count",
            Field::PrevoutHash => "previous output hash",
            Field::PrevoutIndex => "previous output index",
            Field::ScriptLength => "script length",
            Field::Script => "script",
            Field::Sequence => "sequence",
            Field::OutputCount => "output count",
            Field::Value => "output value",
            Field::LockTime => "lock time",
            Field::ExtraPayloadLength => "extra payload length",
            Field::ExtraPayload => "extra payload",
        })
    }
}

/// Which ordered sequence an index was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Input,
    Output,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Collection::Input => "input",
            Collection::Output => "output",
        })
    }
}

/// Why a transaction could not be decoded, constructed or accessed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
    /// A fixed-width or length-prefixed read ran past the end of the buffer.
    #[error("truncated {field}: {source}")]
    TruncatedField {
        field: Field,
        #[source]
        source: PrimitivesError,
    },

    /// A size prefix used a wider encoding than its value needs.
    #[error("non-canonical {field}: {source}")]
    NonCanonicalSize {
        field: Field,
        #[source]
        source: PrimitivesError,
    },

    /// Version or lock time does not fit the 32-bit wire field.
    #[error("{field} {value} does not fit in 32 bits")]
    FieldOutOfRange { field: Field, value: u64 },

    #[error("{kind} index {index} out of range, transaction has {len}")]
    IndexOutOfRange {
        kind: Collection,
        index: usize,
        len: usize,
    },

    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    /// The version word marks a special type but no payload was given.
    #[error("transaction type {tx_type} requires an extra payload")]
    MissingExtraPayload { tx_type: u16 },

    #[error("extra payload given for a transaction without a special type")]
    UnexpectedExtraPayload,
}

impl Malformed {
    /// Attribute a wire read failure to `field`.
    pub(crate) fn at(field: Field) -> impl Fn(PrimitivesError) -> Malformed {
        move |source| match source {
            PrimitivesError::NonCanonicalVarInt { .. } => Malformed::NonCanonicalSize { field, source },
            source => Malformed::TruncatedField { field, source },
        }
    }
}

/// Error types for transaction operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    #[error("malformed transaction: {0}")]
    Malformed(#[from] Malformed),

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for TransactionError {
    fn from(err: hex::FromHexError) -> Self {
        TransactionError::InvalidHex(err.to_string())
    }
}
