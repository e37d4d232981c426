//! Incremental construction of a [`Transaction`].
//!
//! ```
//! use std::sync::Arc;
//! use txwire_primitives::chainhash::Hash;
//! use txwire_script::Script;
//! use txwire_transaction::TransactionBuilder;
//!
//! let tx = TransactionBuilder::new()
//!     .input(Hash::ZERO, 0)
//!     .output(1000, Script::from_bytes(&[0x51]))
//!     .build()
//!     .unwrap();
//! assert_eq!(tx.version(), 1);
//! assert_eq!(tx.inputs()[0].sequence, 0xffff_ffff);
//! ```

use std::sync::Arc;

use txwire_primitives::chainhash::Hash;
use txwire_script::Script;

use crate::input::{OutPoint, TxInput, DEFAULT_SEQUENCE_NUMBER};
use crate::output::TxOutput;
use crate::transaction::{Transaction, DEFAULT_VERSION};
use crate::version::{default_scheme, VersionScheme};
use crate::TransactionError;

/// Collects transaction fields; range and payload checks happen in
/// [`build`](Self::build).
///
/// A builder can be cloned and built more than once.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    scheme: Arc<dyn VersionScheme>,
    version: u64,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    lock_time: u64,
    extra_payload: Option<Vec<u8>>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        TransactionBuilder {
            scheme: default_scheme(),
            version: u64::from(DEFAULT_VERSION),
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
            extra_payload: None,
        }
    }

    pub fn scheme(mut self, scheme: Arc<dyn VersionScheme>) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Spend output `index` of `prev_id` with an empty script and the
    /// default sequence number.
    pub fn input(self, prev_id: Hash, index: u32) -> Self {
        self.input_with(TxInput::new(
            OutPoint::new(prev_id, index),
            Script::new(),
            DEFAULT_SEQUENCE_NUMBER,
        ))
    }

    pub fn input_with(mut self, input: TxInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn output(mut self, value: u64, script: Script) -> Self {
        self.outputs.push(TxOutput::new(value, script));
        self
    }

    pub fn lock_time(mut self, lock_time: u64) -> Self {
        self.lock_time = lock_time;
        self
    }

    pub fn extra_payload(mut self, payload: Vec<u8>) -> Self {
        self.extra_payload = Some(payload);
        self
    }

    /// Validate and assemble the transaction.
    pub fn build(&self) -> Result<Transaction, TransactionError> {
        Transaction::with_scheme(
            Arc::clone(&self.scheme),
            self.version,
            self.inputs.clone(),
            self.outputs.clone(),
            self.lock_time,
            self.extra_payload.clone(),
        )
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
