/// txwire - Transaction envelope codec.
///
/// Decodes and encodes versioned transactions: inputs, outputs, lock time
/// and, for special transaction types, an extra payload after the lock time.
/// Script bytes are carried opaquely and parsed only on request.

pub mod builder;
pub mod config;
pub mod input;
pub mod output;
pub mod transaction;
pub mod version;

mod error;
pub use builder::TransactionBuilder;
pub use config::DecodeConfig;
pub use error::{Collection, Field, Malformed, TransactionError};
pub use input::{OutPoint, TxInput};
pub use output::TxOutput;
pub use transaction::Transaction;
pub use version::{PlainVersionScheme, SpecialTxScheme, VersionFields, VersionScheme};
