#![deny(missing_docs)]

//! txwire - script and transaction codecs.
//!
//! Re-exports every txwire component for single-crate usage.
//!
//! ```
//! use txwire::transaction::Transaction;
//!
//! let tx = Transaction::from_hex(concat!(
//!     "0100000001",
//!     "0000000000000000000000000000000000000000000000000000000000000000ffffffff",
//!     "0151", "00000000",
//!     "01", "e803000000000000", "016a",
//!     "00000000",
//! ))
//! .unwrap();
//! assert!(tx.is_coinbase());
//! assert_eq!(tx.output(0).unwrap().script.to_asm().unwrap(), "OP_RETURN");
//! ```

pub use txwire_primitives as primitives;
pub use txwire_script as script;
pub use txwire_transaction as transaction;
