//! Interpretation of the 32-bit version word.
//!
//! The wire carries one little-endian `u32`. How much of it is the version
//! and whether part of it names a special transaction type is a policy,
//! expressed as a [`VersionScheme`].

use std::fmt;
use std::sync::Arc;

/// First version at which [`SpecialTxScheme`] reads a type from the high bits.
pub const SPECIAL_TX_MIN_VERSION: u16 = 3;

/// The version word split into its version and type parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VersionFields {
    pub version: u32,
    /// 0 for standard transactions.
    pub tx_type: u16,
}

impl VersionFields {
    /// Whether this type carries an extra payload after the lock time.
    pub fn is_special(&self) -> bool {
        self.tx_type != 0
    }
}

/// Policy for splitting a raw version word.
///
/// Transactions hold their scheme as an `Arc<dyn VersionScheme>`, so a
/// scheme configured at runtime can be shared between decodes.
pub trait VersionScheme: fmt::Debug + Send + Sync {
    fn split(&self, raw: u32) -> VersionFields;
}

/// Low 16 bits are the version; from version 3 on, the high 16 bits are
/// the transaction type. Below version 3 the whole word is the version.
///
/// ```
/// use txwire_transaction::{SpecialTxScheme, VersionScheme};
///
/// let fields = SpecialTxScheme.split(0x0001_0003);
/// assert_eq!((fields.version, fields.tx_type), (3, 1));
/// assert!(!SpecialTxScheme.split(2).is_special());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecialTxScheme;

impl VersionScheme for SpecialTxScheme {
    fn split(&self, raw: u32) -> VersionFields {
        let low = (raw & 0xffff) as u16;
        if low >= SPECIAL_TX_MIN_VERSION {
            VersionFields {
                version: u32::from(low),
                tx_type: (raw >> 16) as u16,
            }
        } else {
            VersionFields { version: raw, tx_type: 0 }
        }
    }
}

/// The whole word is the version; no transaction is special.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlainVersionScheme;

impl VersionScheme for PlainVersionScheme {
    fn split(&self, raw: u32) -> VersionFields {
        VersionFields { version: raw, tx_type: 0 }
    }
}

/// The scheme used when none is given: [`SpecialTxScheme`].
pub fn default_scheme() -> Arc<dyn VersionScheme> {
    Arc::new(SpecialTxScheme)
}
