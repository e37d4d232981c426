/// txwire - Wire-level primitives shared by the script and transaction codecs.
///
/// This crate provides the foundational building blocks:
/// - CompactSize variable-length integers (`VarInt`)
/// - Bounded little-endian readers and writers over byte buffers
/// - The 32-byte identifier type used for transaction ids
/// - SHA-256 and double SHA-256, the default digest collaborator

pub mod hash;
pub mod chainhash;
pub mod util;

mod error;
pub use error::PrimitivesError;
