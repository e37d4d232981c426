/// Decoder options.
///
/// Only the trailing-bytes policy is configurable; every other decoding rule
/// is fixed by the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Accept a buffer that continues after the transaction. The extra bytes
    /// are ignored and logged.
    pub allow_trailing_bytes: bool,
}

impl DecodeConfig {
    /// Reject trailing bytes. This is the default.
    pub const fn strict() -> Self {
        DecodeConfig {
            allow_trailing_bytes: false,
        }
    }

    /// Ignore trailing bytes.
    pub const fn lenient() -> Self {
        DecodeConfig {
            allow_trailing_bytes: true,
        }
    }
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self::strict()
    }
}
