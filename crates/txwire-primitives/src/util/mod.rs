//! Bounded binary reading and writing.
//!
//! Provides the CompactSize `VarInt`, plus `WireReader` and `WireWriter` for
//! the little-endian fixed-width fields of the wire format. Every read is
//! checked against the bytes left in the buffer before it happens, so a
//! hostile length can only ever produce an error.

use log::trace;

use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// VarInt
// ---------------------------------------------------------------------------

/// A CompactSize variable-length integer.
///
/// Used for element counts and byte lengths. The encoding uses 1, 3, 5, or 9
/// bytes depending on the magnitude of the value:
///
/// | Value range              | Encoding              |
/// |--------------------------|-----------------------|
/// | `0 ..= 0xfc`             | the byte itself       |
/// | `0xfd ..= 0xffff`        | `0xfd` + u16 LE       |
/// | `0x10000 ..= 0xffffffff` | `0xfe` + u32 LE       |
/// | larger                   | `0xff` + u64 LE       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Return the wire-format byte length of this VarInt.
    ///
    /// # Returns
    /// 1, 3, 5, or 9 depending on the value.
    pub fn length(&self) -> usize {
        if self.0 < 0xfd {
            1
        } else if self.0 <= 0xffff {
            3
        } else if self.0 <= 0xffff_ffff {
            5
        } else {
            9
        }
    }

    /// Encode the VarInt into a new byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.length()];
        self.put_bytes(&mut buf);
        buf
    }

    /// Write the VarInt into a destination buffer.
    ///
    /// The buffer must be at least `self.length()` bytes long.
    ///
    /// # Arguments
    /// * `dst` - Destination buffer to write into.
    ///
    /// # Returns
    /// The number of bytes written.
    pub fn put_bytes(&self, dst: &mut [u8]) -> usize {
        let v = self.0;
        match self.length() {
            1 => {
                dst[0] = v as u8;
                1
            }
            3 => {
                dst[0] = 0xfd;
                dst[1..3].copy_from_slice(&(v as u16).to_le_bytes());
                3
            }
            5 => {
                dst[0] = 0xfe;
                dst[1..5].copy_from_slice(&(v as u32).to_le_bytes());
                5
            }
            _ => {
                dst[0] = 0xff;
                dst[1..9].copy_from_slice(&v.to_le_bytes());
                9
            }
        }
    }

    /// Return the underlying u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VarInt {
    fn from(v: u64) -> Self {
        VarInt(v)
    }
}

impl From<usize> for VarInt {
    fn from(v: usize) -> Self {
        VarInt(v as u64)
    }
}

// ---------------------------------------------------------------------------
// WireReader
// ---------------------------------------------------------------------------

/// A cursor over a borrowed byte slice.
///
/// The cursor only moves forward and never passes the end of the slice:
/// a failed read leaves it where it was.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Create a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        WireReader { data, pos: 0 }
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Arguments
    /// * `n` - Number of bytes to read. Any value is safe, including ones
    ///   larger than the whole buffer.
    ///
    /// # Returns
    /// A byte slice of length `n`, or `UnexpectedEof` if fewer remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(PrimitivesError::UnexpectedEof { needed: n, remaining });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read exactly `N` bytes into a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte and advance the position.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian u16 and advance the position by 2 bytes.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u32 and advance the position by 4 bytes.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u64 and advance the position by 8 bytes.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a CompactSize integer.
    ///
    /// Only the shortest encoding of a value is accepted; anything else is
    /// `NonCanonicalVarInt`. This keeps re-encoding byte-identical to the
    /// input.
    ///
    /// # Returns
    /// The decoded `VarInt`, or an error if the bytes run out or the encoding
    /// is not minimal.
    pub fn read_varint(&mut self) -> Result<VarInt, PrimitivesError> {
        let start = self.pos;
        let result = self.read_varint_body();
        match &result {
            Ok(varint) => trace!("varint {} ({} bytes) at offset {}", varint.0, varint.length(), start),
            Err(_) => self.pos = start,
        }
        result
    }

    fn read_varint_body(&mut self) -> Result<VarInt, PrimitivesError> {
        let (value, encoded_len) = match self.read_u8()? {
            0xff => (self.read_u64_le()?, 9),
            0xfe => (u64::from(self.read_u32_le()?), 5),
            0xfd => (u64::from(self.read_u16_le()?), 3),
            b => (u64::from(b), 1),
        };
        let varint = VarInt(value);
        if varint.length() != encoded_len {
            return Err(PrimitivesError::NonCanonicalVarInt { value, encoded_len });
        }
        Ok(varint)
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

// ---------------------------------------------------------------------------
// WireWriter
// ---------------------------------------------------------------------------

/// An append-only buffer mirroring `WireReader`.
#[derive(Debug, Clone, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        WireWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        WireWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Append raw bytes to the buffer.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte to the buffer.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a little-endian u16 (2 bytes) to the buffer.
    pub fn write_u16_le(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u32 (4 bytes) to the buffer.
    pub fn write_u32_le(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u64 (8 bytes) to the buffer.
    pub fn write_u64_le(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a CompactSize integer in its shortest form.
    pub fn write_varint(&mut self, varint: VarInt) {
        let mut tmp = [0u8; 9];
        let n = varint.put_bytes(&mut tmp);
        self.buf.extend_from_slice(&tmp[..n]);
    }

    /// Append `bytes` preceded by their CompactSize length.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_varint(VarInt::from(bytes.len()));
        self.write_bytes(bytes);
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return a reference to the current buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the current length of the buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
