//! Lazy, restartable decoding of script bytes into operations.
//!
//! A [`ScriptReader`] keeps two independent progressions:
//!
//! - the *decode cursor*, the raw byte offset consumed so far. It only moves
//!   forward, and each byte range is decoded at most once.
//! - an *iteration index* per [`Operations`] iterator, counting operations
//!   (not bytes). It can be rewound freely.
//!
//! Decoded operations land in an append-only cache addressed by iteration
//! index. An iterator serves operations from the cache and only asks the
//! reader to decode when it walks past the cached prefix.
//!
//! ```
//! use txwire_script::ScriptReader;
//!
//! let bytes = [0x76, 0xa9, 0x02, 0xab, 0xcd, 0x88, 0xac];
//! let mut reader = ScriptReader::new(&bytes);
//! assert_eq!(reader.human_readable().unwrap(), "OP_DUP OP_HASH160 abcd OP_EQUALVERIFY OP_CHECKSIG");
//! assert_eq!(reader.position(), bytes.len());
//! ```

use std::iter::FusedIterator;

use log::trace;

use crate::operation::{Operation, PushKind, ScriptToken};
use crate::{OpcodeNames, ScriptError, ScriptPart, StandardOpcodes};

/// Decodes a borrowed script buffer into [`Operation`]s on demand.
#[derive(Debug, Clone)]
pub struct ScriptReader<'a> {
    data: &'a [u8],
    /// Raw decode cursor.
    position: usize,
    cache: Vec<Operation<'a>>,
    /// Set once decoding fails; the bytes after the cached prefix are invalid.
    failure: Option<ScriptError>,
}

impl<'a> ScriptReader<'a> {
    /// Wrap `data` with the cursor at 0 and an empty cache.
    pub fn new(data: &'a [u8]) -> Self {
        ScriptReader {
            data,
            position: 0,
            cache: Vec::new(),
            failure: None,
        }
    }

    /// Raw byte offset consumed by decoding so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total length of the script.
    pub fn end(&self) -> usize {
        self.data.len()
    }

    /// The operations decoded so far, in order.
    pub fn cached(&self) -> &[Operation<'a>] {
        &self.cache
    }

    /// The error that stopped decoding, if any.
    pub fn failure(&self) -> Option<&ScriptError> {
        self.failure.as_ref()
    }

    /// Whether no further operations can be decoded.
    pub fn is_exhausted(&self) -> bool {
        self.failure.is_some() || self.position >= self.data.len()
    }

    /// Iterate over the operations from the first one.
    ///
    /// Each call starts a fresh iteration; already decoded operations come
    /// from the cache.
    pub fn operations(&mut self) -> Operations<'_, 'a> {
        Operations {
            reader: self,
            index: 0,
            finished: false,
        }
    }

    /// The operation at iteration index `index`, decoding up to it if needed.
    ///
    /// # Returns
    /// `None` when the script ends before `index`, `Some(Err(_))` when the
    /// bytes before `index` are malformed.
    pub fn get(&mut self, index: usize) -> Option<Result<Operation<'a>, ScriptError>> {
        while self.cache.len() <= index {
            if let Some(err) = &self.failure {
                return Some(Err(err.clone()));
            }
            if self.position >= self.data.len() {
                return None;
            }
            match self.decode_next() {
                Ok(op) => self.cache.push(op),
                Err(err) => {
                    self.failure = Some(err.clone());
                    return Some(Err(err));
                }
            }
        }
        Some(Ok(self.cache[index]))
    }

    /// Decode the whole script.
    pub fn decode_all(&mut self) -> Result<&[Operation<'a>], ScriptError> {
        let mut index = self.cache.len();
        while let Some(result) = self.get(index) {
            result?;
            index += 1;
        }
        Ok(&self.cache)
    }

    /// Materialize the script as pushed bytes and opcode names.
    pub fn parse(&mut self) -> Result<Vec<ScriptToken<'a>>, ScriptError> {
        self.parse_with(&StandardOpcodes)
    }

    /// Like [`parse`](Self::parse) with a caller-supplied opcode name table.
    pub fn parse_with(&mut self, names: &dyn OpcodeNames) -> Result<Vec<ScriptToken<'a>>, ScriptError> {
        self.operations()
            .map(|op| op.map(|op| op.to_token(names)))
            .collect()
    }

    /// The parsed script as one string: data as lowercase hex, opcodes by
    /// name, separated by single spaces.
    pub fn human_readable(&mut self) -> Result<String, ScriptError> {
        self.human_readable_with(&StandardOpcodes)
    }

    /// Like [`human_readable`](Self::human_readable) with a caller-supplied
    /// opcode name table.
    pub fn human_readable_with(&mut self, names: &dyn OpcodeNames) -> Result<String, ScriptError> {
        let tokens = self.parse_with(names)?;
        Ok(tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "))
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    fn decode_next(&mut self) -> Result<Operation<'a>, ScriptError> {
        let start = self.position;
        let opcode = self.take(1, ScriptPart::Opcode)?[0];

        let op = match PushKind::of(opcode) {
            PushKind::Empty => Operation::push(opcode, &[]),
            PushKind::Direct(len) => Operation::push(opcode, self.take(len as usize, ScriptPart::Payload)?),
            PushKind::Prefixed { width } => {
                let len = self.read_length_prefix(width)?;
                Operation::push(opcode, self.take(len, ScriptPart::Payload)?)
            }
            PushKind::Bare => Operation::bare(opcode),
        };

        trace!(
            "script op {} at offset {}: opcode {:#04x}, {} bytes",
            self.cache.len(),
            start,
            opcode,
            self.position - start
        );
        // PushKind and the Operation constructors agree on what is a push.
        op.ok_or(ScriptError::CursorOverrun {
            position: self.position,
            end: self.data.len(),
        })
    }

    /// Bytes left after the cursor, refusing to go negative.
    fn remaining(&self) -> Result<usize, ScriptError> {
        self.data
            .len()
            .checked_sub(self.position)
            .ok_or(ScriptError::CursorOverrun {
                position: self.position,
                end: self.data.len(),
            })
    }

    fn take(&mut self, n: usize, part: ScriptPart) -> Result<&'a [u8], ScriptError> {
        let remaining = self.remaining()?;
        if remaining < n {
            return Err(ScriptError::TruncatedScript {
                part,
                offset: self.position,
                needed: n,
                remaining,
            });
        }
        let data: &'a [u8] = self.data;
        let slice = &data[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    fn read_length_prefix(&mut self, width: usize) -> Result<usize, ScriptError> {
        let bytes = self.take(width, ScriptPart::LengthPrefix)?;
        let mut le = [0u8; 8];
        le[..width].copy_from_slice(bytes);
        // A length that does not fit usize cannot fit the buffer either.
        Ok(usize::try_from(u64::from_le_bytes(le)).unwrap_or(usize::MAX))
    }
}

impl<'r, 'a> IntoIterator for &'r mut ScriptReader<'a> {
    type Item = Result<Operation<'a>, ScriptError>;
    type IntoIter = Operations<'r, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations()
    }
}

/// An iteration over a reader's operations with its own index.
///
/// Yields each operation once, then ends. If the script is malformed the
/// error is yielded in place of the first undecodable operation and the
/// iteration ends there.
#[derive(Debug)]
pub struct Operations<'r, 'a> {
    reader: &'r mut ScriptReader<'a>,
    index: usize,
    finished: bool,
}

impl<'r, 'a> Operations<'r, 'a> {
    /// Iteration index of the next operation.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Restart from the first operation without re-decoding anything.
    pub fn rewind(&mut self) {
        self.index = 0;
        self.finished = false;
    }

    /// The reader's raw decode cursor.
    pub fn position(&self) -> usize {
        self.reader.position()
    }
}

impl<'r, 'a> Iterator for Operations<'r, 'a> {
    type Item = Result<Operation<'a>, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.reader.get(self.index) {
            Some(Ok(op)) => {
                self.index += 1;
                Some(Ok(op))
            }
            Some(Err(err)) => {
                self.finished = true;
                Some(Err(err))
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}

impl FusedIterator for Operations<'_, '_> {}

#[cfg(test)]
mod tests {
    //! Tests for lazy decoding, the operation cache and truncation handling.

    use super::*;
    use crate::opcodes::*;
    use simplelog::{Config, LevelFilter, TestLogger};

    fn init_logger() {
        let _ = TestLogger::init(LevelFilter::Trace, Config::default());
    }

    fn decode(bytes: &[u8]) -> Result<Vec<Operation<'_>>, ScriptError> {
        let mut reader = ScriptReader::new(bytes);
        let ops = reader.operations().collect();
        ops
    }

    // -----------------------------------------------------------------------
    // Well-formed scripts
    // -----------------------------------------------------------------------

    #[test]
    fn test_decode_p2pkh() {
        init_logger();
        let bytes = hex::decode("76a914e2a623699e81b291c0327f408fea765d534baa2a88ac").unwrap();
        let ops = decode(&bytes).unwrap();
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0].opcode(), OP_DUP);
        assert_eq!(ops[2].opcode(), OP_DATA_20);
        assert_eq!(ops[2].push_data().unwrap().len(), 20);
        assert_eq!(ops[4].opcode(), OP_CHECKSIG);
    }

    #[test]
    fn test_decode_empty_script() {
        let mut reader = ScriptReader::new(&[]);
        assert_eq!(reader.operations().count(), 0);
        assert!(reader.is_exhausted());
        assert_eq!(reader.human_readable().unwrap(), "");
    }

    #[test]
    fn test_op_0_pushes_empty_data() {
        let ops = decode(&[OP_0, OP_0]).unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].push_data(), Some(&[][..]));
    }

    #[test]
    fn test_pushdata_variants() {
        let mut bytes = vec![OP_PUSHDATA1, 0x02, 0xaa, 0xbb];
        bytes.extend_from_slice(&[OP_PUSHDATA2, 0x01, 0x00, 0xcc]);
        bytes.extend_from_slice(&[OP_PUSHDATA4, 0x01, 0x00, 0x00, 0x00, 0xdd]);
        bytes.extend_from_slice(&[OP_PUSHDATA1, 0x00]);
        let ops = decode(&bytes).unwrap();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0].push_data(), Some(&[0xaa, 0xbb][..]));
        assert_eq!(ops[1].push_data(), Some(&[0xcc][..]));
        assert_eq!(ops[2].push_data(), Some(&[0xdd][..]));
        assert_eq!(ops[3].push_data(), Some(&[][..]));
    }

    // -----------------------------------------------------------------------
    // Truncation
    // -----------------------------------------------------------------------

    #[test]
    fn test_direct_push_truncated() {
        // 0x05 claims five bytes, three follow.
        let err = decode(&[0x05, 0x00, 0x00, 0x00]).unwrap_err();
        assert_eq!(
            err,
            ScriptError::TruncatedScript {
                part: ScriptPart::Payload,
                offset: 1,
                needed: 5,
                remaining: 3,
            }
        );
    }

    #[test]
    fn test_pushdata1_payload_truncated() {
        let err = decode(&[OP_PUSHDATA1, 0x05, 0x00, 0x00, 0x00, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::TruncatedScript { part: ScriptPart::Payload, needed: 5, remaining: 4, .. }
        ));
    }

    #[test]
    fn test_pushdata_prefix_truncated() {
        for (bytes, needed) in [
            (vec![OP_PUSHDATA1], 1),
            (vec![OP_PUSHDATA2, 0x01], 2),
            (vec![OP_PUSHDATA4, 0x01, 0x00, 0x00], 4),
        ] {
            let err = decode(&bytes).unwrap_err();
            assert_eq!(
                err,
                ScriptError::TruncatedScript {
                    part: ScriptPart::LengthPrefix,
                    offset: 1,
                    needed,
                    remaining: bytes.len() - 1,
                }
            );
        }
    }

    #[test]
    fn test_pushdata4_huge_length_rejected() {
        let err = decode(&[OP_PUSHDATA4, 0xff, 0xff, 0xff, 0xff, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::TruncatedScript { part: ScriptPart::Payload, needed: 0xffff_ffff, remaining: 1, .. }
        ));
    }

    #[test]
    fn test_error_after_valid_prefix() {
        init_logger();
        let bytes = [OP_DUP, OP_HASH160, 0x14, 0x00];
        let mut reader = ScriptReader::new(&bytes);
        let results: Vec<_> = reader.operations().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
        assert_eq!(reader.cached().len(), 2);
        assert!(reader.failure().is_some());
        assert!(reader.is_exhausted());

        // A second pass replays the valid prefix and the same error, then stops.
        let again: Vec<_> = reader.operations().collect();
        assert_eq!(again, results);
        assert!(reader.parse().is_err());
        assert!(reader.human_readable().is_err());
    }

    #[test]
    fn test_cursor_overrun_is_not_truncation() {
        let mut reader = ScriptReader::new(&[OP_DUP]);
        reader.position = 5;
        assert_eq!(
            reader.decode_next(),
            Err(ScriptError::CursorOverrun { position: 5, end: 1 })
        );
    }

    // -----------------------------------------------------------------------
    // Restartable iteration
    // -----------------------------------------------------------------------

    #[test]
    fn test_second_iteration_reads_nothing() {
        let bytes = hex::decode("76a914e2a623699e81b291c0327f408fea765d534baa2a88ac").unwrap();
        let mut reader = ScriptReader::new(&bytes);

        let first: Vec<_> = reader.operations().collect::<Result<_, _>>().unwrap();
        let position = reader.position();
        let cached = reader.cached().len();
        assert_eq!(position, bytes.len());
        assert_eq!(cached, 5);

        let second: Vec<_> = reader.operations().collect::<Result<_, _>>().unwrap();
        assert_eq!(first, second);
        assert_eq!(reader.position(), position);
        assert_eq!(reader.cached().len(), cached);
    }

    #[test]
    fn test_lazy_decoding_and_rewind() {
        let bytes = [OP_1, OP_2, OP_3, OP_ADD];
        let mut reader = ScriptReader::new(&bytes);

        let mut ops = reader.operations();
        assert_eq!(ops.next().unwrap().unwrap().opcode(), OP_1);
        assert_eq!(ops.position(), 1);
        assert_eq!(ops.index(), 1);

        ops.rewind();
        assert_eq!(ops.index(), 0);
        assert_eq!(ops.next().unwrap().unwrap().opcode(), OP_1);
        // Served from the cache: the cursor did not move.
        assert_eq!(ops.position(), 1);

        assert_eq!(ops.next().unwrap().unwrap().opcode(), OP_2);
        assert_eq!(ops.position(), 2);
        assert_eq!(ops.by_ref().count(), 2);
        assert!(ops.next().is_none());
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_get_decodes_on_demand() {
        let bytes = [OP_1, OP_2, OP_3];
        let mut reader = ScriptReader::new(&bytes);
        assert_eq!(reader.get(1).unwrap().unwrap().opcode(), OP_2);
        assert_eq!(reader.cached().len(), 2);
        assert_eq!(reader.get(0).unwrap().unwrap().opcode(), OP_1);
        assert_eq!(reader.position(), 2);
        assert!(reader.get(3).is_none());
        assert_eq!(reader.decode_all().unwrap().len(), 3);
    }

    #[test]
    fn test_for_loop_over_reader() {
        let bytes = [OP_DUP, OP_DROP];
        let mut reader = ScriptReader::new(&bytes);
        let mut seen = Vec::new();
        for op in &mut reader {
            seen.push(op.unwrap().opcode());
        }
        assert_eq!(seen, vec![OP_DUP, OP_DROP]);
    }

    // -----------------------------------------------------------------------
    // parse / human_readable
    // -----------------------------------------------------------------------

    #[test]
    fn test_human_readable_multisig() {
        let bytes = hex::decode(
            "5221024882ca54cd89c1f14aea2c843fa0109f6339bd4df166a12454d195fefb9e84922102e04b69fe7139498cd99ae410f07d781900357f0b3b1ccaf997b2c9b1e7c185a82103ea5042dd903e5d717682ec9a5071f1516bf2cd6096c31f49b0d6c25ad9326ad853ae",
        )
        .unwrap();
        let mut reader = ScriptReader::new(&bytes);
        assert_eq!(
            reader.human_readable().unwrap(),
            "OP_2 \
             024882ca54cd89c1f14aea2c843fa0109f6339bd4df166a12454d195fefb9e8492 \
             02e04b69fe7139498cd99ae410f07d781900357f0b3b1ccaf997b2c9b1e7c185a8 \
             03ea5042dd903e5d717682ec9a5071f1516bf2cd6096c31f49b0d6c25ad9326ad8 \
             OP_3 OP_CHECKMULTISIG"
        );
    }

    #[test]
    fn test_parse_renders_op_0_as_byte() {
        let bytes = [OP_0, OP_RETURN, 0x01, 0x7f];
        let mut reader = ScriptReader::new(&bytes);
        let tokens = reader.parse().unwrap();
        assert_eq!(tokens[0], ScriptToken::Data(&[0x00]));
        assert_eq!(reader.human_readable().unwrap(), "00 OP_RETURN 7f");
    }

    #[test]
    fn test_custom_names() {
        struct Lower;
        impl OpcodeNames for Lower {
            fn name(&self, opcode: u8) -> std::borrow::Cow<'static, str> {
                crate::opcodes::opcode_to_string(opcode).to_lowercase().into()
            }
        }

        let mut reader = ScriptReader::new(&[OP_DUP, 0x01, 0xff]);
        assert_eq!(reader.human_readable_with(&Lower).unwrap(), "op_dup ff");
    }
}
