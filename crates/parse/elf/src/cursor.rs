//! Forward-only offset tracking over an image buffer.

use crate::header::BitWidth;

/// Number of half-words in one embed-table record on 64-bit targets.
const RECORD_HALF_WORDS_64: u64 = 6;

/// Number of half-words in one embed-table record on 32-bit targets.
const RECORD_HALF_WORDS_32: u64 = 8;

/// A position in a buffer that only ever moves forward.
///
/// The cursor knows nothing about the buffer it indexes: bounds are checked
/// by the read that consumes the offsets, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteCursor {
    pos: u64,
    half_word: u64,
    word: u64,
    record: u64,
}

impl ByteCursor {
    /// Creates a cursor at `start` using embed-table widths for `width`.
    #[must_use]
    pub fn new(start: u64, width: BitWidth) -> Self {
        let record = match width {
            BitWidth::Bits32 => RECORD_HALF_WORDS_32,
            BitWidth::Bits64 => RECORD_HALF_WORDS_64,
        } * width.half_word();
        Self::with_record(start, width, record)
    }

    /// Creates a cursor at `start` with an explicit record size.
    #[must_use]
    pub fn with_record(start: u64, width: BitWidth, record: u64) -> Self {
        Self {
            pos: start,
            half_word: width.half_word(),
            word: width.word(),
            record,
        }
    }

    /// Returns the current offset.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.pos
    }

    /// Returns the record size this cursor steps by.
    #[must_use]
    pub fn record_size(&self) -> u64 {
        self.record
    }

    /// Moves forward by `n` bytes and returns the new offset.
    pub fn advance(&mut self, n: u64) -> u64 {
        self.pos = self.pos.saturating_add(n);
        self.pos
    }

    /// Moves forward by one half-word.
    pub fn advance_half_word(&mut self) -> u64 {
        self.advance(self.half_word)
    }

    /// Moves forward by one word.
    pub fn advance_word(&mut self) -> u64 {
        self.advance(self.word)
    }

    /// Moves forward by one record.
    pub fn advance_record(&mut self) -> u64 {
        self.advance(self.record)
    }

    /// Returns `(start, end)` of the next `n` bytes and steps past them.
    pub fn take(&mut self, n: u64) -> (u64, u64) {
        let start = self.pos;
        (start, self.advance(n))
    }

    /// Returns `(start, end)` of the next half-word and steps past it.
    pub fn take_half_word(&mut self) -> (u64, u64) {
        self.take(self.half_word)
    }
}
