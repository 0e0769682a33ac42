//! Decoded embed-table entries.

use core::fmt;

use gembed_elf::{DecodeError, read_exact};

/// Length of the content digest stored in every record.
pub const DIGEST_LEN: usize = 16;

/// The fixed-size content digest stored alongside each entry.
///
/// Read verbatim; it is never checked against the content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Digest(pub [u8; DIGEST_LEN]);

impl Digest {
    /// Returns `true` if every byte is zero (directories carry no digest).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// One file or directory described by the embed table.
///
/// Pointers have already been translated from virtual addresses to file
/// offsets; spans are checked against the buffer only when read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File offset of the record this entry was decoded from.
    pub record_offset: u64,
    /// File offset of the name bytes.
    pub name_ptr: u64,
    /// Length of the name in bytes.
    pub name_len: u64,
    /// File offset of the content bytes, or 0 when the entry has none.
    pub content_ptr: u64,
    /// Length of the content in bytes.
    pub content_len: u64,
    /// Content digest as stored in the record.
    pub hash: Digest,
    /// `true` when `content_len == 0`.
    pub is_directory: bool,
}

impl FileEntry {
    /// Returns the name bytes, or an empty slice if `name_len == 0`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::OutOfRange`] if the name lies outside `data`.
    pub fn name<'a>(&self, data: &'a [u8]) -> Result<&'a [u8], DecodeError> {
        span(data, self.name_ptr, self.name_len)
    }

    /// Returns the content bytes, or an empty slice if `content_len == 0`.
    ///
    /// Trailing NUL bytes are part of the content and are kept.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::OutOfRange`] if the content lies outside `data`.
    pub fn content<'a>(&self, data: &'a [u8]) -> Result<&'a [u8], DecodeError> {
        span(data, self.content_ptr, self.content_len)
    }
}

fn span(data: &[u8], ptr: u64, len: u64) -> Result<&[u8], DecodeError> {
    if len == 0 {
        return Ok(&[] as &[u8]);
    }
    let end = ptr.checked_add(len).ok_or(DecodeError::OutOfRange {
        start: ptr,
        end: u64::MAX,
        len: data.len(),
    })?;
    read_exact(data, ptr, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name_ptr: u64, name_len: u64, content_ptr: u64, content_len: u64) -> FileEntry {
        FileEntry {
            record_offset: 0,
            name_ptr,
            name_len,
            content_ptr,
            content_len,
            hash: Digest::default(),
            is_directory: content_len == 0,
        }
    }

    #[test]
    fn digest_renders_lowercase_hex() {
        let mut bytes = [0u8; DIGEST_LEN];
        bytes[0] = 0xab;
        bytes[15] = 0x01;
        let digest = Digest(bytes);
        assert_eq!(format!("{digest}"), "ab000000000000000000000000000001");
        assert!(!digest.is_zero());
        assert!(Digest::default().is_zero());
    }

    #[test]
    fn name_and_content_slices() {
        let data = b"dir/file.txtHELLO\0\0";
        let e = entry(0, 12, 12, 7);
        assert_eq!(e.name(data), Ok(&b"dir/file.txt"[..]));
        // Trailing NULs are content.
        assert_eq!(e.content(data), Ok(&b"HELLO\0\0"[..]));
    }

    #[test]
    fn zero_length_spans_are_empty() {
        let e = entry(999, 0, 0, 0);
        assert_eq!(e.name(b""), Ok(&b""[..]));
        assert_eq!(e.content(b""), Ok(&b""[..]));
    }

    #[test]
    fn spans_past_the_buffer_fail() {
        let data = [0u8; 8];
        let e = entry(4, 8, 0, 0);
        assert!(matches!(e.name(&data), Err(DecodeError::OutOfRange { .. })));
        let e = entry(0, 1, u64::MAX, 2);
        assert!(matches!(e.content(&data), Err(DecodeError::OutOfRange { .. })));
    }
}
