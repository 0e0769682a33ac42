//! Bounds-checked byte and integer reads over a raw image buffer.
//!
//! Every read goes through [`read_exact`], which turns a span that does not
//! fit in the buffer into [`DecodeError::OutOfRange`] instead of panicking.

use crate::error::DecodeError;

/// Largest integer magnitude [`read_as_int`] can represent, in bytes.
const MAX_INT_BYTES: usize = 16;

/// Byte order of multi-byte fields (`EI_DATA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// `ELFDATA2LSB`.
    Little,
    /// `ELFDATA2MSB`.
    Big,
}

impl ByteOrder {
    /// Short lowercase name, as printed in reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Little => "little",
            Self::Big => "big",
        }
    }
}

/// Returns the literal slice `[start, end)` of `data`.
///
/// # Errors
///
/// Returns [`DecodeError::OutOfRange`] if `start > end` or `end` exceeds
/// the buffer length.
pub fn read_exact(data: &[u8], start: u64, end: u64) -> Result<&[u8], DecodeError> {
    let out_of_range = DecodeError::OutOfRange {
        start,
        end,
        len: data.len(),
    };
    let (Ok(s), Ok(e)) = (usize::try_from(start), usize::try_from(end)) else {
        return Err(out_of_range);
    };
    data.get(s..e).ok_or(out_of_range)
}

/// Returns the slice `[start, end)` with trailing NUL bytes removed.
///
/// Suitable for zero-padded fixed-width fields. Content and name spans must
/// use [`read_exact`] instead: a genuine trailing `0x00` would be lost here.
///
/// # Errors
///
/// Returns [`DecodeError::OutOfRange`] if the span does not fit in `data`.
pub fn read_raw(data: &[u8], start: u64, end: u64) -> Result<&[u8], DecodeError> {
    read_exact(data, start, end).map(trim_trailing_nuls)
}

fn trim_trailing_nuls(bytes: &[u8]) -> &[u8] {
    let kept = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..kept]
}

/// Decodes `[start, end)` as an unsigned integer in the given byte order.
///
/// Insignificant zero bytes (trailing for little-endian, leading for
/// big-endian) are dropped first, so a field of any width decodes as long
/// as its value fits in a `u128`.
///
/// # Errors
///
/// Returns [`DecodeError::OutOfRange`] if the span does not fit in `data`,
/// or [`DecodeError::MalformedInteger`] if the value exceeds 128 bits.
pub fn read_as_int(
    data: &[u8],
    start: u64,
    end: u64,
    order: ByteOrder,
) -> Result<u128, DecodeError> {
    let bytes = read_exact(data, start, end)?;
    let significant = match order {
        ByteOrder::Little => trim_trailing_nuls(bytes),
        ByteOrder::Big => {
            let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
            &bytes[first..]
        }
    };

    if significant.len() > MAX_INT_BYTES {
        return Err(DecodeError::MalformedInteger {
            offset: start,
            width: bytes.len(),
        });
    }

    let value = match order {
        ByteOrder::Little => significant
            .iter()
            .rev()
            .fold(0u128, |acc, &b| (acc << 8) | u128::from(b)),
        ByteOrder::Big => significant
            .iter()
            .fold(0u128, |acc, &b| (acc << 8) | u128::from(b)),
    };
    Ok(value)
}

/// Like [`read_as_int`], narrowed to a `u64`.
///
/// # Errors
///
/// As [`read_as_int`]; values above `u64::MAX` are reported as
/// [`DecodeError::MalformedInteger`].
pub fn read_u64(data: &[u8], start: u64, end: u64, order: ByteOrder) -> Result<u64, DecodeError> {
    let value = read_as_int(data, start, end, order)?;
    u64::try_from(value).map_err(|_| DecodeError::MalformedInteger {
        offset: start,
        width: usize::try_from(end - start).unwrap_or(usize::MAX),
    })
}
