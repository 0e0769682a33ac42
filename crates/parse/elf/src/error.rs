//! Decode errors shared by every reader in the workspace.

use alloc::string::String;
use core::fmt;

/// Errors that can occur while decoding an image.
///
/// Every variant carries the offending offset, index or raw byte so the
/// caller can report exactly where decoding stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// `EI_CLASS` or `EI_DATA` holds a value other than 1 or 2.
    UnknownArchitecture {
        /// Raw `EI_CLASS` byte (0 if the image is too short to have one).
        class: u8,
        /// Raw `EI_DATA` byte (0 if the image is too short to have one).
        data: u8,
    },
    /// `e_shstrndx` does not name one of the decoded sections.
    SectionIndexOutOfRange {
        /// The requested section index.
        index: u64,
        /// Number of sections actually decoded.
        count: u64,
    },
    /// A read of `[start, end)` falls outside the buffer.
    OutOfRange {
        /// First byte of the requested span.
        start: u64,
        /// One past the last byte of the requested span.
        end: u64,
        /// Length of the buffer being read.
        len: usize,
    },
    /// The integer at `offset` has more significant bytes than a `u128` holds.
    MalformedInteger {
        /// File offset of the field.
        offset: u64,
        /// Width of the field in bytes.
        width: usize,
    },
    /// A field name is not part of the selected layout.
    UnknownField(String),
    /// A virtual address lies below the assumed load base.
    AddressBelowBase {
        /// The virtual address read from the image.
        addr: u64,
        /// The base address it was translated against.
        base: u64,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownArchitecture { class, data } => write!(
                f,
                "unknown ELF architecture (EI_CLASS={class:#04x}, EI_DATA={data:#04x})"
            ),
            Self::SectionIndexOutOfRange { index, count } => write!(
                f,
                "section index {index} out of range ({count} sections decoded)"
            ),
            Self::OutOfRange { start, end, len } => write!(
                f,
                "read of {start:#x}..{end:#x} is out of range (buffer is {len:#x} bytes)"
            ),
            Self::MalformedInteger { offset, width } => write!(
                f,
                "integer field at {offset:#x} ({width} bytes) does not fit in 128 bits"
            ),
            Self::UnknownField(name) => write!(f, "unknown layout field `{name}`"),
            Self::AddressBelowBase { addr, base } => write!(
                f,
                "virtual address {addr:#x} lies below base address {base:#x}"
            ),
        }
    }
}

impl core::error::Error for DecodeError {}
