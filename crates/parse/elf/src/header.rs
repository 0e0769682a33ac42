//! ELF identification bytes (`e_ident`).
//!
//! Only `EI_CLASS` and `EI_DATA` are interpreted. They select the word size
//! and byte order every other reader in the workspace decodes with.

use crate::bytes::ByteOrder;
use crate::error::DecodeError;

/// ELF magic bytes: `\x7fELF`.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Offset of `EI_CLASS` within `e_ident`.
const EI_CLASS: usize = 4;

/// Offset of `EI_DATA` within `e_ident`.
const EI_DATA: usize = 5;

/// ELF class: 32-bit.
const ELFCLASS32: u8 = 1;

/// ELF class: 64-bit.
const ELFCLASS64: u8 = 2;

/// ELF data encoding: little-endian.
const ELFDATA2LSB: u8 = 1;

/// ELF data encoding: big-endian.
const ELFDATA2MSB: u8 = 2;

/// Target word size (`EI_CLASS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitWidth {
    /// `ELFCLASS32`.
    Bits32,
    /// `ELFCLASS64`.
    Bits64,
}

impl BitWidth {
    /// Number of bits, as printed in reports.
    #[must_use]
    pub fn bits(self) -> u32 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }

    /// Width of a half-word field in the embed table.
    #[must_use]
    pub fn half_word(self) -> u64 {
        match self {
            Self::Bits32 => 4,
            Self::Bits64 => 8,
        }
    }

    /// Width of a word field in the embed table.
    #[must_use]
    pub fn word(self) -> u64 {
        self.half_word() * 2
    }
}

/// The identification fields of an image, as found.
///
/// Unrecognised values are kept as `None` rather than rejected, so callers
/// decide whether an unknown class or encoding is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfIdentity {
    /// Decoded `EI_CLASS`, or `None` if unrecognised.
    pub bit_width: Option<BitWidth>,
    /// Decoded `EI_DATA`, or `None` if unrecognised.
    pub byte_order: Option<ByteOrder>,
    /// Raw `EI_CLASS` byte.
    pub ei_class: u8,
    /// Raw `EI_DATA` byte.
    pub ei_data: u8,
    magic: bool,
}

/// A fully recognised word size and byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arch {
    /// Word size of the image.
    pub bit_width: BitWidth,
    /// Byte order of the image.
    pub byte_order: ByteOrder,
}

impl ElfIdentity {
    /// Reads the identification bytes at the start of `data`.
    ///
    /// Never fails: a buffer too short to hold a byte yields `0` for it,
    /// which maps to `None`.
    #[must_use]
    pub fn parse(data: &[u8]) -> Self {
        let ei_class = data.get(EI_CLASS).copied().unwrap_or(0);
        let ei_data = data.get(EI_DATA).copied().unwrap_or(0);

        let bit_width = match ei_class {
            ELFCLASS32 => Some(BitWidth::Bits32),
            ELFCLASS64 => Some(BitWidth::Bits64),
            _ => None,
        };
        let byte_order = match ei_data {
            ELFDATA2LSB => Some(ByteOrder::Little),
            ELFDATA2MSB => Some(ByteOrder::Big),
            _ => None,
        };

        Self {
            bit_width,
            byte_order,
            ei_class,
            ei_data,
            magic: data.starts_with(&ELF_MAGIC),
        }
    }

    /// Returns `true` if the image starts with `\x7fELF`.
    #[must_use]
    pub fn has_magic(&self) -> bool {
        self.magic
    }

    /// Returns the word size and byte order, requiring both to be known.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownArchitecture`] carrying the raw bytes
    /// if either field was unrecognised.
    pub fn arch(&self) -> Result<Arch, DecodeError> {
        match (self.bit_width, self.byte_order) {
            (Some(bit_width), Some(byte_order)) => Ok(Arch {
                bit_width,
                byte_order,
            }),
            _ => Err(DecodeError::UnknownArchitecture {
                class: self.ei_class,
                data: self.ei_data,
            }),
        }
    }
}
