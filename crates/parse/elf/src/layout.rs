//! Field layouts for the ELF file header and section header entries.
//!
//! Each layout is an ordered list of `(name, width)` pairs; a field's offset
//! is the sum of the widths before it. The 32/64-bit difference lives only
//! in which table is selected.

use alloc::string::ToString;

use crate::bytes::{ByteOrder, read_u64};
use crate::error::DecodeError;
use crate::header::BitWidth;

/// Location of one field within its structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Byte offset from the start of the structure.
    pub offset: u64,
    /// Width in bytes.
    pub width: u64,
}

impl Field {
    /// Returns `(start, end)` of this field in a structure at `base`.
    #[must_use]
    pub fn span(&self, base: u64) -> (u64, u64) {
        let start = base.saturating_add(self.offset);
        (start, start.saturating_add(self.width))
    }
}

/// An ordered table of fixed-width fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    fields: &'static [(&'static str, u64)],
}

/// `Elf32_Ehdr`.
pub static ELF32_HEADER: FieldLayout = FieldLayout {
    fields: &[
        ("e_ident", 16),
        ("e_type", 2),
        ("e_machine", 2),
        ("e_version", 4),
        ("e_entry", 4),
        ("e_phoff", 4),
        ("e_shoff", 4),
        ("e_flags", 4),
        ("e_ehsize", 2),
        ("e_phentsize", 2),
        ("e_phnum", 2),
        ("e_shentsize", 2),
        ("e_shnum", 2),
        ("e_shstrndx", 2),
    ],
};

/// `Elf64_Ehdr`.
pub static ELF64_HEADER: FieldLayout = FieldLayout {
    fields: &[
        ("e_ident", 16),
        ("e_type", 2),
        ("e_machine", 2),
        ("e_version", 4),
        ("e_entry", 8),
        ("e_phoff", 8),
        ("e_shoff", 8),
        ("e_flags", 4),
        ("e_ehsize", 2),
        ("e_phentsize", 2),
        ("e_phnum", 2),
        ("e_shentsize", 2),
        ("e_shnum", 2),
        ("e_shstrndx", 2),
    ],
};

/// `Elf32_Shdr`.
pub static ELF32_SECTION: FieldLayout = FieldLayout {
    fields: &[
        ("sh_name", 4),
        ("sh_type", 4),
        ("sh_flags", 4),
        ("sh_addr", 4),
        ("sh_offset", 4),
        ("sh_size", 4),
        ("sh_link", 4),
        ("sh_info", 4),
        ("sh_addralign", 4),
        ("sh_entsize", 4),
    ],
};

/// `Elf64_Shdr`.
pub static ELF64_SECTION: FieldLayout = FieldLayout {
    fields: &[
        ("sh_name", 4),
        ("sh_type", 4),
        ("sh_flags", 8),
        ("sh_addr", 8),
        ("sh_offset", 8),
        ("sh_size", 8),
        ("sh_link", 4),
        ("sh_info", 4),
        ("sh_addralign", 8),
        ("sh_entsize", 8),
    ],
};

impl FieldLayout {
    /// The file header layout for `width`.
    #[must_use]
    pub fn header(width: BitWidth) -> &'static Self {
        match width {
            BitWidth::Bits32 => &ELF32_HEADER,
            BitWidth::Bits64 => &ELF64_HEADER,
        }
    }

    /// The section header entry layout for `width`.
    #[must_use]
    pub fn section(width: BitWidth) -> &'static Self {
        match width {
            BitWidth::Bits32 => &ELF32_SECTION,
            BitWidth::Bits64 => &ELF64_SECTION,
        }
    }

    /// Total size of the structure in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.fields.iter().map(|&(_, w)| w).sum()
    }

    /// Iterates over `(name, field)` pairs in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Field)> + '_ {
        self.fields.iter().scan(0u64, |offset, &(name, width)| {
            let field = Field {
                offset: *offset,
                width,
            };
            *offset += width;
            Some((name, field))
        })
    }

    /// Looks up a field by name.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownField`] if `name` is not in this layout.
    pub fn field(&self, name: &str) -> Result<Field, DecodeError> {
        self.iter()
            .find(|&(n, _)| n == name)
            .map(|(_, f)| f)
            .ok_or_else(|| DecodeError::UnknownField(name.to_string()))
    }

    /// Byte offset of a field.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownField`] if `name` is not in this layout.
    pub fn field_offset(&self, name: &str) -> Result<u64, DecodeError> {
        self.field(name).map(|f| f.offset)
    }

    /// Reads a field of a structure at offset 0, little-endian.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownField`] for an unknown name, or any
    /// error from the underlying read.
    pub fn read_field(&self, data: &[u8], name: &str) -> Result<u64, DecodeError> {
        self.read_field_at(data, 0, name, ByteOrder::Little)
    }

    /// Reads a field of a structure located at `base` in `data`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownField`] for an unknown name, or any
    /// error from the underlying read.
    pub fn read_field_at(
        &self,
        data: &[u8],
        base: u64,
        name: &str,
        order: ByteOrder,
    ) -> Result<u64, DecodeError> {
        let (start, end) = self.field(name)?.span(base);
        read_u64(data, start, end, order)
    }
}
