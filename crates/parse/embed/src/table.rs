//! Embed table walking.
//!
//! Table layout, every field one half-word wide unless noted:
//!
//! ```text
//! header   first_entry_ptr | entry_count | entry_count (duplicate)
//! record   name_ptr | name_len | content_ptr | content_len | digest (16 bytes)
//! ```
//!
//! Records follow the header contiguously. A record is 48 bytes on 64-bit
//! images and 32 bytes on 32-bit images.

use alloc::vec::Vec;

use gembed_elf::{Arch, BitWidth, ByteCursor, DecodeError, read_exact, read_u64};

use crate::entry::{DIGEST_LEN, Digest, FileEntry};

/// Conventional load address of the first byte of a 64-bit image.
pub const ELF64_BASE_ADDR: u64 = 0x40_0000;

/// Conventional load address of the first byte of a 32-bit image.
pub const ELF32_BASE_ADDR: u64 = 0x0804_8000;

/// Returns the conventional base load address for `width`.
#[must_use]
pub fn default_base_addr(width: BitWidth) -> u64 {
    match width {
        BitWidth::Bits32 => ELF32_BASE_ADDR,
        BitWidth::Bits64 => ELF64_BASE_ADDR,
    }
}

/// Translates a virtual address to a file offset.
///
/// # Errors
///
/// Returns [`DecodeError::AddressBelowBase`] if `addr < base`.
pub fn translate(addr: u64, base: u64) -> Result<u64, DecodeError> {
    addr.checked_sub(base)
        .ok_or(DecodeError::AddressBelowBase { addr, base })
}

/// The three header words at the start of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    /// File offset of the table.
    pub offset: u64,
    /// Virtual address stored in the first header word.
    pub first_entry_addr: u64,
    /// Number of records that follow the header.
    pub entry_count: u64,
}

impl TableHeader {
    /// The first-entry pointer translated to a file offset, if it can be.
    #[must_use]
    pub fn first_entry_offset(&self, base: u64) -> Option<u64> {
        self.first_entry_addr.checked_sub(base)
    }
}

/// A fully decoded embed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedTable {
    /// The decoded header.
    pub header: TableHeader,
    entries: Vec<FileEntry>,
}

impl EmbedTable {
    /// The entries in table order.
    #[must_use]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Consumes the table, returning its entries in table order.
    #[must_use]
    pub fn into_entries(self) -> Vec<FileEntry> {
        self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table lists no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all content lengths.
    #[must_use]
    pub fn total_content_len(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.content_len))
    }

    /// Number of directory entries.
    #[must_use]
    pub fn dir_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_directory).count()
    }

    /// Number of file entries.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.len() - self.dir_count()
    }
}

/// Decodes the embed table at virtual address `table_addr`.
///
/// `base` is the virtual address of the image's first byte; see
/// [`default_base_addr`]. Records are decoded in table order and the first
/// bad record aborts the walk.
///
/// # Errors
///
/// Returns [`DecodeError::AddressBelowBase`] if the table or a non-empty
/// name cannot be translated, [`DecodeError::OutOfRange`] if any field lies
/// outside `data`, and [`DecodeError::MalformedInteger`] if a field does not
/// fit in a `u64`.
pub fn read_table(
    data: &[u8],
    table_addr: u64,
    arch: Arch,
    base: u64,
) -> Result<EmbedTable, DecodeError> {
    let offset = translate(table_addr, base)?;
    let mut cursor = ByteCursor::new(offset, arch.bit_width);

    let (start, end) = cursor.take_half_word();
    let first_entry_addr = read_u64(data, start, end, arch.byte_order)?;
    let (start, end) = cursor.take_half_word();
    let entry_count = read_u64(data, start, end, arch.byte_order)?;
    // Duplicate of the count; read so a truncated header is still caught.
    let (start, end) = cursor.take_half_word();
    read_exact(data, start, end)?;

    let header = TableHeader {
        offset,
        first_entry_addr,
        entry_count,
    };

    // Never trust the count for the allocation: it may be garbage.
    let remaining = (data.len() as u64).saturating_sub(cursor.current());
    let capacity = entry_count.min(remaining / cursor.record_size());
    let mut entries = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));

    for _ in 0..entry_count {
        entries.push(read_entry(data, cursor.current(), arch, base)?);
        cursor.advance_record();
    }

    Ok(EmbedTable { header, entries })
}

/// Decodes the single record at file offset `offset`.
///
/// # Errors
///
/// As [`read_table`].
pub fn read_entry(data: &[u8], offset: u64, arch: Arch, base: u64) -> Result<FileEntry, DecodeError> {
    let order = arch.byte_order;
    let mut cursor = ByteCursor::new(offset, arch.bit_width);
    let mut next = || {
        let (start, end) = cursor.take_half_word();
        read_u64(data, start, end, order)
    };

    let name_addr = next()?;
    let name_len = next()?;
    let content_addr = next()?;
    let content_len = next()?;

    let name_ptr = if name_len == 0 {
        0
    } else {
        translate(name_addr, base)?
    };
    // A nil content pointer lands below the base and means "no content".
    let content_ptr = content_addr.saturating_sub(base);

    let (start, end) = cursor.take(DIGEST_LEN as u64);
    let mut hash = Digest::default();
    hash.0.copy_from_slice(read_exact(data, start, end)?);

    Ok(FileEntry {
        record_offset: offset,
        name_ptr,
        name_len,
        content_ptr,
        content_len,
        hash,
        is_directory: content_len == 0,
    })
}
