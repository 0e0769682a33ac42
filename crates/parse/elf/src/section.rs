//! Section header table parsing.
//!
//! Decodes every entry of the section header table, then resolves each
//! entry's name through the section header string table (`e_shstrndx`).

use alloc::string::String;
use alloc::vec::Vec;

use crate::bytes::read_exact;
use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::header::Arch;
use crate::layout::FieldLayout;

/// Name of the read-only data section.
pub const RODATA: &str = ".rodata";

/// One decoded section header entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeaderEntry {
    /// Name resolved through the section header string table.
    pub name: String,
    /// Offset of the name in the section header string table (`sh_name`).
    pub name_index: u32,
    /// File offset of the section data (`sh_offset`).
    pub file_offset: u64,
    /// Size of the section data in bytes (`sh_size`).
    pub size: u64,
}

impl SectionHeaderEntry {
    /// Returns `(start, end)` of the section data in the file.
    #[must_use]
    pub fn span(&self) -> (u64, u64) {
        (
            self.file_offset,
            self.file_offset.saturating_add(self.size),
        )
    }
}

/// A NUL-delimited string table section.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    data: &'a [u8],
}

impl<'a> StringTable<'a> {
    /// Creates a new string table from the raw section data.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Returns the bytes from `offset` up to the next NUL.
    ///
    /// A string running to the end of the table without a terminator is
    /// returned whole. Returns `None` if `offset` is past the end.
    #[must_use]
    pub fn get(&self, offset: u32) -> Option<&'a [u8]> {
        let remaining = self.data.get(usize::try_from(offset).ok()?..)?;
        let end = remaining
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(remaining.len());
        Some(&remaining[..end])
    }
}

/// All section headers of an image, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTable {
    sections: Vec<SectionHeaderEntry>,
}

impl SectionTable {
    /// Decodes the section header table of `data`.
    ///
    /// # Errors
    ///
    /// See [`list_sections`].
    pub fn parse(data: &[u8], arch: Arch) -> Result<Self, DecodeError> {
        list_sections(data, arch).map(|sections| Self { sections })
    }

    /// Finds the first section with the given name.
    #[must_use]
    pub fn find_section(&self, name: &str) -> Option<&SectionHeaderEntry> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Shorthand for `find_section(".rodata")`.
    #[must_use]
    pub fn rodata(&self) -> Option<&SectionHeaderEntry> {
        self.find_section(RODATA)
    }

    /// Returns the raw bytes of a section.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::OutOfRange`] if the section lies outside `data`.
    pub fn section_data<'a>(
        &self,
        data: &'a [u8],
        section: &SectionHeaderEntry,
    ) -> Result<&'a [u8], DecodeError> {
        let (start, end) = section.span();
        read_exact(data, start, end)
    }

    /// Iterates over the sections in table order.
    pub fn iter(&self) -> impl Iterator<Item = &SectionHeaderEntry> {
        self.sections.iter()
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns `true` if the image has no section headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// A section entry before its name has been resolved.
struct RawSection {
    name_index: u32,
    file_offset: u64,
    size: u64,
}

/// Decodes every section header entry of `data`, names resolved.
///
/// Header fields are read in the image's own byte order. An image with
/// `e_shnum == 0` yields an empty list.
///
/// # Errors
///
/// Returns [`DecodeError::OutOfRange`] if the header, any table entry or the
/// string table section lies outside `data`, and
/// [`DecodeError::SectionIndexOutOfRange`] if `e_shstrndx` does not name a
/// decoded entry.
pub fn list_sections(data: &[u8], arch: Arch) -> Result<Vec<SectionHeaderEntry>, DecodeError> {
    let order = arch.byte_order;
    let header = FieldLayout::header(arch.bit_width);
    let e_shoff = header.read_field_at(data, 0, "e_shoff", order)?;
    let e_shentsize = header.read_field_at(data, 0, "e_shentsize", order)?;
    let e_shnum = header.read_field_at(data, 0, "e_shnum", order)?;
    let e_shstrndx = header.read_field_at(data, 0, "e_shstrndx", order)?;

    if e_shnum == 0 {
        return Ok(Vec::new());
    }

    let layout = FieldLayout::section(arch.bit_width);
    let mut cursor = ByteCursor::with_record(e_shoff, arch.bit_width, e_shentsize);
    let mut raw = Vec::new();

    for _ in 0..e_shnum {
        let start = cursor.current();
        // The whole entry must be present, not just the fields used here.
        read_exact(data, start, start.saturating_add(e_shentsize))?;

        let name_index = layout.read_field_at(data, start, "sh_name", order)?;
        raw.push(RawSection {
            // sh_name is 4 bytes wide in both layouts.
            name_index: u32::try_from(name_index).unwrap_or(u32::MAX),
            file_offset: layout.read_field_at(data, start, "sh_offset", order)?,
            size: layout.read_field_at(data, start, "sh_size", order)?,
        });
        cursor.advance_record();
    }

    let strtab_entry = usize::try_from(e_shstrndx)
        .ok()
        .and_then(|i| raw.get(i))
        .ok_or(DecodeError::SectionIndexOutOfRange {
            index: e_shstrndx,
            count: e_shnum,
        })?;
    let strtab = StringTable::new(read_exact(
        data,
        strtab_entry.file_offset,
        strtab_entry.file_offset.saturating_add(strtab_entry.size),
    )?);

    Ok(raw
        .into_iter()
        .map(|s| SectionHeaderEntry {
            name: strtab
                .get(s.name_index)
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default(),
            name_index: s.name_index,
            file_offset: s.file_offset,
            size: s.size,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::ByteOrder;
    use crate::header::BitWidth;
    use crate::header::tests::make_ident;

    /// Write `value` into the named field of the structure at `base`.
    fn put_field(
        buf: &mut [u8],
        layout: &FieldLayout,
        base: u64,
        name: &str,
        value: u64,
        order: ByteOrder,
    ) {
        let field = layout.field(name).expect("known field");
        let start = (base + field.offset) as usize;
        let width = field.width as usize;
        let bytes = match order {
            ByteOrder::Little => value.to_le_bytes()[..width].to_vec(),
            ByteOrder::Big => value.to_be_bytes()[8 - width..].to_vec(),
        };
        buf[start..start + width].copy_from_slice(&bytes);
    }

    /// Build an image with a NULL section, the given sections and a
    /// trailing `.shstrtab`.
    ///
    /// Layout: header | section data | shstrtab | section header table.
    fn make_image(arch: Arch, sections: &[(&str, &[u8])]) -> Vec<u8> {
        let header = FieldLayout::header(arch.bit_width);
        let shdr = FieldLayout::section(arch.bit_width);
        let class = match arch.bit_width {
            BitWidth::Bits32 => 1,
            BitWidth::Bits64 => 2,
        };
        let data = match arch.byte_order {
            ByteOrder::Little => 1,
            ByteOrder::Big => 2,
        };

        let mut buf = make_ident(class, data);
        buf.resize(header.size() as usize, 0);

        let mut shstrtab = vec![0u8];
        // (name_index, offset, size)
        let mut entries = vec![(0u32, 0u64, 0u64)];
        for (name, bytes) in sections {
            entries.push((shstrtab.len() as u32, buf.len() as u64, bytes.len() as u64));
            shstrtab.extend_from_slice(name.as_bytes());
            shstrtab.push(0);
            buf.extend_from_slice(bytes);
        }
        let strtab_name = shstrtab.len() as u32;
        shstrtab.extend_from_slice(b".shstrtab\0");
        entries.push((strtab_name, buf.len() as u64, shstrtab.len() as u64));
        buf.extend_from_slice(&shstrtab);

        let shoff = buf.len() as u64;
        let order = arch.byte_order;
        for (name_index, offset, size) in &entries {
            let base = buf.len() as u64;
            buf.resize(buf.len() + shdr.size() as usize, 0);
            put_field(&mut buf, shdr, base, "sh_name", u64::from(*name_index), order);
            put_field(&mut buf, shdr, base, "sh_offset", *offset, order);
            put_field(&mut buf, shdr, base, "sh_size", *size, order);
        }

        put_field(&mut buf, header, 0, "e_shoff", shoff, order);
        put_field(&mut buf, header, 0, "e_shentsize", shdr.size(), order);
        put_field(&mut buf, header, 0, "e_shnum", entries.len() as u64, order);
        put_field(&mut buf, header, 0, "e_shstrndx", entries.len() as u64 - 1, order);
        buf
    }

    const LE64: Arch = Arch {
        bit_width: BitWidth::Bits64,
        byte_order: ByteOrder::Little,
    };

    const BE32: Arch = Arch {
        bit_width: BitWidth::Bits32,
        byte_order: ByteOrder::Big,
    };

    #[test]
    fn finds_rodata_64() {
        let buf = make_image(
            LE64,
            &[(".text", &[0x90u8; 12][..]), (".rodata", &b"hello\0world"[..])],
        );
        let table = SectionTable::parse(&buf, LE64).expect("valid table");
        assert_eq!(table.len(), 4);

        let rodata = table.rodata().expect(".rodata present");
        assert_eq!(rodata.name, ".rodata");
        assert_eq!(rodata.file_offset, 64 + 12);
        assert_eq!(rodata.size, 11);
        assert_eq!(table.section_data(&buf, rodata), Ok(&b"hello\0world"[..]));
    }

    #[test]
    fn finds_rodata_32_big_endian() {
        let buf = make_image(BE32, &[(".rodata", &[1u8, 2, 3, 0][..])]);
        let table = SectionTable::parse(&buf, BE32).expect("valid table");
        let rodata = table.find_section(".rodata").expect(".rodata present");
        assert_eq!(rodata.file_offset, 52);
        assert_eq!(rodata.size, 4);
        assert_eq!(table.section_data(&buf, rodata), Ok(&[1, 2, 3, 0][..]));
    }

    #[test]
    fn names_resolve_in_order() {
        let buf = make_image(LE64, &[(".text", &b"x"[..]), (".data", &b"y"[..])]);
        let names: Vec<_> = list_sections(&buf, LE64)
            .expect("valid table")
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["", ".text", ".data", ".shstrtab"]);
    }

    #[test]
    fn absent_section_is_none() {
        let buf = make_image(LE64, &[(".text", &b"x"[..])]);
        let table = SectionTable::parse(&buf, LE64).expect("valid table");
        assert!(table.find_section(".rodata").is_none());
        assert!(table.find_section(".debug_info").is_none());
    }

    #[test]
    fn no_sections_is_empty() {
        let mut buf = make_ident(2, 1);
        buf.resize(64, 0);
        let table = SectionTable::parse(&buf, LE64).expect("valid header");
        assert!(table.is_empty());
        assert!(table.rodata().is_none());
    }

    #[test]
    fn truncated_table_is_out_of_range() {
        let buf = make_image(LE64, &[(".rodata", &b"abc"[..])]);
        // Cut one byte off the last section header entry.
        let truncated = &buf[..buf.len() - 1];
        assert!(matches!(
            list_sections(truncated, LE64),
            Err(DecodeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn truncated_header_is_out_of_range() {
        let buf = make_ident(2, 1);
        assert!(matches!(
            list_sections(&buf, LE64),
            Err(DecodeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn bad_shstrndx_is_rejected() {
        let mut buf = make_image(LE64, &[(".rodata", &b"abc"[..])]);
        buf[62..64].copy_from_slice(&9u16.to_le_bytes());
        assert_eq!(
            list_sections(&buf, LE64),
            Err(DecodeError::SectionIndexOutOfRange { index: 9, count: 3 })
        );
    }

    #[test]
    fn string_table_lookup() {
        let strtab = StringTable::new(b"\0.text\0.rodata");
        assert_eq!(strtab.get(0), Some(&b""[..]));
        assert_eq!(strtab.get(1), Some(&b".text"[..]));
        // Unterminated final string runs to the end of the table.
        assert_eq!(strtab.get(7), Some(&b".rodata"[..]));
        assert_eq!(strtab.get(100), None);
    }
}
