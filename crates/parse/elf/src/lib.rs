//! Minimal ELF32/ELF64 reader for locating data inside executable images.
//!
//! Decodes just enough of an ELF image to drive the embed-table reader:
//! the identification bytes (word size and byte order), the file header
//! fields that locate the section header table, and the section headers
//! themselves with their names resolved. Every read is bounds-checked and
//! reported as a [`DecodeError`]; malformed input never panics.
//!
//! # Usage
//!
//! ```
//! use gembed_elf::{ElfIdentity, SectionTable};
//!
//! fn rodata_span(data: &[u8]) -> Option<(u64, u64)> {
//!     let arch = ElfIdentity::parse(data).arch().ok()?;
//!     let sections = SectionTable::parse(data, arch).ok()?;
//!     sections.rodata().map(|s| s.span())
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod bytes;
pub mod cursor;
pub mod error;
pub mod header;
pub mod layout;
pub mod section;

pub use bytes::{ByteOrder, read_as_int, read_exact, read_raw, read_u64};
pub use cursor::ByteCursor;
pub use error::DecodeError;
pub use header::{Arch, BitWidth, ELF_MAGIC, ElfIdentity};
pub use layout::{Field, FieldLayout};
pub use section::{RODATA, SectionHeaderEntry, SectionTable, StringTable, list_sections};
