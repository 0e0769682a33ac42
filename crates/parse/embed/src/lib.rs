//! Reader for embed tables packed into ELF executables.
//!
//! An embed table is a flat, address-relative list of file and directory
//! records placed in an image's data by the build step that produced it.
//! [`read_table`] walks the table from a caller-supplied virtual address
//! and returns every record as a [`FileEntry`], in table order.
//!
//! # Usage
//!
//! ```
//! use gembed_elf::ElfIdentity;
//! use gembed_embed::{default_base_addr, read_table};
//!
//! fn count_files(data: &[u8], table_addr: u64) -> Option<usize> {
//!     let arch = ElfIdentity::parse(data).arch().ok()?;
//!     let base = default_base_addr(arch.bit_width);
//!     let table = read_table(data, table_addr, arch, base).ok()?;
//!     Some(table.file_count())
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod entry;
pub mod table;

pub use entry::{DIGEST_LEN, Digest, FileEntry};
pub use table::{
    ELF32_BASE_ADDR, ELF64_BASE_ADDR, EmbedTable, TableHeader, default_base_addr, read_entry,
    read_table, translate,
};
