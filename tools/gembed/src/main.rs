//! Locate and extract the embed table of an ELF executable.
//!
//! Pipeline: read image → identify word size and byte order → (optionally)
//! list sections → decode the embed table → report → (optionally) extract.
//!
//! Usage:
//!   gembed <IMAGE> <ADDRESS>                 - Report the table contents
//!   gembed <IMAGE> <ADDRESS> --extract       - Extract to output/<IMAGE>
//!   gembed <IMAGE> <ADDRESS> --extract -o D  - Extract to D
//!   gembed <IMAGE> <ADDRESS> --sections      - Also print section headers

mod cli;
mod config;
mod extract;
mod verbose;

use anyhow::{Context, Result};
use clap::Parser;
use gembed_elf::{Arch, ElfIdentity, SectionTable};
use gembed_embed::{EmbedTable, read_table};

use crate::config::Settings;
use crate::verbose::{Timer, dprintln, vprintln, wprintln};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    verbose::init(cli.quiet, cli.verbose);
    let settings = Settings::resolve(&cli)?;
    run(&settings)
}

fn run(settings: &Settings) -> Result<()> {
    let data = std::fs::read(&settings.image)
        .with_context(|| format!("Failed to read {}", settings.image.display()))?;

    let identity = ElfIdentity::parse(&data);
    if !identity.has_magic() {
        wprintln!(
            "{} does not start with the ELF magic bytes",
            settings.image.display()
        );
    }
    let arch = identity
        .arch()
        .with_context(|| format!("{} is not a supported ELF image", settings.image.display()))?;
    let base = settings.base_addr(arch.bit_width);

    dprintln!("[+] Embed Struct @ {:#x}", settings.table_addr);
    dprintln!(
        "[+] File: {}  Endianess: {}  Bits: {}",
        settings.image.display(),
        arch.byte_order.name(),
        arch.bit_width.bits()
    );
    vprintln!("[+] Base Address @ {base:#x}");

    if settings.sections {
        print_sections(&data, arch)?;
    }

    let table = {
        let _t = Timer::start("decode");
        read_table(&data, settings.table_addr, arch, base).with_context(|| {
            format!(
                "Failed to decode embed table at {:#x} in {}",
                settings.table_addr,
                settings.image.display()
            )
        })?
    };

    match table.header.first_entry_offset(base) {
        Some(offset) => dprintln!("[+] First Entry @ {offset:#x}"),
        None => wprintln!(
            "first entry pointer {:#x} lies below base address {base:#x}",
            table.header.first_entry_addr
        ),
    }
    print_entries(&data, &table);
    dprintln!(
        "[+] Found {} files, Total Size : {} bytes",
        table.len(),
        table.total_content_len()
    );

    if settings.extract {
        dprintln!("[+] Extracting Files to {}", settings.output.display());
        let _t = Timer::start("extract");
        let plan = extract::plan(&data, table.entries(), &settings.output)?;
        let summary = extract::materialize(&plan)?;
        dprintln!(
            "[+] Wrote {} files ({} bytes) and {} directories",
            summary.files,
            summary.bytes,
            summary.dirs
        );
    }

    Ok(())
}

/// Print every section header and where `.rodata` lives.
fn print_sections(data: &[u8], arch: Arch) -> Result<()> {
    let sections = SectionTable::parse(data, arch).context("Failed to read section headers")?;
    dprintln!("[+] {} sections", sections.len());
    for (i, s) in sections.iter().enumerate() {
        dprintln!(
            "    [{i:>2}] {:<24} off={:#010x} size={:#x}",
            s.name,
            s.file_offset,
            s.size
        );
    }
    match sections.rodata() {
        Some(s) => dprintln!("[+] .rodata @ {:#x} ({:#x} bytes)", s.file_offset, s.size),
        None => dprintln!("[+] no .rodata section"),
    }
    Ok(())
}

/// Print one line per entry in verbose mode.
fn print_entries(data: &[u8], table: &EmbedTable) {
    if !verbose::is_verbose() {
        return;
    }
    for (i, e) in table.entries().iter().enumerate() {
        let name = e
            .name(data)
            .map_or_else(|_| "<out of range>".into(), String::from_utf8_lossy);
        let kind = if e.is_directory { "dir " } else { "file" };
        vprintln!(
            "    [{i:>4}] {kind} {:>10} {} {name}",
            e.content_len,
            e.hash
        );
    }
}
