//! Settings resolution: command line over config file over defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use gembed_elf::BitWidth;
use gembed_embed::default_base_addr;
use serde::Deserialize;

use crate::cli::Cli;

/// Directory extraction defaults to, under the current directory.
const DEFAULT_OUTPUT_DIR: &str = "output";

/// Optional settings file.
///
/// ```toml
/// extract = true
/// output = "extracted"
/// base-address-64 = 0x400000
/// base-address-32 = 0x08048000
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FileConfig {
    extract: Option<bool>,
    output: Option<PathBuf>,
    base_address_64: Option<u64>,
    base_address_32: Option<u64>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Image to inspect.
    pub image: PathBuf,
    /// Virtual address of the embed table.
    pub table_addr: u64,
    /// Whether to write entries to disk.
    pub extract: bool,
    /// Extraction root.
    pub output: PathBuf,
    /// Print the section header table.
    pub sections: bool,
    base_override: Option<u64>,
    base_64: Option<u64>,
    base_32: Option<u64>,
}

impl Settings {
    /// Resolves settings from the command line and the optional config file.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let table_addr = parse_hex(&cli.address)
            .with_context(|| format!("Invalid embed table address `{}`", cli.address))?;
        let base_override = cli
            .base_addr
            .as_deref()
            .map(|s| parse_hex(s).with_context(|| format!("Invalid base address `{s}`")))
            .transpose()?;

        let output = match cli.output.clone().or(file.output) {
            Some(dir) => dir,
            None => default_output(&cli.image)?,
        };

        Ok(Self {
            image: cli.image.clone(),
            table_addr,
            extract: cli.extract_flag().or(file.extract).unwrap_or(false),
            output,
            sections: cli.sections,
            base_override,
            base_64: file.base_address_64,
            base_32: file.base_address_32,
        })
    }

    /// Base load address for an image of the given word size.
    pub fn base_addr(&self, width: BitWidth) -> u64 {
        let configured = match width {
            BitWidth::Bits32 => self.base_32,
            BitWidth::Bits64 => self.base_64,
        };
        self.base_override
            .or(configured)
            .unwrap_or_else(|| default_base_addr(width))
    }
}

/// Parses a hexadecimal address, with or without a `0x` prefix.
pub fn parse_hex(s: &str) -> Result<u64> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
        .replace('_', "");
    if digits.is_empty() {
        bail!("empty address");
    }
    u64::from_str_radix(&digits, 16).context("not a hexadecimal number")
}

/// `output/<image file name>`, relative to the current directory.
fn default_output(image: &Path) -> Result<PathBuf> {
    let name = image
        .file_name()
        .with_context(|| format!("{} has no file name", image.display()))?;
    Ok(Path::new(DEFAULT_OUTPUT_DIR).join(name))
}
