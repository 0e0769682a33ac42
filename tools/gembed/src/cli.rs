//! Command-line interface definitions for gembed.

use std::path::PathBuf;

use clap::Parser;

/// Inspect an ELF executable and extract the files listed in its embed table.
#[derive(Parser, Debug)]
#[command(name = "gembed", version, about)]
pub struct Cli {
    /// Path to the ELF image to inspect.
    pub image: PathBuf,

    /// Virtual address of the embed table, in hex (`0x` prefix optional).
    pub address: String,

    /// Write the decoded files and directories to disk.
    #[arg(long, overrides_with = "no_extract")]
    pub extract: bool,

    /// Only report the table contents (default).
    #[arg(long, overrides_with = "extract")]
    pub no_extract: bool,

    /// Directory to extract into (default: `output/<image file name>`).
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Base load address of the image, in hex (default: by word size).
    #[arg(long)]
    pub base_addr: Option<String>,

    /// Print the section header table and the location of `.rodata`.
    #[arg(long)]
    pub sections: bool,

    /// TOML file with default settings.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Print only errors.
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print every entry, the base address and phase timings.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// The extraction toggle as given on the command line, if given.
    pub fn extract_flag(&self) -> Option<bool> {
        if self.extract {
            Some(true)
        } else if self.no_extract {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gembed").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn positional_arguments() {
        let cli = parse(&["app.bin", "0x4c3ea0"]);
        assert_eq!(cli.image, PathBuf::from("app.bin"));
        assert_eq!(cli.address, "0x4c3ea0");
        assert_eq!(cli.extract_flag(), None);
        assert!(cli.output.is_none());
    }

    #[test]
    fn last_extract_flag_wins() {
        assert_eq!(parse(&["a", "1", "--extract"]).extract_flag(), Some(true));
        assert_eq!(parse(&["a", "1", "--no-extract"]).extract_flag(), Some(false));
        assert_eq!(
            parse(&["a", "1", "--extract", "--no-extract"]).extract_flag(),
            Some(false)
        );
        assert_eq!(
            parse(&["a", "1", "--no-extract", "--extract"]).extract_flag(),
            Some(true)
        );
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let res = Cli::try_parse_from(["gembed", "a", "1", "-q", "-v"]);
        assert!(res.is_err());
    }

    #[test]
    fn missing_address_is_an_error() {
        assert!(Cli::try_parse_from(["gembed", "a"]).is_err());
    }
}
