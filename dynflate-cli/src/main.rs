//! dynflate CLI - dynamic-Huffman GZIP decoder
//!
//! Decompresses, tests and inspects GZIP files whose DEFLATE stream uses
//! dynamic Huffman blocks only.

mod commands;
mod utils;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{DecompressOptions, cmd_decompress, cmd_info, cmd_test};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dynflate")]
#[command(
    author,
    version,
    about = "Pure Rust decoder for dynamic-Huffman GZIP streams"
)]
#[command(long_about = "
dynflate decodes GZIP files whose DEFLATE stream consists of dynamic
Huffman blocks (BTYPE 2). Stored and fixed-Huffman blocks are reported as
unsupported, together with the index of the block that used them.

Examples:
  dynflate decompress notes.txt.gz
  dynflate decompress -o out.txt --progress big.gz
  dynflate decompress --stdout data.gz | wc -c
  dynflate test data.gz
  dynflate info --json data.gz
")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompress a GZIP file
    #[command(alias = "d")]
    Decompress {
        /// GZIP file to decompress
        file: PathBuf,

        /// Output file (defaults to the stored name, or FILE without .gz)
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<PathBuf>,

        /// Write to standard output
        #[arg(short = 'c', long)]
        stdout: bool,

        /// Overwrite without asking
        #[arg(short, long)]
        force: bool,

        /// Keep only the 32 KiB window in memory instead of the whole output
        #[arg(short, long)]
        keep_window: bool,

        /// Fail once output exceeds this many bytes
        #[arg(long, value_name = "BYTES")]
        limit: Option<u64>,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decode a GZIP file and discard the output
    #[command(alias = "t")]
    Test {
        /// GZIP file to test
        file: PathBuf,
    },

    /// Show header, trailer and per-block information
    #[command(alias = "i")]
    Info {
        /// GZIP file to inspect
        file: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Print shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Decompress {
            file,
            output,
            stdout,
            force,
            keep_window,
            limit,
            progress,
        } => cmd_decompress(
            &file,
            &DecompressOptions {
                output,
                stdout,
                force,
                keep_window,
                limit,
                progress,
            },
        ),
        Commands::Test { file } => cmd_test(&file, cli.verbose > 0),
        Commands::Info { file, json } => cmd_info(&file, json),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "dynflate", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_decompress() {
        let cli = Cli::try_parse_from([
            "dynflate", "-vv", "decompress", "in.gz", "-o", "out", "-k", "--limit", "1000",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Decompress {
                file,
                output,
                keep_window,
                limit,
                stdout,
                ..
            } => {
                assert_eq!(file, PathBuf::from("in.gz"));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert!(keep_window);
                assert!(!stdout);
                assert_eq!(limit, Some(1000));
            }
            _ => panic!("expected decompress"),
        }
    }

    #[test]
    fn test_output_conflicts_with_stdout() {
        assert!(Cli::try_parse_from(["dynflate", "decompress", "a.gz", "-o", "x", "-c"]).is_err());
    }
}
