//! Command implementations for the dynflate CLI.

pub mod decompress;
pub mod info;

pub use decompress::{DecompressOptions, cmd_decompress};
pub use info::cmd_info;
pub use test::cmd_test;

use dynflate_gzip::GzipReader;
use dynflate_inflate::{InflateOptions, Retention};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Open `path` as a GZIP member.
fn open_member(
    path: &Path,
    window_only: bool,
    limit: Option<u64>,
) -> Result<GzipReader<BufReader<File>>, Box<dyn std::error::Error>> {
    let retention = if window_only {
        Retention::Window
    } else {
        Retention::Full
    };
    let file = File::open(path)?;
    let reader = GzipReader::new(BufReader::new(file))?
        .options(InflateOptions::new().retention(retention).output_limit(limit));
    Ok(reader)
}
