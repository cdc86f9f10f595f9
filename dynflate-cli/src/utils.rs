//! Utility functions for the CLI.

use dynflate_gzip::GzipHeader;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::path::{Path, PathBuf};

/// Create a byte progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb
}

/// Log level for the number of `-v` flags, starting from warnings only.
pub fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger.
pub fn init_logging(verbosity: u8) {
    let _ = env_logger::Builder::new()
        .filter_level(level_filter(verbosity))
        .format_timestamp(None)
        .try_init();
}

/// Output path for `input` when none was given.
///
/// Uses the stored file name (its last component only) next to the input,
/// then the input name with `.gz` stripped, then `<input>.out`.
pub fn default_output(input: &Path, header: &GzipHeader) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));

    if let Some(name) = header
        .filename
        .as_deref()
        .and_then(|name| Path::new(name).file_name())
    {
        return dir.join(name);
    }

    match input.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("gz") => input.with_extension(""),
        _ => {
            let mut name = input.as_os_str().to_owned();
            name.push(".out");
            PathBuf::from(name)
        }
    }
}

/// Temporary path output is written to before the final rename.
pub fn part_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
