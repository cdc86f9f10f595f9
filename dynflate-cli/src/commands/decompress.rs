//! Decompress command implementation.

use super::open_member;
use crate::utils::{create_progress_bar, default_output, part_path};
use dialoguer::Confirm;
use dynflate_gzip::GzipReader;
use filetime::FileTime;
use indicatif::ProgressBar;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

type Member = GzipReader<BufReader<File>>;

/// Options for decompressing a file.
pub struct DecompressOptions {
    pub output: Option<PathBuf>,
    pub stdout: bool,
    pub force: bool,
    pub keep_window: bool,
    pub limit: Option<u64>,
    pub progress: bool,
}

pub fn cmd_decompress(
    input: &Path,
    options: &DecompressOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut gzip = open_member(input, options.keep_window, options.limit)?;
    let header = gzip.header().clone();
    let trailer = gzip.trailer()?;

    let pb = create_progress_bar(trailer.isize as u64, options.progress);

    if options.stdout {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        let written = gzip.decompress_to(&mut writer, |s| pb.set_position(s.total_out))?;
        pb.finish_and_clear();
        log::info!("{}: {written} bytes to stdout", input.display());
        return Ok(());
    }

    let output = match &options.output {
        Some(path) => path.clone(),
        None => default_output(input, &header),
    };

    if output.exists() && !options.force {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", output.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            return Err(format!("{} not overwritten", output.display()).into());
        }
    }

    let part = part_path(&output);
    let written = match write_part(&mut gzip, &part, &pb) {
        Ok(written) => written,
        Err(e) => {
            pb.abandon();
            let _ = fs::remove_file(&part);
            return Err(e);
        }
    };

    fs::rename(&part, &output)?;
    if let Some(mtime) = header.modified() {
        filetime::set_file_mtime(&output, FileTime::from_system_time(mtime))?;
    }

    pb.finish_and_clear();
    log::info!(
        "{} -> {}: {written} bytes",
        input.display(),
        output.display()
    );

    Ok(())
}

fn write_part(
    gzip: &mut Member,
    part: &Path,
    pb: &ProgressBar,
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut writer = BufWriter::new(File::create(part)?);
    let written = gzip.decompress_to(&mut writer, |s| {
        pb.set_position(s.total_out);
        pb.set_message(format!("block {}", s.index));
    })?;
    writer.flush()?;
    Ok(written)
}
