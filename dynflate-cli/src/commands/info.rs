//! Info command implementation.

use super::open_member;
use dynflate_inflate::BlockSummary;
use serde::Serialize;
use std::io;
use std::path::Path;

/// JSON serializable per-block data.
#[derive(Debug, Serialize)]
struct BlockJson {
    index: usize,
    is_final: bool,
    hlit: usize,
    hdist: usize,
    hclen: usize,
    literals: u64,
    matches: u64,
    bytes: u64,
    start_bit: u64,
    end_bit: u64,
}

impl BlockJson {
    fn from_summary(s: &BlockSummary) -> Self {
        Self {
            index: s.index,
            is_final: s.is_final,
            hlit: s.hlit,
            hdist: s.hdist,
            hclen: s.hclen,
            literals: s.literals,
            matches: s.matches,
            bytes: s.bytes,
            start_bit: s.start_bit,
            end_bit: s.end_bit,
        }
    }
}

/// JSON output for a GZIP member.
#[derive(Debug, Serialize)]
struct InfoJson {
    file: String,
    compressed_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    mtime: u32,
    xfl: u8,
    os: u8,
    os_name: String,
    text: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra_len: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_crc: Option<u16>,
    crc32: u32,
    isize: u32,
    decoded: u64,
    blocks: Vec<BlockJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let compressed_size = std::fs::metadata(input)?.len();
    let mut gzip = open_member(input, true, None)?;
    let header = gzip.header().clone();
    let trailer = gzip.trailer()?;

    let mut blocks = Vec::new();
    let result = gzip.decompress_to(&mut io::sink(), |s| blocks.push(*s));
    let decoded = blocks.last().map_or(0, |s| s.total_out);

    if json {
        let output = InfoJson {
            file: input.display().to_string(),
            compressed_size,
            filename: header.filename.clone(),
            comment: header.comment.clone(),
            mtime: header.mtime,
            xfl: header.xfl,
            os: header.os,
            os_name: header.os_name().to_string(),
            text: header.is_text(),
            extra_len: header.extra_len,
            header_crc: header.header_crc,
            crc32: trailer.crc32,
            isize: trailer.isize,
            decoded,
            blocks: blocks.iter().map(BlockJson::from_summary).collect(),
            error: result.as_ref().err().map(ToString::to_string),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        result?;
        return Ok(());
    }

    println!("GZIP Member Information");
    println!("=======================");
    println!("File: {}", input.display());
    println!("Size: {} bytes", compressed_size);

    println!();
    println!("Header:");
    if let Some(name) = &header.filename {
        println!("  Original filename: {}", name);
    }
    if let Some(comment) = &header.comment {
        println!("  Comment: {}", comment);
    }
    if header.mtime > 0 {
        println!("  Modification time: {} (Unix timestamp)", header.mtime);
    }
    println!("  Extra flags: {}", header.xfl);
    println!("  OS: {} ({})", header.os_name(), header.os);
    if let Some(len) = header.extra_len {
        println!("  Extra field: {} bytes", len);
    }
    if header.is_text() {
        println!("  Text hint: set");
    }

    println!();
    println!("Trailer:");
    println!("  CRC-32: {:#010x} (not verified)", trailer.crc32);
    println!("  ISIZE: {} bytes", trailer.isize);

    println!();
    println!(
        "{:>5} {:>5} {:>5} {:>5} {:>10} {:>10} {:>10}",
        "Block", "HLIT", "HDIST", "HCLEN", "Literals", "Matches", "Bytes"
    );
    println!("{}", "-".repeat(58));
    for s in &blocks {
        println!(
            "{:>5} {:>5} {:>5} {:>5} {:>10} {:>10} {:>10}{}",
            s.index,
            s.hlit,
            s.hdist,
            s.hclen,
            s.literals,
            s.matches,
            s.bytes,
            if s.is_final { "  final" } else { "" }
        );
    }
    println!("{}", "-".repeat(58));
    println!("{} blocks, {} bytes decoded", blocks.len(), decoded);
    if decoded > 0 {
        println!(
            "Compression ratio: {:.1}%",
            (1.0 - compressed_size as f64 / decoded as f64) * 100.0
        );
    }

    result?;
    Ok(())
}
