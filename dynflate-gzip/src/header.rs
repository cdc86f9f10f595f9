//! GZIP member header and trailer (RFC 1952).

use dynflate_core::error::{DynflateError, Result};
use std::io::Read;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// GZIP magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// GZIP compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// GZIP header flags.
pub mod flags {
    /// Text file.
    pub const FTEXT: u8 = 0x01;
    /// Header CRC present.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
    /// Bits RFC 1952 reserves; they must be zero.
    pub const RESERVED: u8 = 0xE0;
}

/// GZIP member header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    /// Compression method (always 8 once parsed).
    pub method: u8,
    /// Flags.
    pub flags: u8,
    /// Modification time (Unix timestamp, 0 if unknown).
    pub mtime: u32,
    /// Extra flags.
    pub xfl: u8,
    /// Operating system.
    pub os: u8,
    /// Length of the skipped extra field (if FEXTRA flag set).
    pub extra_len: Option<u16>,
    /// Original filename (if FNAME flag set).
    pub filename: Option<String>,
    /// Comment (if FCOMMENT flag set).
    pub comment: Option<String>,
    /// Header CRC16 (if FHCRC flag set), never verified.
    pub header_crc: Option<u16>,
    /// Size of the header in bytes.
    pub header_len: usize,
}

impl GzipHeader {
    /// Read a GZIP header, leaving `reader` at the first byte of the
    /// DEFLATE stream.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; 10];
        reader.read_exact(&mut buf)?;

        if buf[0..2] != GZIP_MAGIC {
            return Err(DynflateError::invalid_magic(
                GZIP_MAGIC.to_vec(),
                buf[0..2].to_vec(),
            ));
        }

        let method = buf[2];
        if method != CM_DEFLATE {
            return Err(DynflateError::unsupported_method(format!(
                "GZIP method {method}"
            )));
        }

        let flags = buf[3];
        if flags & flags::RESERVED != 0 {
            return Err(DynflateError::invalid_header(format!(
                "reserved GZIP flag bits set: {flags:#04x}"
            )));
        }

        let mtime = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let xfl = buf[8];
        let os = buf[9];
        let mut header_len = buf.len();

        let mut extra_len = None;
        if flags & flags::FEXTRA != 0 {
            let mut xlen_buf = [0u8; 2];
            reader.read_exact(&mut xlen_buf)?;
            let xlen = u16::from_le_bytes(xlen_buf);
            let skipped = std::io::copy(&mut reader.take(xlen as u64), &mut std::io::sink())?;
            if skipped < xlen as u64 {
                return Err(DynflateError::invalid_header(format!(
                    "extra field truncated: {skipped} of {xlen} bytes"
                )));
            }
            header_len += 2 + xlen as usize;
            extra_len = Some(xlen);
        }

        let mut filename = None;
        if flags & flags::FNAME != 0 {
            let (name, len) = Self::read_latin1(reader)?;
            header_len += len;
            filename = Some(name);
        }

        let mut comment = None;
        if flags & flags::FCOMMENT != 0 {
            let (text, len) = Self::read_latin1(reader)?;
            header_len += len;
            comment = Some(text);
        }

        let mut header_crc = None;
        if flags & flags::FHCRC != 0 {
            let mut crc_buf = [0u8; 2];
            reader.read_exact(&mut crc_buf)?;
            header_len += 2;
            header_crc = Some(u16::from_le_bytes(crc_buf));
        }

        Ok(Self {
            method,
            flags,
            mtime,
            xfl,
            os,
            extra_len,
            filename,
            comment,
            header_crc,
            header_len,
        })
    }

    /// Read a zero-terminated ISO-8859-1 string and its size on the wire.
    fn read_latin1<R: Read>(reader: &mut R) -> Result<(String, usize)> {
        let mut text = String::new();
        let mut buf = [0u8; 1];
        let mut len = 0;

        loop {
            reader.read_exact(&mut buf)?;
            len += 1;
            if buf[0] == 0 {
                break;
            }
            // Every Latin-1 byte is the Unicode scalar of the same value.
            text.push(buf[0] as char);
        }

        Ok((text, len))
    }

    /// Whether the FTEXT hint is set.
    pub fn is_text(&self) -> bool {
        self.flags & flags::FTEXT != 0
    }

    /// Modification time, if one was recorded.
    pub fn modified(&self) -> Option<SystemTime> {
        (self.mtime != 0).then(|| UNIX_EPOCH + Duration::from_secs(self.mtime as u64))
    }

    /// Name of the operating system in the OS field.
    pub fn os_name(&self) -> &'static str {
        match self.os {
            0 => "FAT",
            1 => "Amiga",
            2 => "VMS",
            3 => "Unix",
            4 => "VM/CMS",
            5 => "Atari TOS",
            6 => "HPFS",
            7 => "Macintosh",
            8 => "Z-System",
            9 => "CP/M",
            10 => "TOPS-20",
            11 => "NTFS",
            12 => "QDOS",
            13 => "Acorn RISCOS",
            _ => "unknown",
        }
    }
}

/// GZIP member trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GzipTrailer {
    /// CRC-32 of the uncompressed data, as recorded. Not verified.
    pub crc32: u32,
    /// Uncompressed size modulo 2^32.
    pub isize: u32,
}

impl GzipTrailer {
    /// Size of the trailer in bytes.
    pub const LEN: usize = 8;

    /// Parse the last eight bytes of a member.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self {
            crc32: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            isize: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    /// Whether `len` bytes of output agree with ISIZE.
    pub fn size_matches(&self, len: u64) -> bool {
        len as u32 == self.isize
    }
}
