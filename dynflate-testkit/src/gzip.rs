//! GZIP member framing for test streams.
//!
//! The CRC-32 field is always written as zero.

/// FTEXT flag.
pub const FTEXT: u8 = 0x01;
/// FHCRC flag.
pub const FHCRC: u8 = 0x02;
/// FEXTRA flag.
pub const FEXTRA: u8 = 0x04;
/// FNAME flag.
pub const FNAME: u8 = 0x08;
/// FCOMMENT flag.
pub const FCOMMENT: u8 = 0x10;

/// Header fields of a GZIP member.
#[derive(Debug, Clone, Default)]
pub struct GzipFrame {
    /// Original file name (FNAME), ISO-8859-1 bytes.
    pub name: Option<Vec<u8>>,
    /// Comment (FCOMMENT), ISO-8859-1 bytes.
    pub comment: Option<Vec<u8>>,
    /// Extra field payload (FEXTRA).
    pub extra: Option<Vec<u8>>,
    /// Emit a header CRC16 (FHCRC).
    pub header_crc: bool,
    /// Modification time.
    pub mtime: u32,
}

impl GzipFrame {
    /// A frame with no optional fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.as_bytes().to_vec());
        self
    }

    /// Set the modification time.
    pub fn mtime(mut self, mtime: u32) -> Self {
        self.mtime = mtime;
        self
    }

    /// Header bytes.
    pub fn header(&self) -> Vec<u8> {
        let mut flags = 0;
        if self.header_crc {
            flags |= FHCRC;
        }
        if self.extra.is_some() {
            flags |= FEXTRA;
        }
        if self.name.is_some() {
            flags |= FNAME;
        }
        if self.comment.is_some() {
            flags |= FCOMMENT;
        }

        let mut out = vec![0x1f, 0x8b, 8, flags];
        out.extend_from_slice(&self.mtime.to_le_bytes());
        out.push(0); // XFL
        out.push(255); // OS: unknown

        if let Some(extra) = &self.extra {
            out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
            out.extend_from_slice(extra);
        }
        for field in [&self.name, &self.comment].into_iter().flatten() {
            out.extend_from_slice(field);
            out.push(0);
        }
        if self.header_crc {
            // Not a real CRC16; readers skip it.
            out.extend_from_slice(&[0xAB, 0xCD]);
        }
        out
    }

    /// Complete member: header, `deflate`, zero CRC-32 and `isize`.
    pub fn wrap(&self, deflate: &[u8], isize: u32) -> Vec<u8> {
        let mut out = self.header();
        out.extend_from_slice(deflate);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&isize.to_le_bytes());
        out
    }
}
