//! SOLOII.DAT file access and section location
//!
//! Knows the fixed byte offsets dividing the file into pre-header, header,
//! extra-data, and data sections, and performs the magic-signature check on
//! open. Section contents are validated elsewhere; this module only hands
//! out correctly positioned reads.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::{
    DATA_AREA_OFFSET, EXTRA_DATA_LEN, EXTRA_DATA_OFFSET, HEADER_AREA_OFFSET,
    HEADER_TRAILER_LEN, HEADER_TRAILER_OFFSET, MAGIC, PRE_HEADER_LEN, PRE_HEADER_OFFSET,
};
use crate::{Error, Result};

/// Read into `buf` until it is full or the reader hits end of input.
///
/// Unlike [`Read::read_exact`] this reports a short trailing read instead of
/// failing, which the section walks need to distinguish truncation from a
/// clean end of data.
pub fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// An open, signature-checked SOLOII.DAT file.
///
/// Owns the file handle for the duration of decoding; the handle is released
/// on every exit path by drop.
#[derive(Debug)]
pub struct SoloFile {
    file: File,
    path: PathBuf,
}

impl SoloFile {
    /// Open a SOLOII.DAT file and validate its signature.
    ///
    /// Any byte stream not starting with the exact 6-byte `SoloII` signature
    /// is rejected with [`Error::InvalidSignature`], including streams
    /// shorter than the signature itself.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|e| Error::io(format!("failed to open {}", path.display()), e))?;

        let mut signature = [0u8; 6];
        let got = read_full(&mut file, &mut signature)
            .map_err(|e| Error::io("failed to read file signature", e))?;
        if &signature[..got] != MAGIC {
            return Err(Error::invalid_signature(&signature[..got]));
        }

        debug!(path = %path.display(), "opened SOLOII.DAT file");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path the file was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The three opaque bytes between the signature and the header area
    pub fn pre_header(&mut self) -> Result<[u8; PRE_HEADER_LEN]> {
        let mut buf = [0u8; PRE_HEADER_LEN];
        self.read_region(PRE_HEADER_OFFSET, &mut buf)?;
        Ok(buf)
    }

    /// The opaque bytes between the header area and the extra data region
    pub fn header_trailer(&mut self) -> Result<[u8; HEADER_TRAILER_LEN]> {
        let mut buf = [0u8; HEADER_TRAILER_LEN];
        self.read_region(HEADER_TRAILER_OFFSET, &mut buf)?;
        Ok(buf)
    }

    /// The opaque extra data region, up to its full 4096 bytes.
    ///
    /// May be shorter for a truncated file; the bytes that exist are
    /// returned as-is.
    pub fn extra_data(&mut self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; EXTRA_DATA_LEN];
        let got = self.read_region_partial(EXTRA_DATA_OFFSET, &mut buf)?;
        buf.truncate(got);
        Ok(buf)
    }

    /// Position the file at the first header entry
    pub fn seek_header_area(&mut self) -> Result<()> {
        self.seek_to(HEADER_AREA_OFFSET)
    }

    /// Position the file at the first data record
    pub fn seek_data_area(&mut self) -> Result<()> {
        self.seek_to(DATA_AREA_OFFSET)
    }

    fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| Error::io(format!("failed to seek to offset {offset}"), e))?;
        Ok(())
    }

    fn read_region(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let got = self.read_region_partial(offset, buf)?;
        if got < buf.len() {
            return Err(Error::io(
                format!(
                    "file ends inside fixed region at offset {offset}: \
                     expected {} bytes, found {got}",
                    buf.len()
                ),
                std::io::Error::from(std::io::ErrorKind::UnexpectedEof),
            ));
        }
        Ok(())
    }

    fn read_region_partial(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.seek_to(offset)?;
        read_full(&mut self.file, buf)
            .map_err(|e| Error::io(format!("failed to read region at offset {offset}"), e))
    }
}

// Sequential section walks read through the file handle directly.
impl Read for SoloFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}
