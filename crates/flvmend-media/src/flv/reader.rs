//! FLV tag stream reader.

use super::{FlvHeader, Tag, FILE_HEADER_LEN, PREV_TAG_SIZE_LEN, TAG_HEADER_LEN};
use crate::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// Maximum allowed tag body size (16 MB) to prevent OOM on malformed files.
const MAX_TAG_BODY_SIZE: u32 = 16 * 1024 * 1024;

/// FLV tag stream reader.
///
/// Produces a lazy, forward-only sequence of typed tags, tracking each
/// tag's absolute byte offset. [`FlvReader::seek_to`] repositions the
/// source for a fresh sequential read (used between the measure and
/// rewrite passes).
pub struct FlvReader<R> {
    reader: R,
    source_len: u64,
    position: u64,
}

impl<R: Read + Seek> FlvReader<R> {
    /// Create a new FLV reader.
    pub fn new(mut reader: R) -> Self {
        let source_len = reader.seek(SeekFrom::End(0)).unwrap_or(0);
        let _ = reader.seek(SeekFrom::Start(0));
        Self {
            reader,
            source_len,
            position: 0,
        }
    }

    /// Total byte size of the underlying source.
    pub fn source_len(&self) -> u64 {
        self.source_len
    }

    /// Absolute byte offset the next read will start at.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reposition to an absolute byte offset for a fresh sequential read.
    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.reader.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    /// Read and validate the file header, consuming the leading
    /// `PreviousTagSize0` footer so the next read lands on the first tag.
    pub fn read_header(&mut self) -> Result<FlvHeader> {
        let mut header = [0u8; FILE_HEADER_LEN as usize];
        self.reader.read_exact(&mut header)?;

        if &header[0..3] != b"FLV" {
            return Err(Error::invalid_flv("missing FLV signature"));
        }

        let version = header[3];
        let flags = header[4];
        let data_offset = u32::from_be_bytes([header[5], header[6], header[7], header[8]]);

        if data_offset < FILE_HEADER_LEN {
            return Err(Error::invalid_flv(format!(
                "header data offset {} shorter than the header itself",
                data_offset
            )));
        }

        // Skip any extension bytes between the header and the tag stream,
        // then consume PreviousTagSize0.
        self.reader.seek(SeekFrom::Start(data_offset as u64))?;
        let mut prev = [0u8; PREV_TAG_SIZE_LEN as usize];
        self.reader.read_exact(&mut prev)?;
        self.position = data_offset as u64 + PREV_TAG_SIZE_LEN as u64;

        Ok(FlvHeader {
            version,
            has_audio: flags & 0x04 != 0,
            has_video: flags & 0x01 != 0,
        })
    }

    /// Read the next tag. Returns `Ok(None)` at a clean end of stream;
    /// a record cut off mid-tag is an error.
    pub fn read_tag(&mut self) -> Result<Option<Tag>> {
        let tag_offset = self.position;

        let mut header = [0u8; TAG_HEADER_LEN as usize];
        if !self.fill_or_eof(&mut header)? {
            return Ok(None);
        }

        // Upper three bits of the type byte are reserved/filter flags.
        let tag_type = header[0] & 0x1F;
        let body_len = u32::from_be_bytes([0, header[1], header[2], header[3]]);
        // 24-bit timestamp with an 8-bit extension holding the high byte.
        let dts = u32::from_be_bytes([header[7], header[4], header[5], header[6]]);

        if body_len > MAX_TAG_BODY_SIZE {
            return Err(Error::invalid_flv(format!(
                "tag body size {} at offset {} exceeds maximum {}",
                body_len, tag_offset, MAX_TAG_BODY_SIZE
            )));
        }

        let mut body = vec![0u8; body_len as usize];
        self.reader.read_exact(&mut body)?;

        let mut footer = [0u8; PREV_TAG_SIZE_LEN as usize];
        self.reader.read_exact(&mut footer)?;
        let recorded = u32::from_be_bytes(footer);
        let expected = TAG_HEADER_LEN + body_len;
        if recorded != expected {
            return Err(Error::invalid_flv(format!(
                "tag footer at offset {} records size {} (expected {})",
                tag_offset, recorded, expected
            )));
        }

        self.position = tag_offset + (expected + PREV_TAG_SIZE_LEN) as u64;

        Tag::from_wire(tag_type, dts, body, tag_offset as i64).map(Some)
    }

    /// Fill `buf` completely, or report a clean EOF if not even one byte
    /// is available. A partial fill is a truncation error.
    fn fill_or_eof(&mut self, buf: &mut [u8]) -> Result<bool> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(false),
                Ok(0) => {
                    return Err(Error::invalid_flv(format!(
                        "stream truncated inside a tag header at offset {}",
                        self.position
                    )))
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }
}
