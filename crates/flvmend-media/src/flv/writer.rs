//! FLV tag stream writer.

use super::{FlvHeader, Tag, FILE_HEADER_LEN, TAG_HEADER_LEN};
use crate::Result;
use bytes::BufMut;
use std::io::Write;

/// FLV tag stream writer. Writes are append-only: a header first, then
/// one framed tag per [`FlvWriter::write_tag`] call.
pub struct FlvWriter<W> {
    writer: W,
}

impl<W: Write> FlvWriter<W> {
    /// Create a new FLV writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write the file header and the leading `PreviousTagSize0` footer.
    pub fn write_header(&mut self, header: &FlvHeader) -> Result<()> {
        let mut buf = Vec::with_capacity(FILE_HEADER_LEN as usize + 4);
        buf.put_slice(b"FLV");
        buf.put_u8(header.version);
        let mut flags = 0u8;
        if header.has_audio {
            flags |= 0x04;
        }
        if header.has_video {
            flags |= 0x01;
        }
        buf.put_u8(flags);
        buf.put_u32(FILE_HEADER_LEN);
        buf.put_u32(0);
        self.writer.write_all(&buf)?;
        Ok(())
    }

    /// Append one framed tag: 11-byte header, body, u32 footer.
    pub fn write_tag(&mut self, tag: &Tag) -> Result<()> {
        let body = tag.body();
        let dts = tag.dts();

        let mut buf = Vec::with_capacity(TAG_HEADER_LEN as usize + body.len() + 4);
        buf.put_u8(tag.tag_type());
        buf.put_uint(body.len() as u64, 3);
        // 24-bit timestamp, then the 8-bit extension carrying the high byte.
        buf.put_uint((dts & 0x00FF_FFFF) as u64, 3);
        buf.put_u8((dts >> 24) as u8);
        // Stream id, always 0.
        buf.put_uint(0, 3);
        buf.put_slice(body);
        buf.put_u32(TAG_HEADER_LEN + body.len() as u32);

        self.writer.write_all(&buf)?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flv::MetaTag;

    #[test]
    fn test_header_wire_layout() {
        let mut writer = FlvWriter::new(Vec::new());
        writer
            .write_header(&FlvHeader {
                version: 1,
                has_audio: false,
                has_video: true,
            })
            .unwrap();
        let bytes = writer.into_inner().unwrap();

        assert_eq!(&bytes[0..3], b"FLV");
        assert_eq!(bytes[3], 1);
        assert_eq!(bytes[4], 0x01);
        assert_eq!(&bytes[5..9], &9u32.to_be_bytes());
        assert_eq!(&bytes[9..13], &0u32.to_be_bytes());
    }

    #[test]
    fn test_tag_wire_layout() {
        let mut writer = FlvWriter::new(Vec::new());
        let tag = Tag::Meta(MetaTag::new(0x0102_0304, vec![0xAA, 0xBB]));
        writer.write_tag(&tag).unwrap();
        let bytes = writer.into_inner().unwrap();

        assert_eq!(bytes.len(), 11 + 2 + 4);
        assert_eq!(bytes[0], 18);
        // 24-bit body length.
        assert_eq!(&bytes[1..4], &[0x00, 0x00, 0x02]);
        // Timestamp low 24 bits, then the extension byte.
        assert_eq!(&bytes[4..7], &[0x02, 0x03, 0x04]);
        assert_eq!(bytes[7], 0x01);
        // Stream id.
        assert_eq!(&bytes[8..11], &[0x00, 0x00, 0x00]);
        assert_eq!(&bytes[11..13], &[0xAA, 0xBB]);
        assert_eq!(&bytes[13..17], &(11u32 + 2).to_be_bytes());
    }
}
