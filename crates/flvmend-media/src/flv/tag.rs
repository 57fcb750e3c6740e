//! FLV tag model and body-prefix parsing.

use super::{PREV_TAG_SIZE_LEN, TAG_HEADER_LEN};
use crate::{Error, Result};

/// Tag type byte for audio tags.
pub const TAG_TYPE_AUDIO: u8 = 8;
/// Tag type byte for video tags.
pub const TAG_TYPE_VIDEO: u8 = 9;
/// Tag type byte for script (metadata) tags.
pub const TAG_TYPE_META: u8 = 18;

/// Track kind of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Video,
    Audio,
    Meta,
}

impl TrackKind {
    /// All track kinds, in routing order.
    pub const ALL: [TrackKind; 3] = [TrackKind::Video, TrackKind::Audio, TrackKind::Meta];

    /// Map a tag type byte to a track kind.
    pub fn from_tag_type(byte: u8) -> Option<Self> {
        match byte {
            TAG_TYPE_VIDEO => Some(Self::Video),
            TAG_TYPE_AUDIO => Some(Self::Audio),
            TAG_TYPE_META => Some(Self::Meta),
            _ => None,
        }
    }

    /// The on-wire tag type byte.
    pub fn tag_type(&self) -> u8 {
        match self {
            Self::Video => TAG_TYPE_VIDEO,
            Self::Audio => TAG_TYPE_AUDIO,
            Self::Meta => TAG_TYPE_META,
        }
    }

    /// Lowercase name used in logs and routing tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Meta => "meta",
        }
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Video frame flavor from the type nibble of the first body byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFlavor {
    Keyframe,
    Inter,
    Disposable,
    Generated,
    Command,
    Unknown(u8),
}

impl FrameFlavor {
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble {
            1 => Self::Keyframe,
            2 => Self::Inter,
            3 => Self::Disposable,
            4 => Self::Generated,
            5 => Self::Command,
            other => Self::Unknown(other),
        }
    }

    pub fn is_keyframe(&self) -> bool {
        matches!(self, Self::Keyframe)
    }
}

/// Audio channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Mono,
    Stereo,
}

impl Channels {
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 == 1 {
            Self::Stereo
        } else {
            Self::Mono
        }
    }

    pub fn is_stereo(&self) -> bool {
        matches!(self, Self::Stereo)
    }
}

/// Audio sample depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDepth {
    Bits8,
    Bits16,
}

impl SampleDepth {
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 == 1 {
            Self::Bits16
        } else {
            Self::Bits8
        }
    }

    /// Depth in bits.
    pub fn bits(&self) -> u32 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
        }
    }
}

/// Sample rates addressed by the 2-bit rate index of an audio tag.
const AUDIO_SAMPLE_RATES: [u32; 4] = [5500, 11025, 22050, 44100];

/// A video tag.
#[derive(Debug, Clone)]
pub struct VideoTag {
    /// Decode timestamp in milliseconds.
    pub dts: u32,
    /// Tag body including the flags byte.
    pub body: Vec<u8>,
    /// On-wire size of this tag: header + body + footer.
    pub framed_size: u32,
    /// Absolute byte offset of the tag's first byte in the source.
    pub offset: i64,
    /// Frame flavor (keyframe, inter, ...).
    pub flavor: FrameFlavor,
    /// Codec id from the low nibble of the flags byte.
    pub codec_id: u8,
    /// Frame width in pixels; 0 when the codec payload does not carry it.
    pub width: u16,
    /// Frame height in pixels; 0 when the codec payload does not carry it.
    pub height: u16,
}

/// An audio tag.
#[derive(Debug, Clone)]
pub struct AudioTag {
    /// Decode timestamp in milliseconds.
    pub dts: u32,
    /// Tag body including the flags byte.
    pub body: Vec<u8>,
    /// On-wire size of this tag: header + body + footer.
    pub framed_size: u32,
    /// Absolute byte offset of the tag's first byte in the source.
    pub offset: i64,
    /// Codec id from the high nibble of the flags byte.
    pub codec_id: u8,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Sample depth.
    pub sample_depth: SampleDepth,
    /// Channel layout.
    pub channels: Channels,
}

/// A script (metadata) tag with an opaque AMF0 body.
#[derive(Debug, Clone)]
pub struct MetaTag {
    /// Decode timestamp in milliseconds.
    pub dts: u32,
    /// AMF0-encoded body.
    pub body: Vec<u8>,
    /// On-wire size of this tag: header + body + footer.
    pub framed_size: u32,
    /// Absolute byte offset in the source; 0 for synthesized tags.
    pub offset: i64,
}

impl MetaTag {
    /// Create a synthesized meta tag not backed by any source bytes.
    pub fn new(dts: u32, body: Vec<u8>) -> Self {
        let framed_size = TAG_HEADER_LEN + body.len() as u32 + PREV_TAG_SIZE_LEN;
        Self {
            dts,
            body,
            framed_size,
            offset: 0,
        }
    }
}

/// One framed record of the FLV tag stream.
#[derive(Debug, Clone)]
pub enum Tag {
    Video(VideoTag),
    Audio(AudioTag),
    Meta(MetaTag),
}

impl Tag {
    /// Build a typed tag from the wire-level fields of one framed record.
    pub fn from_wire(tag_type: u8, dts: u32, body: Vec<u8>, offset: i64) -> Result<Self> {
        let framed_size = TAG_HEADER_LEN + body.len() as u32 + PREV_TAG_SIZE_LEN;
        let kind = TrackKind::from_tag_type(tag_type).ok_or_else(|| {
            Error::invalid_flv(format!("unknown tag type {} at offset {}", tag_type, offset))
        })?;

        match kind {
            TrackKind::Video => {
                let flags = *body.first().ok_or_else(|| {
                    Error::invalid_flv(format!("empty video tag body at offset {}", offset))
                })?;
                let flavor = FrameFlavor::from_nibble(flags >> 4);
                let codec_id = flags & 0x0F;
                let (width, height) = video_dimensions(codec_id, &body);
                Ok(Self::Video(VideoTag {
                    dts,
                    body,
                    framed_size,
                    offset,
                    flavor,
                    codec_id,
                    width,
                    height,
                }))
            }
            TrackKind::Audio => {
                let flags = *body.first().ok_or_else(|| {
                    Error::invalid_flv(format!("empty audio tag body at offset {}", offset))
                })?;
                Ok(Self::Audio(AudioTag {
                    dts,
                    body,
                    framed_size,
                    offset,
                    codec_id: flags >> 4,
                    sample_rate: AUDIO_SAMPLE_RATES[((flags >> 2) & 0x03) as usize],
                    sample_depth: SampleDepth::from_bit(flags >> 1),
                    channels: Channels::from_bit(flags),
                }))
            }
            TrackKind::Meta => Ok(Self::Meta(MetaTag {
                dts,
                body,
                framed_size,
                offset,
            })),
        }
    }

    /// Track kind of this tag.
    pub fn kind(&self) -> TrackKind {
        match self {
            Self::Video(_) => TrackKind::Video,
            Self::Audio(_) => TrackKind::Audio,
            Self::Meta(_) => TrackKind::Meta,
        }
    }

    /// On-wire tag type byte.
    pub fn tag_type(&self) -> u8 {
        self.kind().tag_type()
    }

    /// Decode timestamp in milliseconds.
    pub fn dts(&self) -> u32 {
        match self {
            Self::Video(t) => t.dts,
            Self::Audio(t) => t.dts,
            Self::Meta(t) => t.dts,
        }
    }

    /// Overwrite the decode timestamp.
    pub fn set_dts(&mut self, dts: u32) {
        match self {
            Self::Video(t) => t.dts = dts,
            Self::Audio(t) => t.dts = dts,
            Self::Meta(t) => t.dts = dts,
        }
    }

    /// Tag body bytes.
    pub fn body(&self) -> &[u8] {
        match self {
            Self::Video(t) => &t.body,
            Self::Audio(t) => &t.body,
            Self::Meta(t) => &t.body,
        }
    }

    /// On-wire size of this tag including header and footer.
    pub fn framed_size(&self) -> u32 {
        match self {
            Self::Video(t) => t.framed_size,
            Self::Audio(t) => t.framed_size,
            Self::Meta(t) => t.framed_size,
        }
    }

    /// Absolute byte offset of this tag in its source.
    pub fn offset(&self) -> i64 {
        match self {
            Self::Video(t) => t.offset,
            Self::Audio(t) => t.offset,
            Self::Meta(t) => t.offset,
        }
    }
}

/// Video codec id for Sorenson H.263.
const CODEC_H263: u8 = 2;
/// Video codec id for Screen Video.
const CODEC_SCREEN: u8 = 3;

/// Extract frame dimensions from the codec payload where the codec carries
/// them in a fixed position. Codecs that keep dimensions in out-of-band
/// configuration (AVC, VP6 with its offset nibbles) report (0, 0) and the
/// caller falls back to the onMetaData document.
fn video_dimensions(codec_id: u8, body: &[u8]) -> (u16, u16) {
    let payload = &body[1..];
    match codec_id {
        CODEC_H263 => h263_dimensions(payload).unwrap_or((0, 0)),
        CODEC_SCREEN => screen_dimensions(payload).unwrap_or((0, 0)),
        _ => (0, 0),
    }
}

/// Read `count` bits (at most 16) starting at `bit_offset`.
fn read_bits(data: &[u8], bit_offset: usize, count: usize) -> Option<u32> {
    let mut value = 0u32;
    for i in 0..count {
        let bit = bit_offset + i;
        let byte = *data.get(bit / 8)?;
        value = (value << 1) | ((byte >> (7 - bit % 8)) & 1) as u32;
    }
    Some(value)
}

/// Sorenson H.263 picture header: 17-bit start code, 5-bit version, 8-bit
/// temporal reference, 3-bit picture size code, then either explicit 8- or
/// 16-bit dimensions or a table entry.
fn h263_dimensions(payload: &[u8]) -> Option<(u16, u16)> {
    let size_code = read_bits(payload, 30, 3)?;
    let (width, height) = match size_code {
        0 => (read_bits(payload, 33, 8)?, read_bits(payload, 41, 8)?),
        1 => (read_bits(payload, 33, 16)?, read_bits(payload, 49, 16)?),
        2 => (352, 288),
        3 => (176, 144),
        4 => (128, 96),
        5 => (320, 240),
        6 => (160, 120),
        _ => return None,
    };
    Some((width as u16, height as u16))
}

/// Screen Video packs 4-bit block sizes and 12-bit image dimensions into
/// the first four payload bytes.
fn screen_dimensions(payload: &[u8]) -> Option<(u16, u16)> {
    if payload.len() < 4 {
        return None;
    }
    let width = (u16::from(payload[0] & 0x0F) << 8) | u16::from(payload[1]);
    let height = (u16::from(payload[2] & 0x0F) << 8) | u16::from(payload[3]);
    Some((width, height))
}
