//! FLV container framing.
//!
//! The FLV layout is flat: a file header, then `(tag, footer)` records
//! until end of stream. Every framed-size computation in the crate uses
//! the constants below.

mod reader;
mod tag;
mod writer;

pub use reader::FlvReader;
pub use tag::{
    AudioTag, Channels, FrameFlavor, MetaTag, SampleDepth, Tag, TrackKind, VideoTag,
    TAG_TYPE_AUDIO, TAG_TYPE_META, TAG_TYPE_VIDEO,
};
pub use writer::FlvWriter;

/// Size of the FLV file header ("FLV", version, flags, data offset).
pub const FILE_HEADER_LEN: u32 = 9;

/// Size of a tag header (type, body length, timestamp, stream id).
pub const TAG_HEADER_LEN: u32 = 11;

/// Size of the trailing per-tag footer (u32 size of the preceding tag).
pub const PREV_TAG_SIZE_LEN: u32 = 4;

/// FLV file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlvHeader {
    /// Format version (1 for all known files).
    pub version: u8,
    /// Audio tags present flag.
    pub has_audio: bool,
    /// Video tags present flag.
    pub has_video: bool,
}

impl Default for FlvHeader {
    fn default() -> Self {
        Self {
            version: 1,
            has_audio: true,
            has_video: true,
        }
    }
}
