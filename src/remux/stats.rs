//! Statistics accumulator: the measure pass.

use crate::remux::metadata::ON_METADATA_EVENT;
use crate::remux::Result;
use flvmend_media::amf::{Decoder, Value};
use flvmend_media::flv::{FlvReader, MetaTag, Tag};
use serde::Serialize;
use std::io::{Read, Seek};

/// Aggregate per-track statistics from one forward pass.
///
/// Mutable only while the pass runs; [`scan`] hands it out by value once
/// the pass completes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StreamStats {
    /// Total byte size of the source.
    pub file_size: u64,
    /// Frame width; first non-zero sighting wins, backfilled from
    /// onMetaData when no codec payload carried it.
    pub width: u16,
    /// Frame height; same policy as width.
    pub height: u16,
    /// Last-seen video codec id.
    pub video_codec_id: u8,
    /// Last-seen audio codec id.
    pub audio_codec_id: u8,
    /// Last-seen audio sample rate in Hz.
    pub audio_sample_rate: u32,
    /// Last-seen audio sample depth in bits.
    pub audio_sample_bits: u32,
    /// True once any stereo audio tag was seen.
    pub stereo: bool,
    /// Non-keyframe video tag count (the rate estimator's counter).
    pub video_frames: u32,
    /// Audio tag count.
    pub audio_frames: u32,
    /// Summed framed size of video tags.
    pub video_framed_bytes: u64,
    /// Summed framed size of audio tags.
    pub audio_framed_bytes: u64,
    /// Summed framed size of script tags.
    pub meta_framed_bytes: u64,
    /// Summed body size of video tags.
    pub video_payload_bytes: u64,
    /// Summed body size of audio tags.
    pub audio_payload_bytes: u64,
    /// Timestamp of the last video tag, in ms.
    pub last_video_dts: u32,
    /// Timestamp of the last tag of any kind, in ms.
    pub last_dts: u32,
    /// Timestamp of the last keyframe, in ms.
    pub last_keyframe_dts: u32,
    pub has_video: bool,
    pub has_audio: bool,
    pub has_metadata: bool,
    pub has_keyframes: bool,
    /// Framed size of the original onMetaData tag; the synthesizer needs
    /// it to compute the offset delta.
    pub original_metadata_size: u64,
}

impl StreamStats {
    /// Stream duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        f64::from(self.last_dts) / 1000.0
    }

    /// Summed framed size across all tracks.
    pub fn data_framed_bytes(&self) -> u64 {
        self.video_framed_bytes + self.audio_framed_bytes + self.meta_framed_bytes
    }

    /// Video payload rate in kbit/s; 0 for zero-duration streams.
    pub fn video_data_rate_kbps(&self) -> f64 {
        data_rate_kbps(self.video_payload_bytes, self.duration_secs())
    }

    /// Audio payload rate in kbit/s; 0 for zero-duration streams.
    pub fn audio_data_rate_kbps(&self) -> f64 {
        data_rate_kbps(self.audio_payload_bytes, self.duration_secs())
    }

    /// Estimated frame rate, truncated to an integer. Counts only
    /// non-keyframe video tags; 0 for zero-duration streams.
    pub fn frame_rate(&self) -> u32 {
        let duration = self.duration_secs();
        if duration <= 0.0 {
            return 0;
        }
        (f64::from(self.video_frames) / duration).floor() as u32
    }
}

fn data_rate_kbps(payload_bytes: u64, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    (payload_bytes as f64 / duration_secs) * 8.0 / 1000.0
}

/// One keyframe seek point: timestamp in seconds paired with the absolute
/// byte offset of the keyframe's tag in the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyframeEntry {
    pub time_secs: f64,
    pub position: u64,
}

/// Result of the measure pass.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub stats: StreamStats,
    /// Keyframes in encounter order; positions are non-decreasing.
    pub keyframes: Vec<KeyframeEntry>,
}

/// Single forward pass over the tag stream. Tags are discarded after
/// contributing to the running totals; only keyframe entries are
/// retained. The caller must already have consumed the file header.
pub fn scan<R: Read + Seek>(reader: &mut FlvReader<R>) -> Result<ScanReport> {
    let mut stats = StreamStats {
        file_size: reader.source_len(),
        ..Default::default()
    };
    let mut keyframes = Vec::new();

    while let Some(tag) = reader.read_tag()? {
        match tag {
            Tag::Video(v) => {
                if (stats.width == 0 || stats.height == 0) && v.width != 0 && v.height != 0 {
                    stats.width = v.width;
                    stats.height = v.height;
                }
                if v.flavor.is_keyframe() {
                    stats.last_keyframe_dts = v.dts;
                    stats.has_keyframes = true;
                    keyframes.push(KeyframeEntry {
                        time_secs: f64::from(v.dts) / 1000.0,
                        position: v.offset as u64,
                    });
                } else {
                    stats.video_frames += 1;
                }
                stats.has_video = true;
                stats.last_video_dts = v.dts;
                stats.last_dts = v.dts;
                stats.video_codec_id = v.codec_id;
                stats.video_framed_bytes += u64::from(v.framed_size);
                stats.video_payload_bytes += v.body.len() as u64;
            }
            Tag::Audio(a) => {
                stats.has_audio = true;
                stats.last_dts = a.dts;
                stats.audio_codec_id = a.codec_id;
                stats.audio_sample_rate = a.sample_rate;
                stats.audio_sample_bits = a.sample_depth.bits();
                if a.channels.is_stereo() {
                    stats.stereo = true;
                }
                stats.audio_frames += 1;
                stats.audio_framed_bytes += u64::from(a.framed_size);
                stats.audio_payload_bytes += a.body.len() as u64;
            }
            Tag::Meta(m) => {
                if !absorb_script_tag(&mut stats, &m) {
                    break;
                }
            }
        }
    }

    Ok(ScanReport { stats, keyframes })
}

/// Fold one script tag into the statistics. Returns false when the AMF
/// payload cannot be decoded, which ends the pass early: the stream's
/// useful metadata is over, and whatever was accumulated stands.
fn absorb_script_tag(stats: &mut StreamStats, tag: &MetaTag) -> bool {
    let mut decoder = Decoder::new(&tag.body);

    let event = match decoder.decode_next() {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                "undecodable script tag at offset {}, finalizing statistics early: {}",
                tag.offset,
                e
            );
            return false;
        }
    };

    match event.as_str() {
        Some(ON_METADATA_EVENT) => {
            stats.original_metadata_size = u64::from(tag.framed_size);
            let document = match decoder.decode_next() {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        "truncated onMetaData document at offset {}, finalizing statistics early: {}",
                        tag.offset,
                        e
                    );
                    return false;
                }
            };

            if let Some(pairs) = document.as_mapping() {
                tracing::debug!("original onMetaData ({} fields)", pairs.len());
                for (key, value) in pairs {
                    tracing::debug!("  {} = {:?}", key, value);
                }
            }
            if stats.width == 0 {
                if let Some(n) = document.get("width").and_then(Value::as_number) {
                    stats.width = n as u16;
                }
            }
            if stats.height == 0 {
                if let Some(n) = document.get("height").and_then(Value::as_number) {
                    stats.height = n as u16;
                }
            }
        }
        _ => {
            tracing::debug!("skipping script event {:?} at offset {}", event, tag.offset);
        }
    }

    stats.has_metadata = true;
    stats.last_dts = tag.dts;
    stats.meta_framed_bytes += u64::from(tag.framed_size);
    true
}
