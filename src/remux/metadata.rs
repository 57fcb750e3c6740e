//! Metadata synthesizer: build, measure, retrofit, re-encode.

use crate::remux::stats::{KeyframeEntry, StreamStats};
use crate::remux::{Error, Result};
use chrono::Utc;
use flvmend_media::amf::{encode_value, Encoder, Value};
use flvmend_media::flv::{MetaTag, PREV_TAG_SIZE_LEN, TAG_HEADER_LEN};

/// Event name of the well-known statistics document.
pub const ON_METADATA_EVENT: &str = "onMetaData";

/// Value of the `metadatacreator` field.
pub const METADATA_CREATOR: &str = "flvmend https://github.com/flvmend/flvmend";

/// A replacement onMetaData tag plus the bookkeeping the rewrite pass
/// needs.
#[derive(Debug, Clone)]
pub struct SynthesizedMeta {
    /// The final tag, dts 0, ready to be emitted before the first
    /// keyframe.
    pub tag: MetaTag,
    /// Byte offset of the first keyframe in the original source. The
    /// caller repositions the source here before the rewrite pass;
    /// everything before it (typically just the original metadata tag)
    /// is replaced wholesale by `tag`.
    pub resume_offset: u64,
    /// Signed difference between the replacement tag's framed size and
    /// the original's, already applied to the document's keyframe
    /// offsets.
    pub offset_delta: i64,
}

/// Build the replacement metadata tag for a scanned stream.
///
/// The document's own size affects every `filepositions` entry it
/// records, so the document is encoded twice: once without the event-name
/// prefix purely to measure it, then again with the shifted offsets and
/// the prefix to produce the final body. Only fixed-width numbers change
/// between the two encodings, so the measurement holds.
pub fn synthesize(stats: &StreamStats, keyframes: &[KeyframeEntry]) -> Result<SynthesizedMeta> {
    let first = keyframes.first().ok_or(Error::NoKeyframes)?;

    let mut document = build_document(stats, keyframes);

    let measured = encode_value(&document)?.len() as u64;
    let new_framed_size = measured + u64::from(TAG_HEADER_LEN) + u64::from(PREV_TAG_SIZE_LEN);
    let offset_delta = new_framed_size as i64 - stats.original_metadata_size as i64;

    tracing::debug!(
        "replacement metadata: measured {} bytes framed, original {}, offset delta {}",
        new_framed_size,
        stats.original_metadata_size,
        offset_delta
    );

    let shifted: Vec<Value> = keyframes
        .iter()
        .map(|k| Value::Number((k.position as i64 + offset_delta) as f64))
        .collect();
    set_file_positions(&mut document, shifted);

    let mut encoder = Encoder::new();
    encoder.encode(&Value::String(ON_METADATA_EVENT.to_string()))?;
    encoder.encode(&document)?;

    Ok(SynthesizedMeta {
        tag: MetaTag::new(0, encoder.into_bytes()),
        resume_offset: first.position,
        offset_delta,
    })
}

/// Assemble the onMetaData document. The `times` and `filepositions`
/// arrays are built from independent vectors of equal length;
/// `filepositions` still holds the original, unshifted offsets at this
/// stage.
fn build_document(stats: &StreamStats, keyframes: &[KeyframeEntry]) -> Value {
    let times: Vec<Value> = keyframes
        .iter()
        .map(|k| Value::Number(k.time_secs))
        .collect();
    let positions: Vec<Value> = keyframes
        .iter()
        .map(|k| Value::Number(k.position as f64))
        .collect();

    let keyframe_index = Value::Object(vec![
        ("times".to_string(), Value::StrictArray(times)),
        ("filepositions".to_string(), Value::StrictArray(positions)),
    ]);

    Value::EcmaArray(vec![
        ("metadatacreator".to_string(), METADATA_CREATOR.into()),
        (
            "metadatadate".to_string(),
            Value::Date {
                unix_ms: Utc::now().timestamp_millis() as f64,
                timezone: 0,
            },
        ),
        ("keyframes".to_string(), keyframe_index),
        ("hasVideo".to_string(), stats.has_video.into()),
        ("hasAudio".to_string(), stats.has_audio.into()),
        ("hasMetadata".to_string(), stats.has_metadata.into()),
        ("hasKeyframes".to_string(), stats.has_keyframes.into()),
        ("hasCuePoints".to_string(), false.into()),
        (
            "videocodecid".to_string(),
            f64::from(stats.video_codec_id).into(),
        ),
        ("width".to_string(), f64::from(stats.width).into()),
        ("height".to_string(), f64::from(stats.height).into()),
        (
            "videosize".to_string(),
            (stats.video_framed_bytes as f64).into(),
        ),
        ("framerate".to_string(), f64::from(stats.frame_rate()).into()),
        (
            "videodatarate".to_string(),
            stats.video_data_rate_kbps().into(),
        ),
        (
            "audiocodecid".to_string(),
            f64::from(stats.audio_codec_id).into(),
        ),
        ("stereo".to_string(), stats.stereo.into()),
        (
            "audiosamplesize".to_string(),
            f64::from(stats.audio_sample_bits).into(),
        ),
        ("audiodelay".to_string(), 0.0.into()),
        (
            "audiodatarate".to_string(),
            stats.audio_data_rate_kbps().into(),
        ),
        (
            "audiosize".to_string(),
            (stats.audio_framed_bytes as f64).into(),
        ),
        (
            "audiosamplerate".to_string(),
            f64::from(stats.audio_sample_rate).into(),
        ),
        ("filesize".to_string(), (stats.file_size as f64).into()),
        (
            "datasize".to_string(),
            (stats.data_framed_bytes() as f64).into(),
        ),
        (
            "lasttimestamp".to_string(),
            (f64::from(stats.last_video_dts) / 1000.0).into(),
        ),
        (
            "lastkeyframetimestamp".to_string(),
            (f64::from(stats.last_keyframe_dts) / 1000.0).into(),
        ),
        ("cuePoints".to_string(), Value::StrictArray(Vec::new())),
        ("duration".to_string(), stats.duration_secs().into()),
        ("canSeekToEnd".to_string(), false.into()),
    ])
}

/// Replace the keyframe index's `filepositions` array in place.
fn set_file_positions(document: &mut Value, positions: Vec<Value>) {
    let Value::EcmaArray(pairs) = document else {
        return;
    };
    let Some((_, keyframe_index)) = pairs.iter_mut().find(|(k, _)| k == "keyframes") else {
        return;
    };
    let Value::Object(index_pairs) = keyframe_index else {
        return;
    };
    if let Some((_, value)) = index_pairs.iter_mut().find(|(k, _)| k == "filepositions") {
        *value = Value::StrictArray(positions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyframes() -> Vec<KeyframeEntry> {
        vec![
            KeyframeEntry {
                time_secs: 0.0,
                position: 80,
            },
            KeyframeEntry {
                time_secs: 2.0,
                position: 9000,
            },
        ]
    }

    fn positions_of(document: &Value) -> Vec<f64> {
        let Some(Value::StrictArray(items)) = document.get("keyframes").and_then(|k| k.get("filepositions")) else {
            panic!("missing filepositions");
        };
        items.iter().map(|v| v.as_number().unwrap()).collect()
    }

    fn times_of(document: &Value) -> Vec<f64> {
        let Some(Value::StrictArray(items)) = document.get("keyframes").and_then(|k| k.get("times")) else {
            panic!("missing times");
        };
        items.iter().map(|v| v.as_number().unwrap()).collect()
    }

    #[test]
    fn test_no_keyframes_is_fatal() {
        let stats = StreamStats::default();
        assert!(matches!(
            synthesize(&stats, &[]),
            Err(Error::NoKeyframes)
        ));
    }

    #[test]
    fn test_delta_applied_to_every_position() {
        let stats = StreamStats {
            original_metadata_size: 50,
            has_keyframes: true,
            ..Default::default()
        };
        let synth = synthesize(&stats, &keyframes()).unwrap();

        let mut decoder = flvmend_media::amf::Decoder::new(&synth.tag.body);
        let event = decoder.decode_next().unwrap();
        assert_eq!(event.as_str(), Some(ON_METADATA_EVENT));
        let document = decoder.decode_next().unwrap();

        let expected: Vec<f64> = keyframes()
            .iter()
            .map(|k| (k.position as i64 + synth.offset_delta) as f64)
            .collect();
        assert_eq!(positions_of(&document), expected);
        assert_eq!(synth.resume_offset, 80);
    }

    #[test]
    fn test_measured_size_is_a_fixed_point() {
        // Re-measuring the document after the retrofit must reproduce the
        // framed size the delta was computed from.
        let stats = StreamStats {
            original_metadata_size: 50,
            has_keyframes: true,
            ..Default::default()
        };
        let synth = synthesize(&stats, &keyframes()).unwrap();

        let mut decoder = flvmend_media::amf::Decoder::new(&synth.tag.body);
        decoder.decode_next().unwrap();
        let document = decoder.decode_next().unwrap();

        let remeasured = encode_value(&document).unwrap().len() as i64
            + i64::from(TAG_HEADER_LEN)
            + i64::from(PREV_TAG_SIZE_LEN);
        assert_eq!(
            remeasured,
            stats.original_metadata_size as i64 + synth.offset_delta
        );
    }

    #[test]
    fn test_parallel_arrays_are_independent_and_equal_length() {
        let stats = StreamStats {
            original_metadata_size: 50,
            ..Default::default()
        };
        let synth = synthesize(&stats, &keyframes()).unwrap();

        let mut decoder = flvmend_media::amf::Decoder::new(&synth.tag.body);
        decoder.decode_next().unwrap();
        let document = decoder.decode_next().unwrap();

        let times = times_of(&document);
        let positions = positions_of(&document);
        assert_eq!(times.len(), positions.len());
        // The retrofit must not leak into the times array.
        assert_eq!(times, vec![0.0, 2.0]);
        assert_ne!(positions, times);
    }

    #[test]
    fn test_synthesized_tag_shape() {
        let stats = StreamStats {
            original_metadata_size: 50,
            ..Default::default()
        };
        let synth = synthesize(&stats, &keyframes()).unwrap();
        assert_eq!(synth.tag.dts, 0);
        assert_eq!(
            u64::from(synth.tag.framed_size),
            u64::from(TAG_HEADER_LEN) + synth.tag.body.len() as u64 + u64::from(PREV_TAG_SIZE_LEN)
        );
    }
}
