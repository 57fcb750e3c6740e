//! Shared fixtures: synthetic FLV streams built in memory.
#![allow(dead_code)]

use flvmend_media::amf::{Encoder, Value};
use flvmend_media::flv::{
    FlvHeader, FlvReader, FlvWriter, MetaTag, Tag, TAG_TYPE_AUDIO, TAG_TYPE_VIDEO,
};
use std::io::Cursor;
use std::path::Path;

/// A video tag with an AVC-style body of `payload_len` filler bytes.
pub fn video_tag(dts: u32, keyframe: bool, payload_len: usize) -> Tag {
    let flags = if keyframe { 0x17 } else { 0x27 };
    let mut body = vec![flags];
    body.extend(std::iter::repeat(0u8).take(payload_len));
    Tag::from_wire(TAG_TYPE_VIDEO, dts, body, 0).unwrap()
}

/// An AAC-style stereo audio tag with `payload_len` filler bytes.
pub fn audio_tag(dts: u32, payload_len: usize) -> Tag {
    let mut body = vec![0xAF];
    body.extend(std::iter::repeat(0u8).take(payload_len));
    Tag::from_wire(TAG_TYPE_AUDIO, dts, body, 0).unwrap()
}

/// An onMetaData script tag carrying the given mapping fields.
pub fn metadata_tag(fields: Vec<(String, Value)>) -> Tag {
    let mut encoder = Encoder::new();
    encoder
        .encode(&Value::String("onMetaData".to_string()))
        .unwrap();
    encoder.encode(&Value::EcmaArray(fields)).unwrap();
    Tag::Meta(MetaTag::new(0, encoder.into_bytes()))
}

/// Serialize a header and tag sequence into FLV bytes.
pub fn build_flv(tags: &[Tag]) -> Vec<u8> {
    let mut writer = FlvWriter::new(Vec::new());
    writer.write_header(&FlvHeader::default()).unwrap();
    for tag in tags {
        writer.write_tag(tag).unwrap();
    }
    writer.into_inner().unwrap()
}

/// Write an FLV fixture to disk.
pub fn write_flv(path: &Path, tags: &[Tag]) {
    std::fs::write(path, build_flv(tags)).unwrap();
}

/// Read every tag of an FLV file back, with source offsets populated.
pub fn read_tags(path: &Path) -> Vec<Tag> {
    let bytes = std::fs::read(path).unwrap();
    let mut reader = FlvReader::new(Cursor::new(bytes));
    reader.read_header().unwrap();
    let mut tags = Vec::new();
    while let Some(tag) = reader.read_tag().unwrap() {
        tags.push(tag);
    }
    tags
}

/// Decode the onMetaData document out of a script tag body.
pub fn decode_metadata(tag: &Tag) -> Value {
    let Tag::Meta(meta) = tag else {
        panic!("expected a script tag");
    };
    let mut decoder = flvmend_media::amf::Decoder::new(&meta.body);
    let event = decoder.decode_next().unwrap();
    assert_eq!(event.as_str(), Some("onMetaData"));
    decoder.decode_next().unwrap()
}

/// The `filepositions` array of a decoded onMetaData document.
pub fn file_positions(document: &Value) -> Vec<f64> {
    let Some(Value::StrictArray(items)) = document.get("keyframes").and_then(|k| k.get("filepositions"))
    else {
        panic!("document has no keyframes.filepositions");
    };
    items.iter().map(|v| v.as_number().unwrap()).collect()
}

/// The `times` array of a decoded onMetaData document.
pub fn keyframe_times(document: &Value) -> Vec<f64> {
    let Some(Value::StrictArray(items)) = document.get("keyframes").and_then(|k| k.get("times"))
    else {
        panic!("document has no keyframes.times");
    };
    items.iter().map(|v| v.as_number().unwrap()).collect()
}

/// Length in bytes of the encoded "onMetaData" event-name string that
/// prefixes a script tag body (marker + u16 length + 10 characters).
pub const EVENT_NAME_WIRE_LEN: u64 = 13;
