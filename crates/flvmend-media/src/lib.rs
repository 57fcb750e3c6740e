//! Flvmend-Media: FLV tag framing and AMF0 serialization
//!
//! This crate provides the container-level plumbing for flvmend: reading
//! and writing the FLV sequential tag stream, and encoding/decoding the
//! AMF0 payloads carried by script (metadata) tags.
//!
//! # Modules
//!
//! - `flv` - FLV file header and tag framing (reader/writer, tag model)
//! - `amf` - AMF0 value model, decoder, and encoder
//!
//! # Architecture
//!
//! An FLV file is a 9-byte header followed by a flat sequence of framed
//! tags, each an 11-byte header, a body, and a 4-byte back-pointer footer.
//! `FlvReader` yields one typed [`flv::Tag`] per record, tracking each
//! tag's absolute byte offset so callers can build seek indexes and
//! reposition the source between passes. `FlvWriter` performs the inverse,
//! append-only.
//!
//! Script tag bodies are AMF0: a typed event-name string followed by a
//! keyed document. The `amf` decoder is a stateful cursor (one
//! `decode_next` call per top-level value); the encoder is deterministic,
//! so re-serializing a document in which only fixed-width numbers changed
//! yields the same byte length.

pub mod amf;
pub mod error;
pub mod flv;

pub use error::{Error, Result};
pub use flv::{FlvHeader, FlvReader, FlvWriter, Tag, TrackKind};
