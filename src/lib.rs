//! Flvmend: FLV metadata reconciliation and stream splitting
//!
//! Flvmend walks an FLV tag stream, reconciles its per-track statistics
//! and keyframe seek index into a replacement `onMetaData` tag, and
//! rewrites the stream with corrected byte offsets - optionally repairing
//! non-monotonic timestamps or splitting the stream into per-track files.
//!
//! The container and AMF0 plumbing lives in the `flvmend-media` crate;
//! this crate holds the [`remux`] engine and the CLI binary.

pub mod remux;

pub use remux::{RemuxOptions, SplitDestinations};
