//! Reconciliation & remux engine.
//!
//! Rewriting the `onMetaData` seek index is a two-pass problem: the
//! replacement tag's own size is unknown until the document is built, yet
//! that size shifts every keyframe byte offset the document records. The
//! engine therefore runs:
//!
//! 1. A measure pass ([`stats::scan`]) accumulating per-track statistics
//!    and the keyframe index.
//! 2. [`metadata::synthesize`], which builds the document, measures it,
//!    applies the resulting offset delta to the recorded positions, and
//!    re-encodes the final tag. It also reports where the rewrite pass
//!    must resume in the source.
//! 3. A rewrite pass ([`pipeline`]) replaying the tag stream through the
//!    per-track [`reconcile::TrackTimeline`]s and the [`router::TagRouter`].
//!
//! Everything is single-threaded and strictly sequential; the only
//! mutable state lives in the timeline records and the router's sink
//! table, both confined to the rewrite pass.

pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod reconcile;
pub mod router;
pub mod stats;

pub use error::{Error, Result};
pub use metadata::{synthesize, SynthesizedMeta};
pub use pipeline::{inspect, split, update_keyframes, RemuxOptions, SplitDestinations};
pub use reconcile::{TimelineSet, TrackTimeline};
pub use router::TagRouter;
pub use stats::{scan, KeyframeEntry, ScanReport, StreamStats};
