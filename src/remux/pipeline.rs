//! Two-phase remux pipelines.

use crate::remux::router::TagRouter;
use crate::remux::{metadata, stats, Error, Result, ScanReport, TimelineSet};
use flvmend_media::flv::{FlvReader, Tag, TrackKind};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

/// Options shared by the rewrite pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemuxOptions {
    /// Repair non-monotonic per-track timestamps while rewriting.
    pub fix_timestamps: bool,
}

/// Per-track output paths for [`split`]. A track with no path is dropped.
#[derive(Debug, Clone, Default)]
pub struct SplitDestinations {
    pub video: Option<PathBuf>,
    pub audio: Option<PathBuf>,
    pub meta: Option<PathBuf>,
}

impl SplitDestinations {
    fn routes(&self) -> [(TrackKind, Option<&Path>); 3] {
        [
            (TrackKind::Video, self.video.as_deref()),
            (TrackKind::Audio, self.audio.as_deref()),
            (TrackKind::Meta, self.meta.as_deref()),
        ]
    }
}

/// Rewrite `input` into `output` with a freshly synthesized onMetaData
/// tag whose keyframe index accounts for its own size.
///
/// Phase one scans the whole stream; phase two re-emits it starting at
/// the first keyframe, so everything before it (typically only the
/// original metadata tag) is replaced by the synthesized tag.
pub fn update_keyframes(input: &Path, output: &Path, options: RemuxOptions) -> Result<()> {
    let mut reader = open_source(input)?;
    let header = reader.read_header()?;

    tracing::info!("scanning {}", input.display());
    let report = stats::scan(&mut reader)?;
    let synthesized = metadata::synthesize(&report.stats, &report.keyframes)?;
    tracing::info!(
        "indexed {} keyframes, offset delta {} bytes",
        report.keyframes.len(),
        synthesized.offset_delta
    );

    // All three kinds alias the same path and collapse to one sink.
    let mut router = TagRouter::open(
        &header,
        &[
            (TrackKind::Video, Some(output)),
            (TrackKind::Audio, Some(output)),
            (TrackKind::Meta, Some(output)),
        ],
    )?;
    router.route(&Tag::Meta(synthesized.tag))?;

    reader.seek_to(synthesized.resume_offset)?;
    copy_tags(&mut reader, &mut router, options)?;
    router.finish()?;

    tracing::info!("wrote {}", output.display());
    Ok(())
}

/// Demultiplex `input` into per-track outputs. Kinds declaring the same
/// path share a sink; kinds declaring none are dropped.
pub fn split(input: &Path, destinations: &SplitDestinations, options: RemuxOptions) -> Result<()> {
    let mut reader = open_source(input)?;
    let header = reader.read_header()?;

    let mut router = TagRouter::open(&header, &destinations.routes())?;
    copy_tags(&mut reader, &mut router, options)?;
    router.finish()?;
    Ok(())
}

/// Run the measure pass only.
pub fn inspect(input: &Path) -> Result<ScanReport> {
    let mut reader = open_source(input)?;
    reader.read_header()?;
    stats::scan(&mut reader)
}

fn open_source(input: &Path) -> Result<FlvReader<File>> {
    let file = File::open(input).map_err(|e| Error::SourceOpen {
        path: input.to_path_buf(),
        source: e,
    })?;
    Ok(FlvReader::new(file))
}

/// The rewrite pass: replay the remaining tag stream through the
/// per-track timelines and the router. Any read or write failure aborts
/// the pass.
fn copy_tags<R: Read + Seek>(
    reader: &mut FlvReader<R>,
    router: &mut TagRouter,
    options: RemuxOptions,
) -> Result<()> {
    let mut timelines = TimelineSet::new(options.fix_timestamps);
    while let Some(mut tag) = reader.read_tag()? {
        timelines.reconcile(&mut tag);
        router.route(&tag)?;
    }
    Ok(())
}
