//! Stream router: track kind to sink resolution.

use crate::remux::{Error, Result};
use flvmend_media::flv::{FlvHeader, FlvWriter, Tag, TrackKind};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

struct RoutedSink {
    path: PathBuf,
    writer: FlvWriter<BufWriter<File>>,
}

/// Maps each track kind to at most one sink, honoring output-path
/// aliasing: kinds declared with the same path share one opened sink
/// whose header is written exactly once. A kind with no declared path is
/// dropped silently.
pub struct TagRouter {
    sinks: Vec<RoutedSink>,
    by_kind: [Option<usize>; 3],
}

fn slot(kind: TrackKind) -> usize {
    match kind {
        TrackKind::Video => 0,
        TrackKind::Audio => 1,
        TrackKind::Meta => 2,
    }
}

impl TagRouter {
    /// Open sinks for the declared routes and write `header` to each
    /// distinct one. Fails if no route declares a path, or if any output
    /// cannot be created.
    pub fn open(header: &FlvHeader, routes: &[(TrackKind, Option<&Path>)]) -> Result<Self> {
        let mut sinks: Vec<RoutedSink> = Vec::new();
        let mut by_path: HashMap<PathBuf, usize> = HashMap::new();
        let mut by_kind = [None; 3];

        for (kind, path) in routes {
            let Some(path) = path else { continue };

            let index = match by_path.get(*path) {
                Some(&index) => {
                    tracing::info!(
                        "writing {} tags to already-open output {}",
                        kind,
                        sinks[index].path.display()
                    );
                    index
                }
                None => {
                    let file = File::create(path).map_err(|e| Error::SinkOpen {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                    let mut writer = FlvWriter::new(BufWriter::new(file));
                    writer.write_header(header).map_err(|e| Error::SinkWrite {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                    tracing::info!("writing {} tags to {}", kind, path.display());
                    sinks.push(RoutedSink {
                        path: path.to_path_buf(),
                        writer,
                    });
                    by_path.insert(path.to_path_buf(), sinks.len() - 1);
                    sinks.len() - 1
                }
            };
            by_kind[slot(*kind)] = Some(index);
        }

        if sinks.is_empty() {
            return Err(Error::NoDestinations);
        }

        Ok(Self { sinks, by_kind })
    }

    /// Hand a tag to its resolved sink, if any. Write failures are fatal
    /// for the whole pass.
    pub fn route(&mut self, tag: &Tag) -> Result<()> {
        let Some(index) = self.by_kind[slot(tag.kind())] else {
            return Ok(());
        };
        let sink = &mut self.sinks[index];
        sink.writer.write_tag(tag).map_err(|e| Error::SinkWrite {
            path: sink.path.clone(),
            source: e,
        })
    }

    /// Number of distinct opened sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Whether `kind` resolves to a sink.
    pub fn is_routed(&self, kind: TrackKind) -> bool {
        self.by_kind[slot(kind)].is_some()
    }

    /// Flush and close every sink.
    pub fn finish(self) -> Result<()> {
        for sink in self.sinks {
            sink.writer.into_inner().map_err(|e| Error::SinkWrite {
                path: sink.path.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}
