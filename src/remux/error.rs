//! Error types for the remux engine.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling or rewriting a tag stream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Container or codec layer failure.
    #[error("{0}")]
    Media(#[from] flvmend_media::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to open the input file.
    #[error("failed to open input {}: {source}", path.display())]
    SourceOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create an output file.
    #[error("failed to open output {}: {source}", path.display())]
    SinkOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write to an output file.
    #[error("failed to write to {}: {source}", path.display())]
    SinkWrite {
        path: PathBuf,
        source: flvmend_media::Error,
    },

    /// Keyframe-offset update attempted on a stream with no keyframes.
    #[error("updating keyframe positions requires at least one keyframe")]
    NoKeyframes,

    /// Split requested without a destination for any track.
    #[error("no output configured for any track")]
    NoDestinations,
}
