//! Error types for flvmend-media.

use std::io;
use thiserror::Error;

/// Result type for flvmend-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for flvmend-media operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid FLV file structure.
    #[error("Invalid FLV: {0}")]
    InvalidFlv(String),

    /// Invalid AMF0 data.
    #[error("Invalid AMF0: {0}")]
    InvalidAmf(String),

    /// Unknown AMF0 type marker.
    #[error("Unknown AMF0 marker 0x{marker:02x} at byte {at}")]
    UnknownMarker { marker: u8, at: usize },

    /// Buffer too small for operation.
    #[error("Buffer underflow: need {need} bytes, have {have}")]
    BufferUnderflow { need: usize, have: usize },

    /// Unsupported feature or value kind.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Create an invalid FLV error.
    pub fn invalid_flv(msg: impl Into<String>) -> Self {
        Self::InvalidFlv(msg.into())
    }

    /// Create an invalid AMF0 error.
    pub fn invalid_amf(msg: impl Into<String>) -> Self {
        Self::InvalidAmf(msg.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}
