//! Error types for stegscan.

use thiserror::Error;

/// Result type alias for stegscan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while embedding, extracting or detecting.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding failed.
    #[error("Image error: {0}")]
    Image(String),

    /// The bitstream does not fit in the embedding medium.
    #[error("Capacity exceeded: need {needed} bits, medium holds {available} bits")]
    CapacityExceeded { needed: usize, available: usize },

    /// Alpha-channel embedding was requested on an image without alpha.
    #[error("Image has no alpha channel")]
    NoAlphaChannel,

    /// The embedding method cannot operate on this channel layout.
    #[error("Method {method} does not support images with {channels} channel(s)")]
    UnsupportedChannels { method: &'static str, channels: usize },

    /// Two images that must share a shape do not.
    #[error("Shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    /// Pixel buffer does not match the declared geometry.
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Extraction ran out of bits before reaching the terminator.
    #[error("Terminator not found after scanning {bits_scanned} bits")]
    TerminatorNotFound { bits_scanned: usize },

    /// The recovered payload is not valid UTF-8.
    #[error("Recovered payload is not valid UTF-8")]
    InvalidMessage,

    /// No coefficient adjustment survives clipping and rounding for this block.
    #[error("Block ({block_row}, {block_col}) in channel {channel} cannot hold a parity bit")]
    UnstableBlock {
        channel: usize,
        block_row: usize,
        block_col: usize,
    },

    /// Configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}
