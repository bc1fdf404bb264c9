//! Custom error types for the hwp-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// Every failure is local to the stream (or document) being decoded. Unknown
/// record tags are not an error: they decode to an opaque payload.
#[derive(Debug, Error)]
pub enum HwpError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// A container entry is missing or could not be read.
    #[error("Container entry '{entry}' unavailable: {reason}")]
    Container { entry: String, reason: String },

    /// The document uses a feature this reader refuses to decode
    /// (password protection, unsupported major version).
    #[error("Unsupported document: {0}")]
    UnsupportedFormat(String),

    /// The file is structurally invalid (bad signature, short file header).
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A compressed block is malformed.
    #[error("Stream transform failed: {0}")]
    Transform(String),

    /// Compressed input ran out before the final DEFLATE block.
    #[error("Compressed stream ended before its final block ({consumed} bytes consumed, {produced} produced)")]
    TruncatedStream { consumed: usize, produced: usize },

    /// The distribution-document precondition does not hold, or the
    /// ciphertext is not block aligned.
    #[error("Distribution decryption failed: {0}")]
    Crypto(String),

    /// Fewer bytes remain than a record header or payload requires.
    #[error("Truncated record at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedRecord {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A payload is shorter than the fixed fields of its record type.
    #[error("Malformed payload for tag {tag} at offset {offset}: expected at least {expected} bytes, found {found}")]
    MalformedPayload {
        tag: u16,
        offset: usize,
        expected: usize,
        found: usize,
    },

    /// The container mutex was poisoned by a panicking reader thread.
    #[error("Container lock poisoned")]
    LockPoisoned,

    /// Wraps an error with the name of the stream it occurred in.
    #[error("stream '{stream}': {source}")]
    InStream {
        stream: String,
        #[source]
        source: Box<HwpError>,
    },
}

impl HwpError {
    /// Attaches the stream name to this error. Already-wrapped errors are
    /// returned unchanged.
    pub fn in_stream(self, stream: impl Into<String>) -> Self {
        match self {
            wrapped @ HwpError::InStream { .. } => wrapped,
            other => HwpError::InStream {
                stream: stream.into(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, looking through stream context.
    pub fn root(&self) -> &HwpError {
        match self {
            HwpError::InStream { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the stream this error was raised in, if known.
    pub fn stream(&self) -> Option<&str> {
        match self {
            HwpError::InStream { stream, .. } => Some(stream),
            _ => None,
        }
    }
}

/// A convenience `Result` type alias using the crate's `HwpError` type.
pub type Result<T> = std::result::Result<T, HwpError>;
