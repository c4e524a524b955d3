//! Error types for message parsing.

use std::io;
use std::string::FromUtf8Error;

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message parsing errors.
///
/// Every error is fatal to the parse that produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The envelope could not be split into a header block and a body.
    #[error("Malformed message envelope: {0}")]
    MalformedEnvelope(String),

    /// A Content-Type value is missing or cannot be parsed.
    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),

    /// A Content-Disposition value cannot be parsed.
    #[error("Invalid content disposition: {0}")]
    InvalidDisposition(String),

    /// A file part resolved to an empty file name.
    #[error("Invalid blank file name")]
    BlankFilename,

    /// A Content-Transfer-Encoding value is not supported.
    #[error("Unknown part encoding: {0}")]
    UnknownEncoding(String),

    /// Multipart nesting went deeper than the configured limit.
    #[error("Multipart nesting exceeds maximum depth of {0}")]
    MaxDepthExceeded(usize),

    /// A multipart body does not follow the boundary grammar.
    #[error("Invalid multipart structure: {0}")]
    Multipart(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),

    /// I/O error from the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Payload-free classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::MalformedEnvelope`].
    MalformedEnvelope,
    /// See [`Error::InvalidMediaType`].
    InvalidMediaType,
    /// See [`Error::InvalidDisposition`].
    InvalidDisposition,
    /// See [`Error::BlankFilename`].
    BlankFilename,
    /// See [`Error::UnknownEncoding`].
    UnknownEncoding,
    /// See [`Error::MaxDepthExceeded`].
    MaxDepthExceeded,
    /// See [`Error::Multipart`].
    Multipart,
    /// See [`Error::Base64Decode`] and [`Error::Utf8Decode`].
    Decode,
    /// See [`Error::Io`].
    Io,
}

impl Error {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedEnvelope(_) => ErrorKind::MalformedEnvelope,
            Self::InvalidMediaType(_) => ErrorKind::InvalidMediaType,
            Self::InvalidDisposition(_) => ErrorKind::InvalidDisposition,
            Self::BlankFilename => ErrorKind::BlankFilename,
            Self::UnknownEncoding(_) => ErrorKind::UnknownEncoding,
            Self::MaxDepthExceeded(_) => ErrorKind::MaxDepthExceeded,
            Self::Multipart(_) => ErrorKind::Multipart,
            Self::Base64Decode(_) | Self::Utf8Decode(_) => ErrorKind::Decode,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns true if the error came from the underlying reader.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
