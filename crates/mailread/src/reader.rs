//! Message reading: envelope parsing and dispatch.

use crate::encoding::TransferEncoding;
use crate::error::{Error, Result};
use crate::header;
use crate::media_type::MediaType;
use crate::message::{Message, Part};
use crate::walker::Walker;
use std::io::Read;
use tracing::debug;

/// Charset assumed when the Content-Type header names none.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Default transfer encoding recorded on a fresh message.
pub const DEFAULT_ENCODING: TransferEncoding = TransferEncoding::QuotedPrintable;

/// Default limit on multipart nesting below the top-level body.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Envelope fields that are consumed rather than copied to the message.
const RESERVED_HEADERS: [&str; 2] = ["Content-Type", "Mime-Version"];

/// Envelope fields kept on the part of a single-part message.
const SINGLE_PART_HEADERS: [&str; 2] = ["Content-Type", "Content-Transfer-Encoding"];

/// Options for a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Charset recorded when the message does not declare one.
    pub charset: String,
    /// Default transfer encoding recorded on the message.
    pub encoding: TransferEncoding,
    /// Maximum multipart nesting below the top-level body.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_string(),
            encoding: DEFAULT_ENCODING,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Creates options with the default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default charset.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Sets the default transfer encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: TransferEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the maximum multipart nesting depth.
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Reads messages with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct MessageReader {
    options: ParseOptions,
}

impl MessageReader {
    /// Creates a reader with the given options.
    #[must_use]
    pub const fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Returns the options used by this reader.
    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Reads a whole message from `reader` into `message`.
    ///
    /// `message` is reset first and only receives the parsed content if the
    /// parse succeeds; on error it is left empty. Returns the number of bytes
    /// consumed. The count is not reported on error, since the input is read
    /// in full before parsing starts.
    ///
    /// # Errors
    ///
    /// Returns the reader's I/O error or the first parse error.
    pub fn read_into(&self, mut reader: impl Read, message: &mut Message) -> Result<u64> {
        message.reset(&self.options);

        let mut raw = Vec::new();
        let n = reader.read_to_end(&mut raw)?;

        *message = self.parse(&raw)?;
        Ok(n as u64)
    }

    /// Parses a raw message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedEnvelope`] if the header block cannot be
    /// read, [`Error::InvalidMediaType`] if the top-level Content-Type is
    /// missing or invalid, or the first error from the multipart walk.
    pub fn parse(&self, raw: &[u8]) -> Result<Message> {
        debug!(len = raw.len(), "Parsing message");

        if raw.is_empty() {
            return Err(Error::MalformedEnvelope("empty message".to_string()));
        }
        let (envelope, offset) = header::read_block(raw).map_err(Error::MalformedEnvelope)?;
        let body = &raw[offset..];

        let mut message = Message::with_options(&self.options);
        for (name, values) in envelope.fields() {
            if !RESERVED_HEADERS.contains(&name) {
                message.headers.set_all(name, values.to_vec());
            }
        }

        let content_type = MediaType::parse(envelope.get("Content-Type").unwrap_or_default())?;
        if let Some(charset) = content_type.charset() {
            message.charset = charset.to_string();
        }

        if content_type.is_multipart() {
            let boundary = content_type.boundary().unwrap_or_default();
            Walker::new(&mut message, self.options.max_depth).walk(
                body,
                &content_type.value,
                boundary,
                0,
            )?;
        } else {
            let encoding = envelope
                .get("Content-Transfer-Encoding")
                .filter(|cte| !cte.is_empty())
                .map(TransferEncoding::parse);
            let part = Part::new(
                content_type.value,
                envelope.copy_only(&SINGLE_PART_HEADERS),
                body.to_vec(),
            )
            .with_encoding(encoding);
            message.parts.push(part);
        }

        debug!(
            parts = message.parts.len(),
            attachments = message.attachments.len(),
            embedded = message.embedded.len(),
            "Parsed message"
        );
        Ok(message)
    }
}
