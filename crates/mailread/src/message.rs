//! Parsed message structure.

use crate::encoding::TransferEncoding;
use crate::error::Result;
use crate::header::Headers;
use crate::media_type::MediaType;
use crate::reader::{MessageReader, ParseOptions};
use std::io::Read;

/// A textual body part.
///
/// Parts read from a multipart body hold decoded content. The single body of
/// a non-multipart message is kept exactly as it appeared on the wire, with
/// [`Part::encoding`] telling how it is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Part {
    /// Media type (e.g., "text/plain").
    pub media_type: String,
    /// Part headers.
    pub headers: Headers,
    /// Part body.
    pub body: Vec<u8>,
    /// Transfer encoding, when the part declared one.
    pub encoding: Option<TransferEncoding>,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub fn new(media_type: impl Into<String>, headers: Headers, body: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            headers,
            body,
            encoding: None,
        }
    }

    /// Sets the declared transfer encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: Option<TransferEncoding>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Gets the parsed Content-Type header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is missing or invalid.
    pub fn content_type(&self) -> Result<MediaType> {
        MediaType::parse(self.headers.get("Content-Type").unwrap_or_default())
    }

    /// Gets the body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn body_text(&self) -> Result<String> {
        String::from_utf8(self.body.clone()).map_err(Into::into)
    }
}

/// A file carried by a message, either attached or embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct File {
    /// File name, trimmed and never blank.
    pub filename: String,
    /// Headers of the part the file came from.
    pub headers: Headers,
    /// Decoded file content.
    pub body: Vec<u8>,
}

impl File {
    /// Creates a new file.
    #[must_use]
    pub fn new(filename: impl Into<String>, headers: Headers, body: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            headers,
            body,
        }
    }

    /// Returns the raw Content-Type header of the originating part.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    /// Returns the size of the decoded content in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Parsed MIME message.
///
/// The header map never contains `Content-Type` or `Mime-Version`: the
/// former is consumed into [`Message::charset`] and the part structure.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Message {
    /// Message headers.
    pub headers: Headers,
    /// Charset label from the Content-Type header. Not applied to content.
    pub charset: String,
    /// Default transfer encoding for parts that do not declare one.
    pub encoding: TransferEncoding,
    /// Textual body parts, in stream order.
    pub parts: Vec<Part>,
    /// Attached files, in stream order.
    pub attachments: Vec<File>,
    /// Inline files, in stream order.
    pub embedded: Vec<File>,
}

impl Default for Message {
    fn default() -> Self {
        Self::with_options(&ParseOptions::default())
    }
}

impl Message {
    /// Creates an empty message with the default charset and encoding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty message using the defaults from `options`.
    #[must_use]
    pub fn with_options(options: &ParseOptions) -> Self {
        Self {
            headers: Headers::new(),
            charset: options.charset.clone(),
            encoding: options.encoding.clone(),
            parts: Vec::new(),
            attachments: Vec::new(),
            embedded: Vec::new(),
        }
    }

    /// Parses a raw message.
    ///
    /// # Errors
    ///
    /// Returns the first error found anywhere in the message.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        MessageReader::default().parse(raw)
    }

    /// Parses a raw message with the given options.
    ///
    /// # Errors
    ///
    /// Returns the first error found anywhere in the message.
    pub fn parse_with(raw: &[u8], options: &ParseOptions) -> Result<Self> {
        MessageReader::new(options.clone()).parse(raw)
    }

    /// Replaces this message with one read from `reader`.
    ///
    /// Returns the number of bytes consumed. On error the message is left
    /// empty and no count is reported.
    ///
    /// # Errors
    ///
    /// Returns the reader's I/O error or the first parse error.
    pub fn read_from(&mut self, reader: impl Read) -> Result<u64> {
        MessageReader::default().read_into(reader, self)
    }

    /// Resets the message to an empty state using the defaults from
    /// `options`.
    pub fn reset(&mut self, options: &ParseOptions) {
        *self = Self::with_options(options);
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.headers.get("from")
    }

    /// Gets the To header.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.headers.get("to")
    }

    /// Gets the Subject header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.headers.get("subject")
    }

    /// Gets the Date header.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.headers.get("date")
    }

    /// Gets the Message-ID header.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.headers.get("message-id")
    }

    /// Finds the first text/plain part.
    #[must_use]
    pub fn text_part(&self) -> Option<&Part> {
        self.parts.iter().find(|p| p.media_type == "text/plain")
    }

    /// Finds the first text/html part.
    #[must_use]
    pub fn html_part(&self) -> Option<&Part> {
        self.parts.iter().find(|p| p.media_type == "text/html")
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_message_defaults() {
        let message = Message::new();
        assert_eq!(message.charset, "UTF-8");
        assert_eq!(message.encoding, TransferEncoding::QuotedPrintable);
        assert!(message.headers.is_empty());
        assert!(message.parts.is_empty());
        assert!(message.attachments.is_empty());
        assert!(message.embedded.is_empty());
    }

    #[test]
    fn test_message_reset() {
        let mut message = Message::new();
        message.headers.add("Subject", "Old");
        message.parts.push(Part::new("text/plain", Headers::new(), b"x".to_vec()));

        let options = ParseOptions::default().charset("ISO-8859-1");
        message.reset(&options);

        assert!(message.headers.is_empty());
        assert!(message.parts.is_empty());
        assert_eq!(message.charset, "ISO-8859-1");
    }

    #[test]
    fn test_part_body_text() {
        let mut headers = Headers::new();
        headers.add("content-type", "text/plain; charset=utf-8");
        let part = Part::new("text/plain", headers, b"Hello, World!".to_vec());

        assert_eq!(part.body_text().unwrap(), "Hello, World!");
        assert_eq!(part.content_type().unwrap().charset(), Some("utf-8"));
    }

    #[test]
    fn test_part_body_text_invalid_utf8() {
        let part = Part::new("text/plain", Headers::new(), vec![0xff, 0xfe]);
        assert!(part.body_text().is_err());
    }

    #[test]
    fn test_file_accessors() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "image/png");
        let file = File::new("logo.png", headers, vec![1, 2, 3]);

        assert_eq!(file.content_type(), Some("image/png"));
        assert_eq!(file.len(), 3);
        assert!(!file.is_empty());
    }

    #[test]
    fn test_text_and_html_parts() {
        let mut message = Message::new();
        message
            .parts
            .push(Part::new("text/html", Headers::new(), b"<p>hi</p>".to_vec()));
        message
            .parts
            .push(Part::new("text/plain", Headers::new(), b"hi".to_vec()));

        assert_eq!(message.text_part().unwrap().body, b"hi");
        assert_eq!(message.html_part().unwrap().body, b"<p>hi</p>");
    }
}
