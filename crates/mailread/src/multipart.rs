//! Multipart body splitting (RFC 2046 section 5.1).

use crate::encoding::{TransferEncoding, decode_quoted_printable};
use crate::error::{Error, Result};
use crate::header::{self, Headers};
use std::borrow::Cow;

/// One body part of a multipart entity.
#[derive(Debug, Clone)]
pub struct BodyPart<'a> {
    /// Part headers.
    pub headers: Headers,
    /// Part content. Quoted-printable content is already decoded.
    pub content: Cow<'a, [u8]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Open,
    Close,
}

/// Reads the sibling parts of a multipart body one at a time.
///
/// The preamble before the first delimiter and the epilogue after the close
/// delimiter are ignored. A part declaring
/// `Content-Transfer-Encoding: quoted-printable` is decoded here and the
/// header is removed from the part.
#[derive(Debug)]
pub struct MultipartReader<'a> {
    input: &'a [u8],
    dash_boundary: Vec<u8>,
    pos: usize,
    started: bool,
    finished: bool,
}

impl<'a> MultipartReader<'a> {
    /// Creates a reader over `input` split on `boundary`.
    #[must_use]
    pub fn new(input: &'a [u8], boundary: &str) -> Self {
        let mut dash_boundary = Vec::with_capacity(boundary.len() + 2);
        dash_boundary.extend_from_slice(b"--");
        dash_boundary.extend_from_slice(boundary.as_bytes());
        Self {
            input,
            dash_boundary,
            pos: 0,
            started: false,
            finished: false,
        }
    }

    /// Returns the next part, or `None` after the close delimiter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Multipart`] if there is no opening delimiter, a part
    /// is not terminated by a delimiter, or a part's header block is
    /// malformed.
    pub fn next_part(&mut self) -> Result<Option<BodyPart<'a>>> {
        let input = self.input;
        if self.finished {
            return Ok(None);
        }

        if !self.started {
            let Some((_, next, kind)) = self.find_delimiter(self.pos) else {
                self.finished = true;
                return Err(Error::Multipart(
                    "no opening boundary delimiter found".to_string(),
                ));
            };
            self.started = true;
            self.pos = next;
            if kind == Delimiter::Close {
                self.finished = true;
                return Ok(None);
            }
        }

        let start = self.pos;
        let Some((line_start, next, kind)) = self.find_delimiter(start) else {
            self.finished = true;
            return Err(Error::Multipart(
                "unexpected end of body, missing boundary delimiter".to_string(),
            ));
        };
        self.pos = next;
        self.finished = kind == Delimiter::Close;

        // The line break before a delimiter belongs to the delimiter.
        let mut end = line_start;
        if end > start && input[end - 1] == b'\n' {
            end -= 1;
            if end > start && input[end - 1] == b'\r' {
                end -= 1;
            }
        }

        let raw = &input[start..end];
        let (mut headers, offset) = header::read_block(raw).map_err(|reason| {
            self.finished = true;
            Error::Multipart(format!("malformed part header: {reason}"))
        })?;
        let body = &raw[offset..];

        let quoted_printable = headers
            .get("Content-Transfer-Encoding")
            .is_some_and(|cte| TransferEncoding::parse(cte) == TransferEncoding::QuotedPrintable);
        let content = if quoted_printable {
            headers.remove("Content-Transfer-Encoding");
            Cow::Owned(decode_quoted_printable(body))
        } else {
            Cow::Borrowed(body)
        };

        Ok(Some(BodyPart { headers, content }))
    }

    /// Finds the next delimiter line at or after `from`.
    ///
    /// Returns the offset where the line starts, the offset just past its line
    /// break, and the delimiter kind.
    fn find_delimiter(&self, from: usize) -> Option<(usize, usize, Delimiter)> {
        let mut pos = from;
        while pos < self.input.len() {
            let rest = &self.input[pos..];
            let (line, next) = match rest.iter().position(|&b| b == b'\n') {
                Some(i) => (&rest[..i], pos + i + 1),
                None => (rest, self.input.len()),
            };
            if let Some(kind) = self.delimiter_kind(line) {
                return Some((pos, next, kind));
            }
            pos = next;
        }
        None
    }

    fn delimiter_kind(&self, line: &[u8]) -> Option<Delimiter> {
        let rest = line.strip_prefix(self.dash_boundary.as_slice())?;
        let (kind, padding) = match rest.strip_prefix(b"--") {
            Some(padding) => (Delimiter::Close, padding),
            None => (Delimiter::Open, rest),
        };
        // Transport padding is allowed after the boundary.
        padding
            .iter()
            .all(|&b| matches!(b, b' ' | b'\t' | b'\r'))
            .then_some(kind)
    }
}

impl<'a> Iterator for MultipartReader<'a> {
    type Item = Result<BodyPart<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_part().transpose()
    }
}
