//! Content-Transfer-Encoding handling.
//!
//! Supports Base64 and Quoted-Printable decoding of part bodies.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::io::Read;

/// Transfer encoding types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TransferEncoding {
    /// 7-bit ASCII. Also used when no encoding is declared.
    #[default]
    SevenBit,
    /// 8-bit data.
    EightBit,
    /// Binary (no encoding).
    Binary,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Any other label, kept as declared.
    Other(String),
}

impl TransferEncoding {
    /// Parses transfer encoding from a header value.
    ///
    /// Matching is case-insensitive. An empty value means [`Self::SevenBit`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "" | "7bit" => Self::SevenBit,
            "8bit" => Self::EightBit,
            "binary" => Self::Binary,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Binary => write!(f, "binary"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Other(label) => f.write_str(label),
        }
    }
}

/// Reads a part body from `source`, decoding it according to `encoding`.
///
/// Quoted-printable bodies are passed through: the multipart reader has
/// already decoded them by the time a part reaches this point.
///
/// # Errors
///
/// Returns [`Error::UnknownEncoding`] for an unsupported label, a base64
/// decode error for corrupt base64 data, or the reader's I/O error.
pub fn decode_body(mut source: impl Read, encoding: &TransferEncoding) -> Result<Vec<u8>> {
    if let TransferEncoding::Other(label) = encoding {
        return Err(Error::UnknownEncoding(label.clone()));
    }

    let mut raw = Vec::new();
    source.read_to_end(&mut raw)?;

    match encoding {
        TransferEncoding::Base64 => decode_base64(&raw),
        _ => Ok(raw),
    }
}

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes Base64 data.
///
/// Line breaks and other ASCII whitespace are ignored.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = data
        .as_ref()
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// Decoding is lenient: an `=` that does not start a valid escape is kept
/// literally, and trailing whitespace on each line is dropped.
#[must_use]
pub fn decode_quoted_printable(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());

    for line in data.split_inclusive(|&b| b == b'\n') {
        let (content, newline): (&[u8], &[u8]) = if let Some(c) = line.strip_suffix(b"\r\n") {
            (c, b"\r\n")
        } else if let Some(c) = line.strip_suffix(b"\n") {
            (c, b"\n")
        } else {
            (line, b"")
        };

        let end = content
            .iter()
            .rposition(|&b| b != b' ' && b != b'\t')
            .map_or(0, |i| i + 1);
        let content = &content[..end];

        // Soft line break
        let (content, newline) = match content.strip_suffix(b"=") {
            Some(c) => (c, &b""[..]),
            None => (content, newline),
        };

        let mut i = 0;
        while i < content.len() {
            let byte = content[i];
            if byte == b'=' {
                if let Some(decoded) = content.get(i + 1..i + 3).and_then(hex_byte) {
                    result.push(decoded);
                    i += 3;
                    continue;
                }
            }
            result.push(byte);
            i += 1;
        }
        result.extend_from_slice(newline);
    }

    result
}

fn hex_byte(pair: &[u8]) -> Option<u8> {
    let [hi, lo] = pair else {
        return None;
    };
    let hi = char::from(*hi).to_digit(16)?;
    let lo = char::from(*lo).to_digit(16)?;
    u8::try_from((hi << 4) | lo).ok()
}
