//! Leaf part classification.

use crate::error::{Error, Result};
use crate::media_type::MediaType;

/// Media type whose leaf children are alternative renderings of the body.
pub const MULTIPART_ALTERNATIVE: &str = "multipart/alternative";

/// Where a leaf part is filed in a [`Message`](crate::Message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// A textual body alternative, filed as a [`Part`](crate::Part).
    Alternative,
    /// An inline file, filed with the embedded files.
    Embedded(String),
    /// An attached file.
    Attachment(String),
}

impl Placement {
    /// Returns the resolved file name, if this is a file.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Alternative => None,
            Self::Embedded(name) | Self::Attachment(name) => Some(name.as_str()),
        }
    }
}

/// Decides where a leaf part goes.
///
/// Children of `multipart/alternative` are body alternatives. Anything else
/// is a file: its name comes from the Content-Type `name` parameter, which
/// the Content-Disposition `filename` parameter overrides. An `inline`
/// disposition makes it an embedded file; no disposition or any other value
/// makes it an attachment.
///
/// # Errors
///
/// Returns [`Error::InvalidDisposition`] if `disposition` is present but
/// malformed, or [`Error::BlankFilename`] if no non-blank name is found.
pub fn classify(
    parent_media_type: &str,
    content_type: &MediaType,
    disposition: Option<&str>,
) -> Result<Placement> {
    if parent_media_type == MULTIPART_ALTERNATIVE {
        return Ok(Placement::Alternative);
    }

    let disposition = disposition.map(MediaType::parse_disposition).transpose()?;

    let filename = disposition
        .as_ref()
        .and_then(|cd| cd.param("filename"))
        .or_else(|| content_type.param("name"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(Error::BlankFilename)?
        .to_string();

    match disposition {
        Some(cd) if cd.value == "inline" => Ok(Placement::Embedded(filename)),
        _ => Ok(Placement::Attachment(filename)),
    }
}
