//! Recursive descent over multipart bodies.

use crate::classify::{Placement, classify};
use crate::encoding::{TransferEncoding, decode_body};
use crate::error::{Error, Result};
use crate::media_type::MediaType;
use crate::message::{File, Message, Part};
use crate::multipart::{BodyPart, MultipartReader};
use tracing::{debug, trace};

/// Files the parts of a multipart body into a [`Message`].
pub(crate) struct Walker<'m> {
    message: &'m mut Message,
    max_depth: usize,
}

impl<'m> Walker<'m> {
    pub(crate) const fn new(message: &'m mut Message, max_depth: usize) -> Self {
        Self { message, max_depth }
    }

    /// Walks every part of `body`, a `media_type` entity split on `boundary`.
    ///
    /// `depth` is 0 for the top-level body.
    pub(crate) fn walk(
        &mut self,
        body: &[u8],
        media_type: &str,
        boundary: &str,
        depth: usize,
    ) -> Result<()> {
        debug!(media_type, boundary, depth, "Reading multipart body");

        let mut reader = MultipartReader::new(body, boundary);
        while let Some(part) = reader.next_part()? {
            self.file_part(&part, media_type, depth)?;
        }
        Ok(())
    }

    fn file_part(&mut self, part: &BodyPart<'_>, parent: &str, depth: usize) -> Result<()> {
        let content_type = MediaType::parse(part.headers.get("Content-Type").unwrap_or_default())?;

        if content_type.is_multipart() {
            if depth >= self.max_depth {
                return Err(Error::MaxDepthExceeded(self.max_depth));
            }
            let boundary = content_type.boundary().unwrap_or_default();
            return self.walk(&part.content, &content_type.value, boundary, depth + 1);
        }

        let declared = part
            .headers
            .get("Content-Transfer-Encoding")
            .filter(|cte| !cte.is_empty())
            .map(TransferEncoding::parse);
        let body = decode_body(
            &part.content[..],
            declared.as_ref().unwrap_or(&TransferEncoding::SevenBit),
        )?;

        let placement = classify(
            parent,
            &content_type,
            part.headers.get("Content-Disposition"),
        )?;
        match placement {
            Placement::Alternative => {
                trace!(media_type = %content_type.value, len = body.len(), "Part");
                self.message.parts.push(
                    Part::new(content_type.value, part.headers.clone(), body).with_encoding(declared),
                );
            }
            Placement::Embedded(filename) => {
                trace!(%filename, len = body.len(), "Embedded file");
                self.message
                    .embedded
                    .push(File::new(filename, part.headers.clone(), body));
            }
            Placement::Attachment(filename) => {
                trace!(%filename, len = body.len(), "Attachment");
                self.message
                    .attachments
                    .push(File::new(filename, part.headers.clone(), body));
            }
        }
        Ok(())
    }
}
