//! # mailread
//!
//! Reads RFC 822/MIME messages into headers, textual body parts and files.
//!
//! ## Features
//!
//! - **Envelope parsing**: header block and body, CRLF or bare LF
//! - **Multipart**: arbitrarily nested `multipart/*` bodies, with a
//!   configurable depth limit
//! - **Decoding**: Base64 and Quoted-Printable transfer encodings
//! - **Classification**: `multipart/alternative` children become body parts;
//!   other leaves become attachments or inline files, named from
//!   Content-Disposition `filename` or Content-Type `name`
//! - **Header projection**: copy, copy with overrides, copy selected fields
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailread::Message;
//!
//! let raw = b"From: sender@example.com\r\n\
//!             Subject: Test\r\n\
//!             Content-Type: text/plain\r\n\
//!             \r\n\
//!             Hello, World!";
//!
//! let message = Message::parse(raw)?;
//! println!("Subject: {}", message.subject().unwrap_or("(no subject)"));
//! println!("Body: {}", message.parts[0].body_text()?);
//! ```
//!
//! ### Attachments and Inline Files
//!
//! ```ignore
//! use mailread::Message;
//!
//! let message = Message::parse(&raw)?;
//! for file in &message.attachments {
//!     println!("{} ({} bytes)", file.filename, file.len());
//! }
//! for file in &message.embedded {
//!     println!("inline: {}", file.filename);
//! }
//! ```
//!
//! ### Reading From a Stream
//!
//! ```ignore
//! use mailread::{Message, MessageReader, ParseOptions};
//!
//! let reader = MessageReader::new(ParseOptions::new().max_depth(8));
//! let mut message = Message::new();
//! let consumed = reader.read_into(std::fs::File::open("mail.eml")?, &mut message)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod classify;
mod error;
mod header;
mod media_type;
mod message;
mod multipart;
mod reader;
mod walker;

pub mod encoding;

pub use classify::{MULTIPART_ALTERNATIVE, Placement, classify};
pub use encoding::TransferEncoding;
pub use error::{Error, ErrorKind, Result};
pub use header::Headers;
pub use media_type::MediaType;
pub use message::{File, Message, Part};
pub use multipart::{BodyPart, MultipartReader};
pub use reader::{
    DEFAULT_CHARSET, DEFAULT_ENCODING, DEFAULT_MAX_DEPTH, MessageReader, ParseOptions,
};
