//! Media type values as found in Content-Type and Content-Disposition.
//!
//! Grammar follows RFC 2045 section 5.1 and RFC 2183, with RFC 2231
//! parameter value extensions and continuations.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// RFC 2045 `tspecials`.
const TSPECIALS: &str = "()<>@,;:\\\"/[]?=";

/// A parsed media type (or disposition type) with its parameters.
///
/// The type itself and all parameter names are lower-cased; parameter values
/// keep their case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    /// Type value, e.g. `text/plain` or `inline`.
    pub value: String,
    /// Parameters (e.g., charset=utf-8, boundary=xxx).
    pub parameters: HashMap<String, String>,
}

impl MediaType {
    /// Parses a Content-Type value.
    ///
    /// Format: `type/subtype; param1=value1; param2="quoted value"`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMediaType`] if the value is empty or malformed.
    pub fn parse(s: &str) -> Result<Self> {
        parse_value(s).map_err(|reason| Error::InvalidMediaType(format!("{reason} in {s:?}")))
    }

    /// Parses a Content-Disposition value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDisposition`] if the value is empty or
    /// malformed.
    pub fn parse_disposition(s: &str) -> Result<Self> {
        parse_value(s).map_err(|reason| Error::InvalidDisposition(format!("{reason} in {s:?}")))
    }

    /// Main type (e.g., "text", "image", "multipart").
    #[must_use]
    pub fn main_type(&self) -> &str {
        self.value.split_once('/').map_or(self.value.as_str(), |(main, _)| main)
    }

    /// Subtype (e.g., "plain", "html", "jpeg"). Empty for disposition types.
    #[must_use]
    pub fn sub_type(&self) -> &str {
        self.value.split_once('/').map_or("", |(_, sub)| sub)
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.param("charset")
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.param("boundary")
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.value.starts_with("multipart/")
    }

    /// Checks if this is a text content type.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.main_type() == "text"
    }
}

fn parse_value(s: &str) -> std::result::Result<MediaType, &'static str> {
    let base = s.split_once(';').map_or(s, |(base, _)| base);
    let value = base.trim().to_lowercase();
    check_type(&value)?;

    let mut parameters = HashMap::new();
    let mut continuations: HashMap<String, HashMap<String, String>> = HashMap::new();

    let mut rest = &s[base.len()..];
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let Some((key, param_value, remaining)) = consume_param(rest) else {
            // Trailing semicolons are tolerated.
            if rest.trim() == ";" {
                break;
            }
            return Err("invalid media parameter");
        };

        let map = match key.split_once('*') {
            Some((base_name, _)) => continuations.entry(base_name.to_string()).or_default(),
            None => &mut parameters,
        };
        if map.get(&key).is_some_and(|existing| *existing != param_value) {
            return Err("duplicate parameter name");
        }
        map.insert(key, param_value);
        rest = remaining;
    }

    for (key, pieces) in continuations {
        if let Some(encoded) = pieces.get(&format!("{key}*")) {
            if let Some(decoded) = decode_extended(encoded) {
                parameters.insert(key, decoded);
            }
            continue;
        }

        let mut joined = String::new();
        let mut found = false;
        for n in 0.. {
            let simple = format!("{key}*{n}");
            if let Some(piece) = pieces.get(&simple) {
                found = true;
                joined.push_str(piece);
                continue;
            }
            let Some(piece) = pieces.get(&format!("{simple}*")) else {
                break;
            };
            found = true;
            let decoded = if n == 0 {
                decode_extended(piece)
            } else {
                percent_unescape(piece)
            };
            if let Some(decoded) = decoded {
                joined.push_str(&decoded);
            }
        }
        if found {
            parameters.insert(key, joined);
        }
    }

    Ok(MediaType { value, parameters })
}

/// Checks `token [ "/" token ]`.
fn check_type(value: &str) -> std::result::Result<(), &'static str> {
    let (main, rest) = consume_token(value);
    if main.is_empty() {
        return Err("no media type");
    }
    if rest.is_empty() {
        return Ok(());
    }
    let Some(rest) = rest.strip_prefix('/') else {
        return Err("expected slash after first token");
    };
    let (sub, rest) = consume_token(rest);
    if sub.is_empty() {
        return Err("expected token after slash");
    }
    if !rest.is_empty() {
        return Err("unexpected content after media subtype");
    }
    Ok(())
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !TSPECIALS.contains(c)
}

fn consume_token(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_token_char(c)).unwrap_or(s.len());
    s.split_at(end)
}

/// Consumes a token or a quoted string.
fn consume_value(s: &str) -> Option<(String, &str)> {
    let Some(quoted) = s.strip_prefix('"') else {
        let (token, rest) = consume_token(s);
        return (!token.is_empty()).then(|| (token.to_string(), rest));
    };

    let mut value = String::new();
    let mut chars = quoted.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, &quoted[i + 1..])),
            '\\' => match quoted[i + 1..].chars().next() {
                Some(next) if TSPECIALS.contains(next) => {
                    value.push(next);
                    chars.next();
                }
                _ => value.push(c),
            },
            '\r' | '\n' => return None,
            _ => value.push(c),
        }
    }

    // Unterminated quoted string.
    None
}

/// Consumes `; key=value`, returning the lower-cased key, the value and the
/// remaining input.
fn consume_param(s: &str) -> Option<(String, String, &str)> {
    let rest = s.trim_start().strip_prefix(';')?.trim_start();
    let (key, rest) = consume_token(rest);
    if key.is_empty() {
        return None;
    }
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let (value, rest) = consume_value(rest)?;
    Some((key.to_lowercase(), value, rest))
}

/// Decodes an RFC 2231 `charset'language'percent-encoded` value.
fn decode_extended(s: &str) -> Option<String> {
    let mut fields = s.splitn(3, '\'');
    let charset = fields.next()?.to_lowercase();
    let _language = fields.next()?;
    let encoded = fields.next()?;
    if charset != "us-ascii" && charset != "utf-8" {
        return None;
    }
    percent_unescape(encoded)
}

fn percent_unescape(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s
                .get(i + 1..i + 3)
                .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(String::from_utf8_lossy(&out).into_owned())
}
