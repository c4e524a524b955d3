//! MIME header handling.
//!
//! [`Headers`] keeps fields in the order they were first seen. Field names are
//! stored in canonical form (`content-type` becomes `Content-Type`) so lookups
//! are case-insensitive, and a field may carry several values.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Ordered collection of email headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Headers {
    fields: Vec<(String, Vec<String>)>,
    /// Canonical name to position in `fields`.
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<String, usize>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical form of a header field name.
    ///
    /// The first letter and any letter following a hyphen are upper-cased,
    /// the rest lower-cased. Names containing bytes that are not allowed in a
    /// field name are returned unchanged.
    #[must_use]
    pub fn canonical_key(name: &str) -> String {
        if !name.bytes().all(is_field_name_byte) {
            return name.to_string();
        }

        let mut upper = true;
        name.chars()
            .map(|c| {
                let mapped = if upper {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                };
                upper = c == '-';
                mapped
            })
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&Self::canonical_key(name)).copied()
    }

    fn push_field(&mut self, key: String, values: Vec<String>) {
        self.index.insert(key.clone(), self.fields.len());
        self.fields.push((key, values));
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let value = value.into();
        let key = Self::canonical_key(name.as_ref());
        match self.index.get(&key).copied() {
            Some(i) => self.fields[i].1.push(value),
            None => self.push_field(key, vec![value]),
        }
    }

    /// Sets a header value, replacing any existing values.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.set_all(name, vec![value.into()]);
    }

    /// Sets every value of a header at once, replacing any existing values.
    pub fn set_all(&mut self, name: impl AsRef<str>, values: Vec<String>) {
        let key = Self::canonical_key(name.as_ref());
        match self.index.get(&key).copied() {
            Some(i) => self.fields[i].1 = values,
            None => self.push_field(key, values),
        }
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|i| self.fields[i].1.first().map(String::as_str))
    }

    /// Gets all values for a header.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.position(name)
            .map(|i| self.fields[i].1.as_slice())
            .unwrap_or_default()
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        if let Some(i) = self.index.remove(&Self::canonical_key(name)) {
            self.fields.remove(i);
            for position in self.index.values_mut() {
                if *position > i {
                    *position -= 1;
                }
            }
        }
    }

    /// Returns the number of distinct header fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no header fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the canonical names of all fields, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Returns an iterator over each field and its values.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns an iterator over all `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Copies every field.
    #[must_use]
    pub fn copy_all(&self) -> Self {
        self.clone()
    }

    /// Copies every field, then replaces fields present in `overrides`.
    ///
    /// A field in `overrides` replaces all values of the same field. Fields
    /// only present in `overrides` are appended.
    #[must_use]
    pub fn copy_replacing(&self, overrides: &Self) -> Self {
        let mut copy = self.clone();
        for (name, values) in overrides.fields() {
            copy.set_all(name, values.to_vec());
        }
        copy
    }

    /// Copies only the listed fields, in the order of `keys`.
    ///
    /// Keys absent from `self` are skipped.
    #[must_use]
    pub fn copy_only(&self, keys: &[&str]) -> Self {
        let mut copy = Self::new();
        for key in keys {
            if let Some(i) = self.position(key) {
                let (name, values) = &self.fields[i];
                copy.set_all(name, values.clone());
            }
        }
        copy
    }

    /// Parses headers from raw text.
    ///
    /// Headers are in the format:
    /// ```text
    /// Header-Name: value
    /// Continuation: line
    ///  folded onto the previous field
    /// ```
    ///
    /// Parsing stops at the first empty line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedEnvelope`] if a line is not a valid field.
    pub fn parse(text: &str) -> Result<Self> {
        read_block(text.as_bytes())
            .map(|(headers, _)| headers)
            .map_err(Error::MalformedEnvelope)
    }
}

/// Reads a header block from the start of `input`.
///
/// Returns the headers and the offset of the first byte after the blank line
/// that terminates the block (or `input.len()` if there is none). Lines may
/// end in CRLF or a bare LF.
pub(crate) fn read_block(input: &[u8]) -> std::result::Result<(Headers, usize), String> {
    let mut headers = Headers::new();
    let mut current: Option<(String, String)> = None;
    let mut pos = 0;

    while pos < input.len() {
        let (line, next) = match input[pos..].iter().position(|&b| b == b'\n') {
            Some(end) => (&input[pos..pos + end], pos + end + 1),
            None => (&input[pos..], input.len()),
        };
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        pos = next;

        if line.is_empty() {
            if let Some((name, value)) = current.take() {
                headers.add(name, value);
            }
            return Ok((headers, pos));
        }

        if line[0] == b' ' || line[0] == b'\t' {
            let Some((_, value)) = current.as_mut() else {
                return Err(format!(
                    "malformed initial header line: {:?}",
                    String::from_utf8_lossy(line)
                ));
            };
            let folded = String::from_utf8_lossy(line);
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(folded.trim());
            continue;
        }

        if let Some((name, value)) = current.take() {
            headers.add(name, value);
        }

        let name_end = line
            .iter()
            .position(|&b| b == b':')
            .filter(|&i| i > 0 && line[..i].iter().copied().all(is_field_name_byte))
            .ok_or_else(|| {
                format!(
                    "malformed header line: {:?}",
                    String::from_utf8_lossy(line)
                )
            })?;

        let name = String::from_utf8_lossy(&line[..name_end]).into_owned();
        let value = String::from_utf8_lossy(&line[name_end + 1..])
            .trim()
            .to_string();
        current = Some((name, value));
    }

    if let Some((name, value)) = current {
        headers.add(name, value);
    }

    Ok((headers, input.len()))
}

/// RFC 5322 field names are printable US-ASCII except the colon.
const fn is_field_name_byte(b: u8) -> bool {
    b.is_ascii_graphic() && b != b':'
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
    use proptest::prelude::*;

    #[test]
    fn test_headers_new() {
        let headers = Headers::new();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(Headers::canonical_key("content-type"), "Content-Type");
        assert_eq!(Headers::canonical_key("MIME-VERSION"), "Mime-Version");
        assert_eq!(Headers::canonical_key("x-mailer"), "X-Mailer");
        assert_eq!(Headers::canonical_key("bad key"), "bad key");
    }

    #[test]
    fn test_headers_add_get() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain")); // Case insensitive
        assert_eq!(headers.names().collect::<Vec<_>>(), vec!["Content-Type"]);
    }

    #[test]
    fn test_headers_set() {
        let mut headers = Headers::new();
        headers.add("To", "alice@example.com");
        headers.add("to", "bob@example.com");
        assert_eq!(headers.get_all("To").len(), 2);

        headers.set("To", "charlie@example.com");
        assert_eq!(headers.get_all("To").len(), 1);
        assert_eq!(headers.get("To"), Some("charlie@example.com"));
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = Headers::new();
        headers.add("Subject", "Test");
        assert!(headers.contains("Subject"));

        headers.remove("subject");
        assert!(headers.get("Subject").is_none());
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let mut headers = Headers::new();
        headers.add("Subject", "Test");
        headers.add("From", "a@example.com");
        headers.add("Date", "today");
        headers.add("From", "b@example.com");

        let names: Vec<_> = headers.names().collect();
        assert_eq!(names, vec!["Subject", "From", "Date"]);
        assert_eq!(headers.iter().count(), 4);
    }

    #[test]
    fn test_headers_parse() {
        let text = concat!(
            "From: sender@example.com\r\n",
            "To: recipient@example.com\r\n",
            "Subject: Test Message\r\n",
            "Content-Type: text/plain;\r\n",
            " charset=utf-8\r\n",
            "\r\n"
        );

        let headers = Headers::parse(text).unwrap();
        assert_eq!(headers.get("From"), Some("sender@example.com"));
        assert_eq!(headers.get("To"), Some("recipient@example.com"));
        assert_eq!(headers.get("Subject"), Some("Test Message"));
        assert_eq!(
            headers.get("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
    }

    #[test]
    fn test_headers_parse_rejects_garbage() {
        assert!(Headers::parse("not a header\r\n\r\n").is_err());
        assert!(Headers::parse(" folded first\r\n\r\n").is_err());
        assert!(Headers::parse(": no name\r\n\r\n").is_err());
    }

    #[test]
    fn test_read_block_offset() {
        let raw = b"Subject: hi\nX-Test: 1\n\nbody\n";
        let (headers, offset) = read_block(raw).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(&raw[offset..], b"body\n");
    }

    #[test]
    fn test_read_block_without_blank_line() {
        let raw = b"Subject: hi\r\n";
        let (headers, offset) = read_block(raw).unwrap();
        assert_eq!(headers.get("subject"), Some("hi"));
        assert_eq!(offset, raw.len());
    }

    #[test]
    fn test_remove_keeps_lookups_in_order() {
        let mut headers = Headers::new();
        headers.add("From", "a@example.com");
        headers.add("Subject", "Test");
        headers.add("To", "b@example.com");

        headers.remove("from");
        assert_eq!(headers.get("Subject"), Some("Test"));
        assert_eq!(headers.get("To"), Some("b@example.com"));

        headers.add("From", "c@example.com");
        assert_eq!(
            headers.names().collect::<Vec<_>>(),
            vec!["Subject", "To", "From"]
        );
    }

    #[test]
    fn test_read_block_many_fields() {
        let count = 50_000;
        let mut raw = String::new();
        for i in 0..count {
            raw.push_str(&format!("X-H{i}: v{i}\r\n"));
        }
        raw.push_str("\r\n");

        let started = std::time::Instant::now();
        let (headers, offset) = read_block(raw.as_bytes()).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(headers.len(), count);
        assert_eq!(offset, raw.len());
        assert_eq!(headers.get("x-h49999"), Some("v49999"));
        // Linear in the number of fields; a per-insert scan takes minutes here.
        assert!(elapsed.as_secs() < 10, "took {elapsed:?}");
    }

    #[test]
    fn test_copy_replacing() {
        let mut headers = Headers::new();
        headers.add("From", "a@example.com");
        headers.add("To", "b@example.com");
        headers.add("To", "c@example.com");

        let mut overrides = Headers::new();
        overrides.add("to", "d@example.com");
        overrides.add("Subject", "New");

        let copy = headers.copy_replacing(&overrides);
        assert_eq!(copy.get_all("To"), ["d@example.com"]);
        assert_eq!(copy.get("Subject"), Some("New"));
        assert_eq!(copy.get("From"), Some("a@example.com"));
        // The source is untouched.
        assert_eq!(headers.get_all("To").len(), 2);
    }

    #[test]
    fn test_copy_only() {
        let mut headers = Headers::new();
        headers.add("From", "a@example.com");
        headers.add("Content-Transfer-Encoding", "base64");
        headers.add("Content-Type", "text/plain");

        let copy = headers.copy_only(&["Content-Type", "Content-Transfer-Encoding", "X-Missing"]);
        assert_eq!(
            copy.names().collect::<Vec<_>>(),
            vec!["Content-Type", "Content-Transfer-Encoding"]
        );
        assert!(!copy.contains("From"));
    }

    #[test]
    fn test_copy_all_is_deep() {
        let mut headers = Headers::new();
        headers.add("To", "a@example.com");

        let mut copy = headers.copy_all();
        copy.add("To", "b@example.com");

        assert_eq!(headers.get_all("To").len(), 1);
        assert_eq!(copy.get_all("To").len(), 2);
    }

    proptest! {
        #[test]
        fn prop_copy_only_is_subset(
            entries in proptest::collection::vec(("[A-Za-z][A-Za-z-]{0,8}", "[ -~]{0,16}"), 0..8),
            keys in proptest::collection::vec("[A-Za-z][A-Za-z-]{0,8}", 0..4),
        ) {
            let mut headers = Headers::new();
            for (name, value) in &entries {
                headers.add(name, value.clone());
            }
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            let copy = headers.copy_only(&keys);

            for (name, values) in copy.fields() {
                prop_assert_eq!(values, headers.get_all(name));
                prop_assert!(keys.iter().any(|k| Headers::canonical_key(k) == name));
            }
        }

        #[test]
        fn prop_copy_replacing_prefers_overrides(
            entries in proptest::collection::vec(("[A-Za-z][A-Za-z-]{0,8}", "[ -~]{0,16}"), 0..8),
            overrides in proptest::collection::vec(("[A-Za-z][A-Za-z-]{0,8}", "[ -~]{0,16}"), 0..8),
        ) {
            let mut base = Headers::new();
            for (name, value) in &entries {
                base.add(name, value.clone());
            }
            let mut over = Headers::new();
            for (name, value) in &overrides {
                over.add(name, value.clone());
            }

            let copy = base.copy_replacing(&over);
            for (name, values) in copy.fields() {
                if over.contains(name) {
                    prop_assert_eq!(values, over.get_all(name));
                } else {
                    prop_assert_eq!(values, base.get_all(name));
                }
            }
        }
    }
}
