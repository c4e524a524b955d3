//! Integration tests for message parsing.
//!
//! Each test feeds a complete raw message through the public API and checks
//! how its parts, attachments and inline files are filed.

#![allow(clippy::unwrap_used)]

use mailread::encoding::encode_base64;
use mailread::{ErrorKind, Message, MessageReader, ParseOptions, TransferEncoding};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Joins lines with CRLF.
fn crlf(lines: &[&str]) -> Vec<u8> {
    let mut raw = lines.join("\r\n");
    raw.push_str("\r\n");
    raw.into_bytes()
}

#[test]
fn test_single_part_message() {
    init_tracing();
    let raw = crlf(&[
        "From: Alice <alice@example.com>",
        "To: Bob <bob@example.com>",
        "Subject: Lunch",
        "Date: Mon, 12 Oct 2026 10:00:00 +0000",
        "Message-ID: <1@example.com>",
        "MIME-Version: 1.0",
        "Content-Type: text/plain; charset=\"utf-8\"",
        "Content-Transfer-Encoding: quoted-printable",
        "",
        "Caf=C3=A9 at noon?",
    ]);

    let message = Message::parse(&raw).unwrap();

    assert_eq!(message.from(), Some("Alice <alice@example.com>"));
    assert_eq!(message.to(), Some("Bob <bob@example.com>"));
    assert_eq!(message.date(), Some("Mon, 12 Oct 2026 10:00:00 +0000"));
    assert_eq!(message.message_id(), Some("<1@example.com>"));
    assert_eq!(message.charset, "utf-8");
    assert!(!message.headers.contains("Content-Type"));
    assert!(!message.headers.contains("MIME-Version"));

    assert_eq!(message.parts.len(), 1);
    assert!(message.attachments.is_empty());
    assert!(message.embedded.is_empty());

    let part = &message.parts[0];
    assert_eq!(
        part.headers.names().collect::<Vec<_>>(),
        vec!["Content-Type", "Content-Transfer-Encoding"]
    );
    assert_eq!(part.encoding, Some(TransferEncoding::QuotedPrintable));
    // Single-part bodies are kept as sent.
    assert_eq!(part.body, b"Caf=C3=A9 at noon?\r\n");
}

#[test]
fn test_alternative_parts_in_order() {
    init_tracing();
    let raw = crlf(&[
        "Subject: Alternatives",
        "Content-Type: multipart/alternative; boundary=\"alt\"",
        "",
        "--alt",
        "Content-Type: text/plain; charset=utf-8",
        "",
        "Plain version",
        "--alt",
        "Content-Type: text/html; charset=utf-8",
        "Content-Transfer-Encoding: quoted-printable",
        "",
        "<p>HTML =",
        "version</p>",
        "--alt--",
    ]);

    let message = Message::parse(&raw).unwrap();

    assert_eq!(message.parts.len(), 2);
    assert!(message.attachments.is_empty());

    let text = message.text_part().unwrap();
    assert_eq!(text.body_text().unwrap(), "Plain version");
    assert_eq!(text.encoding, None);

    let html = message.html_part().unwrap();
    assert_eq!(html.body_text().unwrap(), "<p>HTML version</p>");
    // Quoted-printable is decoded by the multipart reader, which drops the header.
    assert_eq!(html.encoding, None);
    assert!(!html.headers.contains("Content-Transfer-Encoding"));

    assert_eq!(message.parts[0].media_type, "text/plain");
    assert_eq!(message.parts[1].media_type, "text/html");
}

#[test]
fn test_inline_and_attached_files() {
    init_tracing();
    let png = encode_base64(b"\x89PNG fake image");
    let raw = crlf(&[
        "Content-Type: multipart/mixed; boundary=mixed",
        "",
        "--mixed",
        "Content-Type: image/png",
        "Content-Disposition: inline; filename=x.png",
        "Content-Transfer-Encoding: base64",
        "",
        png.as_str(),
        "--mixed",
        "Content-Type: application/pdf",
        "Content-Disposition: attachment; filename=y.pdf",
        "",
        "%PDF-1.4",
        "--mixed--",
    ]);

    let message = Message::parse(&raw).unwrap();

    assert!(message.parts.is_empty());
    assert_eq!(message.embedded.len(), 1);
    assert_eq!(message.attachments.len(), 1);

    let image = &message.embedded[0];
    assert_eq!(image.filename, "x.png");
    assert_eq!(image.body, b"\x89PNG fake image");
    assert_eq!(image.content_type(), Some("image/png"));

    let pdf = &message.attachments[0];
    assert_eq!(pdf.filename, "y.pdf");
    assert_eq!(pdf.body, b"%PDF-1.4");
    assert_eq!(
        pdf.headers.get("Content-Disposition"),
        Some("attachment; filename=y.pdf")
    );
}

#[test]
fn test_filename_from_content_type_name() {
    let raw = crlf(&[
        "Content-Type: multipart/mixed; boundary=b",
        "",
        "--b",
        "Content-Type: text/csv; name=\"report.csv\"",
        "Content-Disposition: attachment",
        "",
        "a,b",
        "--b--",
    ]);

    let message = Message::parse(&raw).unwrap();
    assert_eq!(message.attachments[0].filename, "report.csv");
}

#[test]
fn test_filename_without_disposition_header() {
    let raw = crlf(&[
        "Content-Type: multipart/mixed; boundary=b",
        "",
        "--b",
        "Content-Type: text/csv; name=\"  spaced.csv  \"",
        "",
        "a,b",
        "--b--",
    ]);

    let message = Message::parse(&raw).unwrap();
    assert_eq!(message.attachments.len(), 1);
    assert_eq!(message.attachments[0].filename, "spaced.csv");
}

#[test]
fn test_disposition_filename_wins() {
    let raw = crlf(&[
        "Content-Type: multipart/mixed; boundary=b",
        "",
        "--b",
        "Content-Type: application/octet-stream; name=from-type.bin",
        "Content-Disposition: attachment; filename=from-disposition.bin",
        "",
        "data",
        "--b--",
    ]);

    let message = Message::parse(&raw).unwrap();
    assert_eq!(message.attachments[0].filename, "from-disposition.bin");
}

#[test]
fn test_unnamed_file_fails() {
    let raw = crlf(&[
        "Content-Type: multipart/mixed; boundary=b",
        "",
        "--b",
        "Content-Type: text/plain",
        "",
        "who am I?",
        "--b--",
    ]);

    let err = Message::parse(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BlankFilename);
}

#[test]
fn test_uuencode_is_unknown() {
    let raw = crlf(&[
        "Content-Type: multipart/mixed; boundary=b",
        "",
        "--b",
        "Content-Type: application/octet-stream; name=a.bin",
        "Content-Transfer-Encoding: uuencode",
        "",
        "begin 644 a.bin",
        "end",
        "--b--",
    ]);

    let err = Message::parse(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownEncoding);
    assert_eq!(err.to_string(), "Unknown part encoding: uuencode");
}

#[test]
fn test_corrupt_base64_fails() {
    let raw = crlf(&[
        "Content-Type: multipart/mixed; boundary=b",
        "",
        "--b",
        "Content-Type: application/octet-stream; name=a.bin",
        "Content-Transfer-Encoding: base64",
        "",
        "@@@@",
        "--b--",
    ]);

    let err = Message::parse(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_nested_multipart() {
    init_tracing();
    let raw = crlf(&[
        "From: sender@example.com",
        "Content-Type: multipart/mixed; boundary=outer",
        "",
        "preamble is ignored",
        "--outer",
        "Content-Type: multipart/alternative; boundary=inner",
        "",
        "--inner",
        "Content-Type: text/plain",
        "",
        "plain",
        "--inner",
        "Content-Type: text/html",
        "",
        "<b>html</b>",
        "--inner--",
        "",
        "--outer",
        "Content-Type: application/zip",
        "Content-Disposition: attachment; filename=\"archive.zip\"",
        "",
        "PK",
        "--outer--",
        "epilogue is ignored",
    ]);

    let message = Message::parse(&raw).unwrap();

    assert_eq!(message.parts.len(), 2);
    assert_eq!(message.parts[0].body, b"plain");
    assert_eq!(message.parts[1].body, b"<b>html</b>");
    assert_eq!(message.attachments.len(), 1);
    assert_eq!(message.attachments[0].filename, "archive.zip");
    assert!(message.embedded.is_empty());
}

#[test]
fn test_related_inline_image() {
    let raw = crlf(&[
        "Content-Type: multipart/related; boundary=rel",
        "",
        "--rel",
        "Content-Type: multipart/alternative; boundary=alt",
        "",
        "--alt",
        "Content-Type: text/html",
        "",
        "<img src=\"cid:logo\">",
        "--alt--",
        "--rel",
        "Content-Type: image/gif; name=logo.gif",
        "Content-ID: <logo>",
        "Content-Disposition: inline",
        "",
        "GIF89a",
        "--rel--",
    ]);

    let message = Message::parse(&raw).unwrap();
    assert_eq!(message.parts.len(), 1);
    assert_eq!(message.embedded.len(), 1);
    assert_eq!(message.embedded[0].filename, "logo.gif");
    assert_eq!(message.embedded[0].headers.get("Content-Id"), Some("<logo>"));
}

#[test]
fn test_invalid_media_type_at_any_level() {
    let top = crlf(&["Content-Type: text/", "", "body"]);
    assert_eq!(
        Message::parse(&top).unwrap_err().kind(),
        ErrorKind::InvalidMediaType
    );

    let nested = crlf(&[
        "Content-Type: multipart/mixed; boundary=outer",
        "",
        "--outer",
        "Content-Type: multipart/alternative; boundary=inner",
        "",
        "--inner",
        "Content-Type: text/plain; charset",
        "",
        "bad",
        "--inner--",
        "--outer--",
    ]);
    assert_eq!(
        Message::parse(&nested).unwrap_err().kind(),
        ErrorKind::InvalidMediaType
    );
}

#[test]
fn test_invalid_disposition() {
    let raw = crlf(&[
        "Content-Type: multipart/mixed; boundary=b",
        "",
        "--b",
        "Content-Type: image/png; name=a.png",
        "Content-Disposition: inline; filename=\"unterminated",
        "",
        "x",
        "--b--",
    ]);

    let err = Message::parse(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDisposition);
}

#[test]
fn test_missing_boundary_fails() {
    let raw = crlf(&[
        "Content-Type: multipart/mixed",
        "",
        "--b",
        "Content-Type: text/plain; name=a.txt",
        "",
        "x",
        "--b--",
    ]);

    let err = Message::parse(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Multipart);
}

#[test]
fn test_depth_limit() {
    let raw = crlf(&[
        "Content-Type: multipart/mixed; boundary=l0",
        "",
        "--l0",
        "Content-Type: multipart/mixed; boundary=l1",
        "",
        "--l1",
        "Content-Type: multipart/alternative; boundary=l2",
        "",
        "--l2",
        "Content-Type: text/plain",
        "",
        "deep",
        "--l2--",
        "--l1--",
        "--l0--",
    ]);

    let message = Message::parse(&raw).unwrap();
    assert_eq!(message.parts[0].body, b"deep");

    let err = Message::parse_with(&raw, &ParseOptions::new().max_depth(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MaxDepthExceeded);
}

#[test]
fn test_read_from_replaces_previous_content() {
    let first = crlf(&["Subject: one", "Content-Type: text/plain", "", "1"]);
    let second = crlf(&["Subject: two", "Content-Type: text/plain", "", "2"]);

    let mut message = Message::new();
    message.read_from(first.as_slice()).unwrap();
    let n = message.read_from(second.as_slice()).unwrap();

    assert_eq!(n, second.len() as u64);
    assert_eq!(message.subject(), Some("two"));
    assert_eq!(message.headers.get_all("Subject").len(), 1);
    assert_eq!(message.parts.len(), 1);
}

#[test]
fn test_failed_parse_does_not_leave_partial_content() {
    let raw = crlf(&[
        "Subject: half",
        "Content-Type: multipart/mixed; boundary=b",
        "",
        "--b",
        "Content-Type: application/pdf; name=ok.pdf",
        "",
        "pdf",
        "--b",
        "Content-Type: application/pdf",
        "",
        "nameless",
        "--b--",
    ]);

    let mut message = Message::new();
    let err = message.read_from(raw.as_slice()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BlankFilename);
    assert!(message.attachments.is_empty());
    assert!(message.headers.is_empty());
}

#[test]
fn test_repeated_headers_are_kept() {
    let raw = crlf(&[
        "Received: from a",
        "Received: from b",
        "Content-Type: text/plain",
        "",
        "x",
    ]);

    let message = MessageReader::default().parse(&raw).unwrap();
    assert_eq!(message.headers.get_all("received"), ["from a", "from b"]);
}

#[test]
fn test_bad_quoted_printable_escape_is_kept() {
    let raw = crlf(&[
        "Content-Type: multipart/alternative; boundary=alt",
        "",
        "--alt",
        "Content-Type: text/plain",
        "Content-Transfer-Encoding: quoted-printable",
        "",
        "bad =ZZ escape=",
        "--alt--",
    ]);

    let message = Message::parse(&raw).unwrap();
    assert_eq!(message.parts[0].body_text().unwrap(), "bad =ZZ escape");
}

#[test]
fn test_large_header_block() {
    let count = 40_000;
    let fields: Vec<String> = (0..count).map(|i| format!("X-H{i}: v")).collect();
    let mut lines: Vec<&str> = fields.iter().map(String::as_str).collect();
    lines.extend(["Content-Type: text/plain", "", "body"]);

    let started = std::time::Instant::now();
    let message = Message::parse(&crlf(&lines)).unwrap();
    let elapsed = started.elapsed();

    assert_eq!(message.headers.len(), count);
    assert_eq!(message.headers.get("x-h39999"), Some("v"));
    assert_eq!(message.parts.len(), 1);
    assert!(elapsed.as_secs() < 10, "took {elapsed:?}");
}

proptest! {
    #[test]
    fn prop_base64_attachment_round_trip(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let encoded = encode_base64(&data);
        // Wrap at 76 columns the way mail clients do.
        let wrapped: Vec<&str> = encoded
            .as_bytes()
            .chunks(76)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect();

        let mut lines = vec![
            "Content-Type: multipart/mixed; boundary=\"=_boundary\"",
            "",
            "--=_boundary",
            "Content-Type: application/octet-stream",
            "Content-Disposition: attachment; filename=blob.bin",
            "Content-Transfer-Encoding: base64",
            "",
        ];
        lines.extend(wrapped);
        lines.push("--=_boundary--");

        let message = Message::parse(&crlf(&lines)).unwrap();
        prop_assert_eq!(message.attachments.len(), 1);
        prop_assert_eq!(&message.attachments[0].body, &data);
    }
}
