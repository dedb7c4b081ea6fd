//! Content-type detection for published files.
//!
//! Detection looks at the leading bytes of the file: well-known binary
//! signatures first, then markup sniffing for HTML/XML/SVG, then a
//! text-versus-binary check. Plain text gets a second chance through the
//! file extension, since stylesheets, scripts and some markup carry no
//! recognizable signature.

use std::path::Path;
use tokio::io::AsyncReadExt;

/// Bytes read from the start of a file for detection.
const SNIFF_LEN: u64 = 8192;

pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// (offset, signature, content type)
const SIGNATURES: &[(usize, &[u8], &str)] = &[
    (0, b"\x89PNG\r\n\x1a\n", "image/png"),
    (0, b"\xff\xd8\xff", "image/jpeg"),
    (0, b"GIF87a", "image/gif"),
    (0, b"GIF89a", "image/gif"),
    (0, b"%PDF-", "application/pdf"),
    (0, b"PK\x03\x04", "application/zip"),
    (0, b"\x1f\x8b", "application/gzip"),
    (0, b"\x00\x00\x01\x00", "image/vnd.microsoft.icon"),
    (0, b"wOFF", "font/woff"),
    (0, b"wOF2", "font/woff2"),
    (0, b"\x00\x01\x00\x00\x00", "font/ttf"),
    (0, b"OTTO", "font/otf"),
    (0, b"OggS", "audio/ogg"),
    (0, b"ID3", "audio/mpeg"),
    (0, b"\x1a\x45\xdf\xa3", "video/webm"),
    (4, b"ftyp", "video/mp4"),
];

const HTML_MARKERS: &[&str] = &[
    "<!doctype html",
    "<html",
    "<head",
    "<body",
    "<title",
    "<script",
    "<style",
];

/// Detects the content type of the file at `path`.
///
/// Returns `None` when the file does not exist or cannot be read.
pub async fn content_type(path: &Path) -> Option<String> {
    let file = tokio::fs::File::open(path).await.ok()?;
    let mut head = Vec::new();
    file.take(SNIFF_LEN).read_to_end(&mut head).await.ok()?;
    Some(override_by_extension(path, sniff(&head)).to_string())
}

/// Detects a content type from the leading bytes of a file.
///
/// Empty input is reported as plain text.
pub fn sniff(head: &[u8]) -> &'static str {
    for (offset, signature, mime) in SIGNATURES {
        if head.get(*offset..offset + signature.len()) == Some(*signature) {
            return *mime;
        }
    }
    if head.starts_with(b"RIFF") && head.get(8..12) == Some(b"WEBP".as_slice()) {
        return "image/webp";
    }
    if looks_binary(head) {
        return OCTET_STREAM;
    }
    sniff_text(head)
}

/// Replaces a plain-text detection with the type implied by the extension
/// for stylesheets, scripts, HTML and XML. Any other detection is kept.
pub fn override_by_extension(path: &Path, detected: &'static str) -> &'static str {
    if detected != TEXT_PLAIN {
        return detected;
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("css") => "text/css",
        Some("js") => "application/x-javascript",
        Some("html" | "htm") => "text/html",
        Some("xml") => "application/xml",
        _ => detected,
    }
}

fn looks_binary(head: &[u8]) -> bool {
    head.iter()
        .any(|&b| (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b)) || b == 0x7f)
}

fn sniff_text(head: &[u8]) -> &'static str {
    let head = head.strip_prefix(b"\xef\xbb\xbf".as_slice()).unwrap_or(head);
    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    let end = head.len().min(start + 512);
    let prefix = String::from_utf8_lossy(&head[start..end]).to_ascii_lowercase();

    if prefix.starts_with("<?xml") {
        return if prefix.contains("<svg") {
            "image/svg+xml"
        } else {
            "text/xml"
        };
    }
    if prefix.starts_with("<svg") {
        return "image/svg+xml";
    }
    if HTML_MARKERS.iter().any(|marker| prefix.starts_with(marker)) {
        return "text/html";
    }
    TEXT_PLAIN
}
