//! Base64 data-URI helpers for file payloads embedded in API traffic.

use std::fs;
use std::io;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

// Extension -> MIME for the file types the application actually embeds.
const MIME_BY_EXTENSION: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("txt", "text/plain"),
];

const EXTENSION_BY_MIME: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("application/pdf", "pdf"),
    ("application/zip", "zip"),
    ("application/json", "json"),
    ("application/xml", "xml"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("text/plain", "txt"),
];

/// Read a file and encode it as a `data:<mime>;base64,<payload>` URI.
/// The MIME type is guessed from the extension, falling back to
/// `text/plain`.
pub fn encode_file_to_data_uri(path: &Path) -> io::Result<String> {
    let content = fs::read(path)?;
    let mime = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|ext| {
            MIME_BY_EXTENSION
                .iter()
                .find(|(e, _)| ext.eq_ignore_ascii_case(e))
                .map(|(_, m)| *m)
        })
        .unwrap_or("text/plain");
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(content)))
}

/// Return the data part of a data URI, i.e. everything after the first
/// comma. `None` when there is no comma.
pub fn data_uri_payload(s: &str) -> Option<&str> {
    let s = s.trim();
    s.split_once(',').map(|(_, payload)| payload)
}

/// Remove a leading `data:...;base64,` scheme, if present.
pub fn strip_data_uri_scheme(s: &str) -> &str {
    if s.starts_with("data:") {
        if let Some(pos) = s.find(";base64,") {
            return &s[pos + ";base64,".len()..];
        }
    }
    s
}

/// Check that a string (optionally carrying a data-URI scheme) is valid
/// standard base64: it must decode strictly and re-encode to itself.
pub fn is_valid_base64(s: &str) -> bool {
    let payload = strip_data_uri_scheme(s.trim());
    match STANDARD.decode(payload) {
        Ok(decoded) => STANDARD.encode(decoded) == payload,
        Err(_) => false,
    }
}

/// Guess a file extension for a base64 string.
///
/// Prefers the MIME type embedded in a `data:` prefix; without one, the
/// payload is decoded and its magic bytes are sniffed.
pub fn file_extension_from_data_uri(s: &str) -> Option<&'static str> {
    let s = s.trim();

    let mime = if let Some(rest) = s.strip_prefix("data:") {
        let end = rest.find([';', ','])?;
        Some(rest[..end].to_ascii_lowercase())
    } else {
        None
    };
    if let Some(mime) = mime {
        return EXTENSION_BY_MIME
            .iter()
            .find(|(m, _)| **m == mime)
            .map(|(_, ext)| *ext);
    }

    let payload = data_uri_payload(s).unwrap_or(s);
    let decoded = STANDARD.decode(payload).ok()?;
    sniff_extension(&decoded)
}

fn sniff_extension(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if data.starts_with(b"\xff\xd8\xff") {
        Some("jpg")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("gif")
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some("webp")
    } else if data.starts_with(b"%PDF-") {
        Some("pdf")
    } else if data.starts_with(b"PK\x03\x04") {
        Some("zip")
    } else if !data.is_empty() && data.iter().all(|b| b.is_ascii() && *b != 0) {
        Some("txt")
    } else {
        None
    }
}
