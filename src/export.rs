use arboard::Clipboard;
use axum::http::{header, HeaderMap, HeaderValue};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::ClipboardError;

/// Lower-cases and collapses every run of non-alphanumeric characters into one hyphen.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

pub fn export_filename(script_type: &str, topic: &str) -> String {
    let kind = match slugify(script_type) {
        s if s.is_empty() => "untitled".to_string(),
        s => s,
    };
    match slugify(topic) {
        t if t.is_empty() => format!("{}-script.txt", kind),
        t => format!("{}-script-{}.txt", kind, t),
    }
}

// RFC 5987 attr-char: alphanumerics plus a few marks stay literal
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_');

/// ASCII-only variant of a slugged filename for the plain `filename=` parameter.
fn ascii_fallback(filename: &str) -> String {
    let mut out = String::with_capacity(filename.len());
    for c in filename.chars().filter(char::is_ascii) {
        if c == '-' && (out.is_empty() || out.ends_with('-')) {
            continue;
        }
        out.push(c);
    }
    let out = out.replace("-.", ".");
    if out.is_empty() || out.starts_with('.') { format!("script{}", out) } else { out }
}

/// `Content-Disposition` value. Non-ASCII names get an ASCII `filename` plus a
/// percent-encoded UTF-8 `filename*`.
pub fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        format!("attachment; filename=\"{}\"", filename)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            ascii_fallback(filename),
            utf8_percent_encode(filename, FILENAME_ENCODE_SET)
        )
    }
}

/// Headers for a plain-text download of the script.
pub fn download_headers(filename: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    // Only reachable if a quote or control character slipped into the name
    let disposition = HeaderValue::from_str(&content_disposition(filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"script.txt\""));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers
}

/// Port for the system clipboard.
pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard through `arboard`. A fresh handle is opened per write.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArboardClipboard;

impl ClipboardWriter for ArboardClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard.set_text(text).map_err(|e| ClipboardError::Write(e.to_string()))
    }
}
