//! `Content-Disposition` values for font downloads.

use axum::http::header::{HeaderValue, InvalidHeaderValue};

/// Build `attachment; filename="..."; filename*=UTF-8''...` for `file_name`.
///
/// The quoted form is an ASCII approximation for old clients; the extended
/// form carries the exact name.
pub fn attachment(file_name: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_fallback(file_name),
        percent_encode(file_name)
    );
    HeaderValue::from_str(&value)
}

fn ascii_fallback(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            ' '..='~' => c,
            _ => '_',
        })
        .collect()
}

// attr-char from RFC 5987
fn is_attr_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte)
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if is_attr_char(byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
