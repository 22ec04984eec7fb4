//! `data:` references for serialized graphics and encoded PNGs

use base64::Engine;

use crate::{Error, Result};

pub const SVG_DATA_URL_PREFIX: &str = "data:image/svg+xml;charset=utf-8,";
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// The eight bytes every PNG stream starts with
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Wrap serialized markup as an SVG `data:` URL.
///
/// The text is percent-encoded like `encodeURIComponent`; newlines are then
/// dropped and space, `=`, `:` and `/` are left literal to keep the reference
/// short.
pub fn svg_data_url(text: &str) -> String {
    let mut out = String::with_capacity(SVG_DATA_URL_PREFIX.len() + text.len() * 3 / 2);
    out.push_str(SVG_DATA_URL_PREFIX);
    for byte in text.bytes() {
        match byte {
            b'\n' => {}
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')'
            | b' '
            | b'='
            | b':'
            | b'/' => out.push(byte as char),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

/// A decoded `data:` URL
#[derive(Debug, Clone, PartialEq)]
pub struct DataUrl {
    /// Media type without parameters, lowercased
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Decode a `data:` URL (RFC 2397), base64 or percent-encoded.
pub fn decode_data_url(url: &str) -> Result<DataUrl> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::InvalidReference("not a data: URL".to_string()))?;
    let (metadata, data) = rest
        .split_once(',')
        .ok_or_else(|| Error::InvalidReference("missing comma in data URL".to_string()))?;

    let mut parts = metadata.split(';');
    let media_type = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let cleaned: Vec<u8> = data
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| Error::InvalidReference(format!("invalid base64: {}", e)))?
    } else {
        percent_decode(data)?
    };

    Ok(DataUrl {
        media_type: if media_type.is_empty() {
            "text/plain".to_string()
        } else {
            media_type
        },
        bytes,
    })
}

/// Percent-decode without treating `+` specially.
fn percent_decode(input: &str) -> Result<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let hex = bytes
            .get(i + 1..i + 3)
            .and_then(|h| std::str::from_utf8(h).ok())
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| Error::InvalidReference(format!("bad percent-escape at {}", i)))?;
        out.push(hex);
        i += 3;
    }
    Ok(out)
}

/// Wrap encoded PNG bytes as a base64 `data:` URL.
pub fn png_data_url(png: &[u8]) -> String {
    format!(
        "{}{}",
        PNG_DATA_URL_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

/// Decode a PNG `data:` URL and check the payload really is PNG.
pub fn decode_png_data_url(url: &str) -> Result<Vec<u8>> {
    if !url.starts_with("data:image/png") {
        return Err(Error::InvalidReference(
            "only PNG data URLs are supported".to_string(),
        ));
    }
    let decoded = decode_data_url(url)?;
    if decoded.media_type != "image/png" {
        return Err(Error::InvalidReference(format!(
            "unexpected media type {}",
            decoded.media_type
        )));
    }
    if !decoded.bytes.starts_with(&PNG_SIGNATURE) {
        return Err(Error::InvalidReference(
            "payload is not a PNG image".to_string(),
        ));
    }
    Ok(decoded.bytes)
}
