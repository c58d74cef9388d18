//! Image decoding.
//!
//! Entity sources are either raw encoded bytes or a `data:` URI stored as
//! bytes (base64 or percent-encoded). A data URI's mime type selects the
//! decoder unless the payload itself says otherwise.

use image::ImageFormat;

use crate::error::{RenderError, RenderResult};

/// A decoded image ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Straight-alpha RGBA pixel data (4 bytes per pixel).
    pub data: Vec<u8>,
}

impl DecodedImage {
    /// A `width` x `height` image of one color.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: rgba.repeat(pixels),
        }
    }
}

/// Decode an entity image source.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the data URI is malformed or the
/// payload is not a supported image.
pub fn decode_image(data: &[u8]) -> RenderResult<DecodedImage> {
    if data.starts_with(b"data:") {
        let uri = std::str::from_utf8(data)
            .map_err(|e| RenderError::Resource(format!("data URI is not UTF-8: {e}")))?;
        return decode_data_uri(uri);
    }
    decode_bytes(data, None)
}

/// Decode a `data:<mime>[;base64],<payload>` URI.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the URI is malformed or the payload
/// cannot be decoded.
pub fn decode_data_uri(uri: &str) -> RenderResult<DecodedImage> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("data URI has no payload".to_string()))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default();
    let base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if base64 {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| RenderError::Resource(format!("bad base64 payload: {e}")))?
    } else {
        unescape(payload)?
    };

    let declared = ImageFormat::from_mime_type(mime);
    if declared.is_none() && !mime.is_empty() {
        tracing::debug!(mime, "Unrecognized image mime type, sniffing payload");
    }
    decode_bytes(&bytes, declared)
}

/// Decode with `declared` as the preferred format. Recognizable content
/// overrides a wrong declaration.
fn decode_bytes(bytes: &[u8], declared: Option<ImageFormat>) -> RenderResult<DecodedImage> {
    let sniffed = image::guess_format(bytes).ok();
    let format = match (declared, sniffed) {
        (Some(d), Some(s)) if d != s => {
            tracing::warn!(declared = ?d, actual = ?s, "Image mime type does not match content");
            s
        }
        (Some(d), _) => d,
        (None, Some(s)) => s,
        (None, None) => {
            return Err(RenderError::Resource("unrecognized image format".to_string()));
        }
    };

    let rgba = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| RenderError::Resource(format!("cannot decode {format:?} image: {e}")))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        data: rgba.into_raw(),
    })
}

fn unescape(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource(format!("bad escape at byte {i}")))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
