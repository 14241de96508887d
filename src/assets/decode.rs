use std::sync::Arc;

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{ImprintError, ImprintResult};

const DATA_URI_PREFIX: &[u8] = b"data:image/";

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode any format the `image` crate can sniff into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ImprintResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(prepare_dynamic(dyn_img))
}

/// Decode a `data:image/<format>;base64,<payload>` URI.
pub fn decode_data_uri(bytes: &[u8]) -> ImprintResult<PreparedImage> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| ImprintError::validation("data uri is not valid utf-8"))?;
    let (header, payload) = text
        .split_once(',')
        .ok_or_else(|| ImprintError::validation("data uri has no ',' separator"))?;
    let mime = header
        .strip_prefix("data:")
        .and_then(|h| h.strip_suffix(";base64"))
        .ok_or_else(|| {
            ImprintError::validation(format!("unsupported data uri header \"{header}\""))
        })?;
    let format = image::ImageFormat::from_mime_type(mime)
        .ok_or_else(|| ImprintError::validation(format!("unknown image format \"{mime}\"")))?;

    let raw = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ImprintError::validation(format!("invalid base64 image payload: {e}")))?;
    let dyn_img = image::load_from_memory_with_format(&raw, format)
        .with_context(|| format!("decode {mime} data uri"))?;
    Ok(prepare_dynamic(dyn_img))
}

/// Decode an embedded resource: data URIs by declared format, anything else by sniffing.
pub fn decode_resource(bytes: &[u8]) -> ImprintResult<PreparedImage> {
    if bytes.starts_with(DATA_URI_PREFIX) {
        decode_data_uri(bytes)
    } else {
        decode_image(bytes)
    }
}

fn prepare_dynamic(dyn_img: image::DynamicImage) -> PreparedImage {
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
