//! PNG data-URL snapshots of the ink layer.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("not a base64 data URL")]
    NotADataUrl,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
}

/// Encode `image` as a `data:image/png;base64,` URL.
pub fn encode_png_data_url(image: &RgbaImage) -> Result<String, SnapshotError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + bytes.len() * 4 / 3 + 4);
    url.push_str(PNG_DATA_URL_PREFIX);
    STANDARD.encode_string(&bytes, &mut url);
    Ok(url)
}

/// Decode any base64 image data URL the enabled codecs understand.
pub fn decode_data_url(url: &str) -> Result<RgbaImage, SnapshotError> {
    let rest = url.strip_prefix("data:").ok_or(SnapshotError::NotADataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(SnapshotError::NotADataUrl)?;
    if !header.ends_with(";base64") {
        return Err(SnapshotError::NotADataUrl);
    }
    let bytes = STANDARD.decode(payload.trim())?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn png_roundtrip_preserves_pixels() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(2, 1, Rgba([0, 0, 255, 128]));

        let url = encode_png_data_url(&img).unwrap();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));
        assert_eq!(decode_data_url(&url).unwrap(), img);
    }

    #[test]
    fn rejects_non_data_urls() {
        assert!(matches!(
            decode_data_url("img/cozy1.jpg"),
            Err(SnapshotError::NotADataUrl)
        ));
        assert!(matches!(
            decode_data_url("data:text/plain,hello"),
            Err(SnapshotError::NotADataUrl)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(SnapshotError::Base64(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,AAEC"),
            Err(SnapshotError::Image(_))
        ));
    }
}
