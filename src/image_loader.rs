//! # Image and Resource Loading
//!
//! Resolves a source string to raw bytes and decodes images into pixmaps
//! ready to be drawn onto a canvas.
//!
//! Supported `src` formats, for images and for font files alike:
//! - `data:<mime>;base64,...` data URI
//! - File path (absolute or `./`, `../` relative), read from disk
//! - Raw base64-encoded data

use tiny_skia::{IntSize, Pixmap};

use crate::error::{PlacardError, Result};

/// A decoded image in premultiplied RGBA, the form tiny-skia draws from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixmap: Pixmap,
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }
}

/// Load and decode a PNG or JPEG image from a source string.
pub fn load_image(src: &str) -> Result<LoadedImage> {
    let raw = read_source_bytes(src).map_err(PlacardError::Image)?;
    decode_image_bytes(&raw)
}

/// Resolve the source string to raw bytes.
pub fn read_source_bytes(src: &str) -> std::result::Result<Vec<u8>, String> {
    // data:image/png;base64,iVBOR... or data:font/ttf;base64,AAEAAA...
    if src.starts_with("data:") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| "Invalid data URI: missing comma".to_string())?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only explicit path prefixes count as paths; base64 may contain '/'.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src).map_err(|e| format!("Failed to read file '{}': {}", src, e));
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> std::result::Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| format!("Base64 decode error: {}", e))
}

/// Detect the format from magic bytes and decode to a premultiplied pixmap.
pub fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage> {
    if data.len() < 4 {
        return Err(PlacardError::Image("Image data too short".to_string()));
    }
    let format = if is_png(data) {
        image::ImageFormat::Png
    } else if is_jpeg(data) {
        image::ImageFormat::Jpeg
    } else {
        return Err(PlacardError::Image(
            "Unsupported image format (expected JPEG or PNG)".to_string(),
        ));
    };

    let decoded = image::load_from_memory_with_format(data, format)
        .map_err(|e| PlacardError::Image(format!("Failed to decode image: {}", e)))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| PlacardError::Image(format!("Invalid image size {}x{}", width, height)))?;
    let pixmap = Pixmap::from_vec(premultiply(rgba.into_raw()), size)
        .ok_or_else(|| PlacardError::Image("Pixel buffer does not match image size".to_string()))?;

    Ok(LoadedImage { pixmap })
}

/// Straight RGBA to premultiplied RGBA, in place.
fn premultiply(mut rgba: Vec<u8>) -> Vec<u8> {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    rgba
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn tiny_png(w: u32, h: u32) -> Vec<u8> {
        let mut pixmap = Pixmap::new(w, h).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(0, 117, 176, 255));
        pixmap.encode_png().unwrap()
    }

    #[test]
    fn test_load_png_from_data_uri() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(tiny_png(3, 2));
        let img = load_image(&format!("data:image/png;base64,{}", b64)).unwrap();
        assert_eq!(img.width(), 3);
        assert_eq!(img.height(), 2);
        let px = img.pixmap.pixel(0, 0).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (0, 117, 176));
    }

    #[test]
    fn test_load_raw_base64() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(tiny_png(1, 1));
        assert_eq!(load_image(&b64).unwrap().width(), 1);
    }

    #[test]
    fn test_reject_unknown_format() {
        let err = decode_image_bytes(b"GIF89a....").unwrap_err();
        assert_eq!(err.kind(), "ImageError");
    }

    #[test]
    fn test_missing_file() {
        assert!(load_image("/nonexistent/map.png").is_err());
    }

    #[test]
    fn test_premultiply_half_alpha() {
        let out = premultiply(vec![255, 100, 0, 128]);
        assert_eq!(out, vec![128, 50, 0, 128]);
    }
}
