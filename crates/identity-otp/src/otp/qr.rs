//! QR-code rendering for `otpauth://` URIs.
//!
//! Uses the `qrcode` crate to produce the QR matrix and the `image` crate
//! to render it as a PNG blob authenticator apps can scan.

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};

use crate::otp::types::*;

/// Quiet-zone border in modules.
const QUIET_ZONE: u32 = 4;

/// Turns text into a square PNG QR code.
pub trait QrRenderer {
    /// Encode `content` as a `size`×`size` PNG.
    fn render_png(&self, content: &str, size: u32) -> Result<Vec<u8>>;
}

/// Default renderer: black modules on white, highest error correction.
#[derive(Debug, Clone, Copy)]
pub struct PngQrRenderer {
    pub ec_level: EcLevel,
}

impl Default for PngQrRenderer {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::H,
        }
    }
}

impl QrRenderer for PngQrRenderer {
    fn render_png(&self, content: &str, size: u32) -> Result<Vec<u8>> {
        if content.is_empty() {
            log::warn!("qr: refusing to encode empty content");
            return Err(OtpError::QrEncode);
        }

        let code = QrCode::with_error_correction_level(content.as_bytes(), self.ec_level)
            .map_err(|e| {
                log::warn!("qr: encode error: {}", e);
                OtpError::QrEncode
            })?;

        let matrix = code.to_colors();
        let width = code.width() as u32;
        let modules = width + QUIET_ZONE * 2;
        let size = if size == 0 { DEFAULT_IMAGE_SIZE } else { size }.max(modules);

        // Nearest-module sampling so the output is exactly `size` pixels wide.
        let img = GrayImage::from_fn(size, size, |px, py| {
            let mx = px * modules / size;
            let my = py * modules / size;
            let inside = (QUIET_ZONE..QUIET_ZONE + width).contains(&mx)
                && (QUIET_ZONE..QUIET_ZONE + width).contains(&my);
            if inside {
                let idx = ((my - QUIET_ZONE) * width + (mx - QUIET_ZONE)) as usize;
                if matrix[idx] == qrcode::Color::Dark {
                    return Luma([0u8]);
                }
            }
            Luma([255u8])
        });

        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            size,
            size,
            image::ExtendedColorType::L8,
        )
        .map_err(|e| {
            log::warn!("qr: png encode error: {}", e);
            OtpError::ImageEncode
        })?;

        Ok(buf)
    }
}

/// Decode PNG bytes produced by a renderer.
pub fn decode_png(png: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory_with_format(png, ImageFormat::Png).map_err(|e| {
        log::warn!("qr: png decode error: {}", e);
        OtpError::ImageEncode
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "otpauth://totp/Test:me?secret=JBSWY3DPEHPK3PXP";

    #[test]
    fn png_is_valid_png() {
        let png = PngQrRenderer::default().render_png(URI, 256).unwrap();
        assert!(png.len() > 8);
        assert_eq!(&png[..4], b"\x89PNG");
    }

    #[test]
    fn png_has_requested_size() {
        let png = PngQrRenderer::default().render_png(URI, 300).unwrap();
        let img = decode_png(&png).unwrap();
        assert_eq!((img.width(), img.height()), (300, 300));
    }

    #[test]
    fn zero_size_uses_default() {
        let png = PngQrRenderer::default().render_png(URI, 0).unwrap();
        assert_eq!(decode_png(&png).unwrap().width(), DEFAULT_IMAGE_SIZE);
    }

    #[test]
    fn tiny_size_grows_to_one_pixel_per_module() {
        let png = PngQrRenderer::default().render_png(URI, 1).unwrap();
        assert!(decode_png(&png).unwrap().width() >= 21 + 8);
    }

    #[test]
    fn corners_are_quiet_and_finder_is_dark() {
        let png = PngQrRenderer::default().render_png(URI, 512).unwrap();
        let img = decode_png(&png).unwrap().to_luma8();
        assert_eq!(img.get_pixel(0, 0)[0], 255);
        // Top-left finder pattern starts right after the quiet zone.
        let code = QrCode::with_error_correction_level(URI.as_bytes(), EcLevel::H).unwrap();
        let modules = code.width() as u32 + 2 * QUIET_ZONE;
        let px = (QUIET_ZONE * 512).div_ceil(modules) + 1;
        assert_eq!(img.get_pixel(px, px)[0], 0);
    }

    #[test]
    fn empty_content_fails() {
        assert_eq!(
            PngQrRenderer::default().render_png("", 256),
            Err(OtpError::QrEncode)
        );
    }

    #[test]
    fn oversized_content_fails() {
        let long_text = "a".repeat(5000);
        assert_eq!(
            PngQrRenderer::default().render_png(&long_text, 256),
            Err(OtpError::QrEncode)
        );
    }

    #[test]
    fn decode_garbage_fails() {
        assert_eq!(decode_png(b"not a png").unwrap_err(), OtpError::ImageEncode);
    }
}
