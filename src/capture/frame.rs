// frame.rs — Snapshots a live video surface into a base64 JPEG.
//
// The result is the bare base64 payload (no `data:image/jpeg;base64,` header),
// which is what the recognition request embeds.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, GenericImageView, RgbaImage};

/// Errors raised while grabbing pixels from a surface.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("video surface not ready")]
    NotReady,
    #[error("grab failed: {0}")]
    Grab(String),
    #[error("jpeg encode: {0}")]
    Encode(String),
}

/// A live video source the controller can snapshot at tap time.
pub trait VideoSurface: Send + Sync {
    /// Frame size once the stream has reported metadata; `None` before that.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Copy the current frame.
    fn grab(&self) -> Result<RgbaImage, CaptureError>;
}

/// Encoding knobs for a captured frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameOptions {
    /// JPEG quality, 1–100.
    pub jpeg_quality: u8,
    /// Frames wider than this are downscaled, keeping aspect ratio.
    pub max_width: u32,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            max_width: 1920,
        }
    }
}

/// Capture the current frame of `surface` as base64 JPEG.
///
/// Returns `None` when there is no surface, it has not reported dimensions,
/// or the grab/encode fails. Callers treat that as a cancelled tap.
pub fn capture_frame(surface: Option<&dyn VideoSurface>, options: FrameOptions) -> Option<String> {
    let surface = surface?;
    if surface.dimensions().is_none() {
        log::debug!("Frame capture skipped: surface has no dimensions yet");
        return None;
    }
    match surface
        .grab()
        .and_then(|frame| encode_jpeg_base64(DynamicImage::ImageRgba8(frame), options))
    {
        Ok(b64) => Some(b64),
        Err(e) => {
            log::warn!("Frame capture failed: {}", e);
            None
        }
    }
}

/// Downscale if needed, JPEG-encode, then base64-encode.
pub fn encode_jpeg_base64(img: DynamicImage, options: FrameOptions) -> Result<String, CaptureError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(CaptureError::NotReady);
    }

    let img = if options.max_width > 0 && width > options.max_width {
        let ratio = options.max_width as f64 / width as f64;
        let new_h = ((height as f64 * ratio).round() as u32).max(1);
        img.resize_exact(options.max_width, new_h, imageops::FilterType::Triangle)
    } else {
        img
    };
    let (w, h) = img.dimensions();

    let mut jpeg_buf: Vec<u8> = Vec::new();
    {
        let quality = options.jpeg_quality.clamp(1, 100);
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg_buf, quality);
        encoder
            .encode(img.to_rgb8().as_raw(), w, h, image::ExtendedColorType::Rgb8)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
    }

    Ok(BASE64.encode(&jpeg_buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    struct SolidSurface {
        size: Option<(u32, u32)>,
    }

    impl VideoSurface for SolidSurface {
        fn dimensions(&self) -> Option<(u32, u32)> {
            self.size
        }

        fn grab(&self) -> Result<RgbaImage, CaptureError> {
            let (w, h) = self.size.ok_or(CaptureError::NotReady)?;
            Ok(RgbaImage::from_pixel(w, h, Rgba([120, 80, 40, 255])))
        }
    }

    struct BrokenSurface;

    impl VideoSurface for BrokenSurface {
        fn dimensions(&self) -> Option<(u32, u32)> {
            Some((64, 64))
        }

        fn grab(&self) -> Result<RgbaImage, CaptureError> {
            Err(CaptureError::Grab("device lost".into()))
        }
    }

    fn decode(b64: &str) -> DynamicImage {
        let bytes = BASE64.decode(b64).unwrap();
        image::load_from_memory(&bytes).unwrap()
    }

    #[test]
    fn captures_jpeg_without_data_url_header() {
        let surface = SolidSurface {
            size: Some((64, 48)),
        };
        let b64 = capture_frame(Some(&surface), FrameOptions::default()).unwrap();
        assert!(!b64.starts_with("data:"));
        let bytes = BASE64.decode(&b64).unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(decode(&b64).dimensions(), (64, 48));
    }

    #[test]
    fn missing_surface_returns_none() {
        assert!(capture_frame(None, FrameOptions::default()).is_none());
    }

    #[test]
    fn surface_without_dimensions_returns_none() {
        let surface = SolidSurface { size: None };
        assert!(capture_frame(Some(&surface), FrameOptions::default()).is_none());
    }

    #[test]
    fn grab_failure_returns_none() {
        assert!(capture_frame(Some(&BrokenSurface), FrameOptions::default()).is_none());
    }

    #[test]
    fn wide_frames_are_downscaled() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255])));
        let options = FrameOptions {
            jpeg_quality: 80,
            max_width: 100,
        };
        let b64 = encode_jpeg_base64(img, options).unwrap();
        assert_eq!(decode(&b64).dimensions(), (100, 50));
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert!(matches!(
            encode_jpeg_base64(img, FrameOptions::default()),
            Err(CaptureError::NotReady)
        ));
    }
}
