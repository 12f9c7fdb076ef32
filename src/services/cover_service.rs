use anyhow::{Result, anyhow};
use image::imageops::FilterType;

/// Cover images are normalized to a fixed square JPEG.
pub const COVER_SIZE: u32 = 250;
const JPEG_QUALITY: u8 = 85;

pub struct CoverService;

impl CoverService {
    /// Decode any supported image payload and re-encode it as a
    /// 250x250 JPEG, cropping to fill.
    pub fn render_cover(data: &[u8]) -> Result<Vec<u8>> {
        let img = image::load_from_memory(data)
            .map_err(|e| anyhow!("Failed to decode cover image: {}", e))?;

        let cover = img.resize_to_fill(COVER_SIZE, COVER_SIZE, FilterType::Lanczos3);

        let mut out = Vec::new();
        cover
            .write_to(
                &mut std::io::Cursor::new(&mut out),
                image::ImageOutputFormat::Jpeg(JPEG_QUALITY),
            )
            .map_err(|e| anyhow!("Failed to encode cover JPEG: {}", e))?;
        Ok(out)
    }

    pub fn cover_key(user_id: &str, file_id: &str) -> String {
        format!("{}/covers/{}.jpg", user_id, file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([180, 40, 90]),
        ));
        let mut buf = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut buf),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
        buf
    }

    #[test]
    fn test_render_cover_is_fixed_square_jpeg() {
        let out = CoverService::render_cover(&sample_png(17, 31)).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), image::ImageFormat::Jpeg);

        let cover = image::load_from_memory(&out).unwrap();
        assert_eq!(cover.width(), COVER_SIZE);
        assert_eq!(cover.height(), COVER_SIZE);
    }

    #[test]
    fn test_render_cover_rejects_non_image() {
        assert!(CoverService::render_cover(b"not an image").is_err());
    }

    #[test]
    fn test_cover_key_layout() {
        assert_eq!(
            CoverService::cover_key("user-1", "file-9"),
            "user-1/covers/file-9.jpg"
        );
    }
}
