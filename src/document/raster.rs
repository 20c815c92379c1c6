use crate::error::{AppError, Result};
use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// An RGBA raster ready for display, plus the base64 PNG sent to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    png_base64: String,
}

impl RasterImage {
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        let png_base64 = encode_png_base64(&image)?;
        let rgba = image.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
            png_base64,
        })
    }

    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .map_err(|err| AppError::Image(format!("failed to load {}: {err}", path.display())))?;
        Self::from_dynamic(image)
    }

    pub fn from_encoded(bytes: &[u8], format: ImageFormat) -> Result<Self> {
        Self::from_dynamic(image::load_from_memory_with_format(bytes, format)?)
    }

    /// Builds a raster from uncompressed 8-bit samples with 1 (gray), 3 (RGB)
    /// or 4 (CMYK) components per pixel. Trailing padding is ignored.
    pub fn from_samples(width: u32, height: u32, components: u8, samples: &[u8]) -> Result<Self> {
        let pixels = width as usize * height as usize;
        let expected = pixels * components as usize;
        if samples.len() < expected {
            return Err(AppError::Image(format!(
                "expected {expected} samples for {width}x{height}x{components}, got {}",
                samples.len()
            )));
        }
        let samples = &samples[..expected];

        let image = match components {
            1 => GrayImage::from_raw(width, height, samples.to_vec()).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(width, height, samples.to_vec()).map(DynamicImage::ImageRgb8),
            4 => RgbImage::from_raw(width, height, cmyk_to_rgb(samples)).map(DynamicImage::ImageRgb8),
            other => {
                return Err(AppError::Image(format!(
                    "unsupported component count {other}"
                )))
            }
        };

        match image {
            Some(image) => Self::from_dynamic(image),
            None => Err(AppError::Image(format!(
                "sample buffer does not fit {width}x{height}"
            ))),
        }
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn png_base64(&self) -> &str {
        &self.png_base64
    }
}

fn encode_png_base64(image: &DynamicImage) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(general_purpose::STANDARD.encode(buffer.into_inner()))
}

fn cmyk_to_rgb(samples: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(samples.len() / 4 * 3);
    for pixel in samples.chunks_exact(4) {
        let k = 255 - pixel[3] as u16;
        for &channel in &pixel[..3] {
            rgb.push(((255 - channel as u16) * k / 255) as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC_BASE64: &str = "iVBORw0KGgo";

    #[test]
    fn gray_samples_expand_to_rgba() {
        let raster = RasterImage::from_samples(2, 1, 1, &[0, 255]).expect("gray should decode");
        assert_eq!(raster.size(), [2, 1]);
        assert_eq!(raster.rgba(), &[0, 0, 0, 255, 255, 255, 255, 255]);
        assert!(raster.png_base64().starts_with(PNG_MAGIC_BASE64));
    }

    #[test]
    fn rgb_samples_ignore_trailing_padding() {
        let raster = RasterImage::from_samples(1, 1, 3, &[10, 20, 30, 99, 99])
            .expect("rgb should decode");
        assert_eq!(raster.rgba(), &[10, 20, 30, 255]);
    }

    #[test]
    fn cmyk_samples_convert_to_rgb() {
        let raster = RasterImage::from_samples(2, 1, 4, &[0, 0, 0, 0, 0, 0, 0, 255])
            .expect("cmyk should decode");
        assert_eq!(raster.rgba(), &[255, 255, 255, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn short_sample_buffer_is_rejected() {
        let error = RasterImage::from_samples(4, 4, 3, &[0; 10]).expect_err("short buffer should fail");
        assert!(matches!(error, AppError::Image(_)));
    }

    #[test]
    fn unsupported_component_count_is_rejected() {
        assert!(RasterImage::from_samples(1, 1, 2, &[0, 0]).is_err());
    }

    #[test]
    fn open_round_trips_a_png_file() {
        let root = tempfile::tempdir().expect("temp dir should be created");
        let path = root.path().join("dot.png");
        RgbImage::from_raw(1, 1, vec![1, 2, 3])
            .expect("pixel buffer should fit")
            .save(&path)
            .expect("fixture png should save");

        let raster = RasterImage::open(&path).expect("png should open");
        assert_eq!(raster.size(), [1, 1]);
        assert_eq!(raster.rgba(), &[1, 2, 3, 255]);
    }

    #[test]
    fn open_reports_undecodable_file() {
        let root = tempfile::tempdir().expect("temp dir should be created");
        let path = root.path().join("broken.png");
        std::fs::write(&path, b"not an image").expect("fixture should write");

        let error = RasterImage::open(&path).expect_err("garbage should fail");
        assert!(error.to_string().contains("broken.png"));
    }
}
