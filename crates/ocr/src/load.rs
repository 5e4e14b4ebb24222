use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Images larger than this on either side are scaled down before OCR.
pub const MAX_DIMENSION: u32 = 8192;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode image for OCR: {0}")]
    Encode(String),
}

/// A decoded image, re-encoded as PNG for handing to an OCR backend.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Load an image file using the format its extension claims.
pub fn load_image(path: &Path) -> Result<LoadedImage, LoadError> {
    let bytes = std::fs::read(path)?;
    let format = image::ImageFormat::from_path(path)?;
    let img = image::load_from_memory_with_format(&bytes, format)?;
    encode_as_png(fit_within_limit(img))
}

fn fit_within_limit(img: DynamicImage) -> DynamicImage {
    if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, image::imageops::FilterType::Lanczos3)
    } else {
        img
    }
}

fn encode_as_png(img: DynamicImage) -> Result<LoadedImage, LoadError> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| LoadError::Encode(e.to_string()))?;
    Ok(LoadedImage { png, width: img.width(), height: img.height() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, RgbImage, Rgb};

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |_, _| Luma([value]));
        DynamicImage::ImageLuma8(img)
    }

    fn encoded(img: &DynamicImage, format: image::ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn loads_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        std::fs::write(&path, encoded(&solid_gray(6, 4, 90), image::ImageFormat::Png)).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (6, 4));
        // PNG magic bytes: 0x89 0x50 0x4E 0x47
        assert_eq!(&loaded.png[..4], b"\x89PNG");
    }

    #[test]
    fn jpeg_is_reencoded_as_png() {
        let rgb: RgbImage = ImageBuffer::from_fn(8, 8, |x, _| Rgb([(x * 30) as u8, 10, 10]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.JPG");
        std::fs::write(
            &path,
            encoded(&DynamicImage::ImageRgb8(rgb), image::ImageFormat::Jpeg),
        )
        .unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(&loaded.png[..4], b"\x89PNG");
    }

    #[test]
    fn corrupted_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(matches!(load_image(&path), Err(LoadError::Decode(_))));
    }

    #[test]
    fn png_bytes_under_jpg_name_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabelled.jpg");
        std::fs::write(&path, encoded(&solid_gray(4, 4, 0), image::ImageFormat::Png)).unwrap();
        assert!(load_image(&path).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_image(&dir.path().join("gone.png")),
            Err(LoadError::Io(_))
        ));
    }

    #[test]
    fn oversized_image_is_scaled_down() {
        let img = solid_gray(MAX_DIMENSION + 100, 10, 255);
        let fitted = fit_within_limit(img);
        assert!(fitted.width() <= MAX_DIMENSION && fitted.height() <= MAX_DIMENSION);
    }

    #[test]
    fn small_image_is_untouched() {
        let fitted = fit_within_limit(solid_gray(40, 30, 1));
        assert_eq!((fitted.width(), fitted.height()), (40, 30));
    }
}
