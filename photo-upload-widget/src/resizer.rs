use crate::models::{ImageFormat, ResizeRequest, ResizedImage};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Media type used when handing picked bytes to the resizer.
///
/// Always JPEG, independent of what was picked; decoding sniffs the real
/// format from the bytes.
pub const RESIZE_SOURCE_MEDIA_TYPE: &str = "image/jpeg";

/// Error type for resize operations
#[derive(Debug, Clone, PartialEq)]
pub enum ResizeError {
    InvalidDataUri(String),
    ImageLoadError(String),
    ImageSaveError(String),
    IoError(String),
}

impl std::fmt::Display for ResizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResizeError::InvalidDataUri(msg) => write!(f, "Invalid data URI: {}", msg),
            ResizeError::ImageLoadError(msg) => write!(f, "Image load error: {}", msg),
            ResizeError::ImageSaveError(msg) => write!(f, "Image save error: {}", msg),
            ResizeError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ResizeError {}

impl From<std::io::Error> for ResizeError {
    fn from(err: std::io::Error) -> Self {
        ResizeError::IoError(err.to_string())
    }
}

/// Scales raw image bytes to the requested bounds and writes the result to disk.
pub trait ImageResizer: Send + Sync {
    fn resize(&self, request: &ResizeRequest) -> Result<ResizedImage, ResizeError>;
}

/// Builds the data URI the resizer is fed with
pub fn to_resize_data_uri(base64_data: &str) -> String {
    format!("data:{};base64,{}", RESIZE_SOURCE_MEDIA_TYPE, base64_data)
}

/// Splits a `data:<mime>;base64,<payload>` URI and decodes the payload
pub fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>, ResizeError> {
    let rest = data_uri
        .strip_prefix("data:")
        .ok_or_else(|| ResizeError::InvalidDataUri("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ResizeError::InvalidDataUri("missing payload separator".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(ResizeError::InvalidDataUri(format!(
            "unsupported encoding in {}",
            header
        )));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ResizeError::InvalidDataUri(format!("bad base64: {}", e)))
}

/// Encodes an image in the requested output format
pub fn encode_image(
    img: &DynamicImage,
    format: ImageFormat,
    quality: u8,
) -> Result<Vec<u8>, ResizeError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        ImageFormat::Jpeg => {
            // JPEG quality 0 is not accepted by the encoder
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| ResizeError::ImageSaveError(format!("JPEG encode failed: {}", e)))?;
        }
        ImageFormat::Png => {
            img.write_to(&mut buf, image::ImageFormat::Png)
                .map_err(|e| ResizeError::ImageSaveError(format!("PNG encode failed: {}", e)))?;
        }
    }

    Ok(buf.into_inner())
}

/// Resizer backed by the `image` crate.
///
/// The image is fitted inside `width`x`height` keeping its aspect ratio and
/// written as `<uuid>.<ext>` into `output_dir`.
#[derive(Debug, Clone)]
pub struct ImageCrateResizer {
    output_dir: PathBuf,
}

impl ImageCrateResizer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ImageResizer for ImageCrateResizer {
    fn resize(&self, request: &ResizeRequest) -> Result<ResizedImage, ResizeError> {
        let bytes = decode_data_uri(&request.data_uri)?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| ResizeError::ImageLoadError(format!("Failed to decode image: {}", e)))?;

        let resized = img.resize(request.width, request.height, FilterType::Lanczos3);
        log::debug!(
            "Resized {}x{} -> {}x{} ({}, quality {})",
            img.width(),
            img.height(),
            resized.width(),
            resized.height(),
            request.format,
            request.quality
        );

        let encoded = encode_image(&resized, request.format, request.quality)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let name = format!("{}.{}", uuid::Uuid::new_v4(), request.format.extension());
        let path = self.output_dir.join(&name);
        std::fs::write(&path, &encoded)?;

        let absolute = std::fs::canonicalize(&path).unwrap_or(path);
        log::debug!("Resized image written to {:?}", absolute);

        Ok(ResizedImage {
            uri: format!("file:{}", absolute.to_string_lossy()),
            width: resized.width(),
            height: resized.height(),
            name,
            size: encoded.len() as u64,
        })
    }
}
