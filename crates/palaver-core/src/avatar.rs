//! Profile picture upload: validate, shrink, re-encode, store.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::AvatarError;
use crate::store::KvStore;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_DIMENSION: u32 = 800;
pub const JPEG_QUALITY: u8 = 70;
pub const SUPPORTED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];
pub const PICTURE_KEY: &str = "profilePicture";
pub const DEFAULT_PICTURE: &str = "pic2.png.jpg";

/// A file picked by the user.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read a file from disk, inferring the MIME type from its extension.
    pub fn from_path(path: &Path) -> Result<Self, AvatarError> {
        let bytes = std::fs::read(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let mime = match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        };

        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime: mime.to_string(),
            bytes,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

pub fn validate(upload: Option<&Upload>) -> Result<&Upload, AvatarError> {
    let upload = upload.ok_or(AvatarError::NoFile)?;

    if !SUPPORTED_TYPES.contains(&upload.mime.as_str()) {
        return Err(AvatarError::UnsupportedType(upload.mime.clone()));
    }
    if upload.size() > MAX_UPLOAD_BYTES {
        return Err(AvatarError::TooLarge(upload.size()));
    }

    Ok(upload)
}

/// Scale `(width, height)` so the longer side is at most its limit, keeping
/// the aspect ratio. Never upscales.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (w, h) = (width as f64, height as f64);
    let (w, h) = if width > height {
        if width > max_width {
            (max_width as f64, h * max_width as f64 / w)
        } else {
            (w, h)
        }
    } else if height > max_height {
        (w * max_height as f64 / h, max_height as f64)
    } else {
        (w, h)
    };

    ((w.round() as u32).max(1), (h.round() as u32).max(1))
}

pub trait ImageCompressor {
    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, AvatarError>;
}

/// Decode, fit within `MAX_DIMENSION`, and re-encode as JPEG.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCompressor;

impl ImageCompressor for JpegCompressor {
    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, AvatarError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AvatarError::Processing(e.to_string()))?;

        let (w, h) = fit_within(img.width(), img.height(), MAX_DIMENSION, MAX_DIMENSION);
        let img = if (w, h) != (img.width(), img.height()) {
            img.resize_exact(w, h, FilterType::Lanczos3)
        } else {
            img
        };

        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let mut buf = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
        rgb.write_with_encoder(encoder)
            .map_err(|e| AvatarError::Processing(e.to_string()))?;
        Ok(buf.into_inner())
    }
}

pub struct AvatarStore {
    store: Arc<dyn KvStore>,
    dir: PathBuf,
}

impl AvatarStore {
    pub fn new(store: Arc<dyn KvStore>, dir: PathBuf) -> Self {
        Self { store, dir }
    }

    /// Validate, compress and save the upload. Returns the stored picture
    /// reference.
    pub fn save_profile_picture(
        &self,
        upload: Option<&Upload>,
        compressor: &dyn ImageCompressor,
    ) -> Result<String, AvatarError> {
        let upload = validate(upload)?;
        let compressed = compressor.compress(&upload.bytes).map_err(|e| {
            tracing::warn!(file = %upload.name, error = ?e, "Error processing image");
            e
        })?;

        std::fs::create_dir_all(&self.dir)?;
        let dest = self.dir.join("profile.jpg");
        let tmp = dest.with_extension("tmp");
        std::fs::write(&tmp, &compressed)?;
        std::fs::rename(&tmp, &dest)?;

        let reference = dest.to_string_lossy().into_owned();
        self.store.set(PICTURE_KEY, &reference)?;
        tracing::info!(path = %reference, bytes = compressed.len(), "profile picture saved");
        Ok(reference)
    }

    pub fn load_profile_picture(&self) -> String {
        match self.store.get(PICTURE_KEY) {
            Ok(Some(reference)) => reference,
            Ok(None) => DEFAULT_PICTURE.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Error reading profile picture");
                DEFAULT_PICTURE.to_string()
            }
        }
    }
}
