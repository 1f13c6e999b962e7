//! Photo normalization: validate → decode → bound dimensions → JPEG → SHA256

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use sha2::{Digest, Sha256};
use shared::error::ErrorCode;
use std::io::Cursor;

use super::PhotoUpload;

/// Maximum accepted upload size (5MB)
pub const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// Longest side after normalization
const MAX_DIMENSION: u32 = 1024;

const JPEG_QUALITY: u8 = 85;

const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG-encoded photo ready for upload
#[derive(Debug, Clone)]
pub struct NormalizedPhoto {
    pub jpeg: Vec<u8>,
    /// SHA256 of the JPEG bytes, hex
    pub hash: String,
    pub width: u32,
    pub height: u32,
}

/// Why a submitted photo was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoRejection {
    #[error("La photo est vide")]
    Empty,
    #[error("La photo dépasse la taille maximale de 5 Mo")]
    TooLarge(usize),
    #[error("Format de photo non supporté ({0}). Formats acceptés : png, jpg, jpeg, webp")]
    UnsupportedFormat(String),
    #[error("Le fichier n'est pas une image valide")]
    InvalidImage(String),
    #[error("Échec de la compression de la photo")]
    Encode(String),
}

impl PhotoRejection {
    pub fn code(&self) -> ErrorCode {
        match self {
            PhotoRejection::Empty => ErrorCode::EmptyFile,
            PhotoRejection::TooLarge(_) => ErrorCode::FileTooLarge,
            PhotoRejection::UnsupportedFormat(_) => ErrorCode::UnsupportedFileFormat,
            PhotoRejection::InvalidImage(_) | PhotoRejection::Encode(_) => {
                ErrorCode::InvalidImageFile
            }
        }
    }
}

pub fn normalize_photo(upload: &PhotoUpload) -> Result<NormalizedPhoto, PhotoRejection> {
    let data = &upload.bytes;
    if data.is_empty() {
        return Err(PhotoRejection::Empty);
    }
    if data.len() > MAX_PHOTO_SIZE {
        return Err(PhotoRejection::TooLarge(data.len()));
    }

    // The extension is only checked when the client sent a filename
    if let Some(ext) = upload
        .filename
        .as_deref()
        .and_then(|name| std::path::Path::new(name).extension())
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        && !SUPPORTED_FORMATS.contains(&ext.as_str())
    {
        return Err(PhotoRejection::UnsupportedFormat(ext));
    }

    let mut img =
        image::load_from_memory(data).map_err(|e| PhotoRejection::InvalidImage(e.to_string()))?;
    if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img = img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Triangle);
    }

    let rgb = img.to_rgb8();
    let mut jpeg = Vec::new();
    {
        let mut cursor = Cursor::new(&mut jpeg);
        let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb.write_with_encoder(encoder)
            .map_err(|e| PhotoRejection::Encode(e.to_string()))?;
    }

    let hash = hex::encode(Sha256::digest(&jpeg));
    Ok(NormalizedPhoto {
        jpeg,
        hash,
        width: rgb.width(),
        height: rgb.height(),
    })
}
