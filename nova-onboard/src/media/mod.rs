//! Employee photo handling
//!
//! Photos are normalized locally (decode, JPEG re-encode, content hash) and
//! then pushed to the media host, which returns a public URL.

mod cloudinary;
mod photo;

pub use cloudinary::CloudinaryHost;
pub use photo::{MAX_PHOTO_SIZE, NormalizedPhoto, PhotoRejection, normalize_photo};

use async_trait::async_trait;

/// Raw photo as received from the form
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media host unreachable: {0}")]
    Unavailable(String),
    #[error("media host returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected media host response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for MediaError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            MediaError::Decode(e.to_string())
        } else {
            MediaError::Unavailable(e.to_string())
        }
    }
}

/// Media host collaborator
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload a normalized photo under `public_id`, returning its public URL
    async fn upload(&self, photo: &NormalizedPhoto, public_id: &str) -> Result<String, MediaError>;
}
