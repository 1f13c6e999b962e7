//! Cloudinary upload via REST API (unsigned upload preset, no SDK)

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

use super::{MediaError, MediaHost, NormalizedPhoto};
use crate::config::CloudinaryConfig;

#[derive(Clone)]
pub struct CloudinaryHost {
    client: reqwest::Client,
    /// `{api_url}/{cloud_name}/image/upload`
    upload_url: String,
    upload_preset: String,
    folder: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryHost {
    pub fn new(config: &CloudinaryConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            upload_url: format!(
                "{}/{}/image/upload",
                config.api_url.trim_end_matches('/'),
                config.cloud_name
            ),
            upload_preset: config.upload_preset.clone(),
            folder: config.folder.clone(),
        })
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, photo: &NormalizedPhoto, public_id: &str) -> Result<String, MediaError> {
        let file = Part::bytes(photo.jpeg.clone())
            .file_name(format!("{public_id}.jpg"))
            .mime_str("image/jpeg")?;

        let mut form = Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .text("public_id", public_id.to_string())
            .part("file", file);
        if let Some(folder) = &self.folder {
            form = form.text("folder", folder.clone());
        }

        let resp = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MediaError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadResponse = resp.json().await?;
        tracing::info!(public_id, hash = %photo.hash, "Photo uploaded");
        Ok(uploaded.secure_url)
    }
}
