//! Client for the external image host.
//!
//! The host is an opaque collaborator: image bytes go out as multipart, a
//! public URL comes back. Nothing about its storage or CDN behavior is
//! modeled here.

use reqwest::multipart;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ImageHostConfig;

/// Largest accepted image upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Errors from forwarding an image to the host.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The request to the host failed outright.
    #[error("image host request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The host answered with a non-success status.
    #[error("image host rejected the upload: {0}")]
    Rejected(reqwest::StatusCode),
}

/// A stored image as reported back by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    /// Public URL of the stored image.
    pub url: String,
    /// Host-side identifier, when the host provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

/// HTTP client for the configured image host.
pub struct ImageHostClient {
    client: reqwest::Client,
    upload_url: String,
    api_key: SecretString,
}

impl ImageHostClient {
    /// Create a client from the host configuration.
    #[must_use]
    pub fn new(config: &ImageHostConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Forward image bytes to the host and return the stored image.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` if the request fails or the host answers with a
    /// non-success status.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, UploadError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(content_type)
            .map_err(UploadError::Request)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UploadError::Rejected(response.status()));
        }

        Ok(response.json::<UploadedImage>().await?)
    }
}
