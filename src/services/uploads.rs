// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the local image upload sideband.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// An image picked on the upload form.
///
/// Serializes as name and MIME type only; the bytes travel as a data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFile {
    pub name: String,
    /// MIME type, e.g. `image/jpeg`
    pub mime: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadFile<'a> {
    name: &'a str,
    data_url: String,
}

#[derive(Serialize)]
struct UploadRequest<'a> {
    files: Vec<UploadFile<'a>>,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    urls: Vec<String>,
}

#[derive(Deserialize)]
struct UploadError {
    error: String,
}

/// Posts images to the sideband and returns their public paths.
#[derive(Clone)]
pub struct ImageUploadClient {
    http: reqwest::Client,
    url: String,
}

impl ImageUploadClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub async fn upload(&self, files: &[ImageFile]) -> Result<Vec<String>> {
        let body = UploadRequest {
            files: files
                .iter()
                .map(|f| UploadFile {
                    name: &f.name,
                    data_url: f.to_data_url(),
                })
                .collect(),
        };

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UploadError>(&text)
                .map(|e| e.error)
                .unwrap_or_else(|_| format!("Request failed ({})", status.as_u16()));
            return Err(AppError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Parse(e.to_string()))?;
        tracing::info!(count = uploaded.urls.len(), "Images uploaded");
        Ok(uploaded.urls)
    }
}
