// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Picture upload endpoint.
//!
//! Accepts a batch of base64 data URLs, writes each decoded file into the
//! pictures directory and answers with the public paths.

use crate::config::Config;
use crate::error::AppError;
use anyhow::Context;
use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Public URL prefix the pictures directory is served under.
pub const PICTURES_PREFIX: &str = "/pictures";

pub fn routes() -> Router<Arc<Config>> {
    Router::new().route("/__upload", post(upload))
}

#[derive(Debug, Deserialize)]
struct UploadRequest {
    #[serde(default)]
    files: Vec<UploadedFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedFile {
    #[serde(default)]
    name: String,
    data_url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}

/// A decoded data URL.
#[derive(Debug, PartialEq, Eq)]
pub struct DecodedFile {
    pub mime: String,
    pub bytes: Vec<u8>,
}

async fn upload(
    State(config): State<Arc<Config>>,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    let request: UploadRequest =
        serde_json::from_slice(&body).context("Malformed upload payload")?;

    if request.files.is_empty() {
        return Err(AppError::BadRequest("No files received.".to_string()));
    }

    let mut urls = Vec::with_capacity(request.files.len());
    for file in &request.files {
        let Some(decoded) = decode_data_url(&file.data_url) else {
            tracing::debug!(name = %file.name, "Skipping entry that is not a base64 data URL");
            continue;
        };

        let filename = unique_filename(&file.name, &decoded.mime);
        let path = config.pictures_dir.join(&filename);
        tokio::fs::write(&path, &decoded.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(file = %filename, bytes = decoded.bytes.len(), "Stored picture");
        urls.push(format!("{PICTURES_PREFIX}/{filename}"));
    }

    Ok(Json(UploadResponse { urls }))
}

/// Decode `data:<mime>;base64,<payload>`; `None` if it doesn't match.
pub fn decode_data_url(data_url: &str) -> Option<DecodedFile> {
    let rest = data_url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    if mime.is_empty() {
        return None;
    }

    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some(DecodedFile {
        mime: mime.to_string(),
        bytes,
    })
}

/// File extension taken from the MIME subtype, `png` when absent.
pub fn extension_for(mime: &str) -> String {
    let ext: String = mime
        .split('/')
        .nth(1)
        .unwrap_or_default()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '-')
        .collect();

    if ext.is_empty() {
        "png".to_string()
    } else {
        ext
    }
}

/// Lowercase a client-supplied name down to `[a-z0-9._-]`.
pub fn safe_basename(name: &str) -> String {
    let stem = std::path::Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let mut out = String::with_capacity(stem.len());
    for c in stem.to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

fn unique_filename(name: &str, mime: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let tag = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}.{}",
        safe_basename(name),
        millis,
        &tag[..6],
        extension_for(mime)
    )
}
