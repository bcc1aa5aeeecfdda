// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";
const DEFAULT_UPLOAD_PORT: u16 = 5174;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store base URL (e.g. `https://<project>.firebasedatabase.app`)
    pub firebase_url: String,
    /// Identity provider API key
    pub firebase_api_key: String,
    /// Identity provider account endpoint
    pub identity_url: String,
    /// Identity provider token refresh endpoint
    pub secure_token_url: String,

    // --- Local development upload sideband ---
    /// Port the sideband listens on
    pub upload_port: u16,
    /// Full URL the upload page posts images to
    pub upload_url: String,
    /// Directory uploaded pictures are written to
    pub pictures_dir: PathBuf,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let upload_port = env::var("UPLOAD_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_UPLOAD_PORT);

        Ok(Self {
            firebase_url: env::var("FIREBASE_URL")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FIREBASE_URL"))?,
            firebase_api_key: env::var("FIREBASE_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            identity_url: env::var("IDENTITY_URL")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_URL.to_string()),
            secure_token_url: env::var("SECURE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_SECURE_TOKEN_URL.to_string()),
            upload_port,
            upload_url: env::var("UPLOAD_URL")
                .unwrap_or_else(|_| format!("http://localhost:{upload_port}/__upload")),
            pictures_dir: env::var("PICTURES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public/pictures")),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        })
    }

    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        Self {
            firebase_url: "http://127.0.0.1:9000".to_string(),
            firebase_api_key: "test-api-key".to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            secure_token_url: DEFAULT_SECURE_TOKEN_URL.to_string(),
            upload_port: DEFAULT_UPLOAD_PORT,
            upload_url: format!("http://localhost:{DEFAULT_UPLOAD_PORT}/__upload"),
            pictures_dir: env::temp_dir().join("polovnjaci-test-pictures"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
