// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Page controllers turn every failure into a displayed message, so each
//! variant knows how to render itself for the user. The upload sideband
//! converts errors into JSON responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::identity::{AuthError, AuthFlow};

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Client-side validation failed; no network call was issued.
    #[error("{0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the document store.
    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Parse(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Another operation on the same entity is still running.
    #[error("Operation already in progress: {0}")]
    InProgress(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Fallback shown when a listing fetch fails without a usable message.
    pub const LOAD_FAILED: &'static str = "Neuspešno učitavanje oglasa.";

    /// Message displayed to the user by a page controller.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Remote { message, .. } => message.clone(),
            AppError::Network(_) => "Problem sa mrežom. Pokušajte ponovo.".to_string(),
            AppError::Parse(_) => Self::LOAD_FAILED.to_string(),
            AppError::Auth(err) => err.message(AuthFlow::SignIn),
            AppError::Unauthorized => "Morate biti prijavljeni.".to_string(),
            AppError::NotFound(_) => "Oglas nije pronađen.".to_string(),
            AppError::InProgress(_) => "Operacija je već u toku.".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal(_) => "Došlo je do greške.".to_string(),
        }
    }

    /// Like [`user_message`](Self::user_message), with identity errors worded
    /// for the given flow.
    pub fn message_for(&self, flow: AuthFlow) -> String {
        match self {
            AppError::Auth(err) => err.message(flow),
            other => other.user_message(),
        }
    }

    /// True if the error came from the transport or the store's status code.
    pub fn is_remote(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::Remote { .. })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

/// JSON error body returned by the upload sideband.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::BadRequest(msg) | AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Upload failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Upload failed.".to_string())
            }
            other => {
                tracing::error!(error = %other, "Unexpected sideband error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Upload failed.".to_string())
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;
