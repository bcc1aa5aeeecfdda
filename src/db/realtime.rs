// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! REST client for the schemaless document store.
//!
//! Every path is addressed as `{base}/{path}.json`, optionally authorized with
//! an `auth` query parameter. Collections come back as JSON objects keyed by
//! opaque identifiers (or `null` when empty) and are normalized into ordered
//! record lists with [`normalize_records`].

use reqwest::{header::CONTENT_TYPE, Method, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// A record type stored in a keyed collection.
pub trait Document: DeserializeOwned {
    /// Field holding the record's own identifier.
    const ID_FIELD: &'static str = "_id";
}

/// Response to a `POST`: the key the store generated for the new document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushResponse {
    pub name: String,
}

/// Document store client.
#[derive(Clone)]
pub struct RealtimeDb {
    http: reqwest::Client,
    base_url: String,
}

impl RealtimeDb {
    /// Create a client for the store at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing HTTP client.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `{base}/{path}.json[?auth=token]`.
    pub fn url(&self, path: &str, token: Option<&str>) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid store URL: {}", e)))?;
        let mut url = base
            .join(&format!("{}.json", path.trim_matches('/')))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid store path: {}", e)))?;

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            url.query_pairs_mut().append_pair("auth", token);
        }

        Ok(url)
    }

    // ─── Verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T> {
        self.request(Method::GET, path, None, token).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(body), token).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, path, Some(body), token).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PATCH, path, Some(body), token).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T> {
        self.request(Method::DELETE, path, None, token).await
    }

    // ─── Typed helpers ───────────────────────────────────────────

    /// Fetch a whole collection as normalized records.
    pub async fn list<T: Document>(&self, collection: &str, token: Option<&str>) -> Result<Vec<T>> {
        let data: Option<Map<String, Value>> = self.get(collection, token).await?;
        Ok(normalize_records(data))
    }

    /// Fetch a single document by key; `None` if it does not exist.
    pub async fn fetch<T: Document>(
        &self,
        collection: &str,
        id: &str,
        token: Option<&str>,
    ) -> Result<Option<T>> {
        let path = crate::db::collections::doc(collection, id);
        let data: Value = self.get(&path, token).await?;
        Ok(normalize_record(id, data))
    }

    /// Issue a request and decode the JSON body.
    ///
    /// An empty body decodes as `null`. A non-success status fails with the
    /// server's `error`/`message` field, or `Request failed (<status>)`.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<T> {
        let url = self.url(path, token)?;
        tracing::debug!(method = %method, path, "Document store request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if !status.is_success() {
            let data = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
            let message = error_message(&data)
                .unwrap_or_else(|| format!("Request failed ({})", status.as_u16()));
            tracing::warn!(method = %method, path, status = status.as_u16(), error = %message, "Document store request failed");
            return Err(AppError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let data = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str::<Value>(&text)
                .map_err(|e| AppError::Parse(format!("JSON parse error: {}", e)))?
        };

        serde_json::from_value(data).map_err(|e| AppError::Parse(e.to_string()))
    }
}

/// Extract the server-supplied error text, if any.
fn error_message(data: &Value) -> Option<String> {
    let field = |v: &Value| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    };

    data.get("error")
        .and_then(field)
        .or_else(|| data.get("message").and_then(field))
}

/// Turn a keyed collection into an ordered record list.
///
/// Each record's identifier is its own declared identifier, or the key when it
/// has none. `None` (the store's empty collection) yields an empty list.
/// Entries that are not objects or do not decode are skipped.
pub fn normalize_records<T: Document>(data: Option<Map<String, Value>>) -> Vec<T> {
    data.map(|map| {
        map.into_iter()
            .filter_map(|(key, value)| normalize_record(&key, value))
            .collect()
    })
    .unwrap_or_default()
}

/// Normalize a single document fetched by key.
pub fn normalize_record<T: Document>(key: &str, value: Value) -> Option<T> {
    let Value::Object(mut obj) = value else {
        if !value.is_null() {
            tracing::debug!(key, "Skipping non-object record");
        }
        return None;
    };

    let has_id = obj.get(T::ID_FIELD).is_some_and(|v| !v.is_null());
    if !has_id {
        obj.insert(T::ID_FIELD.to_string(), Value::String(key.to_string()));
    }

    match serde_json::from_value(Value::Object(obj)) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(key, error = %e, "Skipping malformed record");
            None
        }
    }
}
