// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth session state: merged user profile, bearer token and a loading flag.
//!
//! State lives in a `watch` channel so route guards and the navigator can
//! react to changes without polling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::models::UserProfile;

/// Snapshot of the auth session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    /// True while the session is being resolved.
    pub is_loading: bool,
}

impl Default for AuthState {
    /// Starts out loading: nothing is known until the first bootstrap pass.
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            is_loading: true,
        }
    }
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn uid(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.uid.as_str())
    }
}

/// Shared auth store handle.
#[derive(Clone)]
pub struct AuthStore {
    tx: Arc<watch::Sender<AuthState>>,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.tx.borrow().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().is_loading
    }

    pub fn set_user(&self, user: Option<UserProfile>) {
        self.tx.send_modify(|state| state.user = user);
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.tx.send_if_modified(|state| {
            let changed = state.is_loading != is_loading;
            state.is_loading = is_loading;
            changed
        });
    }

    /// Publish a resolved session in one update; clears the loading flag.
    pub fn publish(&self, user: Option<UserProfile>, token: Option<String>) {
        self.tx.send_modify(|state| {
            state.user = user;
            state.token = token;
            state.is_loading = false;
        });
    }

    /// Wait until the session for `uid` is published. False on timeout.
    pub async fn wait_for_user(&self, uid: &str, timeout: Duration) -> bool {
        let mut rx = self.subscribe();
        let resolved = async {
            rx.wait_for(|state| !state.is_loading && state.uid() == Some(uid))
                .await
                .is_ok()
        };
        tokio::time::timeout(timeout, resolved).await.unwrap_or(false)
    }

    /// Drop the local session. Signing out at the provider is the caller's job.
    pub fn logout(&self) {
        self.tx.send_modify(|state| {
            state.user = None;
            state.token = None;
            state.is_loading = false;
        });
    }
}
