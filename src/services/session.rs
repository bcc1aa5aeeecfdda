// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth bootstrap: turns identity provider session changes into a published
//! auth session (merged profile plus bearer token).
//!
//! The auth store's loading flag stays asserted until a change is fully
//! resolved, so route guards never see "no user" while a session is still
//! being looked up.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::db::{collections, RealtimeDb};
use crate::models::UserProfile;
use crate::services::identity::{Identity, IdentityProvider};
use crate::stores::AuthStore;

/// Listens to the identity provider and keeps the [`AuthStore`] in sync.
#[derive(Clone)]
pub struct SessionBootstrap {
    identity: Arc<dyn IdentityProvider>,
    db: RealtimeDb,
    auth: AuthStore,
}

impl SessionBootstrap {
    pub fn new(identity: Arc<dyn IdentityProvider>, db: RealtimeDb, auth: AuthStore) -> Self {
        Self { identity, db, auth }
    }

    /// Resolve one session-state change.
    pub async fn handle_change(&self, identity: Option<Identity>) {
        self.auth.set_loading(true);

        let Some(identity) = identity else {
            tracing::debug!("No session");
            self.auth.publish(None, None);
            return;
        };

        let token = match self.identity.id_token(false).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(uid = %identity.uid, error = %e, "Could not obtain ID token");
                self.auth.publish(None, None);
                return;
            }
        };

        let stored = match self
            .db
            .fetch::<UserProfile>(collections::USERS, &identity.uid, Some(&token))
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(uid = %identity.uid, error = %e, "Profile fetch failed, using provider fields");
                None
            }
        };

        let user = merge_profile(&identity, stored);
        tracing::info!(uid = %user.uid, "Session resolved");
        self.auth.publish(Some(user), Some(token));
    }

    /// Resolve the current state, then every change until the provider goes away.
    pub async fn run(self) {
        let mut rx = self.identity.subscribe();
        loop {
            let identity = rx.borrow_and_update().clone();
            self.handle_change(identity).await;

            if rx.changed().await.is_err() {
                tracing::debug!("Identity provider closed, stopping session bootstrap");
                break;
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

/// Merge provider identity fields with the stored profile.
///
/// Stored fields win when present and non-empty; otherwise the provider's
/// display name, email and avatar fill in.
pub fn merge_profile(identity: &Identity, stored: Option<UserProfile>) -> UserProfile {
    let stored = stored.unwrap_or_default();
    let pick = |stored: Option<String>, provided: &Option<String>| {
        stored
            .filter(|v| !v.is_empty())
            .or_else(|| provided.clone().filter(|v| !v.is_empty()))
    };

    UserProfile {
        uid: identity.uid.clone(),
        name: pick(stored.name, &identity.display_name),
        email: pick(stored.email, &identity.email),
        avatar: pick(stored.avatar, &identity.photo_url),
        username: stored.username,
        phone_num: stored.phone_num,
        city: stored.city,
        role: stored.role,
        created_at: stored.created_at,
    }
}
