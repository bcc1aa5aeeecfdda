// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login and registration pages.

use std::time::Duration;

use serde_json::Value;
use validator::Validate;

use super::{field_messages, FormStatus, StatusCell};
use crate::db::collections;
use crate::error::{AppError, Result};
use crate::models::{Role, UserProfile};
use crate::navigation::{AppRoute, HistoryEntry};
use crate::services::{AuthFlow, FederatedCredential, Identity};
use crate::time_utils::now_rfc3339;
use crate::AppState;

/// How long sign-in waits for the session to be published before navigating.
const SESSION_WAIT: Duration = Duration::from_secs(10);

/// Display name for federated accounts without one.
const DEFAULT_NAME: &str = "Korisnik";

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "Unesite ime i prezime."))]
    pub name: String,
    #[validate(length(min = 1, message = "Unesite korisničko ime."))]
    pub username: String,
    #[validate(length(min = 1, message = "Unesite email adresu."))]
    pub email: String,
    #[validate(length(min = 6, message = "Lozinka mora imati najmanje 6 karaktera."))]
    pub password: String,
    pub phone_num: String,
    pub city: String,
}

impl RegisterForm {
    /// Text fields trimmed; the password is kept as typed.
    fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            phone_num: self.phone_num.trim().to_string(),
            city: self.city.trim().to_string(),
        }
    }

    /// Profile document written for a newly created account.
    fn profile(&self, identity: &Identity) -> UserProfile {
        let non_empty = |v: &str| (!v.is_empty()).then(|| v.to_string());
        let name = if self.name.is_empty() {
            &self.username
        } else {
            &self.name
        };

        UserProfile {
            uid: identity.uid.clone(),
            name: Some(name.clone()),
            username: Some(self.username.clone()),
            email: Some(self.email.clone()),
            phone_num: non_empty(&self.phone_num),
            city: non_empty(&self.city),
            avatar: Some(identity.photo_url.clone().unwrap_or_default()),
            role: Some(Role::User),
            created_at: Some(now_rfc3339()),
        }
    }
}

/// Where to go after signing in: the intercepted destination, else home.
pub fn login_destination(entry: &HistoryEntry) -> String {
    entry
        .from
        .as_ref()
        .map(|from| from.to_url())
        .unwrap_or_else(|| AppRoute::Home.to_path())
}

/// Default profile for a federated account signing in the first time.
pub fn federated_profile(identity: &Identity) -> UserProfile {
    let email = identity.email.clone().unwrap_or_default();
    let fallback_username = email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .unwrap_or("korisnik")
        .to_string();

    UserProfile {
        uid: identity.uid.clone(),
        name: Some(
            identity
                .display_name
                .clone()
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        ),
        username: Some(identity.display_name.clone().unwrap_or(fallback_username)),
        email: Some(email),
        avatar: Some(identity.photo_url.clone().unwrap_or_default()),
        role: Some(Role::User),
        created_at: Some(now_rfc3339()),
        ..Default::default()
    }
}

#[derive(Clone)]
pub struct AuthPage {
    app: AppState,
    status: StatusCell,
}

impl AuthPage {
    pub fn new(app: AppState) -> Self {
        Self {
            app,
            status: StatusCell::default(),
        }
    }

    pub fn status(&self) -> FormStatus {
        self.status.get()
    }

    /// Create an account and its profile document, then go home.
    pub async fn register(&self, form: &RegisterForm) -> Result<UserProfile> {
        self.status.start();
        let form = form.normalized();

        if let Err(errors) = form.validate() {
            let fields = field_messages(&errors);
            let message = fields.values().next().cloned().unwrap_or_default();
            self.status.invalid(fields, message.clone());
            return Err(AppError::Validation(message));
        }

        let result = self.try_register(&form).await;
        self.finish(result, AuthFlow::Register)
    }

    async fn try_register(&self, form: &RegisterForm) -> Result<UserProfile> {
        let identity = self.app.identity.register(&form.email, &form.password).await?;

        let display_name = if form.name.is_empty() {
            &form.username
        } else {
            &form.name
        };
        if !display_name.is_empty() {
            self.app.identity.update_display_name(display_name).await?;
        }

        let profile = form.profile(&identity);
        let token = self.app.identity.id_token(false).await?;
        let path = collections::doc(collections::USERS, &identity.uid);
        let _: Value = self.app.db.put(&path, &profile, Some(&token)).await?;

        tracing::info!(uid = %identity.uid, "Account registered");
        self.app.navigator.push(&AppRoute::Home.to_path());
        Ok(profile)
    }

    /// Email/password sign-in; returns to the intercepted destination.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        self.status.start();
        let email = email.trim();

        if email.is_empty() || password.is_empty() {
            let message = "Unesite email i lozinku.".to_string();
            self.status.fail(message.clone());
            return Err(AppError::Validation(message));
        }

        let destination = login_destination(&self.app.navigator.current());
        let result = match self.app.identity.sign_in(email, password).await {
            Ok(identity) => {
                self.enter(&identity, &destination).await;
                Ok(identity)
            }
            Err(e) => Err(AppError::from(e)),
        };
        self.finish(result, AuthFlow::SignIn)
    }

    /// Federated sign-in; creates the profile document on first use.
    pub async fn sign_in_federated(&self, credential: &FederatedCredential) -> Result<Identity> {
        self.status.start();
        let result = self.try_federated(credential).await;
        self.finish(result, AuthFlow::Register)
    }

    async fn try_federated(&self, credential: &FederatedCredential) -> Result<Identity> {
        let identity = self.app.identity.sign_in_federated(credential).await?;
        let token = self.app.identity.id_token(false).await?;
        self.ensure_user_profile(&identity, &token).await?;
        self.enter(&identity, &AppRoute::Home.to_path()).await;
        Ok(identity)
    }

    /// Write a default profile unless one exists already.
    pub async fn ensure_user_profile(&self, identity: &Identity, token: &str) -> Result<bool> {
        let path = collections::doc(collections::USERS, &identity.uid);
        let existing: Value = self.app.db.get(&path, Some(token)).await?;
        if !existing.is_null() {
            return Ok(false);
        }

        let profile = federated_profile(identity);
        let _: Value = self.app.db.put(&path, &profile, Some(token)).await?;
        tracing::info!(uid = %identity.uid, "Created profile for federated account");
        Ok(true)
    }

    /// Navigate once the session for `identity` is published.
    async fn enter(&self, identity: &Identity, destination: &str) {
        if !self.app.auth.wait_for_user(&identity.uid, SESSION_WAIT).await {
            tracing::warn!(uid = %identity.uid, "Session not published in time");
        }
        self.app.navigator.replace(destination);
    }

    fn finish<T>(&self, result: Result<T>, flow: AuthFlow) -> Result<T> {
        match &result {
            Ok(_) => self.status.succeed(None),
            Err(e) => self.status.fail(e.message_for(flow)),
        }
        result
    }
}
