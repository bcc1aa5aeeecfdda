// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Polovnjaci: headless client for a used-car classifieds marketplace.
//!
//! This crate provides the document store gateway, shared reactive stores,
//! guarded navigation and page controllers for browsing, publishing and
//! managing car ads, plus a local development sideband that stores uploaded
//! pictures.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod navigation;
pub mod pages;
pub mod routes;
pub mod services;
pub mod stores;
pub mod time_utils;

use std::sync::Arc;

use tokio::task::JoinHandle;

use config::Config;
use db::RealtimeDb;
use error::{AppError, Result};
use models::UserProfile;
use navigation::{AppRoute, Navigator};
use services::{FirebaseIdentity, IdentityProvider, ImageUploadClient, SessionBootstrap};
use stores::{AuthStore, CarsStore, FilterStore};

/// Shared application state: gateways plus the stores every page reads.
///
/// Cloning is cheap; all members share their underlying state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: RealtimeDb,
    pub identity: Arc<dyn IdentityProvider>,
    pub uploads: ImageUploadClient,
    pub auth: AuthStore,
    pub filters: FilterStore,
    pub cars: CarsStore,
    pub navigator: Navigator,
}

impl AppState {
    /// State backed by the hosted identity provider, starting at the homepage.
    pub fn new(config: Config) -> Self {
        let identity = Arc::new(FirebaseIdentity::new(&config));
        Self::with_identity(config, identity, &AppRoute::Home.to_path())
    }

    pub fn with_identity(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        initial_url: &str,
    ) -> Self {
        let auth = AuthStore::new();
        Self {
            db: RealtimeDb::new(config.firebase_url.clone()),
            uploads: ImageUploadClient::new(config.upload_url.clone()),
            navigator: Navigator::new(auth.clone(), initial_url),
            filters: FilterStore::new(),
            cars: CarsStore::new(),
            config: Arc::new(config),
            identity,
            auth,
        }
    }

    pub fn session(&self) -> SessionBootstrap {
        SessionBootstrap::new(self.identity.clone(), self.db.clone(), self.auth.clone())
    }

    /// Start the session bootstrap and guard revalidation tasks.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        tracing::debug!("Starting session bootstrap");
        vec![self.session().spawn(), self.navigator.watch_auth()]
    }

    /// The signed-in user, or [`AppError::Unauthorized`].
    pub fn require_user(&self) -> Result<UserProfile> {
        self.auth.user().ok_or(AppError::Unauthorized)
    }

    /// Bearer token for authorized store writes.
    pub async fn id_token(&self) -> Result<String> {
        Ok(self.identity.id_token(false).await?)
    }

    /// End the session at the provider and clear the auth store.
    pub async fn logout(&self) -> Result<()> {
        self.identity.sign_out().await?;
        self.auth.logout();
        tracing::info!("Signed out");
        Ok(())
    }

    pub fn home_page(&self) -> pages::HomePage {
        pages::HomePage::new(self.clone())
    }

    pub fn list_page(&self) -> pages::ListPage {
        pages::ListPage::new(self.clone())
    }

    pub fn details_page(&self) -> pages::DetailsPage {
        pages::DetailsPage::new(self.clone())
    }

    pub fn auth_page(&self) -> pages::AuthPage {
        pages::AuthPage::new(self.clone())
    }

    pub fn upload_page(&self) -> pages::UploadPage {
        pages::UploadPage::new(self.clone())
    }

    pub fn my_ads_page(&self) -> pages::MyAdsPage {
        pages::MyAdsPage::new(self.clone())
    }

    pub fn profile_page(&self) -> pages::ProfilePage {
        pages::ProfilePage::new(self.clone())
    }

    pub fn password_page(&self) -> pages::PasswordPage {
        pages::PasswordPage::new(self.clone())
    }
}
