// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route table.
//!
//! Pure routing model with no I/O: parses paths into [`AppRoute`] values and
//! classifies each route's access requirements.

use std::fmt::Display;

/// Application routes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    #[default]
    Home,
    /// `/oglasi`, filtered by query parameters
    CarList,
    /// `/oglas/:id`
    CarDetails { id: String },
    /// `/prijava`
    Login,
    /// `/registracija`
    Register,
    /// `/profil`
    Profile,
    /// `/postavi-oglas`
    UploadCar,
    /// `/moji-oglasi`
    MyAds,
    /// `/reset-sifre`
    PasswordReset,
    NotFound,
}

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Anyone
    Open,
    /// Only visitors without a session (login, register)
    PublicOnly,
    /// Only signed-in users
    Protected,
}

impl AppRoute {
    /// Parse a URL path (no query string) into a route.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/oglasi" => Self::CarList,
            "/prijava" => Self::Login,
            "/registracija" => Self::Register,
            "/profil" => Self::Profile,
            "/postavi-oglas" => Self::UploadCar,
            "/moji-oglasi" => Self::MyAds,
            "/reset-sifre" => Self::PasswordReset,
            other => match other.strip_prefix("/oglas/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Self::CarDetails {
                    id: urlencoding::decode(id)
                        .map(|s| s.into_owned())
                        .unwrap_or_else(|_| id.to_string()),
                },
                _ => Self::NotFound,
            },
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::CarList => "/oglasi".to_string(),
            Self::CarDetails { id } => format!("/oglas/{}", urlencoding::encode(id)),
            Self::Login => "/prijava".to_string(),
            Self::Register => "/registracija".to_string(),
            Self::Profile => "/profil".to_string(),
            Self::UploadCar => "/postavi-oglas".to_string(),
            Self::MyAds => "/moji-oglasi".to_string(),
            Self::PasswordReset => "/reset-sifre".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    pub fn access(&self) -> RouteAccess {
        match self {
            Self::Login | Self::Register => RouteAccess::PublicOnly,
            Self::Profile | Self::UploadCar | Self::MyAds | Self::PasswordReset => {
                RouteAccess::Protected
            }
            _ => RouteAccess::Open,
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.access() == RouteAccess::Protected
    }

    /// Auth-only routes a signed-in user is sent away from.
    pub fn should_redirect_when_authenticated(&self) -> bool {
        self.access() == RouteAccess::PublicOnly
    }

    /// Where a visitor without a session is sent.
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// Where a signed-in user leaving an auth-only route is sent.
    pub fn auth_success_redirect() -> Self {
        Self::Home
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// Path plus query string (without the leading `?`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub query: String,
}

impl Location {
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
        }
    }

    /// Split `/path?query`; an empty path becomes `/`.
    pub fn parse(url: &str) -> Self {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let path = if path.is_empty() { "/" } else { path };
        Self::new(path, query)
    }

    pub fn route(&self) -> AppRoute {
        AppRoute::from_path(&self.path)
    }

    pub fn to_url(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

impl From<AppRoute> for Location {
    fn from(route: AppRoute) -> Self {
        Self::new(route.to_path(), "")
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_url())
    }
}
