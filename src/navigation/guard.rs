// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guards.

use super::route::{AppRoute, Location, RouteAccess};
use crate::stores::AuthState;

/// What to show for a location given the current auth state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    /// Session still resolving; show a loading indicator.
    Loading,
    /// Go elsewhere. `from` is the attempted destination, kept so the login
    /// page can return there.
    Redirect {
        to: Location,
        from: Option<Location>,
    },
}

pub fn guard(location: &Location, auth: &AuthState) -> GuardOutcome {
    match location.route().access() {
        RouteAccess::Open => GuardOutcome::Render,
        _ if auth.is_loading => GuardOutcome::Loading,
        RouteAccess::Protected if !auth.is_authenticated() => GuardOutcome::Redirect {
            to: AppRoute::auth_failure_redirect().into(),
            from: Some(location.clone()),
        },
        RouteAccess::PublicOnly if auth.is_authenticated() => GuardOutcome::Redirect {
            to: AppRoute::auth_success_redirect().into(),
            from: None,
        },
        _ => GuardOutcome::Render,
    }
}
