// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side navigation: route table, guards and history.

pub mod guard;
pub mod navigator;
pub mod route;

pub use guard::{guard, GuardOutcome};
pub use navigator::{HistoryEntry, Navigator};
pub use route::{AppRoute, Location, RouteAccess};
