// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application state stores shared between page controllers.
//!
//! Each store is a cheap-to-clone handle over shared state and is created once
//! at the application root ([`crate::AppState`]). Locks are never held across
//! an `.await`.

pub mod auth;
pub mod cars;
pub mod filters;

pub use auth::{AuthState, AuthStore};
pub use cars::CarsStore;
pub use filters::{FilterState, FilterStore};

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read a store lock; a panic in another writer does not poison the UI state.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
