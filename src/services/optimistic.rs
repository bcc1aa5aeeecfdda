// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Optimistic updates with rollback.
//!
//! An [`OptimisticCommand`] captures the target's pre-image, applies a local
//! mutation immediately, and restores the pre-image verbatim if the remote
//! effect fails. [`InFlight`] rejects a second command for an entity whose
//! first command has not finished.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{AppError, Result};

/// State that can be snapshotted and restored.
pub trait Rollback {
    type Snapshot;

    fn snapshot(&self) -> Self::Snapshot;

    fn restore(&self, snapshot: Self::Snapshot);
}

/// A locally applied change waiting for remote confirmation.
#[must_use = "an optimistic command must be committed"]
pub struct OptimisticCommand<T: Rollback> {
    target: T,
    pre_image: T::Snapshot,
    _guard: Option<InFlightGuard>,
}

impl<T: Rollback> OptimisticCommand<T> {
    /// Snapshot `target`, then mutate it.
    pub fn apply(target: T, mutate: impl FnOnce(&T)) -> Self {
        let pre_image = target.snapshot();
        mutate(&target);
        Self {
            target,
            pre_image,
            _guard: None,
        }
    }

    /// Hold an in-flight guard until the command resolves.
    pub(crate) fn guarded(mut self, guard: InFlightGuard) -> Self {
        self._guard = Some(guard);
        self
    }

    /// Await the remote effect; restore the pre-image if it fails.
    pub async fn commit<R, F>(self, effect: F) -> Result<R>
    where
        F: Future<Output = Result<R>>,
    {
        match effect.await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.target.restore(self.pre_image);
                Err(e)
            }
        }
    }
}

/// Set of entity ids with an operation in progress.
#[derive(Clone, Default)]
pub struct InFlight {
    ids: Arc<DashMap<String, ()>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` busy until the returned guard drops.
    pub fn acquire(&self, id: &str) -> Result<InFlightGuard> {
        use dashmap::mapref::entry::Entry;

        match self.ids.entry(id.to_string()) {
            Entry::Occupied(_) => Err(AppError::InProgress(id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(InFlightGuard {
                    id: id.to_string(),
                    ids: self.ids.clone(),
                })
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }
}

/// Releases its id when dropped.
pub struct InFlightGuard {
    id: String,
    ids: Arc<DashMap<String, ()>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids.remove(&self.id);
    }
}
