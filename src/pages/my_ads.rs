// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! "Moji oglasi" page: the signed-in user's listings, with optimistic delete.

use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::db::{collections, RealtimeDb};
use crate::error::Result;
use crate::models::Listing;
use crate::services::{FetchSequence, InFlight, OptimisticCommand, Rollback};
use crate::stores::{read, write};
use crate::time_utils::timestamp_millis;
use crate::AppState;

/// Displayed listings; the rollback target of a delete.
#[derive(Clone, Default)]
struct Listings(Arc<RwLock<Vec<Listing>>>);

impl Rollback for Listings {
    type Snapshot = Vec<Listing>;

    fn snapshot(&self) -> Vec<Listing> {
        read(&self.0).clone()
    }

    fn restore(&self, snapshot: Vec<Listing>) {
        *write(&self.0) = snapshot;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PageStatus {
    loading: bool,
    error: Option<String>,
}

#[derive(Clone)]
pub struct MyAdsPage {
    app: AppState,
    listings: Listings,
    status: Arc<RwLock<PageStatus>>,
    in_flight: InFlight,
    fetches: FetchSequence,
}

impl MyAdsPage {
    pub fn new(app: AppState) -> Self {
        Self {
            app,
            listings: Listings::default(),
            status: Arc::default(),
            in_flight: InFlight::new(),
            fetches: FetchSequence::new(),
        }
    }

    pub fn listings(&self) -> Vec<Listing> {
        self.listings.snapshot()
    }

    pub fn error(&self) -> Option<String> {
        read(&self.status).error.clone()
    }

    pub fn is_loading(&self) -> bool {
        read(&self.status).loading
    }

    /// True while a delete of `id` is awaiting the store.
    pub fn is_deleting(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    /// Load the signed-in user's listings, newest first.
    pub async fn load(&self) -> Result<()> {
        let ticket = self.fetches.begin();
        *write(&self.status) = PageStatus {
            loading: true,
            error: None,
        };

        let result = self.fetch_own().await;
        if ticket.is_cancelled() {
            return Ok(());
        }

        match result {
            Ok(mut own) => {
                own.sort_by_cached_key(|car| std::cmp::Reverse(timestamp_millis(&car.created_at)));
                self.listings.restore(own);
                write(&self.status).loading = false;
                Ok(())
            }
            Err(e) => {
                *write(&self.status) = PageStatus {
                    loading: false,
                    error: Some(e.user_message()),
                };
                Err(e)
            }
        }
    }

    async fn fetch_own(&self) -> Result<Vec<Listing>> {
        let user = self.app.require_user()?;
        let token = self.app.id_token().await?;
        let all = self
            .app
            .db
            .list::<Listing>(collections::CARS, Some(&token))
            .await?;
        Ok(all.into_iter().filter(|c| c.seller_id == user.uid).collect())
    }

    /// Remove `id` from the displayed set now; the returned handle performs
    /// the remote delete.
    ///
    /// Fails with `InProgress` if a delete of `id` has not finished yet.
    /// Failures are shown like those of [`PendingDelete::finish`].
    pub async fn begin_delete(&self, id: &str) -> Result<PendingDelete> {
        let result = self.try_begin_delete(id).await;
        if let Err(e) = &result {
            tracing::warn!(id = %id, error = %e, "Could not start delete");
            write(&self.status).error = Some(e.user_message());
        }
        result
    }

    async fn try_begin_delete(&self, id: &str) -> Result<PendingDelete> {
        let guard = self.in_flight.acquire(id)?;
        let token = self.app.id_token().await?;

        let target = id.to_string();
        let command = OptimisticCommand::apply(self.listings.clone(), |listings| {
            write(&listings.0).retain(|car| car.id != target);
        })
        .guarded(guard);

        Ok(PendingDelete {
            command,
            db: self.app.db.clone(),
            path: collections::doc(collections::CARS, id),
            token,
            status: self.status.clone(),
        })
    }

    /// Optimistically delete a listing, rolling back if the store refuses.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.begin_delete(id).await?.finish().await
    }

    pub fn unmount(&self) {
        self.fetches.cancel();
    }
}

/// A delete that has been applied locally but not yet confirmed.
#[must_use = "a pending delete must be finished"]
pub struct PendingDelete {
    command: OptimisticCommand<Listings>,
    db: RealtimeDb,
    path: String,
    token: String,
    status: Arc<RwLock<PageStatus>>,
}

impl PendingDelete {
    /// Issue the remote delete. On failure the displayed set is restored to
    /// what it was when the delete began and the error is shown.
    pub async fn finish(self) -> Result<()> {
        let Self {
            command,
            db,
            path,
            token,
            status,
        } = self;

        let result = command
            .commit(async { db.delete::<Value>(&path, Some(&token)).await.map(|_| ()) })
            .await;

        match &result {
            Ok(()) => {
                tracing::info!(path = %path, "Listing deleted");
                write(&status).error = None;
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Delete failed, restoring listings");
                write(&status).error = Some(e.user_message());
            }
        }
        result
    }
}
