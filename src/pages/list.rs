// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Car list page.
//!
//! The URL query string is the source of truth. On every location change the
//! controller:
//! 1. parses the filters and pushes them into the filter panel,
//! 2. fetches all listings and filters them client-side,
//! 3. lazily loads the reference lists used for name resolution.
//!
//! A fetch superseded by a newer location (or by unmounting) never writes
//! its result, and a failed fetch leaves the displayed listings untouched.

use std::sync::{Arc, RwLock};

use tokio::task::JoinHandle;

use super::{search_url, ListingCard};
use crate::db::collections;
use crate::models::{CarFilters, Listing};
use crate::navigation::AppRoute;
use crate::services::{ensure_reference_data, FetchSequence};
use crate::stores::{read, write};
use crate::AppState;

/// Snapshot of the list page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    /// Filters parsed from the current URL
    pub filters: CarFilters,
    pub cars: Vec<Listing>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ListView {
    fn default() -> Self {
        Self {
            filters: CarFilters::default(),
            cars: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

/// One "active filter" chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilter {
    pub label: &'static str,
    pub value: String,
}

#[derive(Clone)]
pub struct ListPage {
    app: AppState,
    view: Arc<RwLock<ListView>>,
    /// Filters of the last fetch that was started; `None` before the first.
    requested: Arc<RwLock<Option<CarFilters>>>,
    fetches: FetchSequence,
    reference_fetches: FetchSequence,
}

impl ListPage {
    pub fn new(app: AppState) -> Self {
        Self {
            app,
            view: Arc::default(),
            requested: Arc::default(),
            fetches: FetchSequence::new(),
            reference_fetches: FetchSequence::new(),
        }
    }

    pub fn view(&self) -> ListView {
        read(&self.view).clone()
    }

    /// Sync with the navigator's current location.
    pub async fn mount(&self) {
        let location = self.app.navigator.location();
        self.sync_location(&location.query).await;
    }

    /// React to a new query string.
    ///
    /// Listings are refetched only when the parsed filters changed.
    pub async fn sync_location(&self, query: &str) {
        let filters = CarFilters::from_query(query);
        self.app.filters.apply_selection(&filters);

        let changed = {
            let mut requested = write(&self.requested);
            let changed = requested.as_ref() != Some(&filters);
            *requested = Some(filters.clone());
            changed
        };

        if changed {
            tokio::join!(self.load(filters), self.ensure_reference());
        } else {
            self.ensure_reference().await;
        }
    }

    /// Fetch all listings and keep the ones matching `filters`.
    pub async fn load(&self, filters: CarFilters) {
        let ticket = self.fetches.begin();
        {
            let mut view = write(&self.view);
            view.loading = true;
            view.error = None;
            view.filters = filters.clone();
        }

        let result = self.app.db.list::<Listing>(collections::CARS, None).await;
        if ticket.is_cancelled() {
            tracing::debug!("Listing fetch superseded, dropping result");
            return;
        }

        let mut view = write(&self.view);
        match result {
            Ok(all) => {
                let total = all.len();
                view.cars = filters.apply(all);
                tracing::debug!(total, shown = view.cars.len(), "Listings filtered");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load listings");
                view.error = Some(e.user_message());
            }
        }
        view.loading = false;
    }

    /// Load reference lists if any is missing; failures are swallowed.
    pub async fn ensure_reference(&self) {
        let ticket = self.reference_fetches.begin();
        ensure_reference_data(&self.app.db, &self.app.filters, Some(&ticket)).await;
    }

    /// Write the panel's selections into the URL, replacing the current entry.
    pub fn search(&self) -> String {
        let url = search_url(&self.app.filters.get_filters());
        self.app.navigator.replace(&url);
        url
    }

    /// Follow navigator changes while the list route is showing.
    ///
    /// Each location is synced on its own task so a newer location can
    /// supersede a slow fetch.
    pub fn follow(&self) -> JoinHandle<()> {
        let page = self.clone();
        let mut rx = self.app.navigator.subscribe();
        tokio::spawn(async move {
            loop {
                let location = rx.borrow_and_update().location.clone();
                if location.route() == AppRoute::CarList {
                    let page = page.clone();
                    tokio::spawn(async move { page.sync_location(&location.query).await });
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Tear down: outstanding fetches must not write any more.
    pub fn unmount(&self) {
        self.fetches.cancel();
        self.reference_fetches.cancel();
    }

    /// Chips describing the URL filters, with names resolved.
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        let filters = read(&self.view).filters.clone();
        let reference = self.app.filters.reference();

        let mut chips = Vec::new();
        if let Some(brand) = &filters.brand {
            chips.push(ActiveFilter {
                label: "Marka",
                value: reference.brand_name(brand).to_string(),
            });
        }
        if let Some(model) = &filters.model {
            chips.push(ActiveFilter {
                label: "Model",
                value: reference.model_name(model).to_string(),
            });
        }
        if let Some(fuel) = &filters.fuel {
            chips.push(ActiveFilter {
                label: "Gorivo",
                value: reference.fuel_name(fuel).to_string(),
            });
        }
        if let Some(body_type) = &filters.body_type {
            chips.push(ActiveFilter {
                label: "Karoserija",
                value: reference.body_type_name(body_type).to_string(),
            });
        }
        if let Some(year) = filters.year_from {
            chips.push(ActiveFilter {
                label: "Godište od",
                value: year.to_string(),
            });
        }
        chips
    }

    pub fn cards(&self) -> Vec<ListingCard> {
        let reference = self.app.filters.reference();
        read(&self.view)
            .cars
            .iter()
            .map(|car| ListingCard::new(car, &reference))
            .collect()
    }
}
