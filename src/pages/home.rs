// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Homepage: filter panel plus the latest ads.

use super::{search_url, ListingCard};
use crate::db::collections;
use crate::models::Listing;
use crate::services::ensure_reference_data;
use crate::AppState;

/// Number of cards in the "latest ads" section.
pub const LATEST_LIMIT: usize = 8;

#[derive(Clone)]
pub struct HomePage {
    app: AppState,
}

impl HomePage {
    pub fn new(app: AppState) -> Self {
        Self { app }
    }

    /// Load reference lists and listings concurrently.
    pub async fn mount(&self) {
        tokio::join!(
            ensure_reference_data(&self.app.db, &self.app.filters, None),
            self.load_cars()
        );
    }

    /// Refresh the cars store. Failures leave the store as it was.
    pub async fn load_cars(&self) {
        let cars = &self.app.cars;
        cars.set_loading(true);
        match self.app.db.list::<Listing>(collections::CARS, None).await {
            Ok(listings) => {
                tracing::info!(count = listings.len(), "Listings loaded");
                cars.set_cars(listings);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load listings"),
        }
        cars.set_loading(false);
    }

    pub fn is_loading(&self) -> bool {
        self.app.cars.is_loading()
    }

    /// Newest listings, names resolved against the reference lists.
    pub fn latest_ads(&self) -> Vec<ListingCard> {
        let reference = self.app.filters.reference();
        self.app
            .cars
            .latest(LATEST_LIMIT)
            .iter()
            .map(|car| ListingCard::new(car, &reference))
            .collect()
    }

    /// Open the list page with the panel's current selections.
    pub fn search(&self) -> String {
        let url = search_url(&self.app.filters.get_filters());
        self.app.navigator.push(&url);
        url
    }
}
