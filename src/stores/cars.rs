// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Most recently fetched listings plus a loading flag.

use std::sync::{Arc, RwLock};

use super::{read, write};
use crate::models::Listing;
use crate::time_utils::timestamp_millis;

#[derive(Debug, Default)]
struct CarsState {
    cars: Vec<Listing>,
    loading: bool,
}

/// Shared listing cache handle.
#[derive(Clone, Default)]
pub struct CarsStore {
    state: Arc<RwLock<CarsState>>,
}

impl CarsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cars(&self) -> Vec<Listing> {
        read(&self.state).cars.clone()
    }

    pub fn set_cars(&self, cars: Vec<Listing>) {
        write(&self.state).cars = cars;
    }

    pub fn is_loading(&self) -> bool {
        read(&self.state).loading
    }

    pub fn set_loading(&self, loading: bool) {
        write(&self.state).loading = loading;
    }

    /// Newest listings first, at most `limit` of them.
    pub fn latest(&self, limit: usize) -> Vec<Listing> {
        let mut cars = self.cars();
        cars.sort_by_cached_key(|car| std::cmp::Reverse(timestamp_millis(&car.created_at)));
        cars.truncate(limit);
        cars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, created_at: &str) -> Listing {
        Listing {
            id: id.into(),
            created_at: created_at.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_latest_sorts_newest_first() {
        let store = CarsStore::new();
        store.set_cars(vec![
            listing("old", "2025-01-01T00:00:00Z"),
            listing("broken", "yesterday"),
            listing("new", "2026-03-01T00:00:00Z"),
            listing("mid", "2025-06-01T00:00:00Z"),
        ]);

        let ids: Vec<_> = store.latest(3).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_loading_flag() {
        let store = CarsStore::new();
        assert!(!store.is_loading());
        store.set_loading(true);
        assert!(store.is_loading());
    }
}
