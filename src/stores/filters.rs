// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Filter panel state: reference lists plus the user's current selections.

use std::sync::{Arc, RwLock};

use super::{read, write};
use crate::models::filters::{parse_year, ALL_VALUE};
use crate::models::{CarFilters, CarModel, ReferenceData};
use crate::time_utils::default_model_years;

/// Snapshot of the filter store.
///
/// Selections are kept as raw select values; an empty string means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub reference: ReferenceData,
    pub years: Vec<i32>,
    pub selected_brand: String,
    pub selected_model: String,
    pub selected_fuel: String,
    pub selected_body_type: String,
    pub year_from: String,
}

/// Shared filter store handle.
#[derive(Clone)]
pub struct FilterStore {
    state: Arc<RwLock<FilterState>>,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStore {
    /// Create a store with the default model-year list (generated once).
    pub fn new() -> Self {
        Self::with_years(default_model_years())
    }

    pub fn with_years(years: Vec<i32>) -> Self {
        Self {
            state: Arc::new(RwLock::new(FilterState {
                years,
                ..Default::default()
            })),
        }
    }

    pub fn snapshot(&self) -> FilterState {
        read(&self.state).clone()
    }

    // ─── Reference lists ─────────────────────────────────────────

    pub fn reference(&self) -> ReferenceData {
        read(&self.state).reference.clone()
    }

    /// True once all four reference lists are populated.
    pub fn has_reference_data(&self) -> bool {
        read(&self.state).reference.is_complete()
    }

    pub fn set_reference_data(&self, reference: ReferenceData) {
        write(&self.state).reference = reference;
    }

    pub fn years(&self) -> Vec<i32> {
        read(&self.state).years.clone()
    }

    /// Models offered by the panel for the currently selected brand.
    pub fn available_models(&self) -> Vec<CarModel> {
        let state = read(&self.state);
        state.reference.models_for_brand(&state.selected_brand)
    }

    // ─── Selections ──────────────────────────────────────────────

    /// Select a brand. Always clears the model selection.
    pub fn select_brand(&self, brand_id: &str) {
        let mut state = write(&self.state);
        state.selected_brand = select_value(brand_id);
        state.selected_model.clear();
    }

    /// Raw model setter; does not check the brand.
    pub fn set_selected_model(&self, model_id: &str) {
        write(&self.state).selected_model = select_value(model_id);
    }

    pub fn set_selected_fuel(&self, fuel_id: &str) {
        write(&self.state).selected_fuel = select_value(fuel_id);
    }

    pub fn set_selected_body_type(&self, body_type_id: &str) {
        write(&self.state).selected_body_type = select_value(body_type_id);
    }

    pub fn set_year_from(&self, year: &str) {
        write(&self.state).year_from = select_value(year);
    }

    /// Replace all five selections at once, e.g. from URL parameters.
    pub fn apply_selection(&self, filters: &CarFilters) {
        let mut state = write(&self.state);
        state.selected_brand = filters.brand.clone().unwrap_or_default();
        state.selected_model = filters.model.clone().unwrap_or_default();
        state.selected_fuel = filters.fuel.clone().unwrap_or_default();
        state.selected_body_type = filters.body_type.clone().unwrap_or_default();
        state.year_from = filters
            .year_from
            .map(|y| y.to_string())
            .unwrap_or_default();
    }

    /// Project the non-empty selections into a sparse filter object.
    pub fn get_filters(&self) -> CarFilters {
        let state = read(&self.state);
        let non_empty = |s: &String| (!s.is_empty()).then(|| s.clone());

        CarFilters {
            brand: non_empty(&state.selected_brand),
            model: non_empty(&state.selected_model),
            fuel: non_empty(&state.selected_fuel),
            body_type: non_empty(&state.selected_body_type),
            year_from: parse_year(&state.year_from),
        }
    }

    /// Reset every selection; reference lists are kept.
    pub fn clear_filters(&self) {
        let mut state = write(&self.state);
        state.selected_brand.clear();
        state.selected_model.clear();
        state.selected_fuel.clear();
        state.selected_body_type.clear();
        state.year_from.clear();
    }
}

/// The panel's "all" option is stored as an empty selection.
fn select_value(value: &str) -> String {
    if value == ALL_VALUE {
        String::new()
    } else {
        value.to_string()
    }
}
