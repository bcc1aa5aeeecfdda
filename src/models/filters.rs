// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sparse car search filters and their URL query-string form.
//!
//! The filter panel serializes its selections into the list route's query
//! string; the list page parses them back. Both directions go through
//! [`CarFilters`], so the two stay symmetric.

use serde::Serialize;
use url::form_urlencoded;

use crate::models::Listing;

/// Select value meaning "no filter" for a field.
pub const ALL_VALUE: &str = "__all__";

/// Compact filter object. Absent fields do not constrain the search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_from: Option<i32>,
}

impl CarFilters {
    pub fn is_empty(&self) -> bool {
        self.brand.is_none()
            && self.model.is_none()
            && self.fuel.is_none()
            && self.body_type.is_none()
            && self.year_from.is_none()
    }

    /// Parse the list route's query string (with or without a leading `?`).
    ///
    /// `brand`/`model` win over their legacy `brandId`/`modelId` aliases.
    /// Absent, empty and `__all__` values mean "no filter"; a `yearFrom`
    /// that is not a positive integer is ignored.
    pub fn from_query(query: &str) -> Self {
        let pairs = parse_query(query);
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        Self {
            brand: normalize_param(get("brand").or_else(|| get("brandId"))),
            model: normalize_param(get("model").or_else(|| get("modelId"))),
            fuel: normalize_param(get("fuel")),
            body_type: normalize_param(get("bodyType")),
            year_from: get("yearFrom").and_then(parse_year),
        }
    }

    /// Serialize into a query string (without `?`), keys in a fixed order.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        let mut push = |key: &str, value: &str| {
            parts.push(format!("{}={}", key, urlencoding::encode(value)));
        };

        if let Some(brand) = &self.brand {
            push("brand", brand);
        }
        if let Some(model) = &self.model {
            push("model", model);
        }
        if let Some(fuel) = &self.fuel {
            push("fuel", fuel);
        }
        if let Some(body_type) = &self.body_type {
            push("bodyType", body_type);
        }
        if let Some(year) = self.year_from {
            push("yearFrom", &year.to_string());
        }

        parts.join("&")
    }

    /// True if the listing satisfies every specified criterion.
    pub fn matches(&self, car: &Listing) -> bool {
        if let Some(brand) = &self.brand {
            if &car.brand_id != brand {
                return false;
            }
        }
        if let Some(model) = &self.model {
            if &car.model_id != model {
                return false;
            }
        }
        if let Some(fuel) = &self.fuel {
            if &car.fuel != fuel {
                return false;
            }
        }
        if let Some(body_type) = &self.body_type {
            if &car.body_type != body_type {
                return false;
            }
        }
        if let Some(year_from) = self.year_from {
            if car.year < f64::from(year_from) {
                return false;
            }
        }
        true
    }

    /// Keep only matching listings, preserving order.
    pub fn apply(&self, cars: Vec<Listing>) -> Vec<Listing> {
        if self.is_empty() {
            return cars;
        }
        cars.into_iter().filter(|car| self.matches(car)).collect()
    }
}

fn normalize_param(value: Option<&str>) -> Option<String> {
    match value {
        None | Some("") | Some(ALL_VALUE) => None,
        Some(v) => Some(v.to_string()),
    }
}

/// A year filter of `0` never constrained anything, so it is treated as absent.
pub(crate) fn parse_year(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok().filter(|year| *year > 0)
}

/// Decoded key/value pairs of a form-encoded query string.
fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}
