// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page controllers.
//!
//! Each controller orchestrates gateway calls for one page, writes the shared
//! stores, and exposes a snapshot of its view state. Failures are converted
//! into displayed messages at this boundary.

pub mod auth;
pub mod details;
pub mod home;
pub mod list;
pub mod my_ads;
pub mod password;
pub mod profile;
pub mod upload;

pub use auth::{AuthPage, RegisterForm};
pub use details::DetailsPage;
pub use home::HomePage;
pub use list::ListPage;
pub use my_ads::MyAdsPage;
pub use password::{PasswordChangeForm, PasswordPage};
pub use profile::{ProfilePage, ProfileUpdate};
pub use upload::{UploadForm, UploadPage};

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use validator::ValidationErrors;

use crate::models::listing::format_price;
use crate::models::{CarFilters, Listing, ReferenceData};
use crate::navigation::AppRoute;
use crate::stores::{read, write};

/// Listing summary shown on the homepage and list page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCard {
    pub id: String,
    pub href: String,
    pub title: String,
    pub image: Option<String>,
    pub price: String,
    pub currency: &'static str,
    pub year: f64,
    pub mileage: String,
    pub brand: String,
    pub model: String,
    pub fuel: String,
    pub body_type: String,
}

impl ListingCard {
    pub fn new(car: &Listing, reference: &ReferenceData) -> Self {
        Self {
            id: car.id.clone(),
            href: car.href(),
            title: car.title.clone(),
            image: car.cover_image().map(str::to_string),
            price: car.formatted_price(),
            currency: car.currency.as_str(),
            year: car.year,
            mileage: format_price(car.mileage),
            brand: reference.brand_name(&car.brand_id).to_string(),
            model: reference.model_name(&car.model_id).to_string(),
            fuel: reference.fuel_name(&car.fuel).to_string(),
            body_type: reference.body_type_name(&car.body_type).to_string(),
        }
    }
}

/// List route URL for a filter object.
pub fn search_url(filters: &CarFilters) -> String {
    let query = filters.to_query_string();
    let path = AppRoute::CarList.to_path();
    if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    }
}

/// Submission state of a form page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    /// Per-field validation messages, keyed by field name.
    pub field_errors: BTreeMap<String, String>,
}

/// Shared form status handle.
#[derive(Clone, Default)]
pub(crate) struct StatusCell(Arc<RwLock<FormStatus>>);

impl StatusCell {
    pub(crate) fn get(&self) -> FormStatus {
        read(&self.0).clone()
    }

    /// Clear messages and mark the form busy.
    pub(crate) fn start(&self) {
        *write(&self.0) = FormStatus {
            loading: true,
            ..Default::default()
        };
    }

    pub(crate) fn fail(&self, message: String) {
        let mut status = write(&self.0);
        status.loading = false;
        status.error = Some(message);
    }

    pub(crate) fn invalid(&self, field_errors: BTreeMap<String, String>, message: String) {
        let mut status = write(&self.0);
        status.loading = false;
        status.field_errors = field_errors;
        status.error = Some(message);
    }

    pub(crate) fn succeed(&self, message: Option<String>) {
        let mut status = write(&self.0);
        status.loading = false;
        status.success = message;
    }
}

/// First message per field, ordered by field name.
pub(crate) fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let message = errs.iter().find_map(|e| e.message.as_ref())?;
            Some((field.to_string(), message.to_string()))
        })
        .collect()
}
