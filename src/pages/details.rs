// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Listing details page: the listing, its seller and an image gallery.

use std::sync::{Arc, RwLock};

use crate::db::collections;
use crate::error::AppError;
use crate::models::{CarFeatures, Listing, UserProfile};
use crate::services::{ensure_reference_data, FetchSequence};
use crate::stores::{read, write};
use crate::AppState;

const NO_PHONE: &str = "Telefon nije dostupan";
const NO_DESCRIPTION: &str = "Nema opisa.";

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsView {
    pub car: Option<Listing>,
    pub seller: Option<UserProfile>,
    /// Index into the listing's images
    pub selected_image: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for DetailsView {
    fn default() -> Self {
        Self {
            car: None,
            seller: None,
            selected_image: 0,
            loading: true,
            error: None,
        }
    }
}

/// Display fields derived from the loaded listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CarSummary {
    pub title: String,
    pub price: String,
    pub currency: &'static str,
    pub brand: String,
    pub model: String,
    pub fuel: String,
    pub body_type: String,
    pub year: f64,
    pub mileage: f64,
    pub engine_power: f64,
    pub engine_displacement: f64,
    pub owner_count: f64,
    pub features: CarFeatures,
    pub description: String,
    pub seller_phone: String,
}

#[derive(Clone)]
pub struct DetailsPage {
    app: AppState,
    view: Arc<RwLock<DetailsView>>,
    fetches: FetchSequence,
}

impl DetailsPage {
    pub fn new(app: AppState) -> Self {
        Self {
            app,
            view: Arc::default(),
            fetches: FetchSequence::new(),
        }
    }

    pub fn view(&self) -> DetailsView {
        read(&self.view).clone()
    }

    /// Load a listing and its seller; reference lists load alongside.
    pub async fn load(&self, id: Option<&str>) {
        tokio::join!(
            self.load_car(id),
            ensure_reference_data(&self.app.db, &self.app.filters, None)
        );
    }

    async fn load_car(&self, id: Option<&str>) {
        let ticket = self.fetches.begin();

        let Some(id) = id.filter(|id| !id.is_empty()) else {
            let mut view = write(&self.view);
            view.error = Some(AppError::NotFound(String::new()).user_message());
            view.loading = false;
            return;
        };

        {
            let mut view = write(&self.view);
            view.loading = true;
            view.error = None;
        }

        let db = &self.app.db;
        let car = match db.fetch::<Listing>(collections::CARS, id, None).await {
            Ok(car) => car,
            Err(e) => {
                if ticket.is_current() {
                    let mut view = write(&self.view);
                    view.error = Some(e.user_message());
                    view.loading = false;
                }
                return;
            }
        };
        if ticket.is_cancelled() {
            return;
        }

        let Some(car) = car else {
            tracing::debug!(id, "Listing not found");
            let mut view = write(&self.view);
            view.car = None;
            view.seller = None;
            view.error = Some(AppError::NotFound(id.to_string()).user_message());
            view.loading = false;
            return;
        };

        let seller_id = car.seller_id.clone();
        self.show_car(car);

        if seller_id.is_empty() {
            write(&self.view).loading = false;
            return;
        }

        let seller = db
            .fetch::<UserProfile>(collections::USERS, &seller_id, None)
            .await;
        if ticket.is_cancelled() {
            return;
        }

        let mut view = write(&self.view);
        match seller {
            Ok(seller) => view.seller = seller,
            Err(e) => view.error = Some(e.user_message()),
        }
        view.loading = false;
    }

    /// Gallery selection restarts whenever a different listing is shown.
    fn show_car(&self, car: Listing) {
        let mut view = write(&self.view);
        let same = view.car.as_ref().is_some_and(|c| c.id == car.id);
        if !same {
            view.selected_image = 0;
            view.seller = None;
        }
        view.car = Some(car);
    }

    pub fn select_image(&self, index: usize) {
        let mut view = write(&self.view);
        let count = view.car.as_ref().map_or(0, |c| c.images.len());
        if index < count {
            view.selected_image = index;
        }
    }

    /// Selected image, or the first one if the selection is out of range.
    pub fn main_image(&self) -> Option<String> {
        let view = read(&self.view);
        let images = &view.car.as_ref()?.images;
        images
            .get(view.selected_image)
            .or_else(|| images.first())
            .cloned()
    }

    pub fn summary(&self) -> Option<CarSummary> {
        let view = read(&self.view);
        let car = view.car.as_ref()?;
        let reference = self.app.filters.reference();

        let seller_phone = view
            .seller
            .as_ref()
            .and_then(|s| s.phone_num.clone())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| NO_PHONE.to_string());
        let description = if car.description.trim().is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            car.description.clone()
        };

        Some(CarSummary {
            title: car.title.clone(),
            price: car.formatted_price(),
            currency: car.currency.as_str(),
            brand: reference.brand_name(&car.brand_id).to_string(),
            model: reference.model_name(&car.model_id).to_string(),
            fuel: reference.fuel_name(&car.fuel).to_string(),
            body_type: reference.body_type_name(&car.body_type).to_string(),
            year: car.year,
            mileage: car.mileage,
            engine_power: car.engine_power,
            engine_displacement: car.engine_displacement,
            owner_count: car.owner_count,
            features: car.features,
            description,
            seller_phone,
        })
    }

    /// Back button.
    pub fn go_back(&self) -> bool {
        self.app.navigator.back()
    }

    pub fn unmount(&self) {
        self.fetches.cancel();
    }
}
