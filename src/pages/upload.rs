// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! "Postavi oglas" page: new listing form.

use std::str::FromStr;
use std::sync::{Arc, RwLock};

use validator::Validate;

use super::{FormStatus, StatusCell};
use crate::db::{collections, PushResponse};
use crate::error::{AppError, Result};
use crate::models::{CarFeatures, CarModel, Currency, Listing};
use crate::navigation::AppRoute;
use crate::services::{ensure_reference_data, ImageFile};
use crate::stores::{read, write};
use crate::time_utils::now_rfc3339;
use crate::AppState;

/// Shown when any field or the image list is empty.
pub const INCOMPLETE_FORM: &str = "Sva polja moraju biti uneta uključujući i slike!";

/// Raw form values, as typed.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct UploadForm {
    #[validate(length(min = 1, message = "Izaberite marku."))]
    pub brand_id: String,
    #[validate(length(min = 1, message = "Izaberite model."))]
    pub model_id: String,
    #[validate(length(min = 1, message = "Unesite naslov oglasa."))]
    pub title: String,
    #[validate(length(min = 1, message = "Unesite godinu proizvodnje."))]
    pub year: String,
    #[validate(length(min = 1, message = "Izaberite gorivo."))]
    pub fuel: String,
    #[validate(length(min = 1, message = "Izaberite karoseriju."))]
    pub body_type: String,
    #[validate(length(min = 1, message = "Unesite kilometražu."))]
    pub mileage: String,
    #[validate(length(min = 1, message = "Unesite snagu motora."))]
    pub engine_power: String,
    #[validate(length(min = 1, message = "Unesite kubikažu."))]
    pub engine_displacement: String,
    #[validate(length(min = 1, message = "Unesite broj vlasnika."))]
    pub owners: String,
    #[validate(length(min = 1, message = "Unesite cenu."))]
    pub price: String,
    #[validate(length(min = 1, message = "Izaberite valutu."))]
    pub currency: String,
    #[validate(length(min = 1, message = "Unesite opis."))]
    pub description: String,
    pub features: CarFeatures,
    #[validate(length(min = 1, message = "Dodajte bar jednu sliku."))]
    pub images: Vec<ImageFile>,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self {
            brand_id: String::new(),
            model_id: String::new(),
            title: String::new(),
            year: String::new(),
            fuel: String::new(),
            body_type: String::new(),
            mileage: String::new(),
            engine_power: String::new(),
            engine_displacement: String::new(),
            owners: String::new(),
            price: String::new(),
            currency: Currency::Eur.as_str().to_string(),
            description: String::new(),
            features: CarFeatures::default(),
            images: Vec::new(),
        }
    }
}

impl UploadForm {
    /// Copy with every text field trimmed.
    pub fn trimmed(&self) -> Self {
        let trim = |s: &String| s.trim().to_string();
        Self {
            brand_id: trim(&self.brand_id),
            model_id: trim(&self.model_id),
            title: trim(&self.title),
            year: trim(&self.year),
            fuel: trim(&self.fuel),
            body_type: trim(&self.body_type),
            mileage: trim(&self.mileage),
            engine_power: trim(&self.engine_power),
            engine_displacement: trim(&self.engine_displacement),
            owners: trim(&self.owners),
            price: trim(&self.price),
            currency: trim(&self.currency),
            description: trim(&self.description),
            features: self.features,
            images: self.images.clone(),
        }
    }

    /// Validate and convert into a listing without images or seller.
    ///
    /// Whitespace-only fields count as empty.
    pub fn to_listing(&self) -> Result<Listing> {
        let form = self.trimmed();
        if form.validate().is_err() {
            return Err(AppError::Validation(INCOMPLETE_FORM.to_string()));
        }
        form.build_listing()
    }

    fn build_listing(&self) -> Result<Listing> {

        let currency = Currency::parse(&self.currency)
            .ok_or_else(|| invalid("Valuta"))?;
        let price = parse_count(&self.price, "Cena")?;

        Ok(Listing {
            title: self.title.clone(),
            brand_id: self.brand_id.clone(),
            model_id: self.model_id.clone(),
            price,
            currency,
            year: parse_count(&self.year, "Godina proizvodnje")?,
            fuel: self.fuel.clone(),
            engine_displacement: parse_count(&self.engine_displacement, "Kubikaža")?,
            engine_power: parse_count(&self.engine_power, "Snaga motora")?,
            body_type: self.body_type.clone(),
            mileage: parse_count(&self.mileage, "Kilometraža")?,
            description: self.description.clone(),
            owner_count: parse_count(&self.owners, "Broj vlasnika")?,
            features: self.features,
            ..Default::default()
        })
    }
}

fn parse_number<T: FromStr>(raw: &str, label: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| invalid(label))
}

/// Non-negative finite number.
fn parse_count(raw: &str, label: &str) -> Result<f64> {
    let value = parse_number::<f64>(raw, label)?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(label))
    }
}

fn invalid(label: &str) -> AppError {
    AppError::Validation(format!("Neispravna vrednost: {label}."))
}

#[derive(Clone)]
pub struct UploadPage {
    app: AppState,
    form: Arc<RwLock<UploadForm>>,
    status: StatusCell,
}

impl UploadPage {
    pub fn new(app: AppState) -> Self {
        Self {
            app,
            form: Arc::default(),
            status: StatusCell::default(),
        }
    }

    /// Load the select options; failures leave them empty.
    pub async fn mount(&self) {
        ensure_reference_data(&self.app.db, &self.app.filters, None).await;
    }

    pub fn form(&self) -> UploadForm {
        read(&self.form).clone()
    }

    pub fn status(&self) -> FormStatus {
        self.status.get()
    }

    /// Edit form fields in place.
    pub fn update(&self, edit: impl FnOnce(&mut UploadForm)) {
        edit(&mut write(&self.form));
    }

    /// Changing the brand always clears the model.
    pub fn select_brand(&self, brand_id: &str) {
        let mut form = write(&self.form);
        form.brand_id = brand_id.to_string();
        form.model_id.clear();
    }

    /// Models offered for the selected brand.
    pub fn available_models(&self) -> Vec<CarModel> {
        let brand = read(&self.form).brand_id.clone();
        self.app.filters.reference().models_for_brand(&brand)
    }

    pub fn add_images(&self, images: impl IntoIterator<Item = ImageFile>) {
        write(&self.form).images.extend(images);
    }

    pub fn remove_image(&self, index: usize) {
        let mut form = write(&self.form);
        if index < form.images.len() {
            form.images.remove(index);
        }
    }

    /// Move an image; equal or out-of-range indices are ignored.
    pub fn reorder_images(&self, from: usize, to: usize) {
        let mut form = write(&self.form);
        let len = form.images.len();
        if from == to || from >= len || to >= len {
            return;
        }
        let moved = form.images.remove(from);
        form.images.insert(to, moved);
    }

    /// Validate, upload the images, then create the listing.
    ///
    /// Returns the new listing's id and opens its details page.
    pub async fn submit(&self) -> Result<String> {
        self.status.start();
        match self.try_submit().await {
            Ok(id) => {
                self.status.succeed(Some("Oglas je uspešno postavljen.".to_string()));
                *write(&self.form) = UploadForm::default();
                self.app
                    .navigator
                    .push(&AppRoute::CarDetails { id: id.clone() }.to_path());
                Ok(id)
            }
            Err(e) => {
                self.status.fail(e.user_message());
                Err(e)
            }
        }
    }

    async fn try_submit(&self) -> Result<String> {
        let form = self.form();
        let mut listing = form.to_listing()?;

        let user = self.app.require_user()?;
        let token = self.app.id_token().await?;

        listing.images = self.app.uploads.upload(&form.images).await?;
        listing.seller_id = user.uid;
        listing.created_at = now_rfc3339();

        let created: PushResponse = self
            .app
            .db
            .post(collections::CARS, &listing, Some(&token))
            .await?;
        tracing::info!(id = %created.name, images = listing.images.len(), "Listing created");
        Ok(created.name)
    }
}
