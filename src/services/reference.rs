// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cache-once loading of the reference lists.

use crate::db::{collections, RealtimeDb};
use crate::error::Result;
use crate::models::{BodyType, Brand, CarModel, Fuel, ReferenceData};
use crate::services::supersede::FetchTicket;
use crate::stores::FilterStore;

/// Fetch all four reference collections concurrently.
pub async fn fetch_reference_data(db: &RealtimeDb) -> Result<ReferenceData> {
    let (brands, models, fuels, body_types) = tokio::try_join!(
        db.list::<Brand>(collections::BRANDS, None),
        db.list::<CarModel>(collections::MODELS, None),
        db.list::<Fuel>(collections::FUELS, None),
        db.list::<BodyType>(collections::BODY_TYPES, None),
    )?;

    Ok(ReferenceData {
        brands,
        models,
        fuels,
        body_types,
    })
}

/// Populate the filter store's reference lists unless they are all present.
///
/// Failures are logged and swallowed; views fall back to raw identifiers.
/// A result arriving after `ticket` was superseded is dropped. Returns whether
/// the lists are complete afterwards.
pub async fn ensure_reference_data(
    db: &RealtimeDb,
    filters: &FilterStore,
    ticket: Option<&FetchTicket>,
) -> bool {
    if filters.has_reference_data() {
        return true;
    }

    let result = fetch_reference_data(db).await;
    if ticket.is_some_and(FetchTicket::is_cancelled) {
        tracing::debug!("Reference data fetch superseded");
        return filters.has_reference_data();
    }

    match result {
        Ok(reference) => {
            tracing::debug!(
                brands = reference.brands.len(),
                models = reference.models.len(),
                fuels = reference.fuels.len(),
                body_types = reference.body_types.len(),
                "Reference data loaded"
            );
            filters.set_reference_data(reference);
            filters.has_reference_data()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load reference data");
            false
        }
    }
}
