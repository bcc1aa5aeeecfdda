// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod filters;
pub mod listing;
pub mod reference;
pub mod user;

pub use filters::CarFilters;
pub use listing::{CarFeatures, Currency, Listing};
pub use reference::{BodyType, Brand, CarModel, Fuel, ReferenceData};
pub use user::{Role, UserProfile};
