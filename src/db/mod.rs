// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (schemaless document store over REST).

pub mod realtime;

pub use realtime::{normalize_record, normalize_records, Document, PushResponse, RealtimeDb};

/// Collection names as constants.
pub mod collections {
    pub const CARS: &str = "cars";
    pub const BRANDS: &str = "brands";
    pub const MODELS: &str = "models";
    pub const FUELS: &str = "fuels";
    pub const BODY_TYPES: &str = "bodytypes";
    pub const USERS: &str = "users";

    /// Path of a single document in a collection.
    pub fn doc(collection: &str, id: &str) -> String {
        format!("{}/{}", collection, urlencoding::encode(id))
    }
}
