// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reference entities used to resolve listing identifiers to display names.

use serde::{Deserialize, Serialize};

use crate::db::Document;

/// Car brand (`brands` collection).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Car model (`models` collection); belongs to exactly one brand.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarModel {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub name: String,
}

/// Fuel type (`fuels` collection).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fuel {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Body type (`bodytypes` collection).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyType {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

impl Document for Brand {}
impl Document for CarModel {}
impl Document for Fuel {}
impl Document for BodyType {}

/// All four lookup tables, fetched and cached together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    pub brands: Vec<Brand>,
    pub models: Vec<CarModel>,
    pub fuels: Vec<Fuel>,
    pub body_types: Vec<BodyType>,
}

impl ReferenceData {
    /// True once every table holds at least one entry.
    pub fn is_complete(&self) -> bool {
        !self.brands.is_empty()
            && !self.models.is_empty()
            && !self.fuels.is_empty()
            && !self.body_types.is_empty()
    }

    pub fn brand_name<'a>(&'a self, id: &'a str) -> &'a str {
        resolve(self.brands.iter().map(|b| (&b.id, &b.name)), id)
    }

    pub fn model_name<'a>(&'a self, id: &'a str) -> &'a str {
        resolve(self.models.iter().map(|m| (&m.id, &m.name)), id)
    }

    pub fn fuel_name<'a>(&'a self, id: &'a str) -> &'a str {
        resolve(self.fuels.iter().map(|f| (&f.id, &f.name)), id)
    }

    pub fn body_type_name<'a>(&'a self, id: &'a str) -> &'a str {
        resolve(self.body_types.iter().map(|b| (&b.id, &b.name)), id)
    }

    /// Models of the given brand; all models when no brand is selected.
    pub fn models_for_brand(&self, brand_id: &str) -> Vec<CarModel> {
        if brand_id.is_empty() {
            return self.models.clone();
        }
        self.models
            .iter()
            .filter(|m| m.brand_id == brand_id)
            .cloned()
            .collect()
    }
}

/// Look up a display name, falling back to the raw identifier.
fn resolve<'a>(
    mut entries: impl Iterator<Item = (&'a String, &'a String)>,
    id: &'a str,
) -> &'a str {
    if id.is_empty() {
        return "";
    }
    entries
        .find(|(entry_id, _)| entry_id.as_str() == id)
        .map(|(_, name)| name.as_str())
        .unwrap_or(id)
}
