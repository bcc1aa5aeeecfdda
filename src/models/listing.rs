// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Car listing model as stored in the `cars` collection.

use serde::{Deserialize, Deserializer, Serialize};

use crate::db::Document;

/// Price currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "RSD")]
    Rsd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Rsd => "RSD",
        }
    }

    /// Parse a form value; anything unknown is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "EUR" => Some(Currency::Eur),
            "RSD" => Some(Currency::Rsd),
            _ => None,
        }
    }
}

/// Financing and warranty flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarFeatures {
    pub is_credit: bool,
    pub is_leasing: bool,
    pub has_warranty: bool,
}

/// A single car advertisement.
///
/// Every field is defaulted on read: documents in the store are schemaless and
/// older ads may miss fields added later.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Listing {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub seller_id: String,
    pub title: String,
    pub brand_id: String,
    pub model_id: String,
    pub price: f64,
    pub currency: Currency,
    #[serde(deserialize_with = "lenient_number")]
    pub year: f64,
    /// Fuel type identifier
    pub fuel: String,
    /// Engine displacement in cm³
    #[serde(deserialize_with = "lenient_number")]
    pub engine_displacement: f64,
    /// Engine power in kW
    #[serde(
        rename = "engineType",
        alias = "enginePower",
        deserialize_with = "lenient_number"
    )]
    pub engine_power: f64,
    /// Body type identifier
    pub body_type: String,
    #[serde(deserialize_with = "lenient_number")]
    pub mileage: f64,
    pub description: String,
    #[serde(rename = "noOwners", deserialize_with = "lenient_number")]
    pub owner_count: f64,
    pub images: Vec<String>,
    pub features: CarFeatures,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl Document for Listing {}

/// Accept any JSON number, or a string holding one. Blank strings read as 0.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(0.0),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl Listing {
    /// First image, if the ad has any.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str).filter(|s| !s.is_empty())
    }

    /// Price with German-style digit grouping, e.g. `18.500` or `1.234,5`.
    pub fn formatted_price(&self) -> String {
        format_price(self.price)
    }

    /// Route to this listing's details page.
    pub fn href(&self) -> String {
        format!("/oglas/{}", self.id)
    }
}

/// Format a number the way the `de-DE` locale does (max three fraction digits).
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let negative = value < 0.0;
    let scaled = (value.abs() * 1000.0).round() as u64;
    let integer = scaled / 1000;
    let fraction = scaled % 1000;

    let digits = integer.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if fraction > 0 {
        let frac = format!("{fraction:03}");
        grouped.push(',');
        grouped.push_str(frac.trim_end_matches('0'));
    }

    if negative && (integer > 0 || fraction > 0) {
        format!("-{grouped}")
    } else {
        grouped
    }
}
