//! Response bodies returned by the Radar API.
//!
//! Field names follow Rust conventions and are renamed to Radar's camelCase
//! on the wire. Required fields are plain types, so a response missing one of
//! them fails to deserialize; optional fields are `Option` and stay `None`
//! when Radar leaves them out. Unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// GeoJSON geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Geometry type, e.g. `Point`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Coordinates in GeoJSON order: longitude first, then latitude.
    pub coordinates: Vec<f64>,
}

impl Geometry {
    /// Returns `(longitude, latitude)` when the geometry carries at least two
    /// coordinates.
    pub fn lon_lat(&self) -> Option<(f64, f64)> {
        match self.coordinates.as_slice() {
            [lon, lat, ..] => Some((*lon, *lat)),
            _ => None,
        }
    }
}

/// Time zone of a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeZone {
    /// IANA identifier, e.g. `America/New_York`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub code: String,
    /// Local time at the location when the request was served.
    pub current_time: String,
    /// Offset from UTC in seconds.
    pub utc_offset: i64,
    /// Daylight saving offset in seconds.
    pub dst_offset: i64,
}

/// A geocoded address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub latitude: f64,
    pub longitude: f64,
    pub geometry: Geometry,
    pub country: String,
    pub country_code: String,
    /// Granularity of the match, e.g. `address`, `postalCode`, `locality`.
    pub layer: String,
    pub formatted_address: String,
    pub address_label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<TimeZone>,
    /// Distance in meters from the `near` point, when one was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Match confidence: `exact`, `interpolated` or `fallback`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borough: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    /// House number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Response metadata; `code` mirrors the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub code: u16,
}

/// Body of `geocode/forward`, `geocode/reverse` and `search/autocomplete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub meta: Meta,
    /// Candidates, best match first.
    pub addresses: Vec<Address>,
}

/// The brand a place belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// A point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub categories: Vec<String>,
    pub location: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<Chain>,
}

/// Body of `search/places`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPlacesResponse {
    pub meta: Meta,
    pub places: Vec<Place>,
}

/// Body of `addresses/validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateAddressResponse {
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Verification details; passed through without interpretation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
}
