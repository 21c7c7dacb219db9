//! Projection of Radar geocoding responses into [`NormalizedResult`].
//!
//! `NormalizedResult` is the provider-agnostic shape the rest of an
//! application should depend on; nothing in it refers to Radar's schema.

use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::models::{Address, GeocodeResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single geocoded location, independent of the provider that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub lat: f64,
    pub lon: f64,
    /// Street line, e.g. `841 Broadway`.
    pub address1: Option<String>,
    /// Unit or suite.
    pub address2: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub country_code: Option<String>,
    pub formatted_address: Option<String>,
}

/// What was looked up. Used for diagnostics and to pick the coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// Forward geocoding of a postal code.
    PostalCode {
        postal_code: &'a str,
        country: &'a str,
    },
    /// Reverse geocoding of a point.
    Coordinates { lat: f64, lon: f64 },
}

impl Lookup<'_> {
    fn subject(&self) -> &'static str {
        match self {
            Lookup::PostalCode { .. } => "postal code",
            Lookup::Coordinates { .. } => "coordinates",
        }
    }

    fn context(&self) -> Map<String, Value> {
        let mut context = Map::new();
        match *self {
            Lookup::PostalCode {
                postal_code,
                country,
            } => {
                context.insert("postal_code".into(), postal_code.into());
                context.insert("country".into(), country.into());
            }
            Lookup::Coordinates { lat, lon } => {
                context.insert("lat".into(), lat.into());
                context.insert("lon".into(), lon.into());
            }
        }
        context
    }
}

/// Collapses a geocoding response into at most one result.
///
/// No candidates: an info diagnostic, then `None`. Several candidates: a
/// warning diagnostic carrying the count, then the first (best-ranked)
/// candidate is used.
///
/// # Examples
///
/// ```
/// use radar_mapping_api::diagnostics::NoopSink;
/// use radar_mapping_api::models::GeocodeResponse;
/// use radar_mapping_api::normalize::{normalize, Lookup};
///
/// let response: GeocodeResponse = serde_json::from_str(
///     r#"{"meta": {"code": 200}, "addresses": []}"#,
/// ).unwrap();
///
/// let lookup = Lookup::PostalCode { postal_code: "00000", country: "US" };
/// assert_eq!(normalize(&response, lookup, &NoopSink), None);
/// ```
pub fn normalize(
    response: &GeocodeResponse,
    lookup: Lookup<'_>,
    sink: &dyn DiagnosticsSink,
) -> Option<NormalizedResult> {
    let count = response.addresses.len();

    let Some(address) = response.addresses.first() else {
        let mut diagnostic = Diagnostic::info(format!(
            "no geocoding results for {}",
            lookup.subject()
        ));
        diagnostic.extras = lookup.context();
        sink.capture(&diagnostic);
        return None;
    };

    if count > 1 {
        let mut diagnostic = Diagnostic::warning(format!(
            "Multiple geocoding results for {}",
            lookup.subject()
        ));
        diagnostic.extras = lookup.context();
        sink.capture(&diagnostic.with_extra("results", count));
    }

    let (lat, lon) = match lookup {
        Lookup::PostalCode { .. } => address
            .geometry
            .lon_lat()
            .map(|(lon, lat)| (lat, lon))
            .unwrap_or((address.latitude, address.longitude)),
        Lookup::Coordinates { lat, lon } => (lat, lon),
    };

    Some(from_address(address, lat, lon))
}

fn from_address(address: &Address, lat: f64, lon: f64) -> NormalizedResult {
    let address1 = match (&address.number, &address.street) {
        (Some(number), Some(street)) => Some(format!("{number} {street}")),
        (None, Some(street)) => Some(street.clone()),
        _ => None,
    };

    NormalizedResult {
        lat,
        lon,
        address1,
        address2: address.unit.clone(),
        postal_code: address.postal_code.clone(),
        city: address.city.clone(),
        state_code: address.state_code.clone(),
        country_code: Some(address.country_code.clone()).filter(|c| !c.is_empty()),
        formatted_address: Some(address.formatted_address.clone()).filter(|f| !f.is_empty()),
    }
}
