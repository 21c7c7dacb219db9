//! Request parameters for each Radar endpoint.
//!
//! Every operation has a parameter struct with a constructor for its required
//! input and chainable setters for the optional ones. [`Endpoint::to_query`]
//! validates the inputs and flattens them into [`QueryParams`]; optional
//! inputs that are absent or empty never reach the wire.

use crate::models::{GeocodeResponse, SearchPlacesResponse, ValidateAddressResponse};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Radar's default and maximum place-search radius, in meters.
pub const DEFAULT_SEARCH_RADIUS: u32 = 10_000;

/// Ordered query parameters for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter unconditionally.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Appends a parameter only when `value` is present and not empty.
    pub fn push_opt(&mut self, key: impl Into<String>, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.push(key, value);
        }
        self
    }

    /// Returns the value of the first parameter named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A Radar operation: where it lives, what it sends, and what comes back.
pub trait Endpoint {
    /// Path relative to the API base URL.
    const PATH: &'static str;

    /// The typed response body.
    type Response: DeserializeOwned;

    /// Validates the inputs and builds the query string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when a required input is missing.
    fn to_query(&self) -> Result<QueryParams>;
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(message.to_string()));
    }
    Ok(())
}

/// Renders a chain-metadata value the way Radar expects it in a query string.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Forward geocoding: address or place name to coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForwardGeocode {
    pub query: String,
    /// Comma-separated layer filters, e.g. `address,locality`.
    pub layers: Option<String>,
    /// Comma-separated 2-letter country codes, e.g. `US,CA`.
    pub country: Option<String>,
    pub lang: Option<String>,
}

impl ForwardGeocode {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn layers(mut self, layers: impl Into<String>) -> Self {
        self.layers = Some(layers.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

impl Endpoint for ForwardGeocode {
    const PATH: &'static str = "geocode/forward";
    type Response = GeocodeResponse;

    fn to_query(&self) -> Result<QueryParams> {
        require(&self.query, "query is required")?;

        let mut params = QueryParams::new();
        params
            .push("query", self.query.as_str())
            .push_opt("layers", self.layers.as_deref())
            .push_opt("country", self.country.as_deref())
            .push_opt("lang", self.lang.as_deref());
        Ok(params)
    }
}

/// Reverse geocoding: coordinates to address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReverseGeocode {
    /// `"lat,lon"`.
    pub coordinates: String,
    pub layers: Option<String>,
    pub lang: Option<String>,
}

impl ReverseGeocode {
    pub fn new(coordinates: impl Into<String>) -> Self {
        Self {
            coordinates: coordinates.into(),
            ..Self::default()
        }
    }

    /// Builds the `"lat,lon"` coordinate string from numbers.
    pub fn at(lat: f64, lon: f64) -> Self {
        Self::new(format!("{lat},{lon}"))
    }

    pub fn layers(mut self, layers: impl Into<String>) -> Self {
        self.layers = Some(layers.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

impl Endpoint for ReverseGeocode {
    const PATH: &'static str = "geocode/reverse";
    type Response = GeocodeResponse;

    fn to_query(&self) -> Result<QueryParams> {
        require(&self.coordinates, "coordinates are required")?;

        let mut params = QueryParams::new();
        params
            .push("coordinates", self.coordinates.as_str())
            .push_opt("layers", self.layers.as_deref())
            .push_opt("lang", self.lang.as_deref());
        Ok(params)
    }
}

/// Place search near a point or an airport.
///
/// One of `near` or `iata_code` must be set.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlaces {
    /// `"lat,lon"`.
    pub near: Option<String>,
    /// Comma-separated chain slugs.
    pub chains: Option<String>,
    /// Comma-separated category filters.
    pub categories: Option<String>,
    /// 3-letter airport code; usable instead of `near`.
    pub iata_code: Option<String>,
    /// Sent as one `chainMetadata[key]=value` parameter per entry.
    pub chain_metadata: Option<Map<String, Value>>,
    /// Search radius in meters. Radar accepts 1 to 10000; not checked locally.
    pub radius: Option<u32>,
    pub limit: Option<u32>,
}

impl Default for SearchPlaces {
    fn default() -> Self {
        Self {
            near: None,
            chains: None,
            categories: None,
            iata_code: None,
            chain_metadata: None,
            radius: Some(DEFAULT_SEARCH_RADIUS),
            limit: None,
        }
    }
}

impl SearchPlaces {
    /// Searches around a `"lat,lon"` point.
    pub fn near(near: impl Into<String>) -> Self {
        Self {
            near: Some(near.into()),
            ..Self::default()
        }
    }

    /// Searches at an airport.
    pub fn iata_code(iata_code: impl Into<String>) -> Self {
        Self {
            iata_code: Some(iata_code.into()),
            ..Self::default()
        }
    }

    pub fn chains(mut self, chains: impl Into<String>) -> Self {
        self.chains = Some(chains.into());
        self
    }

    pub fn categories(mut self, categories: impl Into<String>) -> Self {
        self.categories = Some(categories.into());
        self
    }

    pub fn chain_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.chain_metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Endpoint for SearchPlaces {
    const PATH: &'static str = "search/places";
    type Response = SearchPlacesResponse;

    fn to_query(&self) -> Result<QueryParams> {
        let has_near = self.near.as_deref().is_some_and(|n| !n.is_empty());
        let has_iata = self.iata_code.as_deref().is_some_and(|c| !c.is_empty());
        if !has_near && !has_iata {
            return Err(Error::InvalidArgument(
                "either near or iata_code must be provided".to_string(),
            ));
        }

        let mut params = QueryParams::new();
        params
            .push_opt("near", self.near.as_deref())
            .push_opt("chains", self.chains.as_deref())
            .push_opt("categories", self.categories.as_deref())
            .push_opt("iataCode", self.iata_code.as_deref());

        // Zero means "unset" for both, matching how Radar treats them.
        if let Some(radius) = self.radius.filter(|r| *r > 0) {
            params.push("radius", radius.to_string());
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            params.push("limit", limit.to_string());
        }

        for (key, value) in self.chain_metadata.iter().flatten() {
            params.push(format!("chainMetadata[{key}]"), stringify(value));
        }

        Ok(params)
    }
}

/// Autocomplete for partial addresses and place names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Autocomplete {
    pub query: String,
    /// `"lat,lon"` used to bias results.
    pub near: Option<String>,
    pub layers: Option<String>,
    pub limit: Option<u32>,
    /// Comma-separated 2-letter country codes.
    pub country_code: Option<String>,
    pub lang: Option<String>,
}

impl Autocomplete {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn near(mut self, near: impl Into<String>) -> Self {
        self.near = Some(near.into());
        self
    }

    pub fn layers(mut self, layers: impl Into<String>) -> Self {
        self.layers = Some(layers.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

impl Endpoint for Autocomplete {
    const PATH: &'static str = "search/autocomplete";
    type Response = GeocodeResponse;

    fn to_query(&self) -> Result<QueryParams> {
        require(&self.query, "query is required")?;

        let mut params = QueryParams::new();
        params
            .push("query", self.query.as_str())
            .push_opt("near", self.near.as_deref())
            .push_opt("layers", self.layers.as_deref());
        if let Some(limit) = self.limit {
            params.push("limit", limit.to_string());
        }
        params
            .push_opt("countryCode", self.country_code.as_deref())
            .push_opt("lang", self.lang.as_deref());
        Ok(params)
    }
}

/// Structured address validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidateAddress {
    /// Street line, e.g. `841 Broadway`. Always sent, even when empty.
    pub address_label: String,
    pub city: Option<String>,
    /// Two-letter state or region code.
    pub state_code: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
    /// Apartment, suite or unit.
    pub unit: Option<String>,
}

impl ValidateAddress {
    pub fn new(address_label: impl Into<String>) -> Self {
        Self {
            address_label: address_label.into(),
            ..Self::default()
        }
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn state_code(mut self, state_code: impl Into<String>) -> Self {
        self.state_code = Some(state_code.into());
        self
    }

    pub fn postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

impl Endpoint for ValidateAddress {
    const PATH: &'static str = "addresses/validate";
    type Response = ValidateAddressResponse;

    fn to_query(&self) -> Result<QueryParams> {
        let mut params = QueryParams::new();
        params
            .push("addressLabel", self.address_label.as_str())
            .push_opt("city", self.city.as_deref())
            .push_opt("stateCode", self.state_code.as_deref())
            .push_opt("postalCode", self.postal_code.as_deref())
            .push_opt("countryCode", self.country_code.as_deref())
            .push_opt("unit", self.unit.as_deref());
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(params: &QueryParams) -> Vec<&str> {
        params.iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_forward_geocode_requires_query() {
        let err = ForwardGeocode::new("").to_query().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_forward_geocode_omits_absent_and_empty_options() {
        let params = ForwardGeocode::new("New York")
            .country("")
            .lang("en")
            .to_query()
            .unwrap();

        assert_eq!(keys(&params), vec!["query", "lang"]);
        assert_eq!(params.get("query"), Some("New York"));
    }

    #[test]
    fn test_reverse_geocode_from_numbers() {
        let params = ReverseGeocode::at(40.7342, -73.9912)
            .layers("postalCode,locality,state")
            .to_query()
            .unwrap();

        assert_eq!(params.get("coordinates"), Some("40.7342,-73.9912"));
        assert_eq!(params.get("layers"), Some("postalCode,locality,state"));
        assert_eq!(params.get("lang"), None);
    }

    #[test]
    fn test_reverse_geocode_requires_coordinates() {
        let err = ReverseGeocode::new("").to_query().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_search_places_requires_near_or_iata() {
        let err = SearchPlaces::default().to_query().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = SearchPlaces::near("").to_query().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let params = SearchPlaces::iata_code("JFK").to_query().unwrap();
        assert_eq!(params.get("iataCode"), Some("JFK"));
        assert_eq!(params.get("near"), None);
    }

    #[test]
    fn test_search_places_defaults_radius() {
        let params = SearchPlaces::near("40.7342,-73.9912").to_query().unwrap();

        assert_eq!(keys(&params), vec!["near", "radius"]);
        assert_eq!(params.get("radius"), Some("10000"));
    }

    #[test]
    fn test_search_places_zero_radius_and_limit_are_omitted() {
        let params = SearchPlaces::near("40.7342,-73.9912")
            .radius(0)
            .limit(0)
            .to_query()
            .unwrap();

        assert_eq!(keys(&params), vec!["near"]);
    }

    #[test]
    fn test_search_places_flattens_chain_metadata() {
        let params = SearchPlaces::near("40.7342,-73.9912")
            .chains("starbucks")
            .chain_metadata("offers", true)
            .chain_metadata("tier", "gold")
            .chain_metadata("rank", json!(3))
            .limit(5)
            .to_query()
            .unwrap();

        assert_eq!(params.get("chains"), Some("starbucks"));
        assert_eq!(params.get("limit"), Some("5"));
        assert_eq!(params.get("chainMetadata[offers]"), Some("true"));
        assert_eq!(params.get("chainMetadata[tier]"), Some("gold"));
        assert_eq!(params.get("chainMetadata[rank]"), Some("3"));
    }

    #[test]
    fn test_autocomplete_sends_zero_limit() {
        let params = Autocomplete::new("841 Broadw")
            .limit(0)
            .country_code("US")
            .to_query()
            .unwrap();

        assert_eq!(keys(&params), vec!["query", "limit", "countryCode"]);
        assert_eq!(params.get("limit"), Some("0"));
    }

    #[test]
    fn test_autocomplete_requires_query() {
        let err = Autocomplete::new("").near("1,2").to_query().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_validate_address_always_sends_label() {
        let params = ValidateAddress::new("").to_query().unwrap();
        assert_eq!(keys(&params), vec!["addressLabel"]);

        let params = ValidateAddress::new("841 Broadway")
            .city("New York")
            .state_code("NY")
            .postal_code("10003")
            .country_code("US")
            .unit("4B")
            .to_query()
            .unwrap();
        assert_eq!(
            keys(&params),
            vec![
                "addressLabel",
                "city",
                "stateCode",
                "postalCode",
                "countryCode",
                "unit"
            ]
        );
    }
}
