//! # radar-mapping-api - a typed client for the Radar geocoding API
//!
//! Forward and reverse geocoding, place search, autocomplete and address
//! validation against [Radar](https://radar.com), with typed responses and
//! retries on transient failures.
//!
//! ## Quick Start
//!
//! ```no_run
//! use radar_mapping_api::{
//!     Client, EnvCredentials, ForwardGeocode, SearchPlaces, DEFAULT_REVERSE_LAYERS,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), radar_mapping_api::Error> {
//!     // Reads RADAR_API_KEY
//!     let client = Client::builder()
//!         .credentials(EnvCredentials::default())
//!         .build()?;
//!
//!     let response = client
//!         .forward_geocode(&ForwardGeocode::new("841 Broadway, New York, NY"))
//!         .await?;
//!     for address in &response.addresses {
//!         println!("{} ({})", address.formatted_address, address.layer);
//!     }
//!
//!     let coffee = client
//!         .search_places(&SearchPlaces::near("40.7342,-73.9912").chains("starbucks").limit(5))
//!         .await?;
//!     println!("{} nearby", coffee.places.len());
//!
//!     // Provider-agnostic shape, or None when nothing matched
//!     let here = client
//!         .normalize_by_coordinates(40.7342, -73.9912, DEFAULT_REVERSE_LAYERS)
//!         .await?;
//!     println!("{:?}", here);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Retries
//!
//! Every request goes through a [`RetryPolicy`]: by default up to six
//! attempts with exponential backoff (1s, 2s, 4s, 8s, 16s, capped at 32s).
//! All transport and HTTP failures are retried except `402 Payment
//! Required`, which Radar uses for an exhausted quota and which fails
//! immediately. Swap in [`retry::RetryOnTransient`] to retry only timeouts,
//! connection failures, 429 and 5xx:
//!
//! ```no_run
//! use radar_mapping_api::{Client, retry::RetryOnTransient};
//!
//! # fn example() -> Result<(), radar_mapping_api::Error> {
//! let client = Client::builder()
//!     .api_key("prj_live_sk_...")
//!     .retry_predicate(Box::new(RetryOnTransient))
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! When retries run out the last error is returned unchanged.
//!
//! ## Errors
//!
//! Missing required inputs fail with [`Error::InvalidArgument`] before any
//! request is made. A response that is valid JSON but does not have the
//! expected shape fails with [`Error::SchemaValidation`] and is never
//! retried.

mod client;
pub mod credentials;
pub mod diagnostics;
mod error;
pub mod models;
pub mod normalize;
pub mod request;
pub mod retry;

pub use client::{
    Client, ClientBuilder, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_COUNTRY,
    DEFAULT_REVERSE_LAYERS, DEFAULT_TIMEOUT,
};
pub use credentials::{ApiKey, CredentialProvider, EnvCredentials};
pub use diagnostics::{Diagnostic, DiagnosticsSink, Severity};
pub use error::{Error, Result};
pub use models::{
    Address, Chain, GeocodeResponse, Geometry, Meta, Place, SearchPlacesResponse, TimeZone,
    ValidateAddressResponse,
};
pub use normalize::NormalizedResult;
pub use request::{
    Autocomplete, Endpoint, ForwardGeocode, QueryParams, ReverseGeocode, SearchPlaces,
    ValidateAddress,
};
pub use retry::{RetryPolicy, RetryPredicate, RetryStrategy};
