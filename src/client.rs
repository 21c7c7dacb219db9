//! Radar API client with retry logic and typed responses.
//!
//! The [`Client`] type is the main entry point. Use [`ClientBuilder`] to
//! configure and create clients.

use crate::{
    credentials::{ApiKey, CredentialProvider, EnvCredentials},
    diagnostics::{DiagnosticsSink, TracingSink},
    models::{GeocodeResponse, SearchPlacesResponse, ValidateAddressResponse},
    normalize::{normalize, Lookup, NormalizedResult},
    request::{
        Autocomplete, Endpoint, ForwardGeocode, QueryParams, ReverseGeocode, SearchPlaces,
        ValidateAddress,
    },
    retry::{RetryPolicy, RetryPredicate, RetryStrategy, RetryUnlessQuotaExceeded},
    Error, Result,
};
use http::header::AUTHORIZATION;
use http::HeaderValue;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Radar's v1 API root.
pub const DEFAULT_BASE_URL: &str = "https://api.radar.io/v1/";

/// Environment variable read by [`ClientBuilder::from_env`] to override the base URL.
pub const BASE_URL_ENV: &str = "RADAR_BASE_URL";

/// Per-request timeout used unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const MIN_TIMEOUT: Duration = Duration::from_secs(1);
const MAX_TIMEOUT: Duration = Duration::from_secs(300);

/// Country used by postal-code lookups when the caller has no better answer.
pub const DEFAULT_COUNTRY: &str = "US";

/// Layers requested by coordinate lookups by default.
pub const DEFAULT_REVERSE_LAYERS: &str = "postalCode,locality,state";

/// A client for the Radar geocoding and places API.
///
/// Cloning is cheap and clones share the connection pool, so one client can
/// be built at startup and handed to every task that needs it.
///
/// # Examples
///
/// ```no_run
/// use radar_mapping_api::{Client, ForwardGeocode, DEFAULT_COUNTRY};
///
/// # async fn example() -> Result<(), radar_mapping_api::Error> {
/// let client = Client::builder()
///     .api_key("prj_live_sk_...")
///     .build()?;
///
/// let response = client
///     .forward_geocode(&ForwardGeocode::new("841 Broadway, New York").country("US"))
///     .await?;
/// if let Some(best) = response.addresses.first() {
///     println!("{} -> {:?}", best.formatted_address, best.geometry.coordinates);
/// }
///
/// let normalized = client.normalize_by_postal_code("10003", DEFAULT_COUNTRY).await?;
/// println!("{:?}", normalized);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    authorization: HeaderValue,
    retry_policy: RetryPolicy,
    timeout: Duration,
    diagnostics: Arc<dyn DiagnosticsSink>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The base URL every path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Issues an authenticated GET and returns the decoded JSON body.
    ///
    /// The request is retried according to the client's [`RetryPolicy`].
    /// When retries run out, the error from the last attempt is returned.
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] or [`Error::Timeout`] for transport failures
    /// - [`Error::HttpError`] for non-2xx responses
    /// - [`Error::DecodeFailed`] if the body is not JSON
    pub async fn request(&self, path: &str, params: &QueryParams) -> Result<Value> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }

        self.inner
            .retry_policy
            .run(|attempt| self.execute_request(&url, attempt))
            .await
    }

    /// Validates and sends a request for any [`Endpoint`].
    ///
    /// Invalid inputs are rejected before anything goes over the wire.
    /// A body that does not match `E::Response` fails with
    /// [`Error::SchemaValidation`] and is not retried.
    pub async fn send<E: Endpoint>(&self, endpoint: &E) -> Result<E::Response> {
        let params = endpoint.to_query()?;
        let body = self.request(E::PATH, &params).await?;
        validate(&body)
    }

    /// Executes a single request attempt.
    async fn execute_request(&self, url: &Url, attempt: usize) -> Result<Value> {
        tracing::debug!(
            method = "GET",
            url = %url,
            attempt = attempt,
            "Executing HTTP request"
        );

        let start_time = Instant::now();
        let response = self
            .inner
            .http_client
            .get(url.clone())
            .header(AUTHORIZATION, self.inner.authorization.clone())
            .timeout(self.inner.timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        tracing::info!(
            status = status.as_u16(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            attempt = attempt,
            "Received HTTP response"
        );

        let raw_body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            if status.is_client_error() {
                tracing::error!(
                    status = status.as_u16(),
                    response = %raw_body,
                    "Client error (4xx)"
                );
            } else {
                tracing::warn!(
                    status = status.as_u16(),
                    response = %raw_body,
                    "Server error"
                );
            }

            return Err(Error::HttpError {
                status,
                raw_response: raw_body,
            });
        }

        serde_json::from_str(&raw_body).map_err(|e| {
            tracing::error!(
                error = %e,
                raw_response = %raw_body,
                "Failed to decode response body"
            );

            Error::DecodeFailed {
                serde_error: e.to_string(),
                raw_response: raw_body,
                status,
            }
        })
    }

    /// Converts an address or place name into coordinates.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the query is empty, plus everything
    /// [`Client::send`] can return.
    pub async fn forward_geocode(&self, params: &ForwardGeocode) -> Result<GeocodeResponse> {
        self.send(params).await
    }

    /// Converts `"lat,lon"` coordinates into addresses.
    pub async fn reverse_geocode(&self, params: &ReverseGeocode) -> Result<GeocodeResponse> {
        self.send(params).await
    }

    /// Searches for places near a point or at an airport.
    pub async fn search_places(&self, params: &SearchPlaces) -> Result<SearchPlacesResponse> {
        self.send(params).await
    }

    /// Completes partial addresses and place names.
    pub async fn autocomplete(&self, params: &Autocomplete) -> Result<GeocodeResponse> {
        self.send(params).await
    }

    /// Validates and normalizes a structured address.
    pub async fn validate_address(
        &self,
        params: &ValidateAddress,
    ) -> Result<ValidateAddressResponse> {
        self.send(params).await
    }

    /// Geocodes a postal code into a [`NormalizedResult`].
    ///
    /// Returns `Ok(None)` when Radar has no match. Coordinates come from the
    /// best candidate's geometry.
    pub async fn normalize_by_postal_code(
        &self,
        postal_code: &str,
        country: &str,
    ) -> Result<Option<NormalizedResult>> {
        let params = ForwardGeocode::new(postal_code).country(country);
        let response = self.forward_geocode(&params).await?;

        Ok(normalize(
            &response,
            Lookup::PostalCode {
                postal_code,
                country,
            },
            self.inner.diagnostics.as_ref(),
        ))
    }

    /// Reverse geocodes a point into a [`NormalizedResult`].
    ///
    /// Returns `Ok(None)` when Radar has no match. The result reports the
    /// point that was asked about.
    pub async fn normalize_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
        layers: &str,
    ) -> Result<Option<NormalizedResult>> {
        let params = ReverseGeocode::at(lat, lon).layers(layers);
        let response = self.reverse_geocode(&params).await?;

        Ok(normalize(
            &response,
            Lookup::Coordinates { lat, lon },
            self.inner.diagnostics.as_ref(),
        ))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .field("retry_policy", &self.inner.retry_policy)
            .finish_non_exhaustive()
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout
    } else {
        Error::Network(e)
    }
}

fn validate<T: DeserializeOwned>(body: &Value) -> Result<T> {
    T::deserialize(body).map_err(|e| {
        tracing::error!(error = %e, "Response does not match expected schema");

        Error::SchemaValidation {
            serde_error: e.to_string(),
            raw_response: body.to_string(),
        }
    })
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use radar_mapping_api::{ClientBuilder, RetryStrategy};
/// use radar_mapping_api::retry::RetryOnTransient;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), radar_mapping_api::Error> {
/// let client = ClientBuilder::from_env()?
///     .timeout(Duration::from_secs(10))
///     .retry_predicate(Box::new(RetryOnTransient))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    credentials: Option<Box<dyn CredentialProvider>>,
    retry_strategy: RetryStrategy,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
    timeout: Duration,
    user_agent: Option<String>,
    diagnostics: Option<Arc<dyn DiagnosticsSink>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            credentials: None,
            retry_strategy: RetryStrategy::default(),
            retry_predicate: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            diagnostics: None,
        }
    }

    /// Creates a builder that reads the API key from `RADAR_API_KEY` and,
    /// if set, the base URL from `RADAR_BASE_URL`.
    ///
    /// The key itself is read in [`ClientBuilder::build`].
    ///
    /// # Errors
    ///
    /// Returns an error if `RADAR_BASE_URL` is set but not a valid URL.
    pub fn from_env() -> Result<Self> {
        let builder = Self::new().credentials(EnvCredentials::default());
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.is_empty() => builder.base_url(url),
            _ => Ok(builder),
        }
    }

    /// Sets the base URL for all requests. Defaults to [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let mut url = Url::parse(url.as_ref())?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Uses a fixed API key.
    pub fn api_key(self, key: impl Into<String>) -> Self {
        self.credentials(key.into())
    }

    /// Sets where the API key comes from. The provider is asked once, in
    /// [`ClientBuilder::build`].
    pub fn credentials(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.credentials = Some(Box::new(provider));
        self
    }

    /// Sets the retry strategy for failed requests.
    pub fn retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Sets a custom retry predicate.
    ///
    /// By default every transport and HTTP failure except a 402 is retried
    /// (see [`RetryUnlessQuotaExceeded`]).
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Sets the per-request timeout. Must be between 1 second and 5 minutes.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets where normalization diagnostics go. Defaults to [`TracingSink`].
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if no API key was configured,
    /// the key is empty or not a valid header value, or the timeout is out
    /// of range.
    pub fn build(self) -> Result<Client> {
        let provider = self
            .credentials
            .ok_or_else(|| Error::ConfigurationError("API key must be provided".to_string()))?;
        let api_key: ApiKey = provider.api_key()?;

        let mut authorization = HeaderValue::from_str(api_key.expose()).map_err(|e| {
            Error::ConfigurationError(format!("Invalid API key header value: {}", e))
        })?;
        authorization.set_sensitive(true);

        if !(MIN_TIMEOUT..=MAX_TIMEOUT).contains(&self.timeout) {
            return Err(Error::ConfigurationError(format!(
                "Timeout must be between {:?} and {:?}, got {:?}",
                MIN_TIMEOUT, MAX_TIMEOUT, self.timeout
            )));
        }

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("radar-mapping-api/", env!("CARGO_PKG_VERSION")).to_string());

        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        let retry_predicate = self
            .retry_predicate
            .unwrap_or_else(|| Box::new(RetryUnlessQuotaExceeded));

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                authorization,
                retry_policy: RetryPolicy::new(self.retry_strategy, retry_predicate),
                timeout: self.timeout,
                diagnostics: self.diagnostics.unwrap_or_else(|| Arc::new(TracingSink)),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
