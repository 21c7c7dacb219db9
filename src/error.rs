//! Error types for Radar API calls.
//!
//! Every failure a caller can observe is a variant of [`Error`]. The variants
//! separate caller mistakes, transport failures, HTTP status failures and
//! contract violations in the response body, because the retry policy treats
//! each of those differently.

use http::StatusCode;

/// The main error type for Radar API calls.
///
/// # Examples
///
/// ```no_run
/// use radar_mapping_api::{Client, Error, ForwardGeocode};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().api_key("prj_live_sk_...").build()?;
///
/// match client.forward_geocode(&ForwardGeocode::new("841 Broadway")).await {
///     Ok(response) => println!("{} candidates", response.addresses.len()),
///     Err(e) if e.is_quota_exceeded() => eprintln!("Radar quota exhausted"),
///     Err(Error::SchemaValidation { serde_error, .. }) => {
///         eprintln!("Radar changed its response shape: {}", serde_error);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The caller violated a precondition of an operation (for example an
    /// empty query). Raised before anything is sent over the wire.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The server returned a non-2xx HTTP status code.
    ///
    /// A `402 Payment Required` means the account's quota is exhausted; see
    /// [`Error::is_quota_exceeded`].
    #[error("HTTP error {status}: {raw_response}")]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
    },

    /// The response body was not valid JSON.
    #[error("Failed to decode response (status {status}): {serde_error}")]
    DecodeFailed {
        /// The raw response body that failed to decode
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The response was JSON but did not match the expected response shape.
    ///
    /// Missing required fields and mistyped fields end up here. Unknown
    /// fields never do.
    #[error("Response does not match expected schema: {serde_error}")]
    SchemaValidation {
        /// The serde error message, including the offending field
        serde_error: String,
        /// The decoded JSON body, re-rendered as a string
        raw_response: String,
    },

    /// Invalid configuration was provided, such as an empty API key or an
    /// out-of-range timeout.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` for failures in the transport or HTTP layer: network
    /// errors, timeouts and non-2xx statuses.
    ///
    /// These are the only errors the default retry policy considers.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Timeout | Error::HttpError { .. }
        )
    }

    /// Returns `true` if Radar answered `402 Payment Required`, meaning the
    /// account's call allowance is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use radar_mapping_api::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::HttpError {
    ///     status: StatusCode::PAYMENT_REQUIRED,
    ///     raw_response: "quota exceeded".to_string(),
    /// };
    /// assert!(err.is_quota_exceeded());
    /// assert!(err.is_transport());
    /// ```
    pub fn is_quota_exceeded(&self) -> bool {
        self.status() == Some(StatusCode::PAYMENT_REQUIRED)
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::DecodeFailed { status, .. } => Some(*status),
            Error::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DecodeFailed { raw_response, .. } => Some(raw_response),
            Error::SchemaValidation { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for Radar API calls.
pub type Result<T> = std::result::Result<T, Error>;
