pub mod collector;
pub mod resolver;
pub mod shortener;

use std::time::Duration;

/// Build the HTTP client shared by every upstream call. The timeouts bound
/// how long a stuck upstream can hold a handler.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("HTTP client configuration is valid")
}

/// Failure talking to one of the upstream services.
#[derive(Debug)]
pub enum UpstreamError {
    /// The request failed, timed out, or its body didn't decode.
    Request(reqwest::Error),
    /// The service answered, but what it calls a URL does not parse as one.
    BadUrl(url::ParseError),
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::Request(e) => write!(f, "upstream request failed: {e}"),
            UpstreamError::BadUrl(e) => write!(f, "upstream returned an invalid URL: {e}"),
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamError::Request(e) => Some(e),
            UpstreamError::BadUrl(e) => Some(e),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::Request(e)
    }
}

impl From<url::ParseError> for UpstreamError {
    fn from(e: url::ParseError) -> Self {
        UpstreamError::BadUrl(e)
    }
}
