use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{ApiEnvelope, CategoryRecord, GigRecord};
use crate::retry::{is_retryable_status, with_retry, RetryConfig};

const USER_AGENT: &str = concat!("GigScout/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum MarketApiError {
    #[error("Server returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API reported failure: {0}")]
    Rejected(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl MarketApiError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            MarketApiError::RateLimitExceeded => true,
            MarketApiError::Status { status, .. } => reqwest::StatusCode::from_u16(*status)
                .map(is_retryable_status)
                .unwrap_or(false),
            MarketApiError::NetworkError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MarketApiError>;

/// Thin client over the marketplace REST API
pub struct MarketClient {
    client: reqwest::Client,
    base_url: String,
    retry_config: RetryConfig,
}

impl MarketClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, DEFAULT_TIMEOUT, RetryConfig::default())
    }

    pub fn with_options(base_url: &str, timeout: Duration, retry_config: RetryConfig) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(MarketApiError::InvalidUrl(base_url));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            retry_config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /gigs?page={n}`
    pub async fn fetch_gigs(&self, page: u32) -> Result<ApiEnvelope<Vec<GigRecord>>> {
        let page = page.to_string();
        self.get_envelope("gigs", &[("page", page.as_str())]).await
    }

    /// `GET /categories`
    pub async fn fetch_categories(&self) -> Result<ApiEnvelope<Vec<CategoryRecord>>> {
        self.get_envelope("categories", &[]).await
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiEnvelope<T>> {
        let url = format!("{}/{}", self.base_url, path);

        let payload: serde_json::Value = with_retry(
            &self.retry_config,
            MarketApiError::is_retryable,
            || async {
                debug!("GET {} {:?}", url, query);
                let response = self.client.get(&url).query(query).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(MarketApiError::NotFound(url.clone()));
                }

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(MarketApiError::RateLimitExceeded);
                }

                let body = response.text().await?;
                if !status.is_success() {
                    return Err(MarketApiError::Status {
                        status: status.as_u16(),
                        body,
                    });
                }

                // Decode from text so a bad payload surfaces as ParseError, not a transport error
                Ok::<serde_json::Value, MarketApiError>(serde_json::from_str(&body)?)
            },
        )
        .await?;

        decode_envelope(path, payload)
    }
}

/// Turn a raw response body into a typed envelope
///
/// Failure envelopes usually carry `data: null`, so the flag is checked
/// before typed decoding.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    path: &str,
    payload: serde_json::Value,
) -> Result<ApiEnvelope<T>> {
    if payload.get("success").and_then(|v| v.as_bool()) == Some(false) {
        let message = payload
            .get("message")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} returned success=false", path));
        return Err(MarketApiError::Rejected(message));
    }

    Ok(serde_json::from_value(payload)?)
}
