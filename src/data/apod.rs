//! NASA APOD API client
//!
//! This module fetches today's Astronomy Picture of the Day metadata from the
//! APOD API and downloads the image bytes behind it.

use std::time::Duration;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::asset::{ImageDownloader, ImageError};
use super::{ApodRecord, MediaType};
use crate::cache::Retryable;

/// Default APOD endpoint
pub const DEFAULT_API_URL: &str = "https://api.nasa.gov/planetary/apod";

/// NASA's shared, heavily rate-limited demo key
pub const DEFAULT_API_KEY: &str = "DEMO_KEY";

/// Errors that can occur when fetching APOD metadata
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Network failure, timeout, rate limiting or a 5xx; worth retrying
    #[error("transient fetch error: {0}")]
    Transient(String),

    /// Bad request, bad key, or any other non-2xx that retrying won't fix
    #[error("permanent fetch error: {0}")]
    Permanent(String),

    /// The response arrived but its payload could not be understood
    #[error("malformed APOD payload: {0}")]
    Decode(String),
}

impl Retryable for FetchError {
    fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}

impl FetchError {
    /// Classifies a non-2xx response
    pub fn from_status(status: StatusCode) -> Self {
        let message = format!("APOD API returned {}", status);
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::REQUEST_TIMEOUT {
            FetchError::Transient(message)
        } else {
            FetchError::Permanent(message)
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if err.is_builder() {
            FetchError::Permanent(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::from_status(status)
        } else {
            // connect, timeout, request and body errors
            FetchError::Transient(err.to_string())
        }
    }
}

/// Source of today's APOD metadata
pub trait ApodSource: Send + Sync {
    /// Fetches the record the API currently considers "today"
    fn fetch_today(&self) -> BoxFuture<'_, Result<ApodRecord, FetchError>>;
}

/// Connection settings for the APOD API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Endpoint URL
    pub base_url: String,
    /// API key sent as the `api_key` query parameter
    pub api_key: String,
    /// Timeout for the metadata request
    pub request_timeout: Duration,
    /// Timeout for an image download
    pub image_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            request_timeout: Duration::from_secs(10),
            image_timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the APOD API and the images it links to
#[derive(Debug, Clone)]
pub struct ApodClient {
    client: Client,
    config: ClientConfig,
}

impl Default for ApodClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl ApodClient {
    /// Create a new ApodClient with the given settings
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Fetch today's APOD metadata
    ///
    /// # Returns
    /// * `Ok(ApodRecord)` - The parsed record
    /// * `Err(FetchError::Transient)` - Network trouble or a 5xx/429
    /// * `Err(FetchError::Permanent)` - Any other non-2xx
    /// * `Err(FetchError::Decode)` - A 2xx whose payload is not a valid APOD record
    pub async fn fetch_apod(&self) -> Result<ApodRecord, FetchError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("api_key", self.config.api_key.as_str())])
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        let text = response.text().await?;
        parse_response(&text)
    }

    /// Download the full body at `url`, bounded by the image timeout
    pub async fn download_image(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        let response = self
            .client
            .get(url)
            .timeout(self.config.image_timeout)
            .send()
            .await
            .map_err(|e| ImageError::Download(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Download(format!("{} returned {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ImageError::Download(format!("reading image body: {}", e)))?;

        Ok(body.to_vec())
    }
}

impl ApodSource for ApodClient {
    fn fetch_today(&self) -> BoxFuture<'_, Result<ApodRecord, FetchError>> {
        Box::pin(self.fetch_apod())
    }
}

impl ImageDownloader for ApodClient {
    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ImageError>> {
        Box::pin(self.download_image(url))
    }
}

/// Parse an APOD JSON payload into an ApodRecord
pub fn parse_response(text: &str) -> Result<ApodRecord, FetchError> {
    let response: ApodResponse = serde_json::from_str(text)
        .map_err(|e| FetchError::Decode(e.to_string()))?;

    let date = NaiveDate::parse_from_str(response.date.trim(), "%Y-%m-%d")
        .map_err(|_| FetchError::Decode(format!("invalid date: {}", response.date)))?;

    Ok(ApodRecord {
        date,
        title: response.title.trim().to_string(),
        explanation: response.explanation.trim().to_string(),
        url: response.url,
        hdurl: response.hdurl,
        media_type: response
            .media_type
            .as_deref()
            .map(MediaType::from_api)
            .unwrap_or(MediaType::Image),
        copyright: response.copyright.map(|c| c.trim().to_string()),
    })
}

/// APOD API response structure
#[derive(Debug, Deserialize)]
struct ApodResponse {
    date: String,
    title: String,
    #[serde(default)]
    explanation: String,
    url: Option<String>,
    hdurl: Option<String>,
    media_type: Option<String>,
    copyright: Option<String>,
}
