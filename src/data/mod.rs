//! Core data models for apodsaver
//!
//! This module contains the APOD record returned by the upstream API and the
//! `Snapshot` that owns it together with its lazily resolved image.

pub mod apod;
pub mod asset;

pub use apod::{ApodClient, ApodSource, ClientConfig, FetchError};
pub use asset::{ImageAsset, ImageDownloader, ImageError};

use std::sync::Arc;

use chrono::NaiveDate;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::cache::RetryPolicy;

/// Base of the human-facing APOD archive pages
const PERMALINK_BASE: &str = "https://apod.nasa.gov/apod";

/// Kind of media published for a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Other,
}

impl MediaType {
    /// Maps the API's `media_type` string, treating anything unknown as `Other`
    pub fn from_api(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "image" => MediaType::Image,
            "video" => MediaType::Video,
            _ => MediaType::Other,
        }
    }
}

/// One day's Astronomy Picture of the Day metadata (no pixels)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApodRecord {
    /// Publication day; the identity of the record
    pub date: NaiveDate,
    /// Title of the picture
    pub title: String,
    /// Explanation text written by the editors
    pub explanation: String,
    /// Primary image URL
    pub url: Option<String>,
    /// High-definition image URL
    pub hdurl: Option<String>,
    /// Image, video, or something else
    pub media_type: MediaType,
    /// Credit line, when the picture is not public domain
    pub copyright: Option<String>,
}

impl ApodRecord {
    /// The URL to download: the primary one, or the HD one if the primary is missing
    pub fn image_url(&self) -> Option<&str> {
        non_empty(self.url.as_deref()).or_else(|| non_empty(self.hdurl.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// A fetched APOD together with its derived image asset
///
/// Immutable once built. Shared as `Arc<Snapshot>`; the image asset lives and
/// dies with the snapshot, so a new day always starts with an unresolved image.
#[derive(Debug)]
pub struct Snapshot {
    record: ApodRecord,
    asset: ImageAsset,
}

impl Snapshot {
    /// Creates a snapshot whose image will be downloaded through `downloader`
    pub fn new(record: ApodRecord, downloader: Arc<dyn ImageDownloader>, retry: RetryPolicy) -> Self {
        let asset = ImageAsset::new(record.image_url().map(str::to_owned), downloader, retry);
        Self { record, asset }
    }

    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn explanation(&self) -> &str {
        &self.record.explanation
    }

    pub fn copyright(&self) -> Option<&str> {
        non_empty(self.record.copyright.as_deref())
    }

    /// Whether this day's media can be rendered as a picture
    pub fn has_image(&self) -> bool {
        self.record.media_type == MediaType::Image && self.record.image_url().is_some()
    }

    /// Link to the APOD archive page for this day, e.g. `.../ap240601.html`
    pub fn permalink(&self) -> String {
        format!("{}/ap{}.html", PERMALINK_BASE, self.record.date.format("%y%m%d"))
    }

    /// The raw image bytes, downloaded at most once per snapshot
    pub async fn raw_bytes(&self) -> Result<&[u8], ImageError> {
        self.asset.raw_bytes().await
    }

    /// The decoded image, decoded at most once per snapshot
    pub async fn decoded_image(&self) -> Result<Arc<DynamicImage>, ImageError> {
        self.asset.decoded_image().await
    }
}
