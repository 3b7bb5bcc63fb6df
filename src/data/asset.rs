//! Lazily resolved image for a single APOD snapshot
//!
//! The raw bytes are downloaded on first request and the decoded bitmap is
//! produced on first request; both are memoized for the lifetime of the
//! owning snapshot. Failures are not memoized, so a later call tries again.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use image::DynamicImage;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::cache::{RetryPolicy, Retryable};

/// Errors that can occur while resolving a snapshot's image
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// Neither the primary nor the HD URL is present
    #[error("no image URL found")]
    NoImageUrl,

    /// The HTTP download failed (network, timeout, non-2xx, body read)
    #[error("downloading image: {0}")]
    Download(String),

    /// The bytes are not a recognized image
    #[error("decoding image: {0}")]
    Decode(String),
}

impl Retryable for ImageError {
    fn is_transient(&self) -> bool {
        matches!(self, ImageError::Download(_))
    }
}

/// Fetches the bytes behind an image URL
pub trait ImageDownloader: Send + Sync {
    /// Downloads the full body at `url`
    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ImageError>>;
}

/// Memoized raw bytes and decoded bitmap for one snapshot
pub struct ImageAsset {
    url: Option<String>,
    downloader: Arc<dyn ImageDownloader>,
    retry: RetryPolicy,
    raw: OnceCell<Vec<u8>>,
    decoded: OnceCell<Arc<DynamicImage>>,
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("url", &self.url)
            .field("raw_len", &self.raw.get().map(Vec::len))
            .field("decoded", &self.decoded.initialized())
            .finish()
    }
}

impl ImageAsset {
    /// Creates an unresolved asset for the already selected image URL
    pub fn new(url: Option<String>, downloader: Arc<dyn ImageDownloader>, retry: RetryPolicy) -> Self {
        Self {
            url,
            downloader,
            retry,
            raw: OnceCell::new(),
            decoded: OnceCell::new(),
        }
    }

    /// Returns the image bytes, downloading them on the first successful call
    ///
    /// # Returns
    /// * `Ok(&[u8])` - The full response body
    /// * `Err(ImageError::NoImageUrl)` - The snapshot has no image URL
    /// * `Err(ImageError::Download)` - Every download attempt failed
    pub async fn raw_bytes(&self) -> Result<&[u8], ImageError> {
        let bytes = self
            .raw
            .get_or_try_init(|| async {
                let url = self.url.as_deref().ok_or(ImageError::NoImageUrl)?;
                debug!(url, "downloading APOD image");
                let bytes = self
                    .retry
                    .run("apod image", || self.downloader.download(url))
                    .await?;
                info!(url, bytes = bytes.len(), "downloaded APOD image");
                Ok::<_, ImageError>(bytes)
            })
            .await?;
        Ok(bytes.as_slice())
    }

    /// Returns the decoded image, decoding the bytes on the first successful call
    ///
    /// JPEG and PNG are supported. Invalid data yields `ImageError::Decode`.
    pub async fn decoded_image(&self) -> Result<Arc<DynamicImage>, ImageError> {
        let image = self
            .decoded
            .get_or_try_init(|| async {
                let bytes = self.raw_bytes().await?.to_vec();
                match run_blocking(move || decode(&bytes)).await {
                    Ok(image) => Ok(Arc::new(image)),
                    Err(err) => {
                        error!(url = self.url.as_deref(), error = %err, "failed to decode APOD image");
                        Err(err)
                    }
                }
            })
            .await?;
        Ok(Arc::clone(image))
    }
}

/// Decodes an in-memory JPEG or PNG
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))
}

/// Runs CPU-heavy image work on tokio's blocking pool
///
/// A panicked or cancelled job is reported as `ImageError::Decode`.
pub async fn run_blocking<T, F>(job: F) -> Result<T, ImageError>
where
    F: FnOnce() -> Result<T, ImageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ImageError::Decode(format!("image worker failed: {}", e)))?
}
