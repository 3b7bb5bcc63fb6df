//! Background loading of the APOD and its image
//!
//! Network work runs in tokio tasks so the render loop never waits on it.
//! Results come back through a channel that the main loop drains every tick.

use std::sync::Arc;

use chrono::NaiveDate;
use image::DynamicImage;
use tokio::sync::mpsc;
use tracing::warn;

use crate::cache::{DailyCache, Today};
use crate::data::asset::run_blocking;
use crate::data::{ImageError, Snapshot};

/// Longest side of the preview kept for ASCII rendering
const PREVIEW_MAX_SIDE: u32 = 400;

/// Messages sent from background tasks to the main app
#[derive(Debug, Clone)]
pub enum LoadMessage {
    /// Today's snapshot (possibly a stale fallback)
    SnapshotLoaded(Today),
    /// No snapshot could be produced at all
    LoadFailed(String),
    /// The image for the snapshot of `date` is decoded
    ImageDecoded { date: NaiveDate, image: Arc<DynamicImage> },
    /// The image for the snapshot of `date` could not be resolved
    ImageFailed { date: NaiveDate, error: String },
}

/// Spawns loads against the shared cache and collects their results
pub struct Loader {
    cache: Arc<DailyCache>,
    sender: mpsc::Sender<LoadMessage>,
    receiver: mpsc::Receiver<LoadMessage>,
}

impl Loader {
    /// Creates a loader; must be used from within a tokio runtime
    pub fn new(cache: Arc<DailyCache>) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        Self {
            cache,
            sender,
            receiver,
        }
    }

    /// Starts a `get_today` in the background
    pub fn request_today(&self) {
        let cache = Arc::clone(&self.cache);
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let message = match cache.get_today().await {
                Ok(today) => LoadMessage::SnapshotLoaded(today),
                Err(err) => LoadMessage::LoadFailed(err.to_string()),
            };
            let _ = tx.send(message).await;
        });
    }

    /// Starts resolving `snapshot`'s image in the background
    pub fn request_image(&self, snapshot: Arc<Snapshot>) {
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let date = snapshot.date();
            let message = match resolve_preview(&snapshot).await {
                Ok(image) => LoadMessage::ImageDecoded {
                    date,
                    image: Arc::new(image),
                },
                Err(err) => {
                    warn!(%date, error = %err, "failed to get decoded APOD image");
                    LoadMessage::ImageFailed {
                        date,
                        error: err.to_string(),
                    }
                }
            };
            let _ = tx.send(message).await;
        });
    }

    /// Returns a pending message without blocking
    pub fn try_recv(&mut self) -> Option<LoadMessage> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the next message
    pub async fn recv(&mut self) -> Option<LoadMessage> {
        self.receiver.recv().await
    }
}

/// Decodes the snapshot's image and shrinks it off the runtime threads
async fn resolve_preview(snapshot: &Snapshot) -> Result<DynamicImage, ImageError> {
    let image = snapshot.decoded_image().await?;
    run_blocking(move || Ok(preview(&image))).await
}

/// Shrinks the decoded image so per-frame resizing stays cheap
fn preview(image: &DynamicImage) -> DynamicImage {
    if image.width() <= PREVIEW_MAX_SIDE && image.height() <= PREVIEW_MAX_SIDE {
        image.clone()
    } else {
        image.thumbnail(PREVIEW_MAX_SIDE, PREVIEW_MAX_SIDE)
    }
}
