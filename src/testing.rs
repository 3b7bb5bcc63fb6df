//! Test doubles shared by the unit tests

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use image::{ImageFormat, Rgb, RgbImage};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::cache::Clock;
use crate::data::{ApodRecord, ApodSource, FetchError, ImageDownloader, ImageError, MediaType};

/// An image APOD for the given day with a PNG url
pub fn record(year: i32, month: u32, day: u32) -> ApodRecord {
    ApodRecord {
        date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        title: "T".to_string(),
        explanation: "E".to_string(),
        url: Some("http://x/img.png".to_string()),
        hdurl: None,
        media_type: MediaType::Image,
        copyright: None,
    }
}

/// Encodes a small gradient PNG
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 128]));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
    out
}

/// Serves a fixed body (or always fails) and counts requests
pub struct CountingDownloader {
    body: Option<Vec<u8>>,
    urls: Mutex<Vec<String>>,
}

impl CountingDownloader {
    pub fn serving(body: Vec<u8>) -> Self {
        Self {
            body: Some(body),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            body: None,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl ImageDownloader for CountingDownloader {
    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ImageError>> {
        self.urls.lock().unwrap().push(url.to_string());
        let result = self
            .body
            .clone()
            .ok_or_else(|| ImageError::Download("connection refused".to_string()));
        Box::pin(async move { result })
    }
}

/// Replays a queue of responses and counts fetches
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<ApodRecord, FetchError>>>,
    calls: AtomicUsize,
    latency: Duration,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<ApodRecord, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ApodSource for ScriptedSource {
    fn fetch_today(&self) -> BoxFuture<'_, Result<ApodRecord, FetchError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Permanent("script exhausted".to_string())));
        let latency = self.latency;
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            next
        })
    }
}

/// A clock whose day is set by the test
pub struct ManualClock(Mutex<NaiveDate>);

impl ManualClock {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self(Mutex::new(NaiveDate::from_ymd_opt(year, month, day).unwrap()))
    }

    pub fn set(&self, year: i32, month: u32, day: u32) {
        *self.0.lock().unwrap() = NaiveDate::from_ymd_opt(year, month, day).unwrap();
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap()
    }
}

/// Counts events at `level` that carry a field called `field`
#[derive(Clone)]
pub struct EventCounter {
    level: Level,
    field: &'static str,
    count: Arc<AtomicUsize>,
}

impl EventCounter {
    pub fn new(level: Level, field: &'static str) -> Self {
        Self {
            level,
            field,
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

struct HasField {
    name: &'static str,
    found: bool,
}

impl Visit for HasField {
    fn record_debug(&mut self, field: &Field, _value: &dyn std::fmt::Debug) {
        if field.name() == self.name {
            self.found = true;
        }
    }
}

impl<S: Subscriber> Layer<S> for EventCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != self.level {
            return;
        }
        let mut visitor = HasField {
            name: self.field,
            found: false,
        };
        event.record(&mut visitor);
        if visitor.found {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}
