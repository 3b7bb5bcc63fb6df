//! Application state management for apodsaver
//!
//! This module contains the main application state, handling keyboard input,
//! results from the background loader, and transitions between views.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use image::DynamicImage;
use tracing::{debug, error};

use crate::cache::Today;
use crate::data::Snapshot;
use crate::refresh::LoadMessage;

/// How long the "reloaded!" badge stays visible
const RELOADED_BADGE_DURATION: Duration = Duration::from_secs(5);

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for the APOD
    Loading,
    /// Picture (or explanation) view
    Apod,
    /// Permalink view
    Link,
    /// Nothing could be loaded; holds the reason
    Unavailable(String),
}

/// Progress of the current snapshot's image
#[derive(Debug, Clone)]
pub enum ImageSlot {
    /// No image for this snapshot (not requested, or not an image day)
    None,
    /// Download/decode in progress
    Pending,
    /// Decoded preview ready to be rendered
    Ready(Arc<DynamicImage>),
    /// Download or decode failed
    Failed(String),
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Latest result from the daily cache
    pub today: Option<Today>,
    /// Image state for `today`
    pub image: ImageSlot,
    /// true shows the picture, false the explanation
    pub show_image: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Seed for the decorative art, changed when the view is toggled
    pub art_seed: u64,
    /// When the last user-requested reload finished
    reloaded_at: Option<Instant>,
    /// A reload was requested by the user and has not finished yet
    reload_in_flight: bool,
    /// The main loop should ask the loader for today's APOD
    reload_requested: bool,
    /// The main loop should ask the loader for this snapshot's image
    image_request: Option<Arc<Snapshot>>,
}

impl App {
    /// Creates a new App that requests the APOD on the first tick
    pub fn new() -> Self {
        Self {
            state: AppState::Loading,
            today: None,
            image: ImageSlot::None,
            show_image: true,
            should_quit: false,
            show_help: false,
            art_seed: rand::random(),
            reloaded_at: None,
            reload_in_flight: false,
            reload_requested: true,
            image_request: None,
        }
    }

    /// The snapshot being displayed, if any
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        self.today.as_ref().map(|t| &t.snapshot)
    }

    /// Whether the "reloaded!" badge should be shown
    pub fn reloaded_recently(&self) -> bool {
        self.reloaded_at
            .is_some_and(|at| at.elapsed() < RELOADED_BADGE_DURATION)
    }

    /// Takes the pending reload request, if any
    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    /// Takes the pending image request, if any
    pub fn take_image_request(&mut self) -> Option<Arc<Snapshot>> {
        self.image_request.take()
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` / `Ctrl+C`: Quit
    /// - `r` / `Ctrl+R`: Reload today's APOD
    /// - `e` / `Ctrl+E`: Toggle picture / explanation
    /// - `l` / `Ctrl+L`: Toggle the permalink view
    /// - `?`: Toggle help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Char('c') if ctrl => self.should_quit = true,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('e') => self.toggle_explanation(),
            KeyCode::Char('l') => self.toggle_link(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    /// Applies a result from the background loader
    pub fn apply(&mut self, message: LoadMessage) {
        match message {
            LoadMessage::SnapshotLoaded(today) => self.on_snapshot(today),
            LoadMessage::LoadFailed(reason) => {
                error!(error = %reason, "no APOD to display");
                self.reload_in_flight = false;
                match self.today {
                    Some(_) => self.state = AppState::Apod,
                    None => self.state = AppState::Unavailable(reason),
                }
            }
            LoadMessage::ImageDecoded { date, image } => {
                if self.is_current(date) {
                    self.image = ImageSlot::Ready(image);
                } else {
                    debug!(%date, "dropping image for a replaced snapshot");
                }
            }
            LoadMessage::ImageFailed { date, error } => {
                if self.is_current(date) {
                    self.image = ImageSlot::Failed(error);
                }
            }
        }
    }

    fn on_snapshot(&mut self, today: Today) {
        let same_snapshot = self
            .snapshot()
            .is_some_and(|current| Arc::ptr_eq(current, &today.snapshot));
        let snapshot = Arc::clone(&today.snapshot);
        self.today = Some(today);
        self.state = AppState::Apod;

        if std::mem::take(&mut self.reload_in_flight) {
            self.reloaded_at = Some(Instant::now());
        }

        if !snapshot.has_image() {
            self.image = ImageSlot::None;
            return;
        }
        let keep = same_snapshot && matches!(self.image, ImageSlot::Ready(_) | ImageSlot::Pending);
        if !keep {
            self.image = ImageSlot::Pending;
            self.image_request = Some(snapshot);
        }
    }

    fn is_current(&self, date: chrono::NaiveDate) -> bool {
        self.snapshot().is_some_and(|s| s.date() == date)
    }

    fn reload(&mut self) {
        self.state = AppState::Loading;
        self.reload_in_flight = true;
        self.reload_requested = true;
    }

    fn toggle_explanation(&mut self) {
        if self.today.is_none() {
            return;
        }
        self.state = AppState::Apod;
        self.show_image = !self.show_image;
        self.art_seed = self.art_seed.wrapping_add(1);
    }

    fn toggle_link(&mut self) {
        match self.state {
            AppState::Link => self.state = AppState::Apod,
            AppState::Apod => self.state = AppState::Link,
            _ => {}
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
