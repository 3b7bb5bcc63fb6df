//! apodsaver - NASA's Astronomy Picture of the Day in your terminal
//!
//! A terminal UI screensaver that shows today's APOD as coloured ASCII art,
//! or its explanation next to some decorative space art.

use std::io;
use std::panic;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use apodsaver::app::App;
use apodsaver::cache::DailyCache;
use apodsaver::cli::{Cli, StartupConfig};
use apodsaver::data::ApodClient;
use apodsaver::refresh::Loader;
use apodsaver::{logging, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    match logging::init(config.log_file.clone()) {
        Ok(path) => info!(log_file = %path.display(), "apodsaver starting"),
        Err(e) => eprintln!("warning: logging disabled: {}", e),
    }

    // One cache per process, shared with the background loader
    let client = Arc::new(ApodClient::new(config.client.clone()));
    let cache = Arc::new(DailyCache::new(client.clone(), client, config.cache));
    let mut loader = Loader::new(cache);

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();

    // Main event loop
    loop {
        while let Some(message) = loader.try_recv() {
            app.apply(message);
        }
        if app.take_reload_request() {
            loader.request_today();
        }
        if let Some(snapshot) = app.take_image_request() {
            loader.request_image(snapshot);
        }

        // Render UI
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Resize(width, height) => {
                    tracing::debug!(width, height, "terminal resized");
                }
                _ => {}
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    if let Err(e) = terminal.show_cursor() {
        warn!(error = %e, "failed to restore cursor");
    }
    info!("apodsaver stopped");

    Ok(())
}
