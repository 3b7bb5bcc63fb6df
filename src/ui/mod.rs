//! UI rendering module for apodsaver
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod apod_panel;
pub mod help_overlay;
pub mod space_art;
pub mod widgets;

pub use help_overlay::render as render_help_overlay;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, ImageSlot};
use crate::cache::Today;
use apod_panel::{panel_lines, MUTED, SUPER_MUTED, YELLOW};
use widgets::AsciiImage;

/// Widest the text panel gets next to the decorative art
const PANEL_MAX_WIDTH: u16 = 60;

/// Key hints shown at the bottom of every view
const KEY_HINTS: [(&str, &str); 4] = [
    ("e", "explanation/image"),
    ("l", "link"),
    ("r", "reload"),
    ("q", "quit"),
];

/// Renders the UI based on the current application state
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    match (&app.state, &app.today) {
        (AppState::Unavailable(reason), _) => render_unavailable(frame, area, reason),
        (AppState::Link, Some(today)) => render_link(frame, area, today),
        (AppState::Apod, Some(today)) => render_apod(frame, area, app, today),
        _ => render_loading(frame, area),
    }

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Renders a loading message while data is being fetched
fn render_loading(frame: &mut Frame, area: Rect) {
    let loading_text = Paragraph::new("✨ loading...")
        .style(Style::default().fg(YELLOW))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, centered_rect(area.width, 1, area));
}

/// Renders the explicit "nothing to show" screen
fn render_unavailable(frame: &mut Frame, area: Rect, reason: &str) {
    let muted = Style::default().fg(MUTED);
    let mut lines = vec![
        Line::from(Span::styled("🌌 Astronomy Picture of the Day", muted)),
        Line::from(""),
        Line::from("error fetching APOD :("),
        Line::from(Span::styled(reason.to_string(), muted)),
        Line::from(""),
    ];
    lines.push(help_line());

    let height = lines.len() as u16 + 2;
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, centered_rect(area.width, height, area));
}

/// Renders the permalink view
fn render_link(frame: &mut Frame, area: Rect, today: &Today) {
    let yellow = Style::default().fg(YELLOW);
    let lines = vec![
        Line::from(Span::styled("🔗 link to APOD:", yellow)),
        Line::from(""),
        Line::from(Span::styled(today.snapshot.permalink(), yellow)),
        Line::from(""),
        help_line(),
    ];
    let height = lines.len() as u16;
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, centered_rect(area.width, height, area));
}

/// Renders the APOD, either as a picture or as explanation plus art
fn render_apod(frame: &mut Frame, area: Rect, app: &App, today: &Today) {
    let area = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0)])
        .split(area)[0];

    if app.show_image && today.snapshot.has_image() {
        render_picture(frame, area, app, today);
    } else {
        render_explanation(frame, area, app, today);
    }
}

/// Full-width panel above the ASCII picture
fn render_picture(frame: &mut Frame, area: Rect, app: &App, today: &Today) {
    let panel = panel_lines(app, today, area.width, false);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(panel.len() as u16),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(panel), chunks[0]);
    render_image_slot(frame, chunks[1], &app.image);
    frame.render_widget(help_bar(), chunks[2]);
}

fn render_image_slot(frame: &mut Frame, area: Rect, slot: &ImageSlot) {
    let muted = Style::default().fg(MUTED);
    let notice = match slot {
        ImageSlot::Ready(image) => {
            frame.render_widget(AsciiImage::new(image), area);
            return;
        }
        ImageSlot::None => return,
        ImageSlot::Pending => Paragraph::new("✨ developing the picture...").style(muted),
        ImageSlot::Failed(error) => Paragraph::new(vec![
            Line::from("image unavailable :("),
            Line::from(Span::styled(error.clone(), muted)),
        ])
        .wrap(Wrap { trim: true }),
    };
    frame.render_widget(notice.alignment(Alignment::Center), centered_rect(area.width, 2, area));
}

/// Explanation panel on the left, decorative art on the right
fn render_explanation(frame: &mut Frame, area: Rect, app: &App, today: &Today) {
    let panel_width = area.width.min(PANEL_MAX_WIDTH);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(panel_width), Constraint::Min(0)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(columns[0]);

    let panel = panel_lines(app, today, panel_width, true);
    frame.render_widget(Paragraph::new(panel), left[0]);
    frame.render_widget(help_bar(), left[1]);

    let art_area = columns[1];
    if let Some(art) = space_art::pick_art(art_area.width as usize, art_area.height as usize, app.art_seed) {
        let width = space_art::art_width(art) as u16;
        let height = space_art::art_height(art) as u16;
        let art_lines = space_art::colorize(art, app.art_seed);
        frame.render_widget(Paragraph::new(art_lines), centered_rect(width, height, art_area));
    }
}

/// Blank line followed by the key hints
fn help_bar() -> Paragraph<'static> {
    Paragraph::new(vec![Line::from(""), help_line()])
}

fn help_line() -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, description)) in KEY_HINTS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(SUPER_MUTED)));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(MUTED).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(format!(" {}", description), Style::default().fg(MUTED)));
    }
    Line::from(spans)
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height - height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width - width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
