//! The APOD text panel: header, date, title and explanation

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::app::App;
use crate::cache::Today;

/// Muted grey for secondary text
pub const MUTED: Color = Color::Rgb(0x5C, 0x5C, 0x5C);
/// Even fainter grey for separators
pub const SUPER_MUTED: Color = Color::Rgb(0x3C, 0x3C, 0x3C);
/// Highlight colour for notices
pub const YELLOW: Color = Color::Indexed(220);

/// Builds the panel lines for `today`, wrapped to `width` columns
///
/// The explanation is only included when `with_explanation` is set.
pub fn panel_lines(app: &App, today: &Today, width: u16, with_explanation: bool) -> Vec<Line<'static>> {
    let muted = Style::default().fg(MUTED);
    let yellow = Style::default().fg(YELLOW);
    let width = width.max(1) as usize;
    let snapshot = &today.snapshot;

    let mut lines = vec![Line::from(Span::styled("🌌 Astronomy Picture of the Day", muted))];

    let mut date_line = vec![Span::styled(snapshot.date().format("%Y-%m-%d").to_string(), muted)];
    if app.reloaded_recently() {
        date_line.push(Span::styled(" • ", Style::default().fg(SUPER_MUTED)));
        date_line.push(Span::styled("reloaded!", yellow));
    }
    lines.push(Line::from(date_line));

    if today.is_stale() {
        lines.push(Line::from(Span::styled(
            format!("⚠ showing {}, refresh failed", snapshot.date().format("%Y-%m-%d")),
            yellow,
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(""));

    let title_style = Style::default().add_modifier(Modifier::BOLD);
    for part in textwrap::wrap(snapshot.title(), width) {
        lines.push(Line::from(Span::styled(part.into_owned(), title_style)).centered());
    }
    if let Some(copyright) = snapshot.copyright() {
        for part in textwrap::wrap(&format!("© {}", copyright), width) {
            lines.push(Line::from(Span::styled(part.into_owned(), muted)).centered());
        }
    }
    lines.push(Line::from(""));

    if with_explanation {
        if !snapshot.has_image() {
            lines.push(Line::from(Span::styled("(today's APOD is not a picture)", muted)));
            lines.push(Line::from(""));
        }
        for part in textwrap::wrap(snapshot.explanation(), width) {
            lines.push(Line::from(part.into_owned()));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RetryPolicy;
    use crate::data::Snapshot;
    use crate::testing::{record, CountingDownloader};
    use std::sync::Arc;

    fn today(title: &str, explanation: &str, refresh_error: Option<&str>) -> Today {
        let mut rec = record(2024, 6, 1);
        rec.title = title.to_string();
        rec.explanation = explanation.to_string();
        Today {
            snapshot: Arc::new(Snapshot::new(rec, Arc::new(CountingDownloader::failing()), RetryPolicy::no_retry())),
            refresh_error: refresh_error.map(str::to_string),
        }
    }

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_panel_has_header_date_and_title() {
        let app = App::new();
        let lines = text(&panel_lines(&app, &today("Moon", "Bright.", None), 40, false));

        assert_eq!(lines[0], "🌌 Astronomy Picture of the Day");
        assert_eq!(lines[1], "2024-06-01");
        assert!(lines.contains(&"Moon".to_string()));
        assert!(!lines.contains(&"Bright.".to_string()));
    }

    #[test]
    fn test_explanation_is_wrapped_to_width() {
        let app = App::new();
        let explanation = "one two three four five six seven eight nine ten";
        let lines = panel_lines(&app, &today("T", explanation, None), 12, true);

        let body: Vec<String> = text(&lines).into_iter().skip_while(|l| l != "one two").collect();
        assert!(!body.is_empty(), "explanation should be present");
        for line in &body {
            assert!(line.chars().count() <= 12, "line too long: {:?}", line);
        }
    }

    #[test]
    fn test_stale_notice_is_dated() {
        let app = App::new();
        let lines = text(&panel_lines(&app, &today("T", "E", Some("timeout")), 60, false));

        assert!(lines.iter().any(|l| l == "⚠ showing 2024-06-01, refresh failed"));
    }

    #[test]
    fn test_title_is_centred() {
        let app = App::new();
        let lines = panel_lines(&app, &today("Centred", "E", None), 40, false);
        let title = lines
            .iter()
            .find(|l| l.spans.iter().any(|s| s.content == "Centred"))
            .unwrap();
        assert_eq!(title.alignment, Some(ratatui::layout::Alignment::Center));
    }
}
