use std::time::Duration;

use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
};

use crate::app::App;

pub fn render_status_bar(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let text = status_text(
        &app.root().to_string_lossy(),
        app.sessions().len(),
        app.sessions().dirty_count(),
        app.running_command(),
    );
    let bar = Paragraph::new(text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(bar, area);
}

fn status_text(
    root: &str,
    open: usize,
    dirty: usize,
    running: Option<(&str, DateTime<Local>, Duration)>,
) -> String {
    let process = match running {
        Some((command, started, elapsed)) => format!(
            "running: {command} (since {}, {}s)",
            started.format("%H:%M:%S"),
            elapsed.as_secs()
        ),
        None => "idle".to_string(),
    };
    let unsaved = match dirty {
        0 => String::new(),
        count => format!(" | {count} unsaved"),
    };
    format!(
        "{root} | {process} | {open} open{unsaved} | Ctrl-Q quit  Tab focus  F1-F12 quick  Ctrl-E pick"
    )
}
