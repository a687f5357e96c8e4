use ratatui::{
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

use crate::core::LineStyle;

pub fn pane_block(title: &str, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title.to_string())
}

pub fn line_style(style: LineStyle) -> Style {
    match style {
        LineStyle::Normal => Style::default(),
        LineStyle::Command => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        LineStyle::Success => Style::default().fg(Color::Green),
        LineStyle::Warn => Style::default().fg(Color::Yellow),
        LineStyle::Error => Style::default().fg(Color::Red),
    }
}

pub fn to_color(color: syntect::highlighting::Color) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}
