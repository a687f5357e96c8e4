use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::{Prompt, PromptKind};

use super::layout::centered;

pub fn render_prompt(frame: &mut Frame<'_>, area: Rect, prompt: &Prompt) {
    let rect = centered(area, 50, 3);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(prompt.label());
    let inner = block.inner(rect);
    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);

    if matches!(prompt.kind, PromptKind::ConfirmDelete(_)) {
        frame.render_widget(Paragraph::new("press y to delete, n to cancel"), inner);
        return;
    }
    frame.render_widget(Paragraph::new(prompt.input.as_str()), inner);
    if inner.width > 0 {
        let column = (prompt.input.chars().count() as u16).min(inner.width - 1);
        frame.set_cursor_position(Position::new(inner.x + column, inner.y));
    }
}
