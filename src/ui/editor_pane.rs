use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Paragraph, Tabs},
};
use unicode_width::UnicodeWidthStr;

use crate::core::{EditorSession, SessionId, SessionRegistry};

use super::highlight::Highlighter;
use super::theme::pane_block;

pub struct EditorView<'a> {
    pub sessions: &'a SessionRegistry,
    pub active: Option<SessionId>,
    pub focused: bool,
}

pub fn render_editor(
    frame: &mut Frame<'_>,
    area: Rect,
    view: EditorView<'_>,
    highlighter: &Highlighter,
) {
    let block = pane_block("editor", view.focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)].as_ref())
        .split(inner);
    let (tabs_area, text_area) = (chunks[0], chunks[1]);

    let ids = view.sessions.ids();
    if ids.is_empty() {
        frame.render_widget(
            Paragraph::new("No file open. Select a file in the explorer and press Enter.")
                .style(Style::default().fg(Color::DarkGray)),
            text_area,
        );
        return;
    }

    let titles: Vec<String> = ids
        .iter()
        .filter_map(|id| view.sessions.get(*id))
        .map(tab_title)
        .collect();
    let selected = view
        .active
        .and_then(|active| ids.iter().position(|id| *id == active));
    let tabs = Tabs::new(titles)
        .select(selected.unwrap_or(0))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_widget(tabs, tabs_area);

    let Some(session) = view.active.and_then(|id| view.sessions.get(id)) else {
        return;
    };
    if text_area.height == 0 {
        return;
    }
    let (line, column) = session.cursor_position();
    let offset = scroll_offset(line, text_area.height as usize);
    let display_column = display_column(session.text(), line, column);
    let h_offset = scroll_offset(display_column, text_area.width as usize);
    let lines: Vec<Line<'static>> = highlighter
        .highlight(session.path(), session.text(), offset + text_area.height as usize)
        .into_iter()
        .skip(offset)
        .collect();
    let h_scroll = u16::try_from(h_offset).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).scroll((0, h_scroll)), text_area);

    if view.focused {
        let x = text_area.x + (display_column - h_offset) as u16;
        let y = text_area.y + (line - offset) as u16;
        frame.set_cursor_position(Position::new(x, y));
    }
}

/// Terminal cells taken by the first `column` chars of line `line`.
fn display_column(text: &str, line: usize, column: usize) -> usize {
    let Some(current) = text.split('\n').nth(line) else {
        return 0;
    };
    let end = current
        .char_indices()
        .nth(column)
        .map_or(current.len(), |(index, _)| index);
    UnicodeWidthStr::width(&current[..end])
}

fn tab_title(session: &EditorSession) -> String {
    if session.is_dirty() {
        format!("{} *", session.title())
    } else {
        session.title()
    }
}

/// First visible line (or cell) so that `cursor` stays on screen.
fn scroll_offset(cursor: usize, extent: usize) -> usize {
    (cursor + 1).saturating_sub(extent)
}
