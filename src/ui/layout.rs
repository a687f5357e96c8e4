use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct Areas {
    pub explorer: Rect,
    pub editor: Rect,
    pub terminal: Rect,
    pub status: Rect,
}

pub fn split_main(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)].as_ref())
        .split(rows[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(columns[1]);
    Areas {
        explorer: columns[0],
        editor: right[0],
        terminal: right[1],
        status: rows[1],
    }
}

/// Centered box for the prompt overlay.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
