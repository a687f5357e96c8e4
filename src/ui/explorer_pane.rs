use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{List, ListItem, ListState},
};

use crate::explorer::{ExplorerRow, ExplorerState};

use super::theme::pane_block;

pub fn render_explorer(
    frame: &mut Frame<'_>,
    area: Rect,
    explorer: &ExplorerState,
    focused: bool,
    loading: bool,
) {
    let title = if loading { "explorer (loading)" } else { "explorer" };
    let block = pane_block(title, focused);
    let items: Vec<ListItem> = explorer.rows().iter().map(row_item).collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !explorer.rows().is_empty() {
        state.select(Some(explorer.cursor()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn row_item(row: &ExplorerRow) -> ListItem<'static> {
    let marker = match (row.is_dir, row.expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => "  ",
    };
    let label = format!("{}{marker}{}", "  ".repeat(row.depth), row.name);
    let style = if row.is_dir {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    ListItem::new(label).style(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DirectoryEntry;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use std::path::{Path, PathBuf};

    fn entry(path: &str, is_dir: bool, children: Vec<DirectoryEntry>) -> DirectoryEntry {
        DirectoryEntry {
            name: Path::new(path)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .to_string(),
            path: PathBuf::from(path),
            is_dir,
            children,
        }
    }

    fn render(explorer: &ExplorerState, loading: bool) -> Buffer {
        let backend = TestBackend::new(30, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let area = Rect::new(0, 0, 30, 6);
        terminal
            .draw(|frame| render_explorer(frame, area, explorer, true, loading))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    #[test]
    fn render_explorer_shows_tree_rows_with_selection() {
        let mut explorer = ExplorerState::new();
        explorer.set_tree(entry(
            "/app",
            true,
            vec![
                entry("/app/src", true, Vec::new()),
                entry("/app/index.js", false, Vec::new()),
            ],
        ));
        explorer.move_down();

        let buffer = render(&explorer, false);

        assert!(buffer_line(&buffer, 1, 30).contains("▾ app"));
        assert!(buffer_line(&buffer, 2, 30).contains(">   ▸ src"));
        assert!(buffer_line(&buffer, 3, 30).contains("index.js"));
    }

    #[test]
    fn render_explorer_marks_loading() {
        let buffer = render(&ExplorerState::new(), true);

        assert!(buffer_line(&buffer, 0, 30).contains("explorer (loading)"));
    }

    fn buffer_line(buffer: &Buffer, y: u16, width: u16) -> String {
        (0..width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }
}
