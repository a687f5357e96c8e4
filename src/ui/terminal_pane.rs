use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::core::{TerminalLine, TerminalLog};

use super::event::quick_key_label;
use super::theme::{line_style, pane_block};

const PROMPT: &str = "$ ";

pub struct TerminalView<'a> {
    pub log: &'a TerminalLog,
    pub command_line: &'a str,
    pub quick_commands: &'a [String],
    pub focused: bool,
}

pub fn render_terminal(frame: &mut Frame<'_>, area: Rect, view: TerminalView<'_>) {
    let block = pane_block("terminal", view.focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(inner);
    let (output_area, quick_area, input_area) = (chunks[0], chunks[1], chunks[2]);

    let visible = output_area.height as usize;
    let skip = view.log.len().saturating_sub(visible);
    let lines: Vec<Line<'_>> = view.log.lines().skip(skip).map(render_line).collect();
    frame.render_widget(Paragraph::new(lines), output_area);

    frame.render_widget(quick_bar(view.quick_commands), quick_area);

    let input = Line::from(vec![
        Span::styled(PROMPT, Style::default().fg(Color::Cyan)),
        Span::raw(view.command_line),
    ]);
    frame.render_widget(Paragraph::new(input), input_area);

    if view.focused {
        let column = (PROMPT.len() + view.command_line.chars().count()) as u16;
        let x = input_area.x + column.min(input_area.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(x, input_area.y));
    }
}

fn quick_bar(commands: &[String]) -> Paragraph<'_> {
    let key_style = Style::default().fg(Color::Black).bg(Color::Cyan);
    let mut spans = Vec::with_capacity(commands.len() * 3);
    for (index, command) in commands.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(quick_key_label(index), key_style));
        spans.push(Span::raw(format!(" {command}")));
    }
    Paragraph::new(Line::from(spans))
}

fn render_line(line: &TerminalLine) -> Line<'_> {
    let marker = line.style.marker();
    let text = if marker.is_empty() {
        line.text.clone()
    } else {
        format!("{marker} {}", line.text)
    };
    Line::from(Span::styled(text, line_style(line.style)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    fn render(log: &TerminalLog, command_line: &str, quick_commands: &[String]) -> Buffer {
        let backend = TestBackend::new(60, 7);
        let mut terminal = Terminal::new(backend).unwrap();
        let area = Rect::new(0, 0, 60, 7);
        terminal
            .draw(|frame| {
                let view = TerminalView {
                    log,
                    command_line,
                    quick_commands,
                    focused: true,
                };
                render_terminal(frame, area, view)
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    #[test]
    fn render_terminal_shows_markers_and_input() {
        let mut log = TerminalLog::new(10);
        log.command("npm test");
        log.normal("ok");
        log.success("Process completed");

        let buffer = render(&log, "node -v", &[]);

        assert!(buffer_line(&buffer, 1, 60).contains("$ npm test"));
        assert!(buffer_line(&buffer, 2, 60).contains("ok"));
        assert!(buffer_line(&buffer, 3, 60).contains("✓ Process completed"));
        assert!(buffer_line(&buffer, 5, 60).contains("$ node -v"));
    }

    #[test]
    fn render_terminal_keeps_newest_lines_visible() {
        let mut log = TerminalLog::new(100);
        for index in 0..10 {
            log.normal(format!("line {index}"));
        }

        let buffer = render(&log, "", &[]);

        assert!(buffer_line(&buffer, 1, 60).contains("line 7"));
        assert!(buffer_line(&buffer, 3, 60).contains("line 9"));
    }

    #[test]
    fn render_terminal_labels_quick_commands_with_their_keys() {
        let quick: Vec<String> = ["node -v", "npm -v", "npm init", "npm i", "npm run start"]
            .iter()
            .map(|command| command.to_string())
            .collect();

        let buffer = render(&TerminalLog::new(10), "", &quick);

        assert!(buffer_line(&buffer, 4, 60)
            .starts_with("│F1 node -v F2 npm -v F3 npm init F4 npm i F6 npm run start"));
    }

    fn buffer_line(buffer: &Buffer, y: u16, width: u16) -> String {
        (0..width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }
}
