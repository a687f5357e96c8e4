mod editor_pane;
mod event;
mod explorer_pane;
mod highlight;
mod layout;
mod prompt;
mod status_bar;
mod terminal_pane;
mod theme;

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    cursor::{Hide, Show},
    event::{self as crossterm_event, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

use crate::{
    app::{App, Focus, PromptKind},
    error::AppResult,
};

use editor_pane::{EditorView, render_editor};
use event::{Action, map_key};
use explorer_pane::render_explorer;
use highlight::Highlighter;
use layout::split_main;
use prompt::render_prompt;
use status_bar::render_status_bar;
use terminal_pane::{TerminalView, render_terminal};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(mut app: App) -> AppResult<()> {
    let mut guard = TerminalGuard::new()?;
    let highlighter = Highlighter::new();

    loop {
        app.tick();
        guard
            .terminal_mut()
            .draw(|frame| draw(frame, &app, &highlighter))?;

        if crossterm_event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = crossterm_event::read()? {
                let prompt = app.prompt().map(|prompt| prompt.kind.clone());
                let Some(action) = map_key(key, app.focus(), prompt.as_ref()) else {
                    continue;
                };
                if action == Action::Quit {
                    break;
                }
                apply(&mut app, action);
            }
        }
    }

    tracing::info!("quit");
    Ok(())
}

fn apply(app: &mut App, action: Action) {
    match action {
        Action::Quit => {}
        Action::CycleFocus => app.cycle_focus(),
        Action::Refresh => app.refresh(),
        Action::Save => app.save_active(),
        Action::SaveAll => app.save_all(),
        Action::CloseTab => app.close_active(),
        Action::NextTab => app.next_tab(),
        Action::PrevTab => app.prev_tab(),
        Action::RunFile => app.run_active_file(),
        Action::Stop => app.stop_command(),
        Action::ClearTerminal => app.clear_terminal(),
        Action::QuickCommand(index) => app.run_quick(index),
        Action::PickQuickCommand => app.begin_quick_pick(),
        Action::SelectionUp => app.move_selection_up(),
        Action::SelectionDown => app.move_selection_down(),
        Action::OpenSelected => app.open_selected(),
        Action::NewFile => app.begin_prompt(PromptKind::NewFile),
        Action::NewFolder => app.begin_prompt(PromptKind::NewFolder),
        Action::Rename => app.begin_selected_prompt(PromptKind::Rename),
        Action::Delete => app.begin_selected_prompt(PromptKind::ConfirmDelete),
        Action::ChangeDir => app.begin_prompt(PromptKind::ChangeDir),
        Action::CommandInsert(ch) => app.push_command_char(ch),
        Action::CommandBackspace => app.pop_command_char(),
        Action::CommandSubmit => app.submit_command_line(),
        Action::PromptInsert(ch) => app.push_prompt_char(ch),
        Action::PromptBackspace => app.pop_prompt_char(),
        Action::PromptSubmit => app.submit_prompt(),
        Action::PromptCancel => app.cancel_prompt(),
        editing => {
            if let Some(session) = app.active_session_mut() {
                match editing {
                    Action::EditorInsert(ch) => session.insert_char(ch),
                    Action::EditorNewline => session.insert_newline(),
                    Action::EditorBackspace => session.delete_backward(),
                    Action::EditorLeft => session.move_left(),
                    Action::EditorRight => session.move_right(),
                    Action::EditorUp => session.move_up(),
                    Action::EditorDown => session.move_down(),
                    Action::EditorHome => session.move_line_start(),
                    Action::EditorEnd => session.move_line_end(),
                    _ => {}
                }
            }
        }
    }
}

fn draw(frame: &mut Frame<'_>, app: &App, highlighter: &Highlighter) {
    let area = frame.area();
    let areas = split_main(area);
    let focus = app.focus();
    render_explorer(
        frame,
        areas.explorer,
        &app.explorer,
        focus == Focus::Explorer,
        app.is_loading(),
    );
    let view = EditorView {
        sessions: app.sessions(),
        active: app.active(),
        focused: focus == Focus::Editor,
    };
    render_editor(frame, areas.editor, view, highlighter);
    let quick_commands = app.quick_commands();
    let terminal = TerminalView {
        log: app.log(),
        command_line: app.command_line(),
        quick_commands: &quick_commands,
        focused: focus == Focus::Terminal,
    };
    render_terminal(frame, areas.terminal, terminal);
    render_status_bar(frame, areas.status, app);
    if let Some(prompt) = app.prompt() {
        render_prompt(frame, area, prompt);
    }
}

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> AppResult<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(error) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(error.into());
        }

        let backend = CrosstermBackend::new(stdout);
        match Terminal::new(backend) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(error) => {
                let _ = restore_terminal();
                Err(error.into())
            }
        }
    }

    fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn restore_terminal() -> std::io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, Show)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::backend::TestBackend;

    #[test]
    fn apply_routes_editor_keys_to_active_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("a.js");
        std::fs::write(&file, "").unwrap();
        let mut app = App::new(temp_dir.path().to_path_buf(), Config::default()).unwrap();
        app.open_path(&file);

        apply(&mut app, Action::EditorInsert('h'));
        apply(&mut app, Action::EditorInsert('i'));
        apply(&mut app, Action::EditorLeft);
        apply(&mut app, Action::EditorBackspace);

        assert_eq!(app.active_session().unwrap().text(), "i");
        assert!(app.active_session().unwrap().is_dirty());
    }

    #[test]
    fn draw_renders_every_pane() {
        let temp_dir = tempfile::tempdir().unwrap();
        let app = App::new(temp_dir.path().to_path_buf(), Config::default()).unwrap();
        let highlighter = Highlighter::new();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal
            .draw(|frame| draw(frame, &app, &highlighter))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = (0..30)
            .flat_map(|y| (0..100).map(move |x| buffer[(x, y)].symbol().to_string()))
            .collect();
        assert!(text.contains("explorer"));
        assert!(text.contains("editor"));
        assert!(text.contains("terminal"));
        assert!(text.contains("Node.js Terminal"));
    }
}
