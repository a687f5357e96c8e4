use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{Focus, PromptKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    CycleFocus,
    Refresh,
    Save,
    SaveAll,
    CloseTab,
    NextTab,
    PrevTab,
    RunFile,
    Stop,
    ClearTerminal,
    QuickCommand(usize),
    PickQuickCommand,
    SelectionUp,
    SelectionDown,
    OpenSelected,
    NewFile,
    NewFolder,
    Rename,
    Delete,
    ChangeDir,
    EditorInsert(char),
    EditorNewline,
    EditorBackspace,
    EditorLeft,
    EditorRight,
    EditorUp,
    EditorDown,
    EditorHome,
    EditorEnd,
    CommandInsert(char),
    CommandBackspace,
    CommandSubmit,
    PromptInsert(char),
    PromptBackspace,
    PromptSubmit,
    PromptCancel,
}

pub fn is_quit_event(key: KeyEvent) -> bool {
    is_press(key) && is_ctrl(key, 'q')
}

fn is_press(key: KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
}

fn is_ctrl(key: KeyEvent, ch: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(ch)
}

fn plain_char(key: KeyEvent) -> Option<char> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    match key.code {
        KeyCode::Char(ch) => Some(ch),
        _ => None,
    }
}

/// Maps a key press to an action. An open prompt captures every key except
/// quit.
pub fn map_key(key: KeyEvent, focus: Focus, prompt: Option<&PromptKind>) -> Option<Action> {
    if !is_press(key) {
        return None;
    }
    if is_quit_event(key) {
        return Some(Action::Quit);
    }
    if let Some(kind) = prompt {
        return prompt_action(key, kind);
    }
    global_action(key).or_else(|| match focus {
        Focus::Explorer => explorer_action(key),
        Focus::Editor => editor_action(key),
        Focus::Terminal => terminal_action(key),
    })
}

fn global_action(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        let KeyCode::Char(ch) = key.code else {
            return None;
        };
        return match ch {
            's' => Some(Action::Save),
            'a' => Some(Action::SaveAll),
            'w' => Some(Action::CloseTab),
            'r' => Some(Action::RunFile),
            'k' => Some(Action::Stop),
            'l' => Some(Action::ClearTerminal),
            'n' => Some(Action::NextTab),
            'p' => Some(Action::PrevTab),
            'e' => Some(Action::PickQuickCommand),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Tab => Some(Action::CycleFocus),
        KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::F(n) => quick_index(n).map(Action::QuickCommand),
        _ => None,
    }
}

/// Quick command bound to function key `n`: F1-F4, then F6-F12.
fn quick_index(n: u8) -> Option<usize> {
    match n {
        1..=4 => Some(usize::from(n) - 1),
        6..=12 => Some(usize::from(n) - 2),
        _ => None,
    }
}

/// Label shown next to a quick command. Commands past F12 are reached by
/// number through the picker.
pub fn quick_key_label(index: usize) -> String {
    match index {
        0..=3 => format!("F{}", index + 1),
        4..=10 => format!("F{}", index + 2),
        _ => format!("#{}", index + 1),
    }
}

fn explorer_action(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Up => Some(Action::SelectionUp),
        KeyCode::Down => Some(Action::SelectionDown),
        KeyCode::Enter => Some(Action::OpenSelected),
        _ => match plain_char(key)? {
            'n' => Some(Action::NewFile),
            'N' => Some(Action::NewFolder),
            'r' => Some(Action::Rename),
            'd' => Some(Action::Delete),
            'o' => Some(Action::ChangeDir),
            _ => None,
        },
    }
}

fn editor_action(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter => Some(Action::EditorNewline),
        KeyCode::Backspace => Some(Action::EditorBackspace),
        KeyCode::Left => Some(Action::EditorLeft),
        KeyCode::Right => Some(Action::EditorRight),
        KeyCode::Up => Some(Action::EditorUp),
        KeyCode::Down => Some(Action::EditorDown),
        KeyCode::Home => Some(Action::EditorHome),
        KeyCode::End => Some(Action::EditorEnd),
        _ => plain_char(key).map(Action::EditorInsert),
    }
}

fn terminal_action(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter => Some(Action::CommandSubmit),
        KeyCode::Backspace => Some(Action::CommandBackspace),
        _ => plain_char(key).map(Action::CommandInsert),
    }
}

fn prompt_action(key: KeyEvent, kind: &PromptKind) -> Option<Action> {
    if matches!(kind, PromptKind::ConfirmDelete(_)) {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::PromptSubmit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::PromptCancel),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Esc => Some(Action::PromptCancel),
        KeyCode::Enter => Some(Action::PromptSubmit),
        KeyCode::Backspace => Some(Action::PromptBackspace),
        _ => plain_char(key).map(Action::PromptInsert),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn ctrl_q_quits_even_with_prompt_open() {
        let prompt = PromptKind::NewFile;

        assert_eq!(
            map_key(ctrl('q'), Focus::Editor, Some(&prompt)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn global_shortcuts_apply_in_every_focus() {
        for focus in [Focus::Explorer, Focus::Editor, Focus::Terminal] {
            assert_eq!(map_key(ctrl('s'), focus, None), Some(Action::Save));
            assert_eq!(map_key(ctrl('k'), focus, None), Some(Action::Stop));
            assert_eq!(
                map_key(key(KeyCode::F(3)), focus, None),
                Some(Action::QuickCommand(2))
            );
        }
    }

    #[test]
    fn function_keys_f1_to_f12_run_quick_commands() {
        let reachable: Vec<usize> = (1..=24)
            .filter_map(|n| match map_key(key(KeyCode::F(n)), Focus::Explorer, None) {
                Some(Action::QuickCommand(index)) => Some(index),
                _ => None,
            })
            .collect();

        assert_eq!(reachable, (0..=10).collect::<Vec<_>>());
        assert_eq!(
            map_key(key(KeyCode::F(6)), Focus::Terminal, None),
            Some(Action::QuickCommand(4))
        );
        assert_eq!(map_key(ctrl('e'), Focus::Editor, None), Some(Action::PickQuickCommand));
    }

    #[test]
    fn quick_key_label_matches_bindings() {
        assert_eq!(quick_key_label(0), "F1");
        assert_eq!(quick_key_label(4), "F6");
        assert_eq!(quick_key_label(10), "F12");
        assert_eq!(quick_key_label(11), "#12");
    }

    #[test]
    fn letters_depend_on_focus() {
        let n = key(KeyCode::Char('n'));

        assert_eq!(map_key(n, Focus::Explorer, None), Some(Action::NewFile));
        assert_eq!(map_key(n, Focus::Editor, None), Some(Action::EditorInsert('n')));
        assert_eq!(map_key(n, Focus::Terminal, None), Some(Action::CommandInsert('n')));
    }

    #[test]
    fn confirm_prompt_accepts_only_yes_or_no() {
        let prompt = PromptKind::ConfirmDelete(PathBuf::from("/tmp/a.js"));

        assert_eq!(
            map_key(key(KeyCode::Char('y')), Focus::Explorer, Some(&prompt)),
            Some(Action::PromptSubmit)
        );
        assert_eq!(
            map_key(key(KeyCode::Char('n')), Focus::Explorer, Some(&prompt)),
            Some(Action::PromptCancel)
        );
        assert_eq!(map_key(key(KeyCode::Enter), Focus::Explorer, Some(&prompt)), None);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut release = ctrl('s');
        release.kind = KeyEventKind::Release;

        assert_eq!(map_key(release, Focus::Editor, None), None);
    }
}
