use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::config::{Config, home_dir};
use crate::core::{
    CommandRunner, EditorSession, EntryFilter, RunnerEvent, RunnerEventKind, SessionId,
    SessionRegistry, SnapshotWorker, StopOutcome, TerminalLog, create_file, create_folder,
    delete_entry, npm_scripts, rename_entry,
};
use crate::error::{AppError, AppResult};
use crate::explorer::ExplorerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Explorer,
    Editor,
    Terminal,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Explorer => Focus::Editor,
            Focus::Editor => Focus::Terminal,
            Focus::Terminal => Focus::Explorer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    NewFile,
    NewFolder,
    Rename(PathBuf),
    ChangeDir,
    ConfirmDelete(PathBuf),
    QuickCommand { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn label(&self) -> String {
        match &self.kind {
            PromptKind::NewFile => "New file name".to_string(),
            PromptKind::NewFolder => "New folder name".to_string(),
            PromptKind::Rename(path) => format!("Rename {}", display_name(path)),
            PromptKind::ChangeDir => "Open directory".to_string(),
            PromptKind::ConfirmDelete(path) => format!("Delete {}? (y/n)", display_name(path)),
            PromptKind::QuickCommand { count } => format!("Run quick command (1-{count})"),
        }
    }
}

/// Picks the project root: the CLI argument, then `default_dir`, then the
/// home directory, then the process working directory.
pub fn resolve_start_dir(cli_dir: Option<PathBuf>, config: &Config) -> AppResult<PathBuf> {
    let candidate = cli_dir
        .or_else(|| config.default_dir.clone())
        .or_else(home_dir)
        .map(Ok)
        .unwrap_or_else(std::env::current_dir)?;
    if !candidate.is_dir() {
        return Err(AppError::InvalidWorkingDir(candidate));
    }
    Ok(std::path::absolute(&candidate)?)
}

pub struct App {
    root: PathBuf,
    config: Config,
    filter: EntryFilter,
    pub(crate) explorer: ExplorerState,
    sessions: SessionRegistry,
    active: Option<SessionId>,
    runner: CommandRunner,
    run_started_at: Option<DateTime<Local>>,
    snapshots: SnapshotWorker,
    pending_snapshot: Option<u64>,
    scripts: Vec<String>,
    log: TerminalLog,
    focus: Focus,
    command_line: String,
    prompt: Option<Prompt>,
}

impl App {
    pub fn new(root: PathBuf, config: Config) -> AppResult<Self> {
        if !root.is_dir() {
            return Err(AppError::InvalidWorkingDir(root));
        }
        let root = std::path::absolute(&root)?;
        let filter = EntryFilter::new(config.ignored_names.iter().cloned());
        let mut log = TerminalLog::new(config.terminal_scrollback);
        log.success("=== Node.js Terminal ===");
        log.normal(format!("Working directory: {}", root.display()));
        log.normal("Type commands below, use F1-F12 or Ctrl-E for quick commands");
        let mut app = Self {
            root,
            config,
            filter,
            explorer: ExplorerState::new(),
            sessions: SessionRegistry::new(),
            active: None,
            runner: CommandRunner::new(),
            run_started_at: None,
            snapshots: SnapshotWorker::new(),
            pending_snapshot: None,
            scripts: Vec::new(),
            log,
            focus: Focus::Explorer,
            command_line: String::new(),
            prompt: None,
        };
        app.refresh();
        Ok(app)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn log(&self) -> &TerminalLog {
        &self.log
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn active(&self) -> Option<SessionId> {
        self.active
    }

    #[cfg(test)]
    pub fn active_session(&self) -> Option<&EditorSession> {
        self.active.and_then(|id| self.sessions.get(id))
    }

    pub fn active_session_mut(&mut self) -> Option<&mut EditorSession> {
        self.active.and_then(|id| self.sessions.get_mut(id))
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn cycle_focus(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_snapshot.is_some()
    }

    /// Running command, the wall-clock time it started and how long it has run.
    pub fn running_command(&self) -> Option<(&str, DateTime<Local>, Duration)> {
        let process = self.runner.current()?;
        let started = self.run_started_at.unwrap_or_else(Local::now);
        Some((process.command.as_str(), started, process.started.elapsed()))
    }

    pub fn notice(&mut self, text: impl Into<String>) {
        self.log.normal(text);
    }

    pub fn quick_commands(&self) -> Vec<String> {
        self.config
            .quick_commands
            .iter()
            .cloned()
            .chain(self.scripts.iter().map(|script| format!("npm run {script}")))
            .collect()
    }

    /// Drains worker results. Call once per frame from the UI thread.
    pub fn tick(&mut self) {
        while let Some(result) = self.snapshots.poll() {
            if self.pending_snapshot != Some(result.id) || result.root != self.root {
                continue;
            }
            self.pending_snapshot = None;
            self.explorer.set_tree(result.tree);
        }
        let mut completed = false;
        while let Some(event) = self.runner.poll() {
            completed |= self.apply_runner_event(event);
        }
        if completed {
            self.refresh();
        }
    }

    fn apply_runner_event(&mut self, event: RunnerEvent) -> bool {
        match event.kind {
            RunnerEventKind::Output(line) => {
                self.log.normal(line);
                false
            }
            RunnerEventKind::Exited { code } => {
                self.run_started_at = None;
                match code {
                    Some(0) => self.log.success("Process completed"),
                    Some(code) => self.log.error(format!("Process exited with code: {code}")),
                    None => self.log.error("Process terminated"),
                }
                true
            }
            RunnerEventKind::Cancelled => {
                self.run_started_at = None;
                self.log.error("Process stopped by user");
                false
            }
        }
    }

    pub fn refresh(&mut self) {
        let id = self.snapshots.request(self.root.clone(), self.filter.clone());
        self.pending_snapshot = Some(id);
        self.scripts = npm_scripts(&self.root);
    }

    pub fn change_root(&mut self, path: &Path) {
        let path = if path.is_relative() {
            self.root.join(path)
        } else {
            path.to_path_buf()
        };
        if !path.is_dir() {
            self.report(AppError::InvalidWorkingDir(path));
            return;
        }
        self.root = std::path::absolute(&path).unwrap_or(path);
        self.explorer.reset();
        tracing::info!(root = %self.root.display(), "working directory changed");
        self.log
            .success(format!("Working directory changed to: {}", self.root.display()));
        self.refresh();
    }

    pub fn move_selection_up(&mut self) {
        self.explorer.move_up();
    }

    pub fn move_selection_down(&mut self) {
        self.explorer.move_down();
    }

    pub fn open_selected(&mut self) {
        let Some(row) = self.explorer.selected().cloned() else {
            return;
        };
        if row.is_dir {
            self.explorer.toggle(&row.path);
        } else {
            self.open_path(&row.path);
        }
    }

    pub fn open_path(&mut self, path: &Path) {
        let already_open = self.sessions.find(path).is_some();
        match self.sessions.open(path) {
            Ok(id) => {
                self.active = Some(id);
                self.focus = Focus::Editor;
                if !already_open {
                    self.log.success(format!("Opened: {}", display_name(path)));
                }
            }
            Err(error) => self.report(error),
        }
    }

    pub fn save_active(&mut self) {
        let Some(id) = self.active else {
            self.log.error("No file open to save");
            return;
        };
        self.save_session(id);
    }

    fn save_session(&mut self, id: SessionId) -> bool {
        match self.sessions.save(id) {
            Ok(()) => {
                if let Some(session) = self.sessions.get(id) {
                    self.log.success(format!("Saved: {}", session.title()));
                }
                true
            }
            Err(error) => {
                self.report(error);
                false
            }
        }
    }

    pub fn save_all(&mut self) {
        if self.sessions.is_empty() {
            self.log.normal("No open files");
            return;
        }
        let outcomes = self.sessions.save_all();
        let total = outcomes.len();
        let mut failed = 0;
        for outcome in outcomes {
            match outcome.result {
                Ok(()) => self
                    .log
                    .success(format!("Saved: {}", display_name(&outcome.path))),
                Err(error) => {
                    failed += 1;
                    self.report(error);
                }
            }
        }
        if failed == 0 {
            self.log.success("All files saved");
        } else {
            self.log
                .warn(format!("{failed} of {total} files could not be saved"));
        }
    }

    pub fn close_active(&mut self) {
        let Some(id) = self.active else {
            return;
        };
        let index = self.sessions.ids().iter().position(|candidate| *candidate == id);
        let Some(session) = self.sessions.close(id) else {
            return;
        };
        if session.is_dirty() {
            self.log
                .warn(format!("Discarded unsaved changes in {}", session.title()));
        }
        self.log.normal(format!("Closed tab: {}", session.title()));
        self.active = index.and_then(|index| neighbour(self.sessions.ids(), index));
    }

    pub fn next_tab(&mut self) {
        self.cycle_tab(1);
    }

    pub fn prev_tab(&mut self) {
        self.cycle_tab(-1);
    }

    fn cycle_tab(&mut self, step: isize) {
        let ids = self.sessions.ids();
        if ids.is_empty() {
            return;
        }
        let current = self
            .active
            .and_then(|id| ids.iter().position(|candidate| *candidate == id))
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(ids.len() as isize) as usize;
        self.active = Some(ids[next]);
    }

    pub fn push_command_char(&mut self, ch: char) {
        self.command_line.push(ch);
    }

    pub fn pop_command_char(&mut self) {
        self.command_line.pop();
    }

    pub fn submit_command_line(&mut self) {
        let command = std::mem::take(&mut self.command_line);
        self.execute_command(&command);
    }

    pub fn execute_command(&mut self, command: &str) {
        let command = command.trim();
        if command.is_empty() {
            return;
        }
        self.log.command(command);
        match self.runner.execute(command, &self.root) {
            Ok(_) => self.run_started_at = Some(Local::now()),
            Err(error) => self.report(error),
        }
    }

    pub fn run_quick(&mut self, index: usize) {
        if let Some(command) = self.quick_commands().get(index).cloned() {
            self.execute_command(&command);
        }
    }

    pub fn begin_quick_pick(&mut self) {
        let count = self.quick_commands().len();
        if count == 0 {
            self.log.error("No quick commands configured");
            return;
        }
        self.begin_prompt(PromptKind::QuickCommand { count });
    }

    /// Runs the quick command with the given 1-based number.
    fn run_quick_by_number(&mut self, input: &str) {
        let count = self.quick_commands().len();
        match input.trim().parse::<usize>() {
            Ok(number) if (1..=count).contains(&number) => self.run_quick(number - 1),
            _ => self
                .log
                .error(format!("No quick command {:?} (choose 1-{count})", input.trim())),
        }
    }

    /// Saves the active file and runs it with `node`.
    pub fn run_active_file(&mut self) {
        let Some(id) = self.active else {
            self.log.error("No file open to run");
            return;
        };
        if !self.save_session(id) {
            return;
        }
        let Some(path) = self.sessions.get(id).map(|session| session.path().to_path_buf()) else {
            return;
        };
        let relative = path.strip_prefix(&self.root).unwrap_or(&path);
        let command = format!("node {}", quote_arg(&relative.to_string_lossy()));
        self.execute_command(&command);
    }

    /// A process that already exited is left for `tick` to report.
    pub fn stop_command(&mut self) {
        if self.runner.stop() == StopOutcome::NotRunning && !self.runner.is_running() {
            self.log.error("No process running");
        }
    }

    pub fn clear_terminal(&mut self) {
        self.log.clear();
        self.log.success("Terminal cleared");
    }

    pub fn create_file(&mut self, name: &str) {
        let dir = self.explorer.target_dir(&self.root);
        match create_file(&dir, name) {
            Ok(path) => {
                self.log.success(format!("Created: {}", display_name(&path)));
                self.refresh();
                self.open_path(&path);
            }
            Err(error) => self.report(error),
        }
    }

    pub fn create_folder(&mut self, name: &str) {
        let dir = self.explorer.target_dir(&self.root);
        match create_folder(&dir, name) {
            Ok(path) => {
                self.log
                    .success(format!("Created folder: {}", display_name(&path)));
                self.refresh();
            }
            Err(error) => self.report(error),
        }
    }

    fn selected_path(&mut self) -> Option<PathBuf> {
        let path = self.explorer.selected().map(|row| row.path.clone());
        if path.is_none() {
            self.log.error("No file selected");
        }
        path
    }

    pub fn delete_path(&mut self, path: &Path) {
        if path == self.root {
            self.log.error("Cannot delete the working directory");
            return;
        }
        if let Err(error) = delete_entry(path) {
            self.report(error);
            return;
        }
        let evicted = self.sessions.remove(path);
        if self.active.is_some_and(|id| evicted.contains(&id)) {
            self.active = self.sessions.ids().first().copied();
        }
        self.log.success(format!("Deleted: {}", display_name(path)));
        self.refresh();
    }

    pub fn rename_path(&mut self, path: &Path, new_name: &str) {
        if path == self.root {
            self.log.error("Cannot rename the working directory");
            return;
        }
        match rename_entry(path, new_name) {
            Ok(target) => {
                self.sessions.rename(path, &target);
                self.log
                    .success(format!("Renamed to: {}", display_name(&target)));
                self.refresh();
            }
            Err(error) => self.report(error),
        }
    }

    pub fn begin_prompt(&mut self, kind: PromptKind) {
        let input = match &kind {
            PromptKind::NewFile => "newfile.js".to_string(),
            PromptKind::Rename(path) => display_name(path),
            PromptKind::ChangeDir => self.root.to_string_lossy().to_string(),
            PromptKind::NewFolder
            | PromptKind::ConfirmDelete(_)
            | PromptKind::QuickCommand { .. } => String::new(),
        };
        self.prompt = Some(Prompt { kind, input });
    }

    /// Opens the prompt for an action on the selected explorer row.
    pub fn begin_selected_prompt(&mut self, make: fn(PathBuf) -> PromptKind) {
        if let Some(path) = self.selected_path() {
            self.begin_prompt(make(path));
        }
    }

    pub fn push_prompt_char(&mut self, ch: char) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.input.push(ch);
        }
    }

    pub fn pop_prompt_char(&mut self) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.input.pop();
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn submit_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        match prompt.kind {
            PromptKind::NewFile => self.create_file(&prompt.input),
            PromptKind::NewFolder => self.create_folder(&prompt.input),
            PromptKind::Rename(path) => self.rename_path(&path, &prompt.input),
            PromptKind::ChangeDir => self.change_root(Path::new(prompt.input.trim())),
            PromptKind::ConfirmDelete(path) => self.delete_path(&path),
            PromptKind::QuickCommand { .. } => self.run_quick_by_number(&prompt.input),
        }
    }

    fn report(&mut self, error: AppError) {
        tracing::warn!(%error, "operation failed");
        self.log.error(error.to_string());
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn neighbour(ids: &[SessionId], index: usize) -> Option<SessionId> {
    ids.get(index)
        .or_else(|| index.checked_sub(1).and_then(|previous| ids.get(previous)))
        .copied()
}

/// Quotes `arg` for the platform shell. Words made only of path-safe
/// characters are left bare.
fn quote_arg(arg: &str) -> String {
    let safe = |ch: char| ch.is_ascii_alphanumeric() || "_./-@+,:".contains(ch);
    if !arg.is_empty() && arg.chars().all(safe) {
        return arg.to_string();
    }
    shell_quote(arg)
}

#[cfg(not(target_os = "windows"))]
fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', "'\\''"))
}

#[cfg(target_os = "windows")]
fn shell_quote(arg: &str) -> String {
    format!("\"{}\"", arg.replace('"', "\"\""))
}
