use std::collections::HashMap;
use std::path::{Path, PathBuf};

use slotmap::{SlotMap, new_key_type};

use crate::error::{AppError, AppResult};

new_key_type! { pub struct SessionId; }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    path: PathBuf,
    buffer: String,
    dirty: bool,
    cursor: usize,
}

impl EditorSession {
    fn new(path: PathBuf, buffer: String) -> Self {
        Self {
            path,
            buffer,
            dirty: false,
            cursor: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn title(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Zero-based line and column (in chars) of the cursor.
    pub fn cursor_position(&self) -> (usize, usize) {
        let line = self.buffer[..self.cursor].matches('\n').count();
        let column = self.buffer[self.line_start()..self.cursor].chars().count();
        (line, column)
    }

    pub fn insert_char(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        self.dirty = true;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn delete_backward(&mut self) {
        let Some(previous) = self.buffer[..self.cursor].chars().next_back() else {
            return;
        };
        let start = self.cursor - previous.len_utf8();
        self.buffer.replace_range(start..self.cursor, "");
        self.cursor = start;
        self.dirty = true;
    }

    pub fn move_left(&mut self) {
        if let Some(previous) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= previous.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.buffer[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_line_start(&mut self) {
        self.cursor = self.line_start();
    }

    pub fn move_line_end(&mut self) {
        self.cursor = self.line_end();
    }

    pub fn move_up(&mut self) {
        let start = self.line_start();
        if start == 0 {
            return;
        }
        let column = self.buffer[start..self.cursor].chars().count();
        let previous_end = start - 1;
        let previous_start = self.buffer[..previous_end]
            .rfind('\n')
            .map(|index| index + 1)
            .unwrap_or(0);
        self.cursor = self.offset_for_column(previous_start, previous_end, column);
    }

    pub fn move_down(&mut self) {
        let end = self.line_end();
        if end == self.buffer.len() {
            return;
        }
        let column = self.buffer[self.line_start()..self.cursor].chars().count();
        let next_start = end + 1;
        let next_end = self.buffer[next_start..]
            .find('\n')
            .map(|index| next_start + index)
            .unwrap_or(self.buffer.len());
        self.cursor = self.offset_for_column(next_start, next_end, column);
    }

    fn line_start(&self) -> usize {
        self.buffer[..self.cursor]
            .rfind('\n')
            .map(|index| index + 1)
            .unwrap_or(0)
    }

    fn line_end(&self) -> usize {
        self.buffer[self.cursor..]
            .find('\n')
            .map(|index| self.cursor + index)
            .unwrap_or(self.buffer.len())
    }

    fn offset_for_column(&self, start: usize, end: usize, column: usize) -> usize {
        self.buffer[start..end]
            .char_indices()
            .nth(column)
            .map(|(index, _)| start + index)
            .unwrap_or(end)
    }
}

#[derive(Debug)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub result: AppResult<()>,
}

/// Open editor buffers keyed by absolute path, kept in tab order.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: SlotMap<SessionId, EditorSession>,
    by_path: HashMap<PathBuf, SessionId>,
    order: Vec<SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, path: &Path) -> AppResult<SessionId> {
        let path = std::path::absolute(path).map_err(|source| AppError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(id) = self.by_path.get(&path) {
            return Ok(*id);
        }
        let buffer = read_text(&path)?;
        let id = self.sessions.insert(EditorSession::new(path.clone(), buffer));
        self.by_path.insert(path, id);
        self.order.push(id);
        Ok(id)
    }

    pub fn save(&mut self, id: SessionId) -> AppResult<()> {
        let session = self.sessions.get_mut(id).ok_or(AppError::UnknownSession)?;
        std::fs::write(&session.path, &session.buffer).map_err(|source| AppError::Write {
            path: session.path.clone(),
            source,
        })?;
        session.dirty = false;
        Ok(())
    }

    pub fn save_all(&mut self) -> Vec<SaveOutcome> {
        let ids = self.order.clone();
        ids.into_iter()
            .map(|id| {
                let path = self
                    .sessions
                    .get(id)
                    .map(|session| session.path.clone())
                    .unwrap_or_default();
                let result = self.save(id);
                SaveOutcome { path, result }
            })
            .collect()
    }

    /// Drops the session without writing it.
    pub fn close(&mut self, id: SessionId) -> Option<EditorSession> {
        let session = self.sessions.remove(id)?;
        self.by_path.remove(&session.path);
        self.order.retain(|candidate| *candidate != id);
        Some(session)
    }

    /// Evicts every session at or beneath `path`.
    pub fn remove(&mut self, path: &Path) -> Vec<SessionId> {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let evicted: Vec<SessionId> = self
            .order
            .iter()
            .copied()
            .filter(|id| {
                self.sessions
                    .get(*id)
                    .is_some_and(|session| session.path.starts_with(&path))
            })
            .collect();
        for id in &evicted {
            self.close(*id);
        }
        evicted
    }

    /// Re-keys sessions at or beneath `from` so they save under `to`.
    pub fn rename(&mut self, from: &Path, to: &Path) {
        let from = std::path::absolute(from).unwrap_or_else(|_| from.to_path_buf());
        let to = std::path::absolute(to).unwrap_or_else(|_| to.to_path_buf());
        for id in self.order.clone() {
            let Some(session) = self.sessions.get_mut(id) else {
                continue;
            };
            let Ok(rest) = session.path.strip_prefix(&from) else {
                continue;
            };
            let renamed = if rest.as_os_str().is_empty() {
                to.clone()
            } else {
                to.join(rest)
            };
            self.by_path.remove(&session.path);
            session.path = renamed.clone();
            self.by_path.insert(renamed, id);
        }
    }

    pub fn find(&self, path: &Path) -> Option<SessionId> {
        let path = std::path::absolute(path).ok()?;
        self.by_path.get(&path).copied()
    }

    pub fn get(&self, id: SessionId) -> Option<&EditorSession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut EditorSession> {
        self.sessions.get_mut(id)
    }

    pub fn ids(&self) -> &[SessionId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn dirty_count(&self) -> usize {
        self.sessions.values().filter(|session| session.dirty).count()
    }
}

fn read_text(path: &Path) -> AppResult<String> {
    let bytes = std::fs::read(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| AppError::Read {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, "not valid UTF-8 text"),
    })
}
