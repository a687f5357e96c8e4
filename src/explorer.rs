use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::DirectoryEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExplorerRow {
    pub(crate) depth: usize,
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    pub(crate) is_dir: bool,
    pub(crate) expanded: bool,
}

/// Visible rows of the latest snapshot. The root row is always expanded.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExplorerState {
    tree: Option<DirectoryEntry>,
    expanded: HashSet<PathBuf>,
    rows: Vec<ExplorerRow>,
    cursor: usize,
}

impl ExplorerState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn rows(&self) -> &[ExplorerRow] {
        &self.rows
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Swaps in a new snapshot, keeping expansion and the selected path when
    /// they still exist.
    pub(crate) fn set_tree(&mut self, tree: DirectoryEntry) {
        let selected = self.selected().map(|row| row.path.clone());
        self.expanded.retain(|path| tree.find(path).is_some());
        self.tree = Some(tree);
        self.rebuild();
        self.cursor = selected
            .and_then(|path| self.rows.iter().position(|row| row.path == path))
            .unwrap_or(0);
    }

    pub(crate) fn selected(&self) -> Option<&ExplorerRow> {
        self.rows.get(self.cursor)
    }

    pub(crate) fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub(crate) fn move_down(&mut self) {
        if self.cursor + 1 < self.rows.len() {
            self.cursor += 1;
        }
    }

    pub(crate) fn toggle(&mut self, path: &Path) {
        let is_root = self.tree.as_ref().is_some_and(|tree| tree.path == path);
        if is_root {
            return;
        }
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_path_buf());
        }
        self.rebuild();
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }

    /// Directory that new entries should be created in.
    pub(crate) fn target_dir(&self, root: &Path) -> PathBuf {
        match self.selected() {
            Some(row) if row.is_dir => row.path.clone(),
            Some(row) => row
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            None => root.to_path_buf(),
        }
    }

    fn rebuild(&mut self) {
        let mut rows = Vec::new();
        if let Some(tree) = &self.tree {
            rows.push(ExplorerRow {
                depth: 0,
                name: tree.name.clone(),
                path: tree.path.clone(),
                is_dir: true,
                expanded: true,
            });
            push_rows(&tree.children, 1, &self.expanded, &mut rows);
        }
        self.rows = rows;
    }
}

fn push_rows(
    entries: &[DirectoryEntry],
    depth: usize,
    expanded: &HashSet<PathBuf>,
    rows: &mut Vec<ExplorerRow>,
) {
    for entry in entries {
        let is_expanded = entry.is_dir && expanded.contains(&entry.path);
        rows.push(ExplorerRow {
            depth,
            name: entry.name.clone(),
            path: entry.path.clone(),
            is_dir: entry.is_dir,
            expanded: is_expanded,
        });
        if is_expanded {
            push_rows(&entry.children, depth + 1, expanded, rows);
        }
    }
}
