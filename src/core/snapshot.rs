use std::cmp::Ordering;
use std::path::{Path, PathBuf};

pub const DEFAULT_IGNORED: &[&str] = &["node_modules"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub children: Vec<DirectoryEntry>,
}

impl DirectoryEntry {
    pub fn find(&self, path: &Path) -> Option<&DirectoryEntry> {
        if self.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    pub fn file_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| if child.is_dir { child.file_count() } else { 1 })
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFilter {
    ignored: Vec<String>,
}

impl EntryFilter {
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ignored: Vec<String> = DEFAULT_IGNORED.iter().map(|name| name.to_string()).collect();
        for name in extra {
            let name = name.into();
            if !name.is_empty() && !ignored.contains(&name) {
                ignored.push(name);
            }
        }
        Self { ignored }
    }

    pub fn is_visible(&self, name: &str) -> bool {
        !name.starts_with('.') && !self.ignored.iter().any(|ignored| ignored == name)
    }
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

/// Walks `root` and returns a fresh tree. Directories that cannot be read
/// contribute no children. Symlinked directories are followed unless they
/// lead back into one of their own ancestors.
pub fn snapshot(root: &Path, filter: &EntryFilter) -> DirectoryEntry {
    let name = root
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| root.to_string_lossy().to_string());
    let mut ancestors = Vec::new();
    DirectoryEntry {
        name,
        path: root.to_path_buf(),
        is_dir: true,
        children: read_children(root, filter, &mut ancestors),
    }
}

fn read_children(
    dir: &Path,
    filter: &EntryFilter,
    ancestors: &mut Vec<PathBuf>,
) -> Vec<DirectoryEntry> {
    let real = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    if ancestors.contains(&real) {
        tracing::debug!(dir = %dir.display(), "skipping symlink cycle");
        return Vec::new();
    }
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(error) => {
            tracing::debug!(dir = %dir.display(), %error, "skipping unreadable directory");
            return Vec::new();
        }
    };
    ancestors.push(real);
    let mut children = Vec::new();
    for entry in read_dir.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if !filter.is_visible(&name) {
            continue;
        }
        let path = entry.path();
        // Broken links report an error here and list as files.
        let is_dir = std::fs::metadata(&path).is_ok_and(|metadata| metadata.is_dir());
        let grandchildren = if is_dir {
            read_children(&path, filter, ancestors)
        } else {
            Vec::new()
        };
        children.push(DirectoryEntry {
            name,
            path,
            is_dir,
            children: grandchildren,
        });
    }
    ancestors.pop();
    children.sort_by(compare_entries);
    children
}

fn compare_entries(left: &DirectoryEntry, right: &DirectoryEntry) -> Ordering {
    right
        .is_dir
        .cmp(&left.is_dir)
        .then_with(|| left.name.to_lowercase().cmp(&right.name.to_lowercase()))
        .then_with(|| left.name.cmp(&right.name))
}
