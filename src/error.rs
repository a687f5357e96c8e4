use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot save {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot delete {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot start `{command}`: {source}")]
    ProcessSpawn {
        command: String,
        source: std::io::Error,
    },
    #[error("a process is already running")]
    CommandBusy,
    #[error("empty command")]
    EmptyCommand,
    #[error("invalid name: {0:?}")]
    InvalidName(String),
    #[error("not a directory: {}", .0.display())]
    InvalidWorkingDir(PathBuf),
    #[error("unknown editor session")]
    UnknownSession,
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_names_path() {
        let error = AppError::Read {
            path: PathBuf::from("/tmp/a.js"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };

        assert_eq!(error.to_string(), "cannot read /tmp/a.js: missing");
    }

    #[test]
    fn rename_error_names_both_paths() {
        let error = AppError::Rename {
            from: PathBuf::from("a.js"),
            to: PathBuf::from("b.js"),
            source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "exists"),
        };

        assert_eq!(error.to_string(), "cannot rename a.js to b.js: exists");
    }
}
