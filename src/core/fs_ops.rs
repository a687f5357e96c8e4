use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

pub fn validate_name(name: &str) -> AppResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains('/')
        || trimmed.contains(std::path::MAIN_SEPARATOR)
    {
        return Err(AppError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

pub fn create_file(dir: &Path, name: &str) -> AppResult<PathBuf> {
    let path = dir.join(validate_name(name)?);
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|source| AppError::Create {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

pub fn create_folder(dir: &Path, name: &str) -> AppResult<PathBuf> {
    let path = dir.join(validate_name(name)?);
    std::fs::create_dir(&path).map_err(|source| AppError::Create {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Removes a file, or a directory with everything beneath it.
pub fn delete_entry(path: &Path) -> AppResult<()> {
    let metadata = std::fs::symlink_metadata(path).map_err(|source| AppError::Delete {
        path: path.to_path_buf(),
        source,
    })?;
    let result = if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|source| AppError::Delete {
        path: path.to_path_buf(),
        source,
    })
}

pub fn rename_entry(path: &Path, new_name: &str) -> AppResult<PathBuf> {
    let new_name = validate_name(new_name)?;
    let target = path
        .parent()
        .map(|parent| parent.join(new_name))
        .unwrap_or_else(|| PathBuf::from(new_name));
    let rename_error = |source| AppError::Rename {
        from: path.to_path_buf(),
        to: target.clone(),
        source,
    };
    if target != path && target.symlink_metadata().is_ok() {
        return Err(rename_error(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "target already exists",
        )));
    }
    std::fs::rename(path, &target).map_err(rename_error)?;
    Ok(target)
}
