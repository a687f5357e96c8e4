use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub working_dir: PathBuf,
    pub raw_command: String,
}

impl ShellCommand {
    pub fn new(working_dir: &Path, raw_command: &str) -> AppResult<Self> {
        let raw_command = raw_command.trim();
        if raw_command.is_empty() {
            return Err(AppError::EmptyCommand);
        }
        Ok(Self {
            working_dir: working_dir.to_path_buf(),
            raw_command: raw_command.to_string(),
        })
    }

    /// Host shell invocation with both output pipes captured and stdin closed.
    pub fn build(&self) -> Command {
        let mut command = Command::new(HostShell::path());
        command
            .args(HostShell::args(&self.raw_command))
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

struct HostShell;

impl HostShell {
    fn path() -> &'static str {
        default_shell_path()
    }

    fn args(command: &str) -> Vec<String> {
        default_shell_args(command)
    }
}

#[cfg(target_os = "windows")]
fn default_shell_path() -> &'static str {
    "cmd.exe"
}

#[cfg(target_os = "windows")]
fn default_shell_args(command: &str) -> Vec<String> {
    vec!["/C".to_string(), command.to_string()]
}

#[cfg(not(target_os = "windows"))]
fn default_shell_path() -> &'static str {
    "sh"
}

#[cfg(not(target_os = "windows"))]
fn default_shell_args(command: &str) -> Vec<String> {
    vec!["-c".to_string(), command.to_string()]
}
