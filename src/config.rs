use std::path::{Path, PathBuf};

use crate::core::DEFAULT_SCROLLBACK;

pub const DEFAULT_QUICK_COMMANDS: &[&str] =
    &["node --version", "npm --version", "npm init -y", "npm install"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub default_dir: Option<PathBuf>,
    pub ignored_names: Vec<String>,
    pub quick_commands: Vec<String>,
    pub terminal_scrollback: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_dir: None,
            ignored_names: Vec::new(),
            quick_commands: DEFAULT_QUICK_COMMANDS
                .iter()
                .map(|command| command.to_string())
                .collect(),
            terminal_scrollback: DEFAULT_SCROLLBACK,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        tracing::info!(path = %path.display(), "loaded config");
        parse_config(&content)
    }
}

fn parse_config(content: &str) -> Config {
    let mut config = Config::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let Some(value) = parse_string_value(value) else {
            continue;
        };
        match key.trim() {
            "default_dir" => config.default_dir = Some(expand_home(&value)),
            "ignored_names" => config.ignored_names = split_list(&value, ','),
            "quick_commands" => {
                let commands = split_list(&value, '|');
                if !commands.is_empty() {
                    config.quick_commands = commands;
                }
            }
            "terminal_scrollback" => match value.parse::<usize>() {
                Ok(lines) if lines > 0 => config.terminal_scrollback = lines,
                _ => tracing::warn!(%value, "ignoring invalid terminal_scrollback"),
            },
            other => tracing::debug!(key = other, "ignoring unknown config key"),
        }
    }
    config
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_string_value(value: &str) -> Option<String> {
    let mut raw = value.trim();
    if let Some(index) = raw.find(" #") {
        raw = raw[..index].trim();
    }
    if raw.is_empty() {
        return None;
    }
    let unquoted = if raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')))
    {
        &raw[1..raw.len() - 1]
    } else {
        raw
    };
    let normalized = unquoted.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if value == "~" => home_dir().unwrap_or_else(|| PathBuf::from(value)),
        _ => PathBuf::from(value),
    }
}

pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

fn config_root() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| home_dir().map(|home| home.join(".config")))
}

fn config_path() -> Option<PathBuf> {
    config_root().map(|base| base.join(Path::new("nodedesk").join("config.toml")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config_reads_all_keys() {
        let config = parse_config(
            r#"
# project defaults
default_dir = "/work/app"
ignored_names = "dist, coverage"
quick_commands = "npm test | npm run lint"
terminal_scrollback = 200
"#,
        );

        assert_eq!(config.default_dir, Some(PathBuf::from("/work/app")));
        assert_eq!(config.ignored_names, vec!["dist", "coverage"]);
        assert_eq!(config.quick_commands, vec!["npm test", "npm run lint"]);
        assert_eq!(config.terminal_scrollback, 200);
    }

    #[test]
    fn parse_config_falls_back_on_bad_values() {
        let config = parse_config("terminal_scrollback = lots\nquick_commands = \" | \"\nnope");

        assert_eq!(config, Config::default());
    }

    #[test]
    fn parse_string_value_strips_comments_and_quotes() {
        let value = parse_string_value(" 'npm start' # comment").unwrap();

        assert_eq!(value, "npm start");
    }

    #[test]
    fn default_quick_commands_cover_node_and_npm() {
        let config = Config::default();

        assert_eq!(config.quick_commands.len(), 4);
        assert_eq!(config.quick_commands[0], "node --version");
        assert_eq!(config.quick_commands[3], "npm install");
    }
}
