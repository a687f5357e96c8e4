use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RunTui { dir: Option<PathBuf> },
    Version,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    UnknownOption(String),
    UnexpectedArgument(String),
}

pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = args.into_iter();
    let _ = iter.next();
    let mut dir = None;
    for arg in iter {
        match arg.as_str() {
            "--version" | "-V" => return Ok(Command::Version),
            "--help" | "-h" => return Ok(Command::Help),
            option if option.starts_with('-') && option != "-" => {
                return Err(CliError::UnknownOption(option.to_string()));
            }
            value => {
                if dir.is_some() {
                    return Err(CliError::UnexpectedArgument(value.to_string()));
                }
                dir = Some(PathBuf::from(value));
            }
        }
    }
    Ok(Command::RunTui { dir })
}

pub fn usage() -> &'static str {
    "Usage:\n  nd [DIR]\n  nd --version\n  nd --help"
}

pub fn render_error(error: &CliError) -> String {
    match error {
        CliError::UnknownOption(option) => format!("unknown option: {option}"),
        CliError::UnexpectedArgument(value) => format!("unexpected argument: {value}"),
    }
}

fn build_version_tag() -> Option<&'static str> {
    option_env!("ND_BUILD_VERSION").and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

fn version_tag_for_output(cargo_version: &str, build_tag: Option<&str>) -> String {
    match build_tag {
        Some(tag) => tag.to_string(),
        None => cargo_version.to_string(),
    }
}

pub fn version_line(cargo_version: &str) -> String {
    let tag = version_tag_for_output(cargo_version, build_version_tag());
    format!("nd {tag}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_args_defaults_to_tui_without_dir() {
        let command = parse_args(args(&["nd"])).unwrap();

        assert_eq!(command, Command::RunTui { dir: None });
    }

    #[test]
    fn parse_args_reads_directory() {
        let command = parse_args(args(&["nd", "projects/app"])).unwrap();

        assert_eq!(
            command,
            Command::RunTui {
                dir: Some(PathBuf::from("projects/app"))
            }
        );
    }

    #[test]
    fn parse_args_reads_version_and_help() {
        assert_eq!(parse_args(args(&["nd", "-V"])).unwrap(), Command::Version);
        assert_eq!(parse_args(args(&["nd", "--help"])).unwrap(), Command::Help);
    }

    #[test]
    fn parse_args_rejects_unknown_option() {
        let error = parse_args(args(&["nd", "--verbose"])).unwrap_err();

        assert_eq!(error, CliError::UnknownOption("--verbose".to_string()));
        assert_eq!(render_error(&error), "unknown option: --verbose");
    }

    #[test]
    fn parse_args_rejects_second_directory() {
        let error = parse_args(args(&["nd", "one", "two"])).unwrap_err();

        assert_eq!(error, CliError::UnexpectedArgument("two".to_string()));
    }

    #[test]
    fn version_line_prefers_build_tag() {
        assert_eq!(version_tag_for_output("0.1.0", Some("v1.2.3")), "v1.2.3");
        assert_eq!(version_tag_for_output("0.1.0", None), "0.1.0");
    }
}
