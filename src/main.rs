mod app;
mod cli;
mod config;
mod core;
mod error;
mod explorer;
mod logging;
mod ui;

use std::process::ExitCode;

use crate::{
    app::{App, resolve_start_dir},
    cli::Command,
    config::Config,
};

fn main() -> ExitCode {
    let dir = match cli::parse_args(std::env::args()) {
        Ok(Command::RunTui { dir }) => dir,
        Ok(Command::Version) => {
            println!("{}", cli::version_line(env!("CARGO_PKG_VERSION")));
            return ExitCode::SUCCESS;
        }
        Ok(Command::Help) => {
            println!("{}", cli::usage());
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            eprintln!("{}", cli::render_error(&error));
            eprintln!("{}", cli::usage());
            return ExitCode::from(2);
        }
    };

    let logging = logging::init();
    let config = Config::load();
    let result = resolve_start_dir(dir, &config)
        .and_then(|root| App::new(root, config))
        .and_then(|mut app| {
            if let Some(guard) = &logging {
                app.notice(format!("Logs: {}", guard.log_dir().display()));
            }
            ui::run(app)
        });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "nodedesk exited with an error");
            eprintln!("nd: {error}");
            ExitCode::FAILURE
        }
    }
}
