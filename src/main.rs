// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, then hand config loading, the API
//   client and the terminal presenter to `app::launch`.
// - Fatal errors are printed once and turn into exit code 1. Partial batch
//   failures are part of the summary and still exit 0, and so does Ctrl-C
//   at a prompt.

use anyhow::Context;
use crossterm::style::Stylize;
use follow_sync::api::GitHubClient;
use follow_sync::app::launch;
use follow_sync::config::Config;
use follow_sync::error::SyncError;
use follow_sync::ui::{Presenter, TerminalPresenter};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Logs go to stderr; `RUST_LOG=debug` shows every request.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let err = match run() {
        Ok(()) => return ExitCode::SUCCESS,
        Err(err) => err,
    };
    match err.downcast_ref::<SyncError>() {
        Some(cause) if cause.is_interrupted() => {
            println!("\n{}", "Interrupted.".dim());
            ExitCode::SUCCESS
        }
        // Context line plus the typed cause, without its source chain.
        Some(cause) => {
            eprintln!("{} {}: {}", "❌".red(), err, cause);
            ExitCode::FAILURE
        }
        None => {
            eprintln!("{} {:#}", "❌".red(), err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let presenter = TerminalPresenter::new();
    presenter.intro();

    launch(Config::from_env, GitHubClient::new, presenter)
        .context("Follow sync stopped")?;
    Ok(())
}
