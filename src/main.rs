// Entrypoint for the CLI application.
// - With no push flags, runs the interactive wizard; otherwise broadcasts
//   the push described by the flags.
// - Exits non-zero if any push failed.

use anyhow::bail;
use clap::Parser;
use pushbullet_cli::api::ApiClient;
use pushbullet_cli::cli::{run_non_interactive, Cli};
use pushbullet_cli::config::{default_config_path, Config};
use pushbullet_cli::dispatch::{failures, report};
use pushbullet_cli::ui::run_interactive;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so prompts and the push report stay readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pushbullet_cli=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = Config::load(&config_path);

    // Base URL comes from `PUSHBULLET_API_URL`, see `ApiClient::from_env`.
    let api = ApiClient::from_env()?;

    let outcomes = if cli.is_interactive() {
        run_interactive(&api, &mut config, &config_path)?
    } else {
        run_non_interactive(&api, &config, &cli)?
    };

    report(&outcomes);
    let failed = failures(&outcomes);
    if failed > 0 {
        bail!("{failed} of {} pushes failed", outcomes.len());
    }
    Ok(())
}
