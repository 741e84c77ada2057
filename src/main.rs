// Entrypoint for the CLI application.
// - Keeps `main` small: capture the API key, build one API client and hand
//   a session to the UI flow.
// - Every failure ends up on the console; the process always waits for a
//   final keypress and exits normally.

use clap::Parser;
use log::{error, LevelFilter};

use viewengine_cli::api::{ApiClient, ClientConfig};
use viewengine_cli::error::ConfigError;
use viewengine_cli::logging::{self, LogDestination};
use viewengine_cli::poll::PollConfig;
use viewengine_cli::ui;
use viewengine_cli::workflow::Session;

/// Demo client for the ViewEngine retrieval API.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// API key sent as `X-API-Key`; prompted for when omitted.
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::initialize(LogDestination::File, LevelFilter::Info);
    let cli = Cli::parse();

    ui::print_banner();

    let api_key = match cli.api_key {
        Some(key) => key,
        None => ui::prompt_api_key()?,
    };

    let client = match ApiClient::new(&api_key, &ClientConfig::default()) {
        Ok(client) => client,
        Err(ConfigError::MissingApiKey) => {
            ui::print_usage();
            return Ok(());
        }
        Err(err) => {
            println!("❌ Error: {err}");
            return Ok(());
        }
    };

    let session = Session::new(client, PollConfig::default());
    if let Err(err) = ui::run_demo(&session).await {
        error!("workflow aborted: {err:#}");
        println!("❌ Error: {err}");
        println!();
        println!("Stack trace:");
        println!("{err:?}");
    }

    ui::wait_for_keypress()?;
    Ok(())
}
