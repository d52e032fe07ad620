#![allow(missing_docs)]

//! `outreach` binary: HTTP server and one-shot serverless event runner.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use outreach::config::{load_config, Config};
use outreach::credentials::{load_dotenv, load_dotenv_from, Credentials};
use outreach::lambda::{handle_event, LambdaEvent};
use outreach::pipeline::EmailPipeline;

#[derive(Parser)]
#[command(
    name = "outreach",
    version,
    about = "Personalized cold-email drafts from company research"
)]
struct Cli {
    /// Config file (defaults to $OUTREACH_CONFIG_PATH or ./outreach.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Credentials file loaded before resolving secrets (defaults to ./.env).
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve campaign requests over HTTP.
    Serve {
        /// Listen address, overriding config.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run one serverless event and print the response envelope.
    Invoke {
        /// Event JSON file; stdin when omitted.
        #[arg(long)]
        event: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = outreach::logging::bootstrap(|| -> Result<Config> {
        match &cli.env_file {
            Some(path) => load_dotenv_from(path)?,
            None => load_dotenv()?,
        }
        match &cli.config {
            Some(path) => load_config(path),
            None => Config::load().context("failed to load configuration"),
        }
    })?;

    let _guard = outreach::logging::init(&config.logging)?;

    let credentials = Credentials::from_env(&config)?;
    let pipeline = EmailPipeline::from_config(&config, credentials).await?;

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let addr = config.bind_addr()?;
            info!(version = env!("CARGO_PKG_VERSION"), "outreach starting");
            outreach::server::run_server(pipeline, addr).await
        }
        Command::Invoke { event } => {
            let raw = match event {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read event {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read event from stdin")?;
                    buf
                }
            };
            let event: LambdaEvent =
                serde_json::from_str(&raw).context("event is not valid JSON")?;
            let response = handle_event(&pipeline, &event).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}
