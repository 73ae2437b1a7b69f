//! CLI entry point for wallabag-dl.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use wallabag_core::auth::default_token_path;
use wallabag_core::config::load_config;
use wallabag_core::{ApiClient, ClientSettings, FileTokenStore, ReqwestSender};

mod cli;
mod commands;
mod credentials;

use cli::{Args, Command};
use credentials::ConsoleCredentials;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = load_config(args.config.as_deref()).context("cannot load configuration")?;
    let token_path = args.token_file.clone().unwrap_or_else(default_token_path);
    debug!(url = %config.base_url, token_file = %token_path.display(), "configuration loaded");

    let sender = ReqwestSender::new(ClientSettings::default()).context("cannot build HTTP client")?;
    let mut client = ApiClient::new(
        config,
        Box::new(sender),
        Box::new(FileTokenStore::new(token_path)),
        Box::new(ConsoleCredentials::from_env()),
    );

    authenticate(&mut client).await?;

    match args.command() {
        Command::Export(export) => {
            commands::run_export_command(&mut client, &export, args.quiet).await
        }
        Command::List(filter) => {
            commands::run_list_command(&mut client, &filter).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Show(show) => {
            commands::run_show_command(&mut client, &show).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Obtains a token up front so credential prompts happen before any output.
///
/// A token that was obtained but could not be cached is still usable for
/// this run.
async fn authenticate(client: &mut ApiClient) -> Result<()> {
    match client.auth_header().await {
        Ok(_) => {
            info!(url = %client.base_url(), "authenticated");
            Ok(())
        }
        Err(error) if error.is_persist() => {
            warn!(error = %error, "token obtained but not cached; continuing");
            Ok(())
        }
        Err(error) => Err(error).context("authentication failed"),
    }
}
