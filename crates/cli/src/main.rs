mod cli;
mod commands;
mod local;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;

use schedkit_core::config::{self, Config};

use crate::cli::{CliArgs, Command};

fn print_json(report: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    config::load_dotenv();
    let args = CliArgs::parse();

    let config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    config.log_summary();

    match args.command {
        Command::Normalize {
            request,
            now,
            fires,
        } => {
            let report = commands::normalize(&config, &request, now.unwrap_or_else(Utc::now), fires)?;
            print_json(&report)
        }
        Command::Check {
            request,
            blockouts,
            at,
        } => {
            let report = commands::check(
                &config,
                request.as_deref(),
                &blockouts,
                at.unwrap_or_else(Utc::now),
            )?;
            print_json(&report)
        }
        Command::ResolveOutput {
            request,
            owner,
            root,
            settings,
        } => {
            let report =
                commands::resolve_output(&config, &request, &owner, &root, settings.as_deref())?;
            print_json(&report)
        }
    }
}
