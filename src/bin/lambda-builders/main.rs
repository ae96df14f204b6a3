//! Lambda Builders CLI - serves one build request per invocation

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lambda_builders::protocol::{serve, ProtocolHandler};
use lambda_builders::util::config::{load_config, Config};
use lambda_builders::util::os::SystemOs;
use lambda_builders::Registry;

mod cli;

use cli::{Cli, LOG_ENV};

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let (config, config_error) = match load_config(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // stdout carries the response, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&cli, &config))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Some(e) = config_error {
        tracing::warn!("Failed to load config, using defaults: {:#}", e);
    }

    let handler = ProtocolHandler::new(
        Registry::with_builtin_workflows(),
        Arc::new(SystemOs::new()),
    )
    .with_search_paths(config.resolve.executable_search_paths);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(cli.request, stdin.lock(), stdout.lock(), &handler)
        .context("failed to write response")
}

/// `LAMBDA_BUILDERS_LOG` wins, then `--verbose`, then the config file.
fn log_filter(cli: &Cli, config: &Config) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    if cli.verbose {
        return EnvFilter::new("lambda_builders=debug");
    }
    config
        .log
        .level
        .as_deref()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("lambda_builders=info"))
}
