use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use schema_push::{
    config::{AppConfig, Overrides},
    logging::{self, LogFormat},
    report::Reporter,
    rpc::RpcExecutor,
    run::{push_file, RunOptions},
    upstream::{build_service_client, probe_connection},
};
use tracing::info;

/// Push a SQL script to a hosted database, one statement at a time.
///
/// SERVICE_URL and SERVICE_KEY must be set in the environment (or in
/// config/app.env / .env).
#[derive(Parser, Debug)]
#[command(name = "schema-push", version)]
struct Cli {
    /// SQL file to push (overrides SQL_FILE)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Service base URL (overrides SERVICE_URL)
    #[arg(short, long)]
    url: Option<String>,

    /// Remote procedure that executes SQL (overrides RPC_FUNCTION)
    #[arg(long)]
    function: Option<String>,

    /// Check that the service answers before sending anything
    #[arg(long)]
    check_connection: bool,

    /// Send every statement with its trailing semicolon
    #[arg(long)]
    append_semicolon: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::from_filename("config/app.env");
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init_logging(
        LogFormat::from_env(),
        if cli.debug { "debug" } else { "info" },
    );

    let overrides = Overrides {
        sql_file: cli.file,
        service_url: cli.url,
        rpc_function: cli.function,
        check_connection: cli.check_connection,
        append_semicolon: cli.append_semicolon,
    };
    let cfg = AppConfig::from_env(&overrides).context("invalid configuration")?;

    let client = build_service_client(&cfg.service_key, &cfg.client)?;
    let executor = RpcExecutor::new(client.clone(), &cfg);

    info!(
        event = "boot",
        message = "schema-push started",
        target = %executor.url(),
        file = %cfg.sql_file.display(),
        check_connection = cfg.check_connection,
    );

    let mut reporter = Reporter::stdout();
    reporter.target(&cfg.service_url);

    if cfg.check_connection {
        if let Err(e) = probe_connection(&client, &cfg).await {
            reporter.connection_failed(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    }

    let opts = RunOptions {
        append_semicolon: cfg.append_semicolon,
    };
    let summary = push_file(cfg.sql_file.clone(), &executor, &mut reporter, opts).await?;

    Ok(summary.exit_code())
}
