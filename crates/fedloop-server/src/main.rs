//! fedloop — periodic aggregation server for federated model updates.

use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command};
use fedloop_core::FedloopConfig;
use fedloop_ingest::UpdateQueue;
use fedloop_runtime::{shutdown_on_ctrl_c, CycleOrchestrator, Scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let data_dir = cli::resolve_data_dir(cli.data_dir.as_ref());
    info!("Data directory: {}", data_dir.display());

    let mut config = FedloopConfig::from_env(&data_dir).context("Invalid configuration")?;
    cli.apply_overrides(&mut config)
        .context("Invalid command-line options")?;
    config
        .prepare_dirs()
        .with_context(|| format!("Failed to prepare data directory {}", data_dir.display()))?;

    match cli.command {
        Command::Submit { client_id, file } => {
            let raw = match file {
                Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                _ => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let path = UpdateQueue::new(&config).enqueue_raw(&client_id, &raw)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Status => {
            let aggregator = fedloop_aggregate::create_aggregator(&config);
            let orchestrator = CycleOrchestrator::new(config, aggregator);
            let status = orchestrator.status()?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Command::Once => {
            let aggregator = fedloop_aggregate::create_aggregator(&config);
            let orchestrator = Arc::new(CycleOrchestrator::new(config, aggregator));
            let report = Scheduler::new(orchestrator).run_once().await;
            match report {
                Some(report) => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(())
                }
                None => std::process::exit(1),
            }
        }
        Command::Serve => {
            println!("==================================================");
            println!("   fedloop training server");
            println!("==================================================");
            println!("Press Ctrl+C to stop the server.");

            let aggregator = fedloop_aggregate::create_aggregator(&config);
            let orchestrator = Arc::new(CycleOrchestrator::new(config, aggregator));
            let shutdown = shutdown_on_ctrl_c();
            Scheduler::new(orchestrator).run(shutdown).await;

            info!("Server stopped by user");
            Ok(())
        }
    }
}
