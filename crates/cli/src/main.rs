// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `obsd`: the observatory controller's CLI entry point (spec §6).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "obsd", author, version, about = "Autonomous observatory controller", propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler loop against a live INDI daemon and catalog.
    RunSchedule(commands::run_schedule::RunScheduleArgs),
    /// List device names visible on the INDI daemon.
    FindDevices(commands::find_devices::FindDevicesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::RunSchedule(args) => commands::run_schedule::run(args).await,
        Commands::FindDevices(args) => commands::find_devices::run(args).await,
    }
}
