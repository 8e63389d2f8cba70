//! `obsd find-devices` (spec §6), grounded on
//! `original_source/scheduler/scheduler.py`'s `find_devices` click command.

use anyhow::{Context, Result};
use clap::Args;
use obs_connection::Connection;

#[derive(Args)]
pub struct FindDevicesArgs {
    /// Address of the INDI server.
    #[arg(long, default_value = "localhost")]
    host: String,
    /// Port of the INDI server.
    #[arg(long, default_value_t = 7624)]
    port: u16,
}

pub async fn run(args: FindDevicesArgs) -> Result<()> {
    println!("Looking for devices:");

    let conn = Connection::connect(&args.host, args.port).await.context("failed to connect to the INDI daemon")?;
    let state = conn.state().await?;
    for device in state.device_names() {
        println!("\t{device}");
    }
    conn.close().await.ok();
    Ok(())
}

#[cfg(test)]
#[path = "find_devices_tests.rs"]
mod tests;
