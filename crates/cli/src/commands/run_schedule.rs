//! `obsd run-schedule` (spec §6), grounded on
//! `original_source/scheduler/scheduler.py`'s `run_schedule` click command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use obs_adapters::{Catalog, PocketbaseCatalog};
use obs_connection::{BlobMode, Connection};
use obs_core::config::DaemonAddress;
use obs_core::ObservatoryConfig;
use obs_scheduler::Scheduler;
use tracing::{info, warn};

#[derive(Args)]
pub struct RunScheduleArgs {
    /// INDI name of the mount.
    #[arg(long, default_value = "iOptron CEM70")]
    mount: String,
    /// INDI name of the camera.
    #[arg(long, default_value = "ZWO CCD ASI533MM Pro")]
    camera: String,
    /// INDI name of the focuser.
    #[arg(long, default_value = "ZWO EAF")]
    focus: String,
    /// INDI name of the filter wheel.
    #[arg(long, default_value = "ZWO EFW")]
    wheel: String,
    /// Address of the INDI server.
    #[arg(long, default_value = "localhost")]
    host: String,
    /// Port of the INDI server.
    #[arg(long, default_value_t = 7624)]
    port: u16,
    /// Base URL of the job catalog.
    #[arg(long, default_value = "http://127.0.0.1:8090")]
    cache: String,
    /// Catalog username, if it requires authentication.
    #[arg(long)]
    username: Option<String>,
    /// Catalog password, if it requires authentication.
    #[arg(long)]
    password: Option<String>,
}

pub async fn run(args: RunScheduleArgs) -> Result<()> {
    info!("Scheduler running!");

    let config = ObservatoryConfig {
        mount: args.mount,
        camera: args.camera,
        focus: args.focus,
        wheel: args.wheel,
        host: DaemonAddress { host: args.host.clone(), port: args.port },
        cache_url: args.cache.clone(),
    };
    let config = ObservatoryConfig::initialize(config).context("observatory config already initialized")?;
    info!(?config, "config set");

    let conn = Connection::connect(&args.host, args.port).await.context("failed to connect to the INDI daemon")?;

    let state = conn.state().await?;
    let configured = config.configured_devices();
    for device in state.device_names() {
        if !configured.contains(&device) {
            warn!(%device, "device not found in config");
        }
    }

    conn.set_camera_recv(None, BlobMode::Also).await.context("failed to enable camera blob forwarding")?;

    let catalog: Arc<dyn Catalog> = match (&args.username, &args.password) {
        (Some(username), Some(password)) => Arc::new(
            PocketbaseCatalog::authenticate(args.cache.as_str(), username.as_str(), password.as_str())
                .await
                .context("failed to authenticate with the catalog")?,
        ),
        _ => Arc::new(PocketbaseCatalog::new(args.cache.as_str())),
    };

    let mut scheduler = Scheduler::new(conn, catalog);
    scheduler.run_forever().await;
    Ok(())
}

#[cfg(test)]
#[path = "run_schedule_tests.rs"]
mod tests;
