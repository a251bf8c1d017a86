//! Chargeband agent
//!
//! Single binary that runs:
//! - the recurring decision cycle keeping the modem battery in its band
//! - a reachability-gated turn-on watchdog
//! - an HTTP surface triggering the same operations on demand

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use chargeband_agent::api::{self, AppState};
use chargeband_agent::automation::Automation;
use chargeband_agent::config::{Cli, CloudConfig, NotifyConfig};
use chargeband_agent::device::{CloudDeviceClient, PowerSwitch};
use chargeband_agent::notify::Notifier;
use chargeband_agent::reachability::ReachabilityChecker;
use chargeband_agent::scheduler::Scheduler;
use chargeband_agent::telemetry::ModemClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!(
        modem = %cli.modem_host,
        listen = %cli.listen_addr,
        "chargeband-agent starting"
    );

    // ── Collaborator clients ────────────────────────────────────
    let cloud_cfg = CloudConfig::from_env()?;
    let cloud = CloudDeviceClient::connect(&cloud_cfg)
        .await
        .map_err(|e| anyhow::anyhow!("cloud device session: {e}"))?;

    let modem = ModemClient::new(&cli.modem_host, cli.telemetry_timeout)?;
    let switch = PowerSwitch::new(Arc::new(cloud), cloud_cfg.device_id.clone());
    let checker = ReachabilityChecker::new(cli.probe_timeout)?;
    let notifier = Notifier::new(NotifyConfig::from_env())?;

    let automation = Arc::new(Automation::new(modem, switch, checker, notifier));

    // ── Scheduler ───────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = Arc::new(Scheduler::new(shutdown_rx));

    let cycle = automation.clone();
    scheduler
        .add_job(
            "automate-modem",
            Duration::from_secs(cli.cycle_interval),
            move || {
                let automation = cycle.clone();
                async move { automation.run_cycle().await }
            },
        )
        .await;

    let gated = automation.clone();
    scheduler
        .add_job(
            "charger-on-watch",
            Duration::from_secs(cli.turn_on_interval),
            move || {
                let automation = gated.clone();
                async move { automation.gated_turn_on().await }
            },
        )
        .await;

    let loop_scheduler = scheduler.clone();
    let scheduler_handle = tokio::spawn(async move { loop_scheduler.run().await });

    // ── HTTP surface ────────────────────────────────────────────
    let app = api::router(AppState {
        automation,
        scheduler,
    })
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());

    let addr: SocketAddr = cli.listen_addr.parse()?;
    tracing::info!("chargeband-agent listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP surface failed");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received SIGINT, shutting down");
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = scheduler_handle.await;
    tracing::info!("chargeband-agent stopped");
    Ok(())
}
