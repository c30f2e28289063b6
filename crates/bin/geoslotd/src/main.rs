//! # geoslotd — geoslot daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations and the simulated device
//! - Construct the slot service and the scheduler, injecting them via port traits
//! - Run the poll loop that feeds the scheduler positions and time ticks
//! - Re-apply the granted permissions from the config file on SIGHUP
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use geoslot_adapter_http_axum::state::{AppState, Scheduler};
use geoslot_adapter_storage_sqlite_sqlx::{
    Config as StorageConfig, SqliteEventStore, SqliteSlotRepository,
};
use geoslot_adapter_virtual::{
    RouteFeed, StaticPermissionGate, TimerNotificationScheduler, VirtualDevice,
};
use geoslot_app::event_bus::InProcessEventBus;
use geoslot_app::scheduler::{DeviceCapabilities, SlotScheduler};
use geoslot_app::services::slot_service::SlotService;

use crate::config::Config;

type DaemonScheduler = Scheduler<
    Arc<SqliteSlotRepository>,
    Arc<InProcessEventBus>,
    SqliteEventStore,
    VirtualDevice,
    Arc<StaticPermissionGate>,
    TimerNotificationScheduler,
>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let slot_repo = Arc::new(SqliteSlotRepository::new(pool.clone()));
    let event_store = Arc::new(SqliteEventStore::new(pool));

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(256));

    // Device
    let gate = Arc::new(StaticPermissionGate::new(
        config.virtual_device.granted_permissions.iter().copied(),
    ));
    let device = DeviceCapabilities {
        executor: VirtualDevice::default(),
        gate: Arc::clone(&gate),
        notifier: TimerNotificationScheduler::default(),
    };

    // Services
    let slot_service = Arc::new(SlotService::new(
        Arc::clone(&slot_repo),
        Arc::clone(&event_bus),
    ));
    let scheduler: Arc<DaemonScheduler> = Arc::new(
        SlotScheduler::new(
            slot_repo,
            Arc::clone(&event_store),
            Arc::clone(&event_bus),
            device,
        )
        .with_action_timeout(config.action_timeout()),
    );

    // Poll loop
    let route = if config.virtual_device.enabled {
        RouteFeed::new(config.virtual_device.route.clone())
    } else {
        None
    };
    let poller = tokio::spawn(poll_loop(
        Arc::clone(&scheduler),
        route,
        config.poll_interval(),
    ));
    let reloader = tokio::spawn(reload_permissions(gate));

    // HTTP
    let state = AppState::from_arcs(slot_service, scheduler, event_store, event_bus);
    let app = geoslot_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "geoslotd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.abort();
    reloader.abort();
    tracing::info!("geoslotd stopped");
    Ok(())
}

/// Feed the scheduler once per `period`: the next route waypoint when a
/// route is replayed, a plain time tick otherwise.
async fn poll_loop(scheduler: Arc<DaemonScheduler>, route: Option<RouteFeed>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let at = chrono::Local::now().naive_local();
        let report = match &route {
            Some(route) => scheduler.on_position_update(route.next_position(), at).await,
            None => scheduler.on_time_tick(at).await,
        };
        if report.store_unavailable {
            tracing::warn!(%at, "tick skipped, slot store unavailable");
        } else {
            tracing::debug!(
                %at,
                evaluated = report.slots.len(),
                executed = report.executed().count(),
                reminders = report.reminders.len(),
                "tick done"
            );
        }
    }
}

/// Re-read the config file on every SIGHUP and apply its
/// `virtual_device.granted_permissions` to the running gate.
#[cfg(unix)]
async fn reload_permissions(gate: Arc<StaticPermissionGate>) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(err) => {
            tracing::error!(%err, "could not listen for SIGHUP");
            return;
        }
    };
    while hangup.recv().await.is_some() {
        match Config::load() {
            Ok(config) => {
                gate.replace(config.virtual_device.granted_permissions.iter().copied());
                tracing::info!(granted = ?gate.granted(), "permissions reloaded");
            }
            Err(err) => tracing::warn!(%err, "could not reload config, keeping permissions"),
        }
    }
}

#[cfg(not(unix))]
async fn reload_permissions(_gate: Arc<StaticPermissionGate>) {}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
