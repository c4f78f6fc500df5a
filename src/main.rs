//! Boxoffice admission worker
//!
//! Registers the configured sales, then runs admission passes and hold
//! sweeps on fixed intervals until interrupted.
//!
//! The worker has no intake of its own: it is the harness a collaborator
//! embeds to feed reservations through `TicketSaleService::queue_reservation`
//! on the same repositories. Run standalone, its passes see empty queues.

use anyhow::Context;
use boxoffice_core::{models::NewSale, AppConfig, SystemClock};
use boxoffice_db::{MemoryReservationRepository, MemorySaleRepository};
use boxoffice_services::{HoldSweeper, SaleLocks, TicketSaleService};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "boxoffice={},boxoffice_services={},boxoffice_db={}",
            log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Boxoffice worker v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    let sale_repo = Arc::new(MemorySaleRepository::new());
    let reservation_repo = Arc::new(MemoryReservationRepository::new());
    let clock = Arc::new(SystemClock);
    let locks = Arc::new(SaleLocks::new());

    let sales = Arc::new(TicketSaleService::new(
        sale_repo.clone(),
        reservation_repo.clone(),
        clock.clone(),
        locks.clone(),
        config.sales.hold_duration().context("invalid hold duration")?,
    ));
    let sweeper = Arc::new(HoldSweeper::new(sale_repo, reservation_repo, clock, locks));

    for entry in &config.catalog {
        let sale = sales
            .create_sale(NewSale {
                name: entry.name.clone(),
                capacity: entry.capacity,
            })
            .await
            .with_context(|| format!("failed to register sale '{}'", entry.name))?;
        info!("Registered sale '{}' ({}) with capacity {}", sale.name, sale.id, sale.capacity);
    }

    if config.catalog.is_empty() {
        warn!("No sales configured in catalog");
    }

    info!(
        "Hold duration {}s, processing every {}s, sweeping every {}s",
        config.sales.hold_duration_secs,
        config.sales.process_interval_secs,
        config.sales.sweep_interval_secs
    );

    let mut processor = {
        let sales = sales.clone();
        let period = Duration::from_secs(config.sales.process_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if let Err(e) = sales.process_all().await {
                    error!("Admission pass failed: {}", e);
                }
            }
        })
    };

    let mut reclaimer = {
        let sweeper = sweeper.clone();
        let period = Duration::from_secs(config.sales.sweep_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if let Err(e) = sweeper.sweep_all().await {
                    error!("Hold sweep failed: {}", e);
                }
            }
        })
    };

    let outcome = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            info!("Shutdown signal received, stopping worker");
            Ok(())
        }
        result = &mut processor => Err(task_stopped("admission", result)),
        result = &mut reclaimer => Err(task_stopped("sweeper", result)),
    };

    processor.abort();
    reclaimer.abort();

    outcome
}

/// Report a background loop that ended on its own
fn task_stopped(task: &str, result: Result<(), JoinError>) -> anyhow::Error {
    match result {
        Err(e) if e.is_panic() => error!("{} task panicked: {}", task, e),
        Err(e) => error!("{} task failed: {}", task, e),
        Ok(()) => error!("{} task exited", task),
    }
    anyhow::anyhow!("{} task stopped unexpectedly", task)
}
