//! trackarr — per-profile watch-status tracking for serialized media.
//!
//! The core of the crate is the watch-status propagation engine
//! ([`services::WatchStatusService`]): it derives season statuses from
//! episodes and show statuses from seasons, persists them per profile in a
//! single transaction per run, and reports the changes it made. The CLI is a
//! thin consumer of that engine.

pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;
pub mod status;

pub use config::Config;

use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    cli::run(config).await
}
