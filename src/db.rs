use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info};

use crate::config::DbConfig;

const PING_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn connect(cfg: &DbConfig) -> anyhow::Result<PgPool> {
    cfg.validate()?;

    // sqlx has no idle-count cap; idle connections are reaped by idle_timeout.
    debug!(
        max_open = cfg.max_open_conns,
        max_idle = cfg.idle_cap(),
        idle_timeout_secs = cfg.max_idle_time.as_secs(),
        "configuring pool"
    );

    let db = PgPoolOptions::new()
        .max_connections(cfg.max_open_conns)
        .idle_timeout(cfg.max_idle_time)
        .acquire_timeout(cfg.query_timeout)
        .connect_lazy(&cfg.database_url)
        .context("parse database url")?;

    tokio::time::timeout(PING_TIMEOUT, sqlx::query("SELECT 1").execute(&db))
        .await
        .context("database ping timed out")?
        .context("ping database")?;

    info!("database connected");
    Ok(db)
}
