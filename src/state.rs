use crate::{
    config::DbConfig,
    error::{GetDatabaseConnectionSnafu, MigrateSnafu, OpenDatabaseSnafu, RosterResult},
};
use snafu::ResultExt;
use sqlx::{Pool, Postgres, Transaction, pool::PoolConnection, postgres::PgPoolOptions};
use std::{ops::Deref, time::Duration};

pub const CONNECT_ATTEMPTS: u32 = 10;
pub const CONNECT_SPACING: Duration = Duration::from_secs(1);

/// Shared handle to the record store. Cloning is cheap; every clone uses the same pool.
#[derive(Clone, Debug)]
pub struct RosterState {
    pool: Pool<Postgres>,
}

impl RosterState {
    pub async fn new(options: PgPoolOptions, config: &DbConfig) -> RosterResult<Self> {
        let pool = connect_with_retry(options, &config.get_db_path(), CONNECT_SPACING).await?;
        Self::from_pool(pool).await
    }

    /// Wraps an already-open pool, bringing the schema up to date first.
    pub async fn from_pool(pool: Pool<Postgres>) -> RosterResult<Self> {
        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;
        Ok(Self { pool })
    }

    /// Skips migrations; for tests that never reach the database.
    #[cfg(test)]
    pub(crate) fn unmigrated(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_connection(&self) -> RosterResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }

    pub async fn get_transaction(&self) -> RosterResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.context(GetDatabaseConnectionSnafu)
    }

    pub async fn sensible_shutdown(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}

impl Deref for RosterState {
    type Target = Pool<Postgres>;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

/// Gives up after [`CONNECT_ATTEMPTS`] failures, waiting `spacing` between each.
async fn connect_with_retry(
    options: PgPoolOptions,
    url: &str,
    spacing: Duration,
) -> RosterResult<Pool<Postgres>> {
    let mut attempt = 1;
    loop {
        info!(attempt, "Connecting to the database");
        match options.clone().connect(url).await {
            Ok(pool) => {
                info!("Successfully connected");
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                warn!(?e, attempt, "database unavailable, retrying");
                tokio::time::sleep(spacing).await;
                attempt += 1;
            }
            Err(e) => return Err(e).context(OpenDatabaseSnafu { attempts: attempt }),
        }
    }
}
