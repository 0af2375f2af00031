#![allow(dead_code)]

use roster::state::RosterState;
use sqlx::{Connection, Executor, PgConnection, postgres::PgPoolOptions};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

static NEXT_SCHEMA: AtomicUsize = AtomicUsize::new(0);

/// A migrated, empty schema of its own, so tests can run in parallel against one database.
pub struct TestDb {
    pub state: RosterState,
    url: String,
    schema: String,
}

/// `None` when `DATABASE_URL` is unset; callers return early in that case.
pub async fn test_db() -> Option<TestDb> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    let schema = format!(
        "roster_test_{}_{}_{}",
        std::process::id(),
        NEXT_SCHEMA.fetch_add(1, Ordering::Relaxed),
        nanos
    );

    let mut conn = PgConnection::connect(&url)
        .await
        .expect("connect for schema setup");
    conn.execute(format!("CREATE SCHEMA {schema}").as_str())
        .await
        .expect("create test schema");
    conn.close().await.expect("close setup connection");

    let set_path = format!("SET search_path TO {schema}");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .after_connect(move |conn, _meta| {
            let set_path = set_path.clone();
            Box::pin(async move {
                conn.execute(set_path.as_str()).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await
        .expect("connect test pool");

    let state = RosterState::from_pool(pool).await.expect("migrate test schema");
    Some(TestDb { state, url, schema })
}

impl TestDb {
    /// Inserts a course and returns its id.
    pub async fn course(&self, name: &str) -> i32 {
        sqlx::query_scalar("INSERT INTO course (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&*self.state)
            .await
            .expect("insert course")
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT count(*) FROM {table}"))
            .fetch_one(&*self.state)
            .await
            .expect("count rows")
    }

    pub async fn teardown(self) {
        self.state.sensible_shutdown().await;
        let mut conn = PgConnection::connect(&self.url)
            .await
            .expect("connect for teardown");
        conn.execute(format!("DROP SCHEMA {} CASCADE", self.schema).as_str())
            .await
            .expect("drop test schema");
    }
}
