use crate::error::RosterResult;
use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres};

pub mod student;
pub mod teacher;

/// A row type the entity service can drive. Implementors own their SQL; the
/// service owns transaction boundaries.
#[async_trait]
pub trait DataType: Sized + Send + Sync + 'static {
    /// Lower-case noun used in messages and logs, e.g. `"student"`.
    const KIND: &'static str;

    fn id(&self) -> i32;

    async fn get_from_db_by_id(id: i32, conn: &mut PgConnection) -> RosterResult<Option<Self>>;
    async fn get_all(pool: &Pool<Postgres>) -> RosterResult<Vec<Self>>;
    /// Inserts every field except the id and returns the id the store assigned.
    async fn insert_into_database(&self, conn: &mut PgConnection) -> RosterResult<i32>;
    /// Replaces every mutable field of the row with `self.id()`. Returns rows affected.
    async fn update_in_database(&self, conn: &mut PgConnection) -> RosterResult<u64>;
    async fn remove_from_database(id: i32, conn: &mut PgConnection) -> RosterResult<u64>;
}
