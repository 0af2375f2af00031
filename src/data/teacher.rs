use crate::{
    data::DataType,
    error::{MakeQuerySnafu, RosterResult},
};
use async_trait::async_trait;
use futures::TryStreamExt;
use snafu::ResultExt;
use sqlx::{FromRow, PgConnection, Pool, Postgres};
use time::OffsetDateTime;

#[derive(FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub dob: OffsetDateTime,
    pub joined_date: OffsetDateTime,
}

#[async_trait]
impl DataType for Teacher {
    const KIND: &'static str = "teacher";

    fn id(&self) -> i32 {
        self.id
    }

    async fn get_from_db_by_id(id: i32, conn: &mut PgConnection) -> RosterResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, first_name, last_name, dob, joined_date FROM teacher WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn get_all(pool: &Pool<Postgres>) -> RosterResult<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, first_name, last_name, dob, joined_date FROM teacher ORDER BY id",
        )
        .fetch(pool)
        .try_collect()
        .await
        .context(MakeQuerySnafu)
    }

    async fn insert_into_database(&self, conn: &mut PgConnection) -> RosterResult<i32> {
        sqlx::query_scalar(
            "INSERT INTO teacher (first_name, last_name, dob, joined_date) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.dob)
        .bind(self.joined_date)
        .fetch_one(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn update_in_database(&self, conn: &mut PgConnection) -> RosterResult<u64> {
        Ok(sqlx::query(
            "UPDATE teacher SET first_name = $2, last_name = $3, dob = $4, joined_date = $5 WHERE id = $1",
        )
        .bind(self.id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.dob)
        .bind(self.joined_date)
        .execute(conn)
        .await
        .context(MakeQuerySnafu)?
        .rows_affected())
    }

    async fn remove_from_database(id: i32, conn: &mut PgConnection) -> RosterResult<u64> {
        Ok(sqlx::query("DELETE FROM teacher WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?
            .rows_affected())
    }
}
