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
pub struct Student {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub dob: OffsetDateTime,
    pub course_id: i32,
}

#[async_trait]
impl DataType for Student {
    const KIND: &'static str = "student";

    fn id(&self) -> i32 {
        self.id
    }

    async fn get_from_db_by_id(id: i32, conn: &mut PgConnection) -> RosterResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, first_name, last_name, dob, course_id FROM student WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn get_all(pool: &Pool<Postgres>) -> RosterResult<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, first_name, last_name, dob, course_id FROM student ORDER BY id",
        )
        .fetch(pool)
        .try_collect()
        .await
        .context(MakeQuerySnafu)
    }

    async fn insert_into_database(&self, conn: &mut PgConnection) -> RosterResult<i32> {
        sqlx::query_scalar(
            "INSERT INTO student (first_name, last_name, dob, course_id) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.dob)
        .bind(self.course_id)
        .fetch_one(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn update_in_database(&self, conn: &mut PgConnection) -> RosterResult<u64> {
        Ok(sqlx::query(
            "UPDATE student SET first_name = $2, last_name = $3, dob = $4, course_id = $5 WHERE id = $1",
        )
        .bind(self.id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.dob)
        .bind(self.course_id)
        .execute(conn)
        .await
        .context(MakeQuerySnafu)?
        .rows_affected())
    }

    async fn remove_from_database(id: i32, conn: &mut PgConnection) -> RosterResult<u64> {
        Ok(sqlx::query("DELETE FROM student WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?
            .rows_affected())
    }
}
