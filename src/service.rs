use crate::{
    data::DataType,
    error::{CommitTransactionSnafu, MissingRecordSnafu, RollbackTransactionSnafu, RosterResult},
    state::RosterState,
};
use http::StatusCode;
use snafu::{OptionExt, ResultExt};
use sqlx::{Postgres, Transaction};
use std::{fmt::Display, marker::PhantomData};

/// Application-level result of a write. Failures here are still successful RPC calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub message: String,
    pub code: StatusCode,
    pub id: i32,
}

impl Outcome {
    pub fn success(message: impl Into<String>, id: i32) -> Self {
        Self {
            message: message.into(),
            code: StatusCode::OK,
            id,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: StatusCode::BAD_REQUEST,
            id: 0,
        }
    }

    /// A write whose payload could not be turned into a row.
    pub fn rejected(reason: &impl Display) -> Self {
        Self::failure(format!("Invalid input: {reason}"))
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

/// The five record operations, generic over the row type.
pub struct EntityService<T> {
    state: RosterState,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityService<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: DataType> EntityService<T> {
    pub const fn new(state: RosterState) -> Self {
        Self {
            state,
            _record: PhantomData,
        }
    }

    pub async fn get(&self, id: i32) -> RosterResult<T> {
        let mut conn = self.state.get_connection().await?;
        T::get_from_db_by_id(id, &mut conn)
            .await?
            .context(MissingRecordSnafu { kind: T::KIND, id })
    }

    pub async fn get_all(&self) -> RosterResult<Vec<T>> {
        T::get_all(&self.state).await
    }

    pub async fn register(&self, record: T) -> Outcome {
        let mut tx = match self.state.get_transaction().await {
            Ok(tx) => tx,
            Err(e) => {
                error!(?e, kind = T::KIND, "Cannot begin SQL transaction");
                return Outcome::failure("Cannot start transaction");
            }
        };

        let id = match record.insert_into_database(&mut tx).await {
            Ok(id) => id,
            Err(e) => {
                error!(?e, kind = T::KIND, "Cannot insert, rolling back");
                roll_back(tx, T::KIND).await;
                return Outcome::failure(format!("Cannot insert {}", T::KIND));
            }
        };

        if id == 0 {
            error!(kind = T::KIND, "store returned no usable id, rolling back");
            roll_back(tx, T::KIND).await;
            return Outcome::failure("Something went wrong");
        }

        if let Err(e) = tx.commit().await.context(CommitTransactionSnafu) {
            error!(?e, kind = T::KIND, id, "Cannot commit insert");
            return Outcome::failure("Cannot commit transaction");
        }

        Outcome::success("Successfully created", id)
    }

    /// Zero rows affected counts as success.
    pub async fn edit(&self, record: T) -> Outcome {
        let id = record.id();
        let mut tx = match self.state.get_transaction().await {
            Ok(tx) => tx,
            Err(e) => {
                error!(?e, kind = T::KIND, id, "Cannot begin SQL transaction");
                return Outcome::failure("Cannot begin SQL transaction");
            }
        };

        match record.update_in_database(&mut tx).await {
            Ok(rows) => debug!(kind = T::KIND, id, rows, "updated"),
            Err(e) => {
                error!(?e, kind = T::KIND, id, "Cannot update, rolling back");
                roll_back(tx, T::KIND).await;
                return Outcome::failure(format!("Cannot update {} information", T::KIND));
            }
        }

        if let Err(e) = tx.commit().await.context(CommitTransactionSnafu) {
            error!(?e, kind = T::KIND, id, "Cannot commit update");
            return Outcome::failure("Cannot commit transaction");
        }

        Outcome::success("Successfully updated", id)
    }

    /// A single autocommit `DELETE`. Removing a missing id succeeds.
    pub async fn remove(&self, id: i32) -> Outcome {
        let result = match self.state.get_connection().await {
            Ok(mut conn) => T::remove_from_database(id, &mut conn).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(rows) => {
                debug!(kind = T::KIND, id, rows, "removed");
                Outcome::success("Successfully deleted", id)
            }
            Err(e) => {
                error!(?e, kind = T::KIND, id, "Cannot delete");
                Outcome::failure("Cannot delete")
            }
        }
    }
}

async fn roll_back(tx: Transaction<'static, Postgres>, kind: &'static str) {
    if let Err(e) = tx.rollback().await.context(RollbackTransactionSnafu) {
        error!(?e, kind, "Error rolling back");
    }
}
