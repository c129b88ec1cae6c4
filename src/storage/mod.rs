//! # Storage Module
//!
//! Transactional access to the SQLite store. Every logical operation acquires
//! one [`UnitOfWork`], performs its reads and writes through it and then either
//! commits it or lets it drop, which rolls the transaction back.
//!
//! Query methods live next to the entity they touch:
//! - `users` - users, roles and linked OpenID accounts
//! - `businesses` - businesses and their owners
//! - `posts` - posts scoped to a business
//! - `applications` - post applications

mod applications;
mod businesses;
mod posts;
mod users;

use sqlx::sqlite::SqliteQueryResult;
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;

/// Failures surfaced by the storage layer. Service code maps these onto
/// `ApiError`; nothing sqlx-specific travels further up.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no matching rows")]
    NotFound,

    #[error("unique constraint violation")]
    UniqueViolation,

    #[error("foreign key violation")]
    ForeignKeyViolation,

    #[error("database is busy with a conflicting write")]
    Busy,

    #[error("stored data is invalid: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

// SQLite primary result codes (low byte of the extended code)
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation()
                    || db_err.message().contains("UNIQUE constraint failed")
                {
                    return StoreError::UniqueViolation;
                }
                if db_err.is_foreign_key_violation()
                    || db_err.message().contains("FOREIGN KEY constraint failed")
                {
                    return StoreError::ForeignKeyViolation;
                }
                let primary_code = db_err
                    .code()
                    .and_then(|c| c.parse::<i32>().ok())
                    .map(|c| c & 0xff);
                if matches!(primary_code, Some(SQLITE_BUSY) | Some(SQLITE_LOCKED))
                    || db_err.message().contains("database is locked")
                {
                    return StoreError::Busy;
                }
                StoreError::Database(err)
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Shared handle to the connection pool
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a unit of work. The returned handle must be committed explicitly;
    /// dropping it on any other exit path rolls the transaction back.
    pub async fn begin(&self) -> Result<UnitOfWork, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(UnitOfWork { tx })
    }
}

/// One database transaction, passed by `&mut` to the code that needs storage.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Turns "zero rows affected" into `NotFound` for single-row writes
fn expect_one_row(result: SqliteQueryResult) -> Result<(), StoreError> {
    if result.rows_affected() == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_test_store;

    #[tokio::test]
    async fn test_dropped_unit_of_work_rolls_back() {
        let store = setup_test_store().await;

        {
            let mut uow = store.begin().await.unwrap();
            uow.create_user().await.unwrap();
            // dropped without commit
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_committed_unit_of_work_persists() {
        let store = setup_test_store().await;

        let mut uow = store.begin().await.unwrap();
        let user_id = uow.create_user().await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let user = uow.get_user_for_id(&user_id).await.unwrap();
        assert!(user.is_some());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
    }
}
