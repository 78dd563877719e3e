// Rides
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Common utilities to interact with an SQLite database.

use crate::db::{Db, DbError, DbResult, Executor, TxExecutor};
use async_trait::async_trait;
use log::warn;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use time::OffsetDateTime;

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::RowNotFound => DbError::NotFound,
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => DbError::Unavailable,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Maximum time a caller waits for its turn to use the connection.
///
/// Long enough that queued callers never give up in practice.  `Duration::MAX` cannot be used
/// because sqlx adds this to the current instant to compute a deadline.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Opens the database described by `conn_str`, creating it if it does not exist yet.
///
/// The returned database funnels all statements through a single connection, so they are executed
/// one at a time in the order in which callers asked for the connection, with callers waiting for
/// as long as it takes to get their turn.  The connection is never
/// recycled, which keeps `:memory:` databases alive until `close` is called.
pub async fn connect(conn_str: &str) -> DbResult<SqliteDb> {
    let options = SqliteConnectOptions::from_str(conn_str)
        .map_err(map_sqlx_error)?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(map_sqlx_error)?;
    Ok(SqliteDb { pool })
}

/// A database instance backed by SQLite.
pub struct SqliteDb {
    /// Connection pool with a single connection.  Waiting to acquire it is what serializes all
    /// statements issued against the database.
    pool: SqlitePool,
}

impl Drop for SqliteDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("Dropping connection without having called close() first");
        }
    }
}

#[async_trait]
impl Db for SqliteDb {
    async fn ex(&self) -> DbResult<Executor> {
        let conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        Ok(Executor::PoolExec(conn))
    }

    async fn begin(&self) -> DbResult<TxExecutor> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(TxExecutor(Executor::TxExec(tx)))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Helper function to initialize the database with a `schema` made of one or more statements.
pub async fn run_schema(ex: &mut Executor, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(ex.conn()).await.map_err(map_sqlx_error)?;
    Ok(())
}

/// Converts a timestamp as extracted from the database into an `OffsetDateTime`.
///
/// Timestamps are stored as seconds since the epoch because that is what SQLite can compute on its
/// own when filling column defaults.  The input must be positive: the schema never assigns
/// negative timestamps, so seeing one means the table was tampered with.
pub fn build_timestamp(timestamp_sec: i64) -> DbResult<OffsetDateTime> {
    if timestamp_sec < 0 {
        return Err(DbError::DataIntegrityError(format!(
            "Timestamp cannot be negative: sec={}",
            timestamp_sec
        )));
    }

    match OffsetDateTime::from_unix_timestamp(timestamp_sec) {
        Ok(timestamp) => Ok(timestamp),
        Err(e) => Err(DbError::DataIntegrityError(format!("Invalid timestamp: {}", e))),
    }
}

/// Test utilities for the SQLite connection.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;

    /// Initializes a fresh in-memory test database.
    pub async fn setup() -> SqliteDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();
        connect(":memory:").await.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use sqlx::Row;
    use time::macros::datetime;

    #[tokio::test]
    async fn test_callers_wait_for_their_turn() {
        let db = setup().await;

        let options = db.pool.options();
        assert_eq!(1, options.get_max_connections());
        assert_eq!(ACQUIRE_TIMEOUT, options.get_acquire_timeout());
        assert!(options.get_acquire_timeout() > Duration::from_secs(30));

        db.close().await;
    }

    #[tokio::test]
    async fn test_run_schema_multiple_statements() {
        let db = setup().await;

        run_schema(
            &mut db.ex().await.unwrap(),
            "CREATE TABLE a (i INTEGER); CREATE TABLE b (i INTEGER); INSERT INTO b VALUES (5);",
        )
        .await
        .unwrap();

        let mut ex = db.ex().await.unwrap();
        let row = sqlx::query("SELECT i FROM b").fetch_one(ex.conn()).await.unwrap();
        assert_eq!(5, row.try_get::<i64, _>("i").unwrap());
        drop(ex);

        db.close().await;
    }

    #[tokio::test]
    async fn test_run_schema_error() {
        let db = setup().await;

        match run_schema(&mut db.ex().await.unwrap(), "CREATE TABLE oops (").await {
            Err(DbError::BackendError(_)) => (),
            e => panic!("Must have failed with a BackendError but got: {:?}", e),
        }

        db.close().await;
    }

    #[tokio::test]
    async fn test_memory_databases_are_isolated() {
        let db1 = setup().await;
        let db2 = setup().await;

        run_schema(&mut db1.ex().await.unwrap(), "CREATE TABLE only_in_one (i INTEGER)")
            .await
            .unwrap();

        let mut ex = db2.ex().await.unwrap();
        let result = sqlx::query("SELECT * FROM only_in_one").fetch_all(ex.conn()).await;
        assert!(result.is_err());
        drop(ex);

        db1.close().await;
        db2.close().await;
    }

    #[tokio::test]
    async fn test_closed_db_is_unavailable() {
        let db = setup().await;
        db.close().await;

        assert_eq!(DbError::Unavailable, db.ex().await.unwrap_err());
    }

    #[test]
    fn test_map_sqlx_error_row_not_found() {
        assert_eq!(DbError::NotFound, map_sqlx_error(sqlx::Error::RowNotFound));
    }

    #[test]
    fn test_build_timestamp_zero() {
        assert_eq!(Ok(datetime!(1970-01-01 00:00:00 UTC)), build_timestamp(0));
    }

    #[test]
    fn test_build_timestamp_ok() {
        assert_eq!(Ok(datetime!(2023-12-01 05:50:00 UTC)), build_timestamp(1701409800));
    }

    #[test]
    fn test_build_timestamp_negative() {
        match build_timestamp(-1) {
            Err(DbError::DataIntegrityError(_)) => (),
            e => panic!("Must have failed with a DataIntegrityError but got: {:?}", e),
        }
    }

    #[test]
    fn test_build_timestamp_too_big() {
        match build_timestamp(123456789123456789i64) {
            Err(_) => (),
            Ok(_) => panic!("Must have failed"),
        }
    }
}
