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

//! Generic abstraction to access the database.
//!
//! The service persists its data in SQLite.  The `Db` trait exists so that the storage handle can
//! be injected into the business logic instead of living in global state: production code passes
//! a file-backed database and tests pass a fresh in-memory instance.

use crate::model::ModelError;
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnection};
use sqlx::Transaction;

pub mod sqlite;

/// Database errors.  Any unexpected errors that come from the database are classified as
/// `BackendError`, but errors we know about have more specific types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbError {
    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates a failure processing the data that already exists in the database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a query matched no entries.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because the connection was closed or
    /// because we timed out waiting for our turn to use it).
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// A database executor that statements can be issued against.
///
/// Holding an executor means holding the database connection, so executors should be kept alive
/// for as short as possible: other callers queue up behind the current holder.
#[derive(Debug)]
pub enum Executor {
    /// An executor backed directly by the pooled connection.
    PoolExec(PoolConnection<Sqlite>),

    /// An executor backed by an open transaction.
    TxExec(Transaction<'static, Sqlite>),
}

impl Executor {
    /// Returns the raw connection to pass to `sqlx` queries.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        match self {
            Executor::PoolExec(conn) => &mut **conn,
            Executor::TxExec(tx) => &mut **tx,
        }
    }
}

/// A wrapper for a database executor backed by an open transaction.
pub struct TxExecutor(Executor);

impl TxExecutor {
    /// Returns the executor wrapped by this transaction.
    ///
    /// This would be better called `executor` but this method is used so frequently that it makes
    /// call sites too verbose.
    pub fn ex(&mut self) -> &mut Executor {
        &mut self.0
    }

    /// Commits the transaction.
    pub async fn commit(self) -> DbResult<()> {
        match self.0 {
            Executor::PoolExec(_) => unreachable!("Transactions are always backed by TxExec"),
            Executor::TxExec(tx) => tx.commit().await.map_err(sqlite::map_sqlx_error),
        }
    }
}

/// Abstraction over the database connection.
#[async_trait]
pub trait Db {
    /// Obtains an executor for direct access to the database, waiting for our turn if another
    /// caller is holding the connection.
    ///
    /// This would be better called `executor` but this method is used so frequently that it makes
    /// call sites too verbose.
    async fn ex(&self) -> DbResult<Executor>;

    /// Begins a transaction.
    ///
    /// It is the responsibility of the caller to call `commit` on the returned executor.  Otherwise
    /// the transaction is rolled back on drop.
    async fn begin(&self) -> DbResult<TxExecutor>;

    /// Closes the database, waiting for any in-flight statements to complete.
    async fn close(&self);
}
