//! The SQL execution channel the engine drives.

use crate::config::StorageConfig;
use crate::error::DbStorageError;
use crate::location::ConnectionParams;
use crate::results::ResultSet;
use crate::sqlite::SqliteConnection;
use crate::types::{DatabaseType, ValueBinding};

/// A synchronous SQL execution channel.
///
/// Implementations hold one open connection. Every call blocks until the
/// driver responds; there is no cooperative suspension. Dropping an
/// implementation releases the connection, which discards any transaction
/// the driver still has open.
pub trait DriverConnection: std::fmt::Debug {
    /// Begin a driver-level transaction.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError` if a transaction is already open or the
    /// driver rejects the begin.
    fn begin(&mut self) -> Result<(), DbStorageError>;

    /// Commit the open driver-level transaction.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError` if no transaction is open or the commit
    /// fails.
    fn commit(&mut self) -> Result<(), DbStorageError>;

    /// Execute one DDL/DML statement with bound inputs; returns rows
    /// affected.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError` if preparing or executing the statement
    /// fails.
    fn execute(&mut self, sql: &str, params: &[ValueBinding]) -> Result<usize, DbStorageError>;

    /// Execute one SELECT and materialize every result row.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError` if preparing or executing the query fails.
    fn query(&mut self, sql: &str, params: &[ValueBinding]) -> Result<ResultSet, DbStorageError>;
}

/// Open a driver connection for the resolved location.
///
/// # Errors
///
/// Returns `DbStorageError::ConnectionError` if the backend cannot open the
/// endpoint.
pub fn connect(
    params: &ConnectionParams,
    config: &StorageConfig,
) -> Result<Box<dyn DriverConnection>, DbStorageError> {
    match params.db_type {
        DatabaseType::Sqlite => Ok(Box::new(SqliteConnection::open(params, config)?)),
    }
}
