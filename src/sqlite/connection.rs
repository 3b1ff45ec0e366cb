use std::fmt;
use std::fmt::Write;

use rusqlite::Connection;
use tracing::debug;

use super::params::Params;
use super::query::build_result_set;
use crate::config::StorageConfig;
use crate::driver::DriverConnection;
use crate::error::DbStorageError;
use crate::location::ConnectionParams;
use crate::results::ResultSet;
use crate::types::ValueBinding;

/// Connection wrapper around one rusqlite connection.
///
/// Tracks whether a transaction is open so double-begin and commit-without-
/// begin are caught before reaching the driver.
pub struct SqliteConnection {
    conn: Connection,
    in_transaction: bool,
}

impl SqliteConnection {
    /// Open the database file named by the resolved location and apply the
    /// configured tuning pragmas.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ConnectionError` if the file cannot be
    /// opened, or `DbStorageError::SqliteError` if a pragma fails.
    pub fn open(params: &ConnectionParams, config: &StorageConfig) -> Result<Self, DbStorageError> {
        let conn = Connection::open(&params.database).map_err(|e| {
            DbStorageError::ConnectionError(format!("failed to open {}: {e}", params.database))
        })?;

        let mut pragmas = format!(
            "PRAGMA journal_mode = {};\nPRAGMA busy_timeout = {};\n",
            config.journal_mode.as_pragma(),
            config.busy_timeout_ms
        );
        if let Some(kib) = config.cache_size_kib {
            let _ = writeln!(pragmas, "PRAGMA cache_size = -{kib};");
        }
        conn.execute_batch(&pragmas)
            .map_err(DbStorageError::SqliteError)?;

        debug!(database = %params.database, "opened sqlite connection");
        Ok(Self {
            conn,
            in_transaction: false,
        })
    }
}

impl DriverConnection for SqliteConnection {
    fn begin(&mut self) -> Result<(), DbStorageError> {
        if self.in_transaction {
            return Err(DbStorageError::ProtocolError(
                "sqlite transaction already in progress".into(),
            ));
        }
        self.conn
            .execute_batch("BEGIN")
            .map_err(DbStorageError::SqliteError)?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbStorageError> {
        if !self.in_transaction {
            return Err(DbStorageError::ProtocolError(
                "sqlite transaction not active".into(),
            ));
        }
        self.conn
            .execute_batch("COMMIT")
            .map_err(DbStorageError::SqliteError)?;
        self.in_transaction = false;
        Ok(())
    }

    fn execute(&mut self, sql: &str, params: &[ValueBinding]) -> Result<usize, DbStorageError> {
        let converted = Params::convert(params)?;
        let refs = converted.as_refs();
        let mut stmt = self
            .conn
            .prepare_cached(sql)
            .map_err(DbStorageError::SqliteError)?;
        let affected = stmt
            .execute(&refs[..])
            .map_err(DbStorageError::SqliteError)?;
        Ok(affected)
    }

    fn query(&mut self, sql: &str, params: &[ValueBinding]) -> Result<ResultSet, DbStorageError> {
        let converted = Params::convert(params)?;
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(DbStorageError::SqliteError)?;
        build_result_set(&mut stmt, converted.as_values())
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("in_transaction", &self.in_transaction)
            .finish_non_exhaustive()
    }
}
