//! The storage engine: transaction and statement state machine.

mod insert;
mod select;

use tracing::debug;

use crate::config::StorageConfig;
use crate::driver::{DriverConnection, connect};
use crate::error::DbStorageError;
use crate::location::{LogicalLocation, resolve_location};
use crate::results::ResultSet;
use crate::statement::StatementBuilder;

/// Which endpoint the engine connects to on the next transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Persist,
    Retrieve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Idle,
    TransactionOpen,
    InsertBuilding,
    QueryBuilding,
    QueryExecuted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorPos {
    Start,
    At(usize),
    Done,
}

/// Transactional access to one relational storage endpoint.
///
/// One engine instance serves one caller sequentially. It holds no internal
/// locking and every driver call blocks until the driver responds;
/// concurrent method calls on the same instance are unsupported. At most one
/// transaction and one statement are active at a time, and statement
/// execution requires an open transaction.
///
/// The engine never rolls back on error. After a failed operation the
/// transaction is still open; the caller chooses to retry, commit via
/// [`end_transaction`](Self::end_transaction), or drop the engine, which
/// releases the connection and with it any uncommitted driver transaction.
/// A failed `insert_row` or `query` tears down the active statement so
/// `end_transaction` stays reachable.
#[derive(Debug)]
pub struct StorageEngine {
    config: StorageConfig,
    location: Option<(LogicalLocation, AccessMode)>,
    conn: Option<Box<dyn DriverConnection>>,
    state: EngineState,
    statement: Option<StatementBuilder>,
    result: Option<ResultSet>,
    cursor: CursorPos,
}

impl StorageEngine {
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            location: None,
            conn: None,
            state: EngineState::Idle,
            statement: None,
            result: None,
            cursor: CursorPos::Start,
        }
    }

    /// Record the endpoint for subsequent write transactions.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` while a transaction is open.
    pub fn set_persist_location(
        &mut self,
        location: &LogicalLocation,
    ) -> Result<(), DbStorageError> {
        self.set_location(location, AccessMode::Persist, "set persist location")
    }

    /// Record the endpoint for subsequent read transactions.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` while a transaction is open.
    pub fn set_retrieve_location(
        &mut self,
        location: &LogicalLocation,
    ) -> Result<(), DbStorageError> {
        self.set_location(location, AccessMode::Retrieve, "set retrieve location")
    }

    fn set_location(
        &mut self,
        location: &LogicalLocation,
        mode: AccessMode,
        ctx: &str,
    ) -> Result<(), DbStorageError> {
        self.ensure_state(EngineState::Idle, ctx)?;
        self.location = Some((location.clone(), mode));
        Ok(())
    }

    /// Resolve the recorded location, open a driver connection, and begin a
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` if a transaction is already
    /// open or no location was recorded; resolution and connection failures
    /// surface as `ConfigError`/`ConnectionError`.
    pub fn start_transaction(&mut self) -> Result<(), DbStorageError> {
        if self.state != EngineState::Idle {
            return Err(DbStorageError::ProtocolError(
                "transaction already open".into(),
            ));
        }
        let Some((location, mode)) = self.location.as_ref() else {
            return Err(DbStorageError::ProtocolError(
                "no location set before transaction start".into(),
            ));
        };
        let params = resolve_location(location)?;
        let mut conn = connect(&params, &self.config)?;
        conn.begin()?;
        debug!(location = %location, ?mode, "transaction started");
        self.conn = Some(conn);
        self.state = EngineState::TransactionOpen;
        Ok(())
    }

    /// Commit the open transaction and release the connection.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` if no transaction is open or
    /// a statement is still active; commit failures leave the transaction
    /// open for the caller to retry or abandon.
    pub fn end_transaction(&mut self) -> Result<(), DbStorageError> {
        match self.state {
            EngineState::Idle => Err(DbStorageError::ProtocolError(
                "no transaction open".into(),
            )),
            EngineState::InsertBuilding
            | EngineState::QueryBuilding
            | EngineState::QueryExecuted => Err(DbStorageError::ProtocolError(
                "statement still active at transaction end".into(),
            )),
            EngineState::TransactionOpen => {
                self.conn_mut()?.commit()?;
                self.conn = None;
                self.state = EngineState::Idle;
                debug!("transaction committed");
                Ok(())
            }
        }
    }

    /// Create `new_name` with `template_name`'s column definitions and no
    /// rows.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` outside an open transaction,
    /// `DbStorageError::StorageError` if the driver rejects the statement.
    pub fn create_table_from_template(
        &mut self,
        new_name: &str,
        template_name: &str,
    ) -> Result<(), DbStorageError> {
        self.ensure_state(EngineState::TransactionOpen, "create table")?;
        let sql = format!("CREATE TABLE {new_name} AS SELECT * FROM {template_name} WHERE 1=0");
        self.run_ddl(&sql, "CREATE TABLE", new_name)
    }

    /// Delete every row of `name`.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` outside an open transaction,
    /// `DbStorageError::StorageError` if the driver rejects the statement.
    pub fn truncate_table(&mut self, name: &str) -> Result<(), DbStorageError> {
        self.ensure_state(EngineState::TransactionOpen, "truncate table")?;
        let sql = format!("DELETE FROM {name}");
        self.run_ddl(&sql, "TRUNCATE", name)
    }

    /// Drop `name`.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` outside an open transaction,
    /// `DbStorageError::StorageError` if the driver rejects the statement.
    pub fn drop_table(&mut self, name: &str) -> Result<(), DbStorageError> {
        self.ensure_state(EngineState::TransactionOpen, "drop table")?;
        let sql = format!("DROP TABLE {name}");
        self.run_ddl(&sql, "DROP TABLE", name)
    }

    /// Run one free-form statement against the open transaction.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` outside an open transaction,
    /// `DbStorageError::StorageError` if the driver rejects the statement.
    pub fn execute_sql(&mut self, sql: &str) -> Result<(), DbStorageError> {
        self.ensure_state(EngineState::TransactionOpen, "execute sql")?;
        debug!(%sql, "executing statement");
        self.conn_mut()?
            .execute(sql, &[])
            .map_err(|e| DbStorageError::StorageError(format!("statement failed: {e}")))?;
        Ok(())
    }

    fn run_ddl(&mut self, sql: &str, kind: &str, table: &str) -> Result<(), DbStorageError> {
        debug!(%sql, "executing ddl");
        self.conn_mut()?
            .execute(sql, &[])
            .map_err(|e| DbStorageError::StorageError(format!("{kind} on {table} failed: {e}")))?;
        Ok(())
    }

    fn ensure_state(&self, expected: EngineState, ctx: &str) -> Result<(), DbStorageError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(DbStorageError::ProtocolError(format!(
                "operation not permitted in current state ({ctx})"
            )))
        }
    }

    fn conn_mut(&mut self) -> Result<&mut (dyn DriverConnection + '_), DbStorageError> {
        match self.conn.as_deref_mut() {
            Some(conn) => Ok(&mut *conn),
            None => Err(DbStorageError::ProtocolError("no open connection".into())),
        }
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new(StorageConfig::default())
    }
}
