use tracing::debug;

use super::{EngineState, StorageEngine};
use crate::error::DbStorageError;
use crate::statement::StatementBuilder;
use crate::types::{ScalarValue, ValueBinding};

impl StorageEngine {
    /// Select the target table and enter insert building.
    ///
    /// Any bindings from a previous statement are discarded.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` outside an open transaction
    /// or while another statement is active.
    pub fn set_table_for_insert(&mut self, table: &str) -> Result<(), DbStorageError> {
        self.ensure_state(EngineState::TransactionOpen, "set table for insert")?;
        self.statement = Some(StatementBuilder::for_insert(table));
        self.state = EngineState::InsertBuilding;
        Ok(())
    }

    /// Bind one column value; the last write for a given name wins.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` when no insert is being
    /// built.
    pub fn set_column<T: ScalarValue>(
        &mut self,
        name: &str,
        value: T,
    ) -> Result<(), DbStorageError> {
        self.insert_statement_mut("set column")?
            .set_column(name, value.into_binding());
        Ok(())
    }

    /// Bind an explicit NULL for `name`; distinct from leaving the column
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` when no insert is being
    /// built.
    pub fn set_column_to_null(&mut self, name: &str) -> Result<(), DbStorageError> {
        self.insert_statement_mut("set column to null")?
            .set_column(name, ValueBinding::Null);
        Ok(())
    }

    /// Build and execute one INSERT from the accumulated bindings.
    ///
    /// The statement is torn down on success and on failure alike; the
    /// engine returns to the transaction-open state either way.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` when no insert is being built
    /// or no columns are bound, `DbStorageError::StorageError` when the
    /// driver rejects the row.
    pub fn insert_row(&mut self) -> Result<(), DbStorageError> {
        self.ensure_state(EngineState::InsertBuilding, "insert row")?;
        let statement = self
            .statement
            .take()
            .ok_or_else(|| DbStorageError::ProtocolError("no statement active (insert row)".into()))?;
        self.state = EngineState::TransactionOpen;

        let (sql, params) = statement.build_insert()?;
        let table = statement
            .table_list()
            .first()
            .cloned()
            .unwrap_or_default();
        debug!(%sql, "executing insert");
        self.conn_mut()?
            .execute(&sql, &params)
            .map_err(|e| DbStorageError::StorageError(format!("INSERT into {table} failed: {e}")))?;
        Ok(())
    }

    fn insert_statement_mut(
        &mut self,
        ctx: &str,
    ) -> Result<&mut StatementBuilder, DbStorageError> {
        if self.state != EngineState::InsertBuilding {
            return Err(DbStorageError::ProtocolError(format!(
                "operation not permitted in current state ({ctx})"
            )));
        }
        self.statement
            .as_mut()
            .ok_or_else(|| DbStorageError::ProtocolError(format!("no statement active ({ctx})")))
    }
}
