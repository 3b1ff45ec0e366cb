use tracing::{debug, warn};

use super::{CursorPos, EngineState, StorageEngine};
use crate::error::DbStorageError;
use crate::output::{OutScalar, OutSlot};
use crate::results::StorageRow;
use crate::statement::{OutputSpec, StatementBuilder};
use crate::types::ScalarValue;

impl StorageEngine {
    /// Select the table to query and enter query building.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` outside an open transaction
    /// or while another statement is active.
    pub fn set_table_for_query(&mut self, table: &str) -> Result<(), DbStorageError> {
        self.set_table_list_for_query(&[table])
    }

    /// Multi-table variant; tables appear in the FROM clause in order.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` outside an open transaction,
    /// while another statement is active, or for an empty table list.
    pub fn set_table_list_for_query(&mut self, tables: &[&str]) -> Result<(), DbStorageError> {
        self.ensure_state(EngineState::TransactionOpen, "set table for query")?;
        if tables.is_empty() {
            return Err(DbStorageError::ProtocolError(
                "no table named for query".into(),
            ));
        }
        self.statement = Some(StatementBuilder::for_query(tables));
        self.state = EngineState::QueryBuilding;
        Ok(())
    }

    /// Register a predicate parameter for a `:name` placeholder.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` when no query is being built.
    pub fn cond_param<T: ScalarValue>(
        &mut self,
        name: &str,
        value: T,
    ) -> Result<(), DbStorageError> {
        self.query_statement_mut("bind condition parameter")?
            .add_param(name, value.into_binding());
        Ok(())
    }

    /// Store the free-form WHERE text referencing `:name` placeholders.
    ///
    /// Placeholders are matched against registered parameters when the query
    /// executes, not here.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` when no query is being built.
    pub fn set_query_where(&mut self, where_clause: &str) -> Result<(), DbStorageError> {
        self.query_statement_mut("set query where")?
            .set_where(where_clause);
        Ok(())
    }

    /// Register a positional output column; positions follow call order
    /// starting at 0.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` when no query is being built
    /// or bound outputs were already registered.
    pub fn out_column(&mut self, name: &str) -> Result<(), DbStorageError> {
        self.query_statement_mut("register output column")?
            .add_out_column(name)?;
        Ok(())
    }

    /// Register a bound output destination written on every row advance.
    ///
    /// The slot is caller-owned and must outlive the query through the last
    /// [`next`](Self::next) call.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` when no query is being built
    /// or positional outputs were already registered.
    pub fn out_param<T: OutScalar>(
        &mut self,
        name: &str,
        slot: &OutSlot<T>,
    ) -> Result<(), DbStorageError> {
        self.query_statement_mut("register output parameter")?
            .add_out_param(name, T::destination(slot))?;
        Ok(())
    }

    /// Build and execute the SELECT; transitions to row iteration.
    ///
    /// On failure the statement is torn down and the engine returns to the
    /// transaction-open state, so `end_transaction` stays reachable.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` for an incomplete
    /// specification (no output registered, unmatched placeholder) and
    /// `DbStorageError::StorageError` when the driver rejects the query.
    pub fn query(&mut self) -> Result<(), DbStorageError> {
        self.ensure_state(EngineState::QueryBuilding, "query")?;
        let Some(statement) = self.statement.as_ref() else {
            return Err(DbStorageError::ProtocolError(
                "no statement active (query)".into(),
            ));
        };
        let tables = statement.table_list().join(", ");
        let built = statement.build_select();

        let (sql, params) = match built {
            Ok(built) => built,
            Err(e) => {
                warn!(error = %e, "query specification rejected; statement discarded");
                self.discard_statement();
                return Err(e);
            }
        };
        debug!(%sql, "executing query");
        match self.conn_mut()?.query(&sql, &params) {
            Ok(result) => {
                self.result = Some(result);
                self.cursor = CursorPos::Start;
                self.state = EngineState::QueryExecuted;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "query failed; statement discarded");
                self.discard_statement();
                Err(DbStorageError::StorageError(format!(
                    "SELECT from {tables} failed: {e}"
                )))
            }
        }
    }

    /// Advance the row cursor.
    ///
    /// Returns `Ok(false)` once the result set is exhausted; that is the
    /// expected terminal signal, not an error. Bound destinations are
    /// written only while rows remain, so exhaustion never clobbers the
    /// values of the last row.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` when no query result is
    /// active, `DbStorageError::TypeMismatch` when a bound destination
    /// cannot hold the row's value.
    pub fn next(&mut self) -> Result<bool, DbStorageError> {
        self.ensure_state(EngineState::QueryExecuted, "next")?;
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| DbStorageError::ProtocolError("no result set (next)".into()))?;

        let next_index = match self.cursor {
            CursorPos::Start => 0,
            CursorPos::At(index) => index + 1,
            CursorPos::Done => return Ok(false),
        };
        if next_index >= result.len() {
            self.cursor = CursorPos::Done;
            return Ok(false);
        }
        let row = result.row(next_index).ok_or_else(|| {
            DbStorageError::StorageError(format!("result row {next_index} unavailable"))
        })?;

        if let Some(statement) = self.statement.as_ref() {
            if let OutputSpec::Bound(bindings) = statement.output() {
                for (position, binding) in bindings.iter().enumerate() {
                    let value = row.get_by_index(position).ok_or_else(|| {
                        DbStorageError::StorageError(format!(
                            "result row missing output position {position}"
                        ))
                    })?;
                    binding.dest.write(value)?;
                }
            }
        }
        self.cursor = CursorPos::At(next_index);
        Ok(true)
    }

    /// Null flag of the output column at `position` for the current row.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` without a current row or for
    /// an out-of-range position.
    pub fn column_is_null(&self, position: usize) -> Result<bool, DbStorageError> {
        let row = self.current_row("column is null")?;
        let value = row.get_by_index(position).ok_or_else(|| {
            DbStorageError::ProtocolError(format!("output position {position} out of range"))
        })?;
        Ok(value.is_null())
    }

    /// Read the output column at `position` for the current row.
    ///
    /// A NULL column yields the type's default value; consult
    /// [`column_is_null`](Self::column_is_null) first.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` without a current row or for
    /// an out-of-range position, `DbStorageError::TypeMismatch` when the
    /// column's kind differs from `T`.
    pub fn get_column_by_pos<T: ScalarValue>(&self, position: usize) -> Result<T, DbStorageError> {
        let row = self.current_row("get column by position")?;
        let value = row.get_by_index(position).ok_or_else(|| {
            DbStorageError::ProtocolError(format!("output position {position} out of range"))
        })?;
        T::from_binding(value)
    }

    /// Release the buffered result and output spec; back to the
    /// transaction-open state.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` when no query is active.
    pub fn finish_query(&mut self) -> Result<(), DbStorageError> {
        self.ensure_state(EngineState::QueryExecuted, "finish query")?;
        self.discard_statement();
        Ok(())
    }

    fn discard_statement(&mut self) {
        self.statement = None;
        self.result = None;
        self.cursor = CursorPos::Start;
        self.state = EngineState::TransactionOpen;
    }

    fn current_row(&self, ctx: &str) -> Result<&StorageRow, DbStorageError> {
        if self.state != EngineState::QueryExecuted {
            return Err(DbStorageError::ProtocolError(format!(
                "operation not permitted in current state ({ctx})"
            )));
        }
        let CursorPos::At(index) = self.cursor else {
            return Err(DbStorageError::ProtocolError(format!(
                "no current row ({ctx})"
            )));
        };
        self.result
            .as_ref()
            .and_then(|r| r.row(index))
            .ok_or_else(|| DbStorageError::ProtocolError(format!("no current row ({ctx})")))
    }

    fn query_statement_mut(&mut self, ctx: &str) -> Result<&mut StatementBuilder, DbStorageError> {
        if self.state != EngineState::QueryBuilding {
            return Err(DbStorageError::ProtocolError(format!(
                "operation not permitted in current state ({ctx})"
            )));
        }
        self.statement
            .as_mut()
            .ok_or_else(|| DbStorageError::ProtocolError(format!("no statement active ({ctx})")))
    }
}
