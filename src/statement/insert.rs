use std::fmt::Write;

use super::{StatementBuilder, StatementMode};
use crate::error::DbStorageError;
use crate::types::ValueBinding;

impl StatementBuilder {
    /// Render `INSERT INTO t (c1, ...) VALUES (?1, ...)` with parameters in
    /// column registration order.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` when no table is selected or
    /// no columns are bound.
    pub(crate) fn build_insert(&self) -> Result<(String, Vec<ValueBinding>), DbStorageError> {
        if self.mode != StatementMode::Insert {
            return Err(DbStorageError::ProtocolError(
                "statement is not an insert".into(),
            ));
        }
        let Some(table) = self.tables.first() else {
            return Err(DbStorageError::ProtocolError(
                "no table selected for insert".into(),
            ));
        };
        if self.columns.is_empty() {
            return Err(DbStorageError::ProtocolError(format!(
                "no columns bound for insert into {table}"
            )));
        }

        let mut sql = format!("INSERT INTO {table} (");
        for (i, (name, _)) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(name);
        }
        sql.push_str(") VALUES (");
        for i in 1..=self.columns.len() {
            if i > 1 {
                sql.push_str(", ");
            }
            let _ = write!(sql, "?{i}");
        }
        sql.push(')');

        let params = self.columns.iter().map(|(_, v)| v.clone()).collect();
        Ok((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_insert_shape() {
        let mut stmt = StatementBuilder::for_insert("obs");
        stmt.set_column("id", ValueBinding::Int(42));
        stmt.set_column("ra", ValueBinding::Float(3.5));
        stmt.set_column("something", ValueBinding::Null);
        let (sql, params) = stmt.build_insert().unwrap();
        assert_eq!(
            sql,
            "INSERT INTO obs (id, ra, something) VALUES (?1, ?2, ?3)"
        );
        assert_eq!(
            params,
            vec![
                ValueBinding::Int(42),
                ValueBinding::Float(3.5),
                ValueBinding::Null,
            ]
        );
    }

    #[test]
    fn rejects_empty_column_set() {
        let stmt = StatementBuilder::for_insert("obs");
        assert!(matches!(
            stmt.build_insert(),
            Err(DbStorageError::ProtocolError(_))
        ));
    }
}
