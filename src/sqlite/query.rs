use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{Statement, ToSql};

use crate::error::DbStorageError;
use crate::results::ResultSet;
use crate::types::ValueBinding;

/// Extract a `ValueBinding` from a `SQLite` row.
///
/// # Errors
///
/// Returns `DbStorageError` if the value cannot be read, or
/// `DbStorageError::StorageError` for column types outside the supported
/// scalar set.
pub fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<ValueBinding, DbStorageError> {
    let value: Value = row.get(idx).map_err(DbStorageError::SqliteError)?;
    match value {
        Value::Null => Ok(ValueBinding::Null),
        Value::Integer(i) => Ok(ValueBinding::Int(i)),
        Value::Real(f) => Ok(ValueBinding::Float(f)),
        Value::Text(s) => Ok(ValueBinding::Text(s)),
        Value::Blob(_) => Err(DbStorageError::StorageError(format!(
            "unsupported blob value in column {idx}"
        ))),
    }
}

/// Run a prepared SELECT and materialize every row into a `ResultSet`.
///
/// # Errors
///
/// Returns `DbStorageError` if query execution or value extraction fails.
pub fn build_result_set(
    stmt: &mut Statement,
    params: &[Value],
) -> Result<ResultSet, DbStorageError> {
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|v| v as &dyn ToSql).collect();
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows_iter = stmt.query(&param_refs[..])?;
    while let Some(row) = rows_iter.next()? {
        let mut values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            values.push(extract_value(row, i)?);
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}
