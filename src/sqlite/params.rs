use crate::error::DbStorageError;
use crate::types::ValueBinding;

/// Convert a single binding to a rusqlite `Value`.
#[must_use]
pub fn binding_to_sqlite_value(value: &ValueBinding) -> rusqlite::types::Value {
    match value {
        ValueBinding::Int(i) => rusqlite::types::Value::Integer(*i),
        ValueBinding::Float(f) => rusqlite::types::Value::Real(*f),
        ValueBinding::Text(s) => rusqlite::types::Value::Text(s.clone()),
        ValueBinding::Null => rusqlite::types::Value::Null,
    }
}

/// Unified `SQLite` parameter container.
pub struct Params(pub Vec<rusqlite::types::Value>);

impl Params {
    /// Convert bindings into `SQLite` values.
    ///
    /// # Errors
    ///
    /// Infallible for the supported scalar kinds; the `Result` keeps the
    /// conversion seam uniform across backends.
    pub fn convert(params: &[ValueBinding]) -> Result<Self, DbStorageError> {
        let mut values = Vec::with_capacity(params.len());
        for p in params {
            values.push(binding_to_sqlite_value(p));
        }
        Ok(Params(values))
    }

    /// Borrow the underlying values.
    #[must_use]
    pub fn as_values(&self) -> &[rusqlite::types::Value] {
        &self.0
    }

    /// Build a borrowed params slice suitable for rusqlite execution.
    #[must_use]
    pub fn as_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.0.iter().map(|v| v as &dyn rusqlite::ToSql).collect()
    }
}
