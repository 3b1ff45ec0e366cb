use std::collections::HashMap;
use std::sync::Arc;

use crate::types::ValueBinding;

/// One materialized row of a query result.
///
/// Column names and the name-to-index cache are shared across all rows of a
/// result set to avoid duplicating them per row.
#[derive(Debug, Clone)]
pub struct StorageRow {
    column_names: Arc<Vec<String>>,
    values: Vec<ValueBinding>,
    column_index: Arc<HashMap<String, usize>>,
}

impl StorageRow {
    pub(crate) fn new(
        column_names: Arc<Vec<String>>,
        column_index: Arc<HashMap<String, usize>>,
        values: Vec<ValueBinding>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index,
        }
    }

    /// The column names of the owning result set.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Get the index of a column by name, or None if not found.
    #[must_use]
    pub fn column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index.get(column_name) {
            return Some(idx);
        }
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value from the row by column name.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&ValueBinding> {
        self.column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&ValueBinding> {
        self.values.get(index)
    }

    /// Number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
