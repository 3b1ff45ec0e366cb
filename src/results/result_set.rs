use std::collections::HashMap;
use std::sync::Arc;

use super::row::StorageRow;
use crate::types::ValueBinding;

/// A result set from a database query.
///
/// Rows are fully materialized when the query executes; the engine's row
/// cursor is a forward-only position over this buffer.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    rows: Vec<StorageRow>,
    column_names: Option<Arc<Vec<String>>>,
    column_index: Option<Arc<HashMap<String, usize>>>,
    rows_affected: usize,
}

impl ResultSet {
    /// Create a new result set with a known row capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            rows: Vec::with_capacity(capacity),
            column_names: None,
            column_index: None,
            rows_affected: 0,
        }
    }

    /// Set the column names shared by all rows; builds the name-to-index
    /// cache once.
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        let index = Arc::new(
            column_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );
        self.column_names = Some(column_names);
        self.column_index = Some(index);
    }

    /// Column names shared by the rows, if any row was added.
    #[must_use]
    pub fn column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a row's values; a no-op until column names have been set.
    pub fn add_row_values(&mut self, values: Vec<ValueBinding>) {
        if let (Some(names), Some(index)) = (&self.column_names, &self.column_index) {
            self.rows
                .push(StorageRow::new(names.clone(), index.clone(), values));
            self.rows_affected += 1;
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[StorageRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&StorageRow> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows affected; tracks row count for SELECT results.
    #[must_use]
    pub fn rows_affected(&self) -> usize {
        self.rows_affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_column_names() {
        let mut rs = ResultSet::with_capacity(2);
        rs.set_column_names(Arc::new(vec!["id".to_string(), "ra".to_string()]));
        rs.add_row_values(vec![ValueBinding::Int(1), ValueBinding::Float(0.5)]);
        rs.add_row_values(vec![ValueBinding::Int(2), ValueBinding::Null]);

        assert_eq!(rs.len(), 2);
        let row = rs.row(1).unwrap();
        assert_eq!(row.column_index("ra"), Some(1));
        assert!(row.get("ra").unwrap().is_null());
        assert_eq!(row.get("id").unwrap().as_int(), Some(&2));
    }

    #[test]
    fn add_before_names_is_ignored() {
        let mut rs = ResultSet::default();
        rs.add_row_values(vec![ValueBinding::Int(1)]);
        assert!(rs.is_empty());
    }
}
