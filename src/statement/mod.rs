//! Incremental statement assembly.
//!
//! A [`StatementBuilder`] accumulates the table selection, column and
//! parameter bindings, predicate text, and output spec for exactly one
//! INSERT or SELECT, then renders the statement text and its ordered
//! parameter list in one step. Incomplete specifications are rejected here,
//! before any driver interaction.

mod insert;
mod select;

use crate::error::DbStorageError;
use crate::output::OutDestination;
use crate::types::ValueBinding;

/// Shape of the statement being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementMode {
    Insert,
    Query,
}

/// A named output destination registered for a query.
#[derive(Debug, Clone)]
pub(crate) struct OutBinding {
    pub(crate) name: String,
    pub(crate) dest: OutDestination,
}

/// Registered result destinations for a query.
///
/// Positional and bound registration are mutually exclusive per statement.
#[derive(Debug, Clone, Default)]
pub(crate) enum OutputSpec {
    #[default]
    None,
    Positional(Vec<String>),
    Bound(Vec<OutBinding>),
}

/// Accumulates one statement's table, bindings, predicate, and output spec.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    mode: StatementMode,
    tables: Vec<String>,
    columns: Vec<(String, ValueBinding)>,
    params: Vec<(String, ValueBinding)>,
    where_clause: Option<String>,
    output: OutputSpec,
}

impl StatementBuilder {
    pub(crate) fn for_insert(table: &str) -> Self {
        Self {
            mode: StatementMode::Insert,
            tables: vec![table.to_string()],
            columns: Vec::new(),
            params: Vec::new(),
            where_clause: None,
            output: OutputSpec::None,
        }
    }

    pub(crate) fn for_query(tables: &[&str]) -> Self {
        Self {
            mode: StatementMode::Query,
            tables: tables.iter().map(|t| (*t).to_string()).collect(),
            columns: Vec::new(),
            params: Vec::new(),
            where_clause: None,
            output: OutputSpec::None,
        }
    }

    pub(crate) fn table_list(&self) -> &[String] {
        &self.tables
    }

    /// Register or overwrite a column binding; last write for a name wins.
    pub(crate) fn set_column(&mut self, name: &str, value: ValueBinding) {
        if let Some(entry) = self.columns.iter_mut().find(|entry| entry.0 == name) {
            entry.1 = value;
        } else {
            self.columns.push((name.to_string(), value));
        }
    }

    /// Register or overwrite a predicate parameter binding.
    pub(crate) fn add_param(&mut self, name: &str, value: ValueBinding) {
        if let Some(entry) = self.params.iter_mut().find(|entry| entry.0 == name) {
            entry.1 = value;
        } else {
            self.params.push((name.to_string(), value));
        }
    }

    pub(crate) fn set_where(&mut self, text: &str) {
        self.where_clause = Some(text.to_string());
    }

    /// Register a positional output column; returns its assigned position.
    pub(crate) fn add_out_column(&mut self, name: &str) -> Result<usize, DbStorageError> {
        match &mut self.output {
            OutputSpec::Bound(_) => Err(DbStorageError::ProtocolError(
                "positional and bound output modes cannot be mixed".into(),
            )),
            OutputSpec::None => {
                self.output = OutputSpec::Positional(vec![name.to_string()]);
                Ok(0)
            }
            OutputSpec::Positional(names) => {
                names.push(name.to_string());
                Ok(names.len() - 1)
            }
        }
    }

    /// Register a bound output destination; returns its assigned position.
    pub(crate) fn add_out_param(
        &mut self,
        name: &str,
        dest: OutDestination,
    ) -> Result<usize, DbStorageError> {
        let binding = OutBinding {
            name: name.to_string(),
            dest,
        };
        match &mut self.output {
            OutputSpec::Positional(_) => Err(DbStorageError::ProtocolError(
                "positional and bound output modes cannot be mixed".into(),
            )),
            OutputSpec::None => {
                self.output = OutputSpec::Bound(vec![binding]);
                Ok(0)
            }
            OutputSpec::Bound(bindings) => {
                bindings.push(binding);
                Ok(bindings.len() - 1)
            }
        }
    }

    pub(crate) fn output(&self) -> &OutputSpec {
        &self.output
    }
}
