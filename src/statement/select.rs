use super::{OutputSpec, StatementBuilder, StatementMode};
use crate::error::DbStorageError;
use crate::placeholder::bind_named_placeholders;
use crate::types::ValueBinding;

impl StatementBuilder {
    /// Render `SELECT o1, ... FROM t1[, t2] [WHERE ...]` with the predicate's
    /// named placeholders rewritten to positional markers.
    ///
    /// The output column order is the registration order, so result position
    /// N always corresponds to the Nth registered output.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ProtocolError` when no table is selected, no
    /// output is registered, or a placeholder has no matching parameter.
    pub(crate) fn build_select(&self) -> Result<(String, Vec<ValueBinding>), DbStorageError> {
        if self.mode != StatementMode::Query {
            return Err(DbStorageError::ProtocolError(
                "statement is not a query".into(),
            ));
        }
        if self.tables.is_empty() {
            return Err(DbStorageError::ProtocolError(
                "no table selected for query".into(),
            ));
        }
        let out_names: Vec<&str> = match &self.output {
            OutputSpec::None => {
                return Err(DbStorageError::ProtocolError(
                    "no output registered for query".into(),
                ));
            }
            OutputSpec::Positional(names) => names.iter().map(String::as_str).collect(),
            OutputSpec::Bound(bindings) => bindings.iter().map(|b| b.name.as_str()).collect(),
        };

        let mut sql = format!(
            "SELECT {} FROM {}",
            out_names.join(", "),
            self.tables.join(", ")
        );
        let params = if let Some(where_text) = &self.where_clause {
            let (predicate, ordered) = bind_named_placeholders(where_text, &self.params)?;
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
            ordered
        } else {
            Vec::new()
        };
        Ok((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_select_shape() {
        let mut stmt = StatementBuilder::for_query(&["obs"]);
        stmt.add_out_column("decl").unwrap();
        stmt.add_out_column("obs.something").unwrap();
        stmt.add_out_column("ra").unwrap();
        stmt.add_param("id", ValueBinding::Int(42));
        stmt.set_where("id = :id");
        let (sql, params) = stmt.build_select().unwrap();
        assert_eq!(
            sql,
            "SELECT decl, obs.something, ra FROM obs WHERE id = ?1"
        );
        assert_eq!(params, vec![ValueBinding::Int(42)]);
    }

    #[test]
    fn renders_multi_table_from() {
        let mut stmt = StatementBuilder::for_query(&["obs", "visits"]);
        stmt.add_out_column("obs.id").unwrap();
        let (sql, _) = stmt.build_select().unwrap();
        assert_eq!(sql, "SELECT obs.id FROM obs, visits");
    }

    #[test]
    fn rejects_missing_output() {
        let stmt = StatementBuilder::for_query(&["obs"]);
        assert!(matches!(
            stmt.build_select(),
            Err(DbStorageError::ProtocolError(_))
        ));
    }

    #[test]
    fn surfaces_unbound_placeholder() {
        let mut stmt = StatementBuilder::for_query(&["obs"]);
        stmt.add_out_column("id").unwrap();
        stmt.set_where("id = :id");
        assert!(matches!(
            stmt.build_select(),
            Err(DbStorageError::ProtocolError(_))
        ));
    }
}
