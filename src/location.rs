use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::DbStorageError;
use crate::types::DatabaseType;

lazy_static! {
    static ref LOCATION_RE: Regex = Regex::new(
        r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.-]*)://(?P<host>[^:/]*)(?::(?P<port>\d{1,5}))?(?P<path>/.*)$"
    )
    .expect("location pattern");
}

/// Opaque, immutable descriptor of a storage endpoint.
///
/// Carries a `scheme://host[:port]/database-path` locator string, e.g.
/// `sqlite:///var/data/registry.db`. The engine only ever hands the locator
/// to [`resolve_location`]; it never interprets it itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLocation {
    locator: String,
}

impl LogicalLocation {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
        }
    }

    /// The raw locator string.
    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }
}

impl fmt::Display for LogicalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.locator)
    }
}

/// Driver connection parameters resolved from a [`LogicalLocation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub db_type: DatabaseType,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Database path. For `SQLite` this is the filesystem path of the
    /// database file, leading slash included.
    pub database: String,
}

/// Parse a `scheme://host[:port]/path` locator into driver parameters.
///
/// # Errors
///
/// Returns `DbStorageError::ConfigError` for a malformed locator, an
/// unsupported scheme, or an out-of-range port.
pub fn resolve_location(location: &LogicalLocation) -> Result<ConnectionParams, DbStorageError> {
    let caps = LOCATION_RE.captures(location.locator()).ok_or_else(|| {
        DbStorageError::ConfigError(format!("malformed location: {}", location.locator()))
    })?;

    let scheme = caps["scheme"].to_ascii_lowercase();
    let db_type = match scheme.as_str() {
        "sqlite" | "file" => DatabaseType::Sqlite,
        other => {
            return Err(DbStorageError::ConfigError(format!(
                "unsupported scheme: {other}"
            )));
        }
    };

    let host = caps
        .name("host")
        .map(|m| m.as_str())
        .filter(|h| !h.is_empty())
        .map(str::to_string);
    let port = caps
        .name("port")
        .map(|m| m.as_str().parse::<u16>())
        .transpose()
        .map_err(|_| {
            DbStorageError::ConfigError(format!("port out of range in {}", location.locator()))
        })?;

    Ok(ConnectionParams {
        db_type,
        host,
        port,
        database: caps["path"].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_sqlite_path_locator() {
        let loc = LogicalLocation::new("sqlite:///tmp/data/reg.db");
        let params = resolve_location(&loc).unwrap();
        assert_eq!(params.db_type, DatabaseType::Sqlite);
        assert_eq!(params.host, None);
        assert_eq!(params.port, None);
        assert_eq!(params.database, "/tmp/data/reg.db");
    }

    #[test]
    fn resolves_host_and_port() {
        let loc = LogicalLocation::new("sqlite://localhost:3306/tmp/reg.db");
        let params = resolve_location(&loc).unwrap();
        assert_eq!(params.host.as_deref(), Some("localhost"));
        assert_eq!(params.port, Some(3306));
        assert_eq!(params.database, "/tmp/reg.db");
    }

    #[test]
    fn rejects_unknown_scheme() {
        let loc = LogicalLocation::new("mysql://host:3306/dbname");
        let err = resolve_location(&loc).unwrap_err();
        assert!(matches!(err, DbStorageError::ConfigError(_)));
    }

    #[test]
    fn rejects_malformed_locator() {
        let loc = LogicalLocation::new("not-a-locator");
        assert!(matches!(
            resolve_location(&loc),
            Err(DbStorageError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_port() {
        let loc = LogicalLocation::new("sqlite://host:70000/db");
        assert!(matches!(
            resolve_location(&loc),
            Err(DbStorageError::ConfigError(_))
        ));
    }
}
