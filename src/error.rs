use thiserror::Error;

use crate::types::ValueKind;

/// Crate-wide error type.
///
/// Three broad categories flow through this enum: protocol violations
/// (`ProtocolError`), storage failures reported by or on behalf of the driver
/// (`SqliteError`, `ConnectionError`, `StorageError`), and binding type
/// mismatches (`TypeMismatch`). Every variant aborts the operation that
/// produced it; nothing is retried and no transaction is rolled back on the
/// caller's behalf.
#[derive(Debug, Error)]
pub enum DbStorageError {
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("protocol violation: {0}")]
    ProtocolError(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },
}
