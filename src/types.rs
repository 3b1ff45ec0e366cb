use std::fmt;

use clap::ValueEnum;

use crate::error::DbStorageError;

/// Values that can be bound into a statement or read back from a result row.
///
/// The same closed union is used for inserted column values, query
/// parameters, and materialized result cells, so helper code never branches
/// on driver types:
/// ```rust
/// use db_storage::ValueBinding;
///
/// let bindings = vec![
///     ValueBinding::Int(42),
///     ValueBinding::Text("m31".into()),
///     ValueBinding::Null,
/// ];
/// # let _ = bindings;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ValueBinding {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// NULL value
    Null,
}

impl ValueBinding {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Runtime tag of the stored value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            ValueBinding::Int(_) => ValueKind::Int,
            ValueBinding::Float(_) => ValueKind::Float,
            ValueBinding::Text(_) => ValueKind::Text,
            ValueBinding::Null => ValueKind::Null,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let ValueBinding::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let ValueBinding::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let ValueBinding::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

/// Runtime tag for the kinds a [`ValueBinding`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
    Text,
    Null,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::Null => "null",
        };
        f.write_str(name)
    }
}

/// Scalar types representable in a [`ValueBinding`].
///
/// The trait carries the static-to-runtime mapping for the generic bind and
/// read APIs: binding stores the runtime tag, reading back verifies it. NULL
/// reads back as the type's default value; callers are expected to consult
/// the null flag first.
pub trait ScalarValue: Default + Clone {
    /// Runtime tag corresponding to this type.
    const KIND: ValueKind;

    /// Wrap an owned value into the union.
    fn into_binding(self) -> ValueBinding;

    /// Tag-checked read-back.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::TypeMismatch` if the stored tag differs from
    /// `Self::KIND` and the value is not NULL.
    fn from_binding(value: &ValueBinding) -> Result<Self, DbStorageError>;
}

impl ScalarValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_binding(self) -> ValueBinding {
        ValueBinding::Int(self)
    }

    fn from_binding(value: &ValueBinding) -> Result<Self, DbStorageError> {
        match value {
            ValueBinding::Int(i) => Ok(*i),
            ValueBinding::Null => Ok(0),
            other => Err(DbStorageError::TypeMismatch {
                expected: ValueKind::Int,
                actual: other.kind(),
            }),
        }
    }
}

impl ScalarValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn into_binding(self) -> ValueBinding {
        ValueBinding::Float(self)
    }

    fn from_binding(value: &ValueBinding) -> Result<Self, DbStorageError> {
        match value {
            ValueBinding::Float(f) => Ok(*f),
            ValueBinding::Null => Ok(0.0),
            other => Err(DbStorageError::TypeMismatch {
                expected: ValueKind::Float,
                actual: other.kind(),
            }),
        }
    }
}

impl ScalarValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn into_binding(self) -> ValueBinding {
        ValueBinding::Text(self)
    }

    fn from_binding(value: &ValueBinding) -> Result<Self, DbStorageError> {
        match value {
            ValueBinding::Text(s) => Ok(s.clone()),
            ValueBinding::Null => Ok(String::new()),
            other => Err(DbStorageError::TypeMismatch {
                expected: ValueKind::Text,
                actual: other.kind(),
            }),
        }
    }
}

/// The database type supported by this layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum DatabaseType {
    /// `SQLite` database
    Sqlite,
}
