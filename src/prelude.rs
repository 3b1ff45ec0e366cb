//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types to make it easier to
//! get started with the library.

pub use crate::config::{JournalMode, StorageConfig, StorageConfigBuilder};
pub use crate::engine::{AccessMode, StorageEngine};
pub use crate::error::DbStorageError;
pub use crate::location::LogicalLocation;
pub use crate::output::OutSlot;
pub use crate::results::{ResultSet, StorageRow};
pub use crate::types::{DatabaseType, ValueBinding, ValueKind};
