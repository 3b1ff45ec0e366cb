//! Transactional relational-storage access layer.
//!
//! [`StorageEngine`] wraps one database endpoint behind an explicit
//! transaction and statement protocol: select a table for insert or query,
//! register typed column/parameter bindings, execute, then iterate rows
//! through positional reads or pre-bound output slots.
//!
//! ```rust,no_run
//! use db_storage::prelude::*;
//!
//! fn lookup(loc: &LogicalLocation) -> Result<f64, DbStorageError> {
//!     let mut engine = StorageEngine::new(StorageConfig::default());
//!     engine.set_retrieve_location(loc)?;
//!     engine.start_transaction()?;
//!     engine.set_table_for_query("observation")?;
//!     engine.cond_param("id", 42i64)?;
//!     engine.set_query_where("id = :id")?;
//!     engine.out_column("ra")?;
//!     engine.query()?;
//!     let ra = if engine.next()? {
//!         engine.get_column_by_pos::<f64>(0)?
//!     } else {
//!         0.0
//!     };
//!     engine.finish_query()?;
//!     engine.end_transaction()?;
//!     Ok(ra)
//! }
//! ```

mod config;
mod driver;
mod engine;
mod error;
mod location;
mod output;
mod placeholder;
mod results;
mod statement;
mod types;

pub mod prelude;
pub mod sqlite;

pub use config::{JournalMode, StorageConfig, StorageConfigBuilder};
pub use driver::{DriverConnection, connect};
pub use engine::{AccessMode, StorageEngine};
pub use error::DbStorageError;
pub use location::{ConnectionParams, LogicalLocation, resolve_location};
pub use output::{OutDestination, OutScalar, OutSlot};
pub use results::{ResultSet, StorageRow};
pub use types::{DatabaseType, ScalarValue, ValueBinding, ValueKind};
