//! `SQLite` backend, built on rusqlite.

mod connection;
pub(crate) mod params;
pub(crate) mod query;

pub use connection::SqliteConnection;
pub use params::Params;
pub use query::build_result_set;
