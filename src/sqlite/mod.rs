// SQLite backend
//
// - config: bb8 connection manager and blocking-call helper
// - params: parameter conversion between RowValues and rusqlite values
// - query: result extraction and building
// - executor: statement execution against the pool

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::{SharedSqliteConnection, SqliteManager};
pub use executor::{execute_batch, execute_dml, execute_select};
pub use params::Params;
pub use query::build_result_set;
