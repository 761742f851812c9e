// PostgreSQL backend
//
// - config: bb8 connection manager
// - params: RowValues as tokio-postgres parameters
// - query: result extraction and building
// - executor: statement execution against the pool

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::PgManager;
pub use executor::{execute_batch, execute_dml, execute_select};
pub use params::Params;
pub use query::build_result_set_from_statement;
