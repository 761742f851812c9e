//! Rows and result sets shared by both dialects.

mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::CustomDbRow;
