use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// One row of a query or row-query result.
///
/// Column names and the name lookup are shared with every other row of the
/// same [`ResultSet`](super::ResultSet).
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    pub column_names: Arc<Vec<String>>,
    /// Values in column order.
    pub rows: Vec<RowValues>,
    #[doc(hidden)]
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl CustomDbRow {
    /// A standalone row; builds its own column lookup.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let cache = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            rows,
            column_index_cache: cache,
        }
    }

    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index_cache.get(column_name).copied()
    }

    /// Value of `column_name`, `None` if the result has no such column.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }
}

/// Name to position; a repeated name resolves to its first column.
pub(crate) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        index.entry(name.clone()).or_insert(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_column_names_resolve_to_the_first() {
        let row = CustomDbRow::new(
            Arc::new(vec!["id".into(), "name".into(), "id".into()]),
            vec![RowValues::Int(1), RowValues::Text("a".into()), RowValues::Int(2)],
        );
        assert_eq!(row.get_column_index("id"), Some(0));
        assert_eq!(row.get("id").and_then(RowValues::as_int), Some(&1));
        assert_eq!(row.get_by_index(2).and_then(RowValues::as_int), Some(&2));
        assert!(row.get("missing").is_none());
    }
}
