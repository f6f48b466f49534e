use std::collections::HashMap;
use std::sync::Arc;

use crate::conversion::FromValue;
use crate::error::SqliteDriverError;
use crate::types::Value;

/// A row drained from a cursor.
///
/// Column names and the name → index map are shared by every row of the
/// same [`ResultSet`].
#[derive(Debug, Clone)]
pub struct Row {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub values: Vec<Value>,
    column_index: Arc<HashMap<String, usize>>,
}

impl Row {
    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Convert the named cell into a Rust value.
    ///
    /// # Errors
    ///
    /// Returns `SqliteDriverError::ConversionError` if the column is missing
    /// or the cell does not convert to `T`.
    pub fn try_get<T: FromValue>(&self, column_name: &str) -> Result<T, SqliteDriverError> {
        let value = self.get(column_name).ok_or_else(|| {
            SqliteDriverError::ConversionError(format!("no column named {column_name:?}"))
        })?;
        T::from_value(value)
    }
}

/// Every row of one query, in cursor order.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<Row>,
    column_names: Option<Arc<Vec<String>>>,
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: None,
            column_index: Arc::default(),
        }
    }

    /// Set the column names for this result set (to be shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        // first occurrence wins for duplicate names
        let mut index = HashMap::with_capacity(column_names.len());
        for (i, name) in column_names.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        self.column_index = Arc::new(index);
        self.column_names = Some(column_names);
    }

    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Append a row. Column names must be set first; rows added before
    /// that are dropped.
    pub fn add_row_values(&mut self, values: Vec<Value>) {
        if let Some(column_names) = &self.column_names {
            self.results.push(Row {
                column_names: Arc::clone(column_names),
                values,
                column_index: Arc::clone(&self.column_index),
            });
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
