use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single result row keyed by column name, in column order.
pub type Row = Map<String, Value>;

/// Column name and database type as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

/// Execution statistics attached to a `JSON` formatted response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStatistics {
    #[serde(default)]
    pub elapsed: f64,
    #[serde(default)]
    pub rows_read: u64,
    #[serde(default)]
    pub bytes_read: u64,
}

/// Tabular result in ClickHouse's `JSON` output format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub meta: Vec<ColumnMeta>,
    #[serde(default)]
    pub data: Vec<Row>,
    #[serde(default)]
    pub rows: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<QueryStatistics>,
}

impl QueryResult {
    /// Keeps only the rows accepted by `keep`, updating the row count.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&Row) -> bool) {
        self.data.retain(|row| keep(row));
        self.rows = self.data.len() as u64;
    }

    /// Keeps rows whose `name` column is a string accepted by `keep`.
    pub fn retain_named(&mut self, keep: impl Fn(&str) -> bool) {
        self.retain_rows(|row| row_name(row).is_some_and(&keep));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Values of the `name` column, skipping rows without one.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.data.iter().filter_map(row_name).collect()
    }
}

fn row_name(row: &Row) -> Option<&str> {
    row.get("name").and_then(Value::as_str)
}
