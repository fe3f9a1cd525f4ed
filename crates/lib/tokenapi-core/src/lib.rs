//! Core types and services for tokenapi-mcp.
//!
//! This crate owns SQL escaping and the fixed catalog statements, the
//! `QueryExecutor` seam with its ClickHouse HTTP implementation, and the
//! progress sink used to stream delivery status back to protocol clients.

pub mod catalog;
pub mod executor;
pub mod progress;
pub mod query;
pub mod sql;

pub use catalog::Catalog;
pub use executor::{ClickHouseClient, ClickHouseConfig, ClientError, QueryError, QueryExecutor};
pub use progress::{ProgressSink, ProgressUpdate};
pub use query::{ColumnMeta, QueryResult, QueryStatistics, Row};
