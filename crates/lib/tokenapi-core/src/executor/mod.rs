//! Query execution against the analytical database.
//!
//! `QueryExecutor` is the seam between the catalog and the wire: the catalog
//! builds statements, an executor runs them.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::progress::ProgressSink;
use crate::query::QueryResult;

pub mod clickhouse;

pub use clickhouse::{ClickHouseClient, ClickHouseConfig, ClientError};

/// Future returned by `QueryExecutor::execute`.
pub type QueryFuture<'a> = BoxFuture<'a, Result<QueryResult, QueryError>>;

/// Runs complete SQL statements and returns their tabular result.
pub trait QueryExecutor: Send + Sync {
    /// Executes `sql`, optionally reporting delivery progress to `progress`.
    fn execute<'a>(&'a self, sql: &'a str, progress: Option<&'a dyn ProgressSink>)
    -> QueryFuture<'a>;
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for Arc<E> {
    fn execute<'a>(
        &'a self,
        sql: &'a str,
        progress: Option<&'a dyn ProgressSink>,
    ) -> QueryFuture<'a> {
        (**self).execute(sql, progress)
    }
}

#[derive(Debug)]
pub enum QueryError {
    /// The request never produced a response (connect, TLS, body read).
    Transport(Box<reqwest::Error>),
    /// The database rejected or aborted the statement.
    Database {
        status: u16,
        code: Option<String>,
        message: String,
    },
    /// A successful response whose body is not valid `JSON` format output.
    Decode(serde_json::Error),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "database request failed: {err}"),
            Self::Database {
                status,
                code: Some(code),
                message,
            } => write!(f, "database error (HTTP {status}, code {code}): {message}"),
            Self::Database {
                status,
                code: None,
                message,
            } => write!(f, "database error (HTTP {status}): {message}"),
            Self::Decode(err) => write!(f, "failed to decode database response: {err}"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err.as_ref()),
            Self::Decode(err) => Some(err),
            Self::Database { .. } => None,
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}
