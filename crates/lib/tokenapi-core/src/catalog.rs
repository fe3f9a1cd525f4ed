//! Catalog operations backing the MCP tools.

use crate::executor::{QueryError, QueryExecutor};
use crate::progress::ProgressSink;
use crate::query::QueryResult;
use crate::sql;

/// Read-only catalog and query access over a `QueryExecutor`.
#[derive(Debug, Clone)]
pub struct Catalog<E> {
    executor: E,
}

impl<E: QueryExecutor> Catalog<E> {
    pub const fn new(executor: E) -> Self {
        Self { executor }
    }

    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Lists databases following the `{network}:{name}@{version}` convention.
    ///
    /// # Errors
    /// Returns `QueryError` if the statement fails.
    pub async fn list_databases(
        &self,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<QueryResult, QueryError> {
        let statement = sql::list_databases_statement();
        let mut result = self.executor.execute(&statement, progress).await?;
        result.retain_named(sql::is_versioned_database);
        Ok(result)
    }

    /// Lists the public tables of `database`.
    ///
    /// # Errors
    /// Returns `QueryError` if the statement fails.
    pub async fn list_tables(
        &self,
        database: &str,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<QueryResult, QueryError> {
        let statement = sql::list_tables_statement(database);
        let mut result = self.executor.execute(&statement, progress).await?;
        result.retain_named(|name| !sql::is_hidden_table(name));
        Ok(result)
    }

    /// Describes the columns of `database.table`.
    ///
    /// # Errors
    /// Returns `QueryError` if the statement fails.
    pub async fn describe_table(
        &self,
        database: &str,
        table: &str,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<QueryResult, QueryError> {
        let statement = sql::describe_table_statement(database, table);
        self.executor.execute(&statement, progress).await
    }

    /// Runs a caller supplied statement verbatim.
    ///
    /// # Errors
    /// Returns `QueryError` if the statement fails.
    pub async fn run_query(
        &self,
        query: &str,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<QueryResult, QueryError> {
        self.executor.execute(query, progress).await
    }
}
