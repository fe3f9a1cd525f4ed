use std::future::Future;

use rmcp::{
    ErrorData,
    RoleServer,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    service::RequestContext,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use tokenapi_core::{ProgressSink, QueryError, QueryExecutor, QueryResult};

use super::ToolName;
use crate::progress::McpProgress;
use crate::{TokenApiMcp, helpers};

/// Parameters for listing the tables of a database.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListTablesParams {
    /// Database name, e.g. `mainnet:evm-tokens@v1`.
    pub database: String,
}

/// Parameters for describing a table.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DescribeTableParams {
    /// Database name, e.g. `mainnet:evm-tokens@v1`.
    pub database: String,
    /// Table name inside the database.
    pub table: String,
}

/// Parameters for running a read-only query.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RunQueryParams {
    /// ClickHouse SQL statement, run as given.
    pub query: String,
}

#[tool_router(router = tool_router_catalog, vis = "pub")]
impl<E: QueryExecutor + 'static> TokenApiMcp<E> {
    #[tool(description = "List available databases")]
    async fn list_databases(
        &self,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let progress = McpProgress::from_context(&context);
        self.call_list_databases(McpProgress::as_sink(progress.as_ref()))
            .await
    }

    #[tool(description = "List available tables from a database")]
    async fn list_tables(
        &self,
        Parameters(params): Parameters<ListTablesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let progress = McpProgress::from_context(&context);
        self.call_list_tables(&params, McpProgress::as_sink(progress.as_ref()))
            .await
    }

    #[tool(description = "Describe the schema of a table from a database")]
    async fn describe_table(
        &self,
        Parameters(params): Parameters<DescribeTableParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let progress = McpProgress::from_context(&context);
        self.call_describe_table(&params, McpProgress::as_sink(progress.as_ref()))
            .await
    }

    #[tool(description = "Run a read-only SQL query")]
    async fn run_query(
        &self,
        Parameters(params): Parameters<RunQueryParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let progress = McpProgress::from_context(&context);
        self.call_run_query(&params, McpProgress::as_sink(progress.as_ref()))
            .await
    }
}

impl<E: QueryExecutor + 'static> TokenApiMcp<E> {
    /// Runs `list_databases` outside the protocol layer.
    ///
    /// # Errors
    /// Returns `ErrorData` only if the rows cannot be serialized.
    pub async fn call_list_databases(
        &self,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<CallToolResult, ErrorData> {
        self.tracked(ToolName::ListDatabases, self.catalog.list_databases(progress))
            .await
    }

    /// Runs `list_tables` outside the protocol layer.
    ///
    /// # Errors
    /// Returns `INVALID_PARAMS` for a blank database.
    pub async fn call_list_tables(
        &self,
        params: &ListTablesParams,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<CallToolResult, ErrorData> {
        let database = helpers::required("database", &params.database)?;
        self.tracked(
            ToolName::ListTables,
            self.catalog.list_tables(database, progress),
        )
        .await
    }

    /// Runs `describe_table` outside the protocol layer.
    ///
    /// # Errors
    /// Returns `INVALID_PARAMS` for a blank database or table.
    pub async fn call_describe_table(
        &self,
        params: &DescribeTableParams,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<CallToolResult, ErrorData> {
        let database = helpers::required("database", &params.database)?;
        let table = helpers::required("table", &params.table)?;
        self.tracked(
            ToolName::DescribeTable,
            self.catalog.describe_table(database, table, progress),
        )
        .await
    }

    /// Runs `run_query` outside the protocol layer.
    ///
    /// # Errors
    /// Returns `INVALID_PARAMS` for a blank query.
    pub async fn call_run_query(
        &self,
        params: &RunQueryParams,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = helpers::required("query", &params.query)?;
        self.tracked(ToolName::RunQuery, self.catalog.run_query(query, progress))
            .await
    }

    async fn tracked<F>(&self, tool: ToolName, call: F) -> Result<CallToolResult, ErrorData>
    where
        F: Future<Output = Result<QueryResult, QueryError>>,
    {
        match self.metrics.track(tool.as_str(), call).await {
            Ok(result) => helpers::rows_result(&result),
            Err(err) => Ok(helpers::query_failure(&err)),
        }
    }
}
