//! MCP server implementation for tokenapi-mcp.
//!
//! This crate wires the catalog into rmcp tool handlers, wraps every tool call
//! with the metrics recorder, and exposes the usage instructions as a prompt
//! and an optional resource.

mod helpers;
mod progress;
pub mod prompts;
pub mod resources;
pub mod server;
pub mod tools;

use std::sync::Arc;

use rmcp::{
    ErrorData,
    RoleServer,
    ServerHandler,
    handler::server::tool::ToolRouter,
    model::{
        GetPromptRequestParams,
        GetPromptResult,
        Implementation,
        ListPromptsResult,
        ListResourceTemplatesResult,
        ListResourcesResult,
        PaginatedRequestParams,
        ReadResourceRequestParams,
        ReadResourceResult,
        ServerCapabilities,
        ServerInfo,
        Tool,
    },
    service::RequestContext,
    tool_handler,
};
use tokenapi_core::{Catalog, QueryExecutor};
use tokenapi_metrics::ToolMetrics;

pub use progress::McpProgress;
pub use tools::ToolName;
pub use tools::catalog::{DescribeTableParams, ListTablesParams, RunQueryParams};

pub const SERVER_NAME: &str = "tokenapi-mcp";

const SERVER_INSTRUCTIONS: &str = r"tokenapi-mcp exposes read-only access to blockchain analytics databases stored in ClickHouse.

Databases are named `{network}:{database_name}@{version}`. Discover data in order:
1. `list_databases` to find networks and versions.
2. `list_tables` with a `database` to find relevant tables.
3. `describe_table` with `database` and `table` to read column names and types.
4. `run_query` with a ClickHouse SQL `query`; wrap database names in backticks and start with a LIMIT.

Load the `mcp_token_api_general_instructions` prompt for the full guide.";

/// Options that shape what the server advertises.
#[derive(Debug, Clone)]
pub struct McpOptions {
    pub version: String,
    pub expose_resources: bool,
}

impl Default for McpOptions {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            expose_resources: false,
        }
    }
}

/// MCP server wrapper around the catalog, metrics and tool router.
pub struct TokenApiMcp<E> {
    tool_router: ToolRouter<Self>,
    catalog: Arc<Catalog<E>>,
    metrics: Arc<ToolMetrics>,
    options: Arc<McpOptions>,
}

impl<E> Clone for TokenApiMcp<E> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            catalog: self.catalog.clone(),
            metrics: self.metrics.clone(),
            options: self.options.clone(),
        }
    }
}

impl<E: QueryExecutor + 'static> TokenApiMcp<E> {
    /// Creates a server with default options.
    #[must_use]
    pub fn new(catalog: Arc<Catalog<E>>, metrics: Arc<ToolMetrics>) -> Self {
        Self::with_options(catalog, metrics, Arc::new(McpOptions::default()))
    }

    #[must_use]
    pub fn with_options(
        catalog: Arc<Catalog<E>>,
        metrics: Arc<ToolMetrics>,
        options: Arc<McpOptions>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router_catalog(),
            catalog,
            metrics,
            options,
        }
    }

    /// Tool definitions as advertised by `tools/list`.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    #[must_use]
    pub fn metrics(&self) -> &ToolMetrics {
        &self.metrics
    }
}

#[tool_handler]
impl<E: QueryExecutor + 'static> ServerHandler for TokenApiMcp<E> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: self.options.version.clone(),
                ..Implementation::default()
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(prompts::list_prompts())
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        prompts::get_prompt(&request.name)
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(resources::list_resources(self.options.expose_resources))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(resources::list_resource_templates())
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        resources::read_resource(&request.uri)
    }
}
