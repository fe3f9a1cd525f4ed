use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use rmcp::ServerHandler;
use rmcp::model::{CallToolResult, ErrorCode};
use serde_json::{Value, json};
use tokenapi_core::executor::QueryFuture;
use tokenapi_core::{Catalog, ProgressSink, QueryError, QueryExecutor};
use tokenapi_mcp::{
    DescribeTableParams,
    ListTablesParams,
    McpOptions,
    RunQueryParams,
    SERVER_NAME,
    TokenApiMcp,
    ToolName,
};
use tokenapi_metrics::{CallStatus, ToolMetrics};

/// Answers every statement with `response`, or fails when it is `None`.
struct Scripted {
    statements: Mutex<Vec<String>>,
    response: Option<Value>,
}

impl Scripted {
    fn answering(response: Value) -> Self {
        Self {
            statements: Mutex::new(Vec::new()),
            response: Some(response),
        }
    }

    fn failing() -> Self {
        Self {
            statements: Mutex::new(Vec::new()),
            response: None,
        }
    }

    fn statements(&self) -> Vec<String> {
        self.statements.lock().expect("statements lock").clone()
    }
}

impl QueryExecutor for Scripted {
    fn execute<'a>(
        &'a self,
        sql: &'a str,
        _progress: Option<&'a dyn ProgressSink>,
    ) -> QueryFuture<'a> {
        self.statements
            .lock()
            .expect("statements lock")
            .push(sql.to_string());
        let result = match &self.response {
            Some(response) => serde_json::from_value(response.clone()).map_err(QueryError::from),
            None => Err(QueryError::Database {
                status: 404,
                code: Some("60".to_string()),
                message: "Code: 60. DB::Exception: Unknown table expression identifier 'nope'. (UNKNOWN_TABLE)".to_string(),
            }),
        };
        Box::pin(async move { result })
    }
}

fn server(executor: Scripted) -> TokenApiMcp<Scripted> {
    let metrics = Arc::new(ToolMetrics::new().expect("metrics should build"));
    TokenApiMcp::new(Arc::new(Catalog::new(executor)), metrics)
}

fn rows_of(result: &CallToolResult) -> Value {
    let text = result.content[0]
        .as_text()
        .map(|content| content.text.clone())
        .expect("tool result should be text");
    serde_json::from_str(&text).expect("tool result should be JSON")
}

fn error_text(result: &CallToolResult) -> String {
    result.content[0]
        .as_text()
        .map(|content| content.text.clone())
        .expect("tool error should be text")
}

#[test]
fn registers_four_uniquely_named_tools() {
    let server = server(Scripted::answering(json!({})));
    let tools = server.tools();
    let names: HashSet<String> = tools.iter().map(|tool| tool.name.to_string()).collect();

    assert_eq!(tools.len(), 4);
    let expected: HashSet<String> = ToolName::ALL
        .iter()
        .map(|tool| tool.as_str().to_string())
        .collect();
    assert_eq!(names, expected);
}

#[test]
fn tool_schemas_declare_their_parameters() {
    let server = server(Scripted::answering(json!({})));
    let tools = server.tools();
    let properties = |name: &str| -> Vec<String> {
        let tool = tools
            .iter()
            .find(|tool| tool.name == name)
            .expect("tool should be registered");
        tool.input_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default()
    };

    assert!(properties("list_databases").is_empty());
    assert_eq!(properties("list_tables"), vec!["database"]);
    let mut describe = properties("describe_table");
    describe.sort();
    assert_eq!(describe, vec!["database", "table"]);
    assert_eq!(properties("run_query"), vec!["query"]);
}

#[tokio::test]
async fn describe_table_returns_schema_rows() {
    let server = server(Scripted::answering(json!({
        "meta": [{"name": "name", "type": "String"}, {"name": "type", "type": "String"}],
        "data": [{"name": "address", "type": "FixedString(42)"}],
        "rows": 1
    })));

    let result = server
        .call_describe_table(
            &DescribeTableParams {
                database: "mainnet:evm-tokens@v1".to_string(),
                table: "balances".to_string(),
            },
            None,
        )
        .await
        .expect("describe should succeed");

    assert_ne!(result.is_error, Some(true));
    assert_eq!(rows_of(&result), json!([{"name": "address", "type": "FixedString(42)"}]));
    assert_eq!(
        server.metrics().call_count("describe_table", CallStatus::Success),
        1
    );
}

#[tokio::test]
async fn run_query_failure_is_a_tool_error_and_counted() {
    let executor = Scripted::failing();
    let server = server(executor);

    let result = server
        .call_run_query(
            &RunQueryParams {
                query: "SELECT * FROM nope".to_string(),
            },
            None,
        )
        .await
        .expect("database failures are reported as tool errors");

    assert_eq!(result.is_error, Some(true));
    assert!(error_text(&result).contains("UNKNOWN_TABLE"));
    assert_eq!(server.metrics().call_count("run_query", CallStatus::Error), 1);
    assert_eq!(server.metrics().call_count("run_query", CallStatus::Success), 0);
    assert_eq!(server.metrics().observation_count("run_query"), 1);
}

#[tokio::test]
async fn mixed_outcomes_are_counted_once_each() {
    let ok = server(Scripted::answering(json!({"data": [{"x": 1}], "rows": 1})));
    let failing = server(Scripted::failing());
    let params = RunQueryParams {
        query: "SELECT 1 AS x".to_string(),
    };

    for _ in 0..3 {
        ok.call_run_query(&params, None).await.expect("tool call");
    }
    for _ in 0..2 {
        failing.call_run_query(&params, None).await.expect("tool call");
    }

    assert_eq!(ok.metrics().call_count("run_query", CallStatus::Success), 3);
    assert_eq!(ok.metrics().observation_count("run_query"), 3);
    assert_eq!(failing.metrics().call_count("run_query", CallStatus::Error), 2);
    assert_eq!(failing.metrics().observation_count("run_query"), 2);
}

#[tokio::test]
async fn blank_parameters_are_rejected_before_execution() {
    let server = server(Scripted::answering(json!({})));

    let err = server
        .call_list_tables(
            &ListTablesParams {
                database: "   ".to_string(),
            },
            None,
        )
        .await
        .expect_err("blank database should be rejected");
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

    let err = server
        .call_run_query(
            &RunQueryParams {
                query: String::new(),
            },
            None,
        )
        .await
        .expect_err("blank query should be rejected");
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

    assert_eq!(server.metrics().observation_count("list_tables"), 0);
    assert_eq!(server.metrics().observation_count("run_query"), 0);
}

#[tokio::test]
async fn list_tables_escapes_database_and_hides_internal_tables() {
    let executor = Arc::new(Scripted::answering(json!({
        "data": [
            {"name": "balances", "description": "ERC20 balances"},
            {"name": "backfill_balances", "description": ""},
            {"name": "cursors", "description": ""}
        ],
        "rows": 3
    })));
    let metrics = Arc::new(ToolMetrics::new().expect("metrics should build"));
    let server = TokenApiMcp::new(Arc::new(Catalog::new(executor.clone())), metrics);

    let result = server
        .call_list_tables(
            &ListTablesParams {
                database: "x' OR 1=1 --".to_string(),
            },
            None,
        )
        .await
        .expect("list tables should succeed");

    assert_eq!(
        rows_of(&result),
        json!([{"name": "balances", "description": "ERC20 balances"}])
    );
    let statements = executor.statements();
    assert!(statements[0].contains(r"database = 'x\' OR 1=1 --'"));
}

#[tokio::test]
async fn describe_table_escapes_identifiers_as_given() {
    let executor = Arc::new(Scripted::answering(json!({})));
    let metrics = Arc::new(ToolMetrics::new().expect("metrics should build"));
    let server = TokenApiMcp::new(Arc::new(Catalog::new(executor.clone())), metrics);

    server
        .call_describe_table(
            &DescribeTableParams {
                database: "mainnet:evm-tokens@v1".to_string(),
                table: " x".to_string(),
            },
            None,
        )
        .await
        .expect("describe should succeed");

    assert_eq!(
        executor.statements(),
        vec!["DESCRIBE `mainnet:evm-tokens@v1`.` x`".to_string()]
    );
}

#[tokio::test]
async fn list_databases_only_returns_versioned_names() {
    let server = server(Scripted::answering(json!({
        "data": [
            {"name": "default", "description": ""},
            {"name": "mainnet:evm-tokens@v1", "description": "Tokens"}
        ],
        "rows": 2
    })));

    let result = server
        .call_list_databases(None)
        .await
        .expect("list databases should succeed");

    assert_eq!(
        rows_of(&result),
        json!([{"name": "mainnet:evm-tokens@v1", "description": "Tokens"}])
    );
}

#[test]
fn server_info_advertises_tools_prompts_and_resources() {
    let metrics = Arc::new(ToolMetrics::new().expect("metrics should build"));
    let options = Arc::new(McpOptions {
        version: "9.9.9+abc1234".to_string(),
        expose_resources: false,
    });
    let server = TokenApiMcp::with_options(
        Arc::new(Catalog::new(Scripted::answering(json!({})))),
        metrics,
        options,
    );

    let info = server.get_info();

    assert_eq!(info.server_info.name, SERVER_NAME);
    assert_eq!(info.server_info.version, "9.9.9+abc1234");
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.prompts.is_some());
    assert!(info.capabilities.resources.is_some());
    assert!(info.instructions.is_some_and(|text| text.contains("list_databases")));
}
