use std::borrow::Cow;

use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content, ErrorCode};
use tokenapi_core::{QueryError, QueryResult};

pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Rejects blank parameters before a tool body runs.
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ErrorData> {
    if value.trim().is_empty() {
        return Err(mcp_err(
            ErrorCode::INVALID_PARAMS,
            format!("{field} is required and must not be blank"),
        ));
    }
    Ok(value)
}

pub fn rows_result(result: &QueryResult) -> Result<CallToolResult, ErrorData> {
    Ok(CallToolResult::success(vec![Content::json(&result.data)?]))
}

/// A failed query is reported to the model as a tool error, not a protocol error.
pub fn query_failure(err: &QueryError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(err.to_string())])
}
