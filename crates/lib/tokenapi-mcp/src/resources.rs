//! The usage instructions, addressable as a resource.

use rmcp::ErrorData;
use rmcp::model::{
    AnnotateAble,
    ErrorCode,
    ListResourceTemplatesResult,
    ListResourcesResult,
    RawResource,
    ReadResourceResult,
    ResourceContents,
};

use crate::helpers;
use crate::prompts::INSTRUCTIONS;

pub const INSTRUCTIONS_URI: &str = "file:///mcp_token_api_general_instructions.txt";
pub const INSTRUCTIONS_NAME: &str = "Token API MCP General Usage Instructions";

/// Lists the instructions resource only when `expose` is set.
#[must_use]
pub fn list_resources(expose: bool) -> ListResourcesResult {
    if !expose {
        return ListResourcesResult::with_all_items(Vec::new());
    }
    let mut resource = RawResource::new(INSTRUCTIONS_URI, INSTRUCTIONS_NAME);
    resource.mime_type = Some("text/plain".to_string());
    ListResourcesResult::with_all_items(vec![resource.no_annotation()])
}

#[must_use]
pub fn list_resource_templates() -> ListResourceTemplatesResult {
    ListResourceTemplatesResult::with_all_items(Vec::new())
}

/// Reads a resource by URI.
///
/// # Errors
/// Returns `RESOURCE_NOT_FOUND` for any URI other than the instructions.
pub fn read_resource(uri: &str) -> Result<ReadResourceResult, ErrorData> {
    if uri != INSTRUCTIONS_URI {
        return Err(helpers::mcp_err(
            ErrorCode::RESOURCE_NOT_FOUND,
            format!("unknown resource: {uri}"),
        ));
    }
    Ok(ReadResourceResult {
        contents: vec![ResourceContents::text(INSTRUCTIONS, uri)],
    })
}
