//! Usage instructions exposed as an MCP prompt.

use rmcp::ErrorData;
use rmcp::model::{
    ErrorCode,
    GetPromptResult,
    ListPromptsResult,
    Prompt,
    PromptMessage,
    PromptMessageRole,
};

use crate::helpers;

pub const PROMPT_NAME: &str = "mcp_token_api_general_instructions";

pub const PROMPT_DESCRIPTION: &str = "General instructions for language models on how to make the best use of the tools and resources provided by the Token API MCP.";

pub const INSTRUCTIONS: &str = r"These are instructions on how to use the tools from the Token API MCP.
The MCP provides access to a collection of databases for multiple blockchain networks.
The naming convention for the databases is as follows:
    {network}:{database_name}@{version}
Versions are incremental and latest versions have the latest features in terms of tables implemented.
The version prior to the latest one is kept as a backup and for compatibility until it is replaced once a newer version comes out.

The databases are currently segregated into three main themes:
    - Tokens: tables for ERC20 balances, holders, historical data, transfers, etc.
    - NFT: tables for ERC721 and ERC1155 standards as well as other NFT types, transfers, Seaport marketplace prices, holders, wallet, etc.
    - Uniswap: tables for ERC20 token prices, swaps, market data, etc.

In order to discover the data, the MCP provides 4 main tools:
    1. 'list_databases': use this to discover which networks and databases are available.
    2. 'list_tables': use this to discover which tables are available for a specific database.
    3. 'describe_table': use this to get the schema of a particular table inside a database with fields and columns types.
    4. 'run_query': run a read-only SQL query using the ClickHouse query syntax.

Answering a user's question should generally follow the steps in the order above: first discover networks and databases, then list tables and find the relevant ones, then get the schema of those tables to accurately construct and run a SQL query.
A few tips on making queries:
    - Always get the schema of a table first and do not guess at column names.
    - Add LIMIT clauses first to only get a sample of the data and validate that the query is correct and relevant in the user's context. Then retrieve the full data if needed.
    - Be wary of resource consumption, avoid heavy JOIN and aggregation operations unless necessary.
    - Always use backticks around the database name in a query (e.g. SELECT * FROM `database`.table ...)
";

#[must_use]
pub fn list_prompts() -> ListPromptsResult {
    ListPromptsResult::with_all_items(vec![Prompt::new(
        PROMPT_NAME,
        Some(PROMPT_DESCRIPTION),
        None,
    )])
}

/// Loads a prompt by name.
///
/// # Errors
/// Returns `INVALID_PARAMS` for unknown prompt names.
pub fn get_prompt(name: &str) -> Result<GetPromptResult, ErrorData> {
    if name != PROMPT_NAME {
        return Err(helpers::mcp_err(
            ErrorCode::INVALID_PARAMS,
            format!("unknown prompt: {name}"),
        ));
    }
    Ok(GetPromptResult {
        description: Some(PROMPT_DESCRIPTION.to_string()),
        messages: vec![PromptMessage::new_text(PromptMessageRole::User, INSTRUCTIONS)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_single_instructions_prompt() {
        let prompts = list_prompts().prompts;
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].name, PROMPT_NAME);
    }

    #[test]
    fn loading_is_idempotent() {
        let first = get_prompt(PROMPT_NAME).expect("prompt should load");
        let second = get_prompt(PROMPT_NAME).expect("prompt should load");
        let first = serde_json::to_value(&first).expect("prompt should serialize");
        let second = serde_json::to_value(&second).expect("prompt should serialize");
        assert_eq!(first, second);
        assert_eq!(first["messages"][0]["role"], "user");
        assert_eq!(first["messages"][0]["content"]["text"], INSTRUCTIONS);
    }

    #[test]
    fn unknown_prompt_is_invalid_params() {
        let err = get_prompt("nope").expect_err("unknown prompt should fail");
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn instructions_describe_naming_convention_and_tools() {
        assert!(INSTRUCTIONS.contains("{network}:{database_name}@{version}"));
        for tool in ["list_databases", "list_tables", "describe_table", "run_query"] {
            assert!(INSTRUCTIONS.contains(tool), "{tool} missing from instructions");
        }
    }
}
