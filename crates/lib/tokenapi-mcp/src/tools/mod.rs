//! MCP tool modules.
//!
//! The catalog tools are the whole tool surface: discovery of databases and
//! tables, table schemas, and arbitrary read-only queries.

pub mod catalog;

/// Wire names of the registered tools, also used as metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListDatabases,
    ListTables,
    DescribeTable,
    RunQuery,
}

impl ToolName {
    pub const ALL: [Self; 4] = [
        Self::ListDatabases,
        Self::ListTables,
        Self::DescribeTable,
        Self::RunQuery,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListDatabases => "list_databases",
            Self::ListTables => "list_tables",
            Self::DescribeTable => "describe_table",
            Self::RunQuery => "run_query",
        }
    }
}
