//! Database query tool: hands an SQL string to a pluggable database.
//!
//! The tool owns no connection logic. It delegates to a [`Database`]
//! implementation, which is responsible for its own handle and locking.

use std::sync::Arc;
use async_trait::async_trait;
use rustcrew_core::error::ToolError;
use rustcrew_core::tool::{Tool, ToolResult};

/// Something that can answer a query with a JSON-serializable value.
#[async_trait]
pub trait Database: Send + Sync {
    async fn query(&self, query: &str) -> Result<serde_json::Value, ToolError>;
}

/// A database with no data. Every query answers "No results found".
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDatabase;

#[async_trait]
impl Database for NullDatabase {
    async fn query(&self, _query: &str) -> Result<serde_json::Value, ToolError> {
        Ok(serde_json::Value::String("No results found".into()))
    }
}

pub struct DatabaseQueryTool {
    db: Arc<dyn Database>,
}

impl DatabaseQueryTool {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

impl Default for DatabaseQueryTool {
    fn default() -> Self {
        Self::new(Arc::new(NullDatabase))
    }
}

#[async_trait]
impl Tool for DatabaseQueryTool {
    fn name(&self) -> &str {
        "database_query"
    }

    fn description(&self) -> &str {
        "Query the database for information"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The SQL query to execute on the database"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        tracing::debug!(query, "Running database query");
        let rows = self.db.query(query).await?;
        Ok(ToolResult::json(rows))
    }
}
