//! File write tool: write content to a file on the local filesystem.

use async_trait::async_trait;
use rustcrew_core::error::ToolError;
use rustcrew_core::tool::{Tool, ToolResult};

use crate::path::PathGuard;

pub struct FileWriteTool {
    guard: PathGuard,
}

impl FileWriteTool {
    /// Create a file write tool with no path restrictions.
    pub fn new() -> Self {
        Self {
            guard: PathGuard::unrestricted(),
        }
    }

    /// Create a file write tool with path restrictions.
    pub fn with_restrictions(allowed_roots: &[String], forbidden_paths: &[String]) -> Self {
        Self {
            guard: PathGuard::new(allowed_roots, forbidden_paths),
        }
    }
}

impl Default for FileWriteTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "file_write"
    }

    fn description(&self) -> &str {
        "Write content to a file on the local filesystem"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "The name of the file to write to, including path if necessary"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write to the file"
                }
            },
            "required": ["filename", "content"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let filename = arguments["filename"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'filename' argument".into()))?;

        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'content' argument".into()))?;

        let path = self
            .guard
            .resolve(filename)
            .map_err(|e| ToolError::PermissionDenied {
                tool_name: "file_write".into(),
                reason: e.to_string(),
            })?;

        if let Some(parent) = path.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            return Ok(ToolResult::failed(format!("Failed to create directory: {e}")));
        }

        match tokio::fs::write(&path, content).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), bytes = content.len(), "File written");
                Ok(ToolResult::ok(format!("Content successfully written to {filename}")))
            }
            Err(e) => Ok(ToolResult::failed(format!("Failed to write file: {e}"))),
        }
    }
}
