//! Built-in tool implementations for RustCrew.
//!
//! Tools let an agent act on the world during a task: write files and
//! query a database. Agents opt into tools by name in the crew manifest.

pub mod database_query;
pub mod file_write;
pub mod path;

use std::sync::Arc;
use rustcrew_config::ToolsConfig;
use rustcrew_core::tool::Tool;

pub use database_query::{Database, DatabaseQueryTool, NullDatabase};
pub use file_write::FileWriteTool;
pub use path::{PathError, PathGuard};

/// Names accepted by [`builtin`].
pub const BUILTIN_TOOLS: &[&str] = &["file_write", "database_query"];

/// Build a built-in tool by name.
///
/// `file_write` picks up its path policy from `config`. `database_query`
/// is backed by [`NullDatabase`]; embedders with a real database construct
/// [`DatabaseQueryTool`] themselves.
pub fn builtin(name: &str, config: &ToolsConfig) -> Option<Arc<dyn Tool>> {
    match name {
        "file_write" => Some(Arc::new(FileWriteTool::with_restrictions(
            &config.file_write.allowed_roots,
            &config.file_write.forbidden_paths,
        ))),
        "database_query" => Some(Arc::new(DatabaseQueryTool::default())),
        _ => None,
    }
}
