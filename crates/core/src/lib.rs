//! # RustCrew Core
//!
//! Domain types, traits, and error definitions for the RustCrew multi-agent
//! runtime. This crate does no I/O: it defines the model that the provider,
//! tool, and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here:
//! - [`Provider`]: the completion service an agent talks to
//! - [`Tool`]: a capability an agent may invoke mid-task
//!
//! Concrete implementations live in their own crates, so tests can swap in
//! scripted providers and stub tools without touching the orchestration code.

pub mod agent;
pub mod error;
pub mod event;
pub mod memory;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::AgentConfig;
pub use error::{Error, ExecutionError, ProviderError, Result, ToolError};
pub use event::{CrewEvent, EventBus};
pub use memory::{MemoryRecord, SharedMemory};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolChoice, ToolDefinition};
pub use tool::{Tool, ToolRegistry, ToolResult};
