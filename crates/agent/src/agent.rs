//! A single goal-bound agent and its tool-turn protocol.
//!
//! One call to [`Agent::perform_task`] is one conversation:
//!
//! 1. Build the context (goal, shared-memory snapshot, task, output contract)
//! 2. Ask the model, advertising the agent's tools
//! 3. If the model asks for tools: run each one, append the results, and ask
//!    once more for a final answer with no tools advertised
//! 4. Return the text (prefixed by the tool outcomes when tools ran)
//!
//! There is exactly one tool round per task. Tool calls in the follow-up
//! response are logged and ignored.

use std::sync::Arc;
use std::time::Instant;

use rustcrew_core::agent::AgentConfig;
use rustcrew_core::error::ExecutionError;
use rustcrew_core::event::{CrewEvent, EventBus};
use rustcrew_core::memory::SharedMemory;
use rustcrew_core::message::{Conversation, Message, MessageToolCall};
use rustcrew_core::provider::{Provider, ProviderRequest};
use rustcrew_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

/// A goal-bound worker that executes one task at a time.
pub struct Agent {
    /// Name, goal, output contract, model settings
    config: AgentConfig,

    /// The completion service
    provider: Arc<dyn Provider>,

    /// Tools this agent may call, fixed after construction
    tools: ToolRegistry,

    /// Where task and tool events are published
    event_bus: Arc<EventBus>,
}

impl Agent {
    /// Create an agent with no tools.
    pub fn new(config: AgentConfig, provider: Arc<dyn Provider>) -> Self {
        Self {
            config,
            provider,
            tools: ToolRegistry::new(),
            event_bus: Arc::new(EventBus::default()),
        }
    }

    /// Bind a set of tools to this agent.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Publish events on `bus` instead of a private one.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = bus;
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn goal(&self) -> &str {
        &self.config.goal
    }

    pub fn expected_output(&self) -> Option<&str> {
        self.config.expected_output.as_deref()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub(crate) fn set_event_bus(&mut self, bus: Arc<EventBus>) {
        self.event_bus = bus;
    }

    /// Perform a task against a snapshot of the crew's shared memory.
    ///
    /// Emits exactly one of `TaskCompleted` / `TaskFailed`. Service failures
    /// propagate; individual tool failures are folded into the result text.
    pub async fn perform_task(
        &self,
        task: &str,
        memory: &SharedMemory,
    ) -> Result<String, rustcrew_core::Error> {
        self.perform_task_with_history(task, memory, &[]).await
    }

    /// Like [`perform_task`](Self::perform_task), with prior chat history
    /// placed right after the goal message.
    pub async fn perform_task_with_history(
        &self,
        task: &str,
        memory: &SharedMemory,
        history: &[Message],
    ) -> Result<String, rustcrew_core::Error> {
        info!(agent = %self.config.name, task = %task, "Agent performing task");

        match self.run(task, memory, history).await {
            Ok(result) => {
                self.event_bus
                    .publish(CrewEvent::task_completed(&self.config.name, task, &result));
                Ok(result)
            }
            Err(e) => {
                self.event_bus
                    .publish(CrewEvent::task_failed(&self.config.name, task, &e));
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        task: &str,
        memory: &SharedMemory,
        history: &[Message],
    ) -> Result<String, rustcrew_core::Error> {
        let mut conversation = self.build_conversation(task, memory, history)?;

        let request = self
            .request(&conversation)
            .with_tools(self.tools.definitions());

        debug!(
            conversation_id = %conversation.id,
            messages = conversation.len(),
            tools = request.tools.len(),
            "Sending initial request"
        );

        let response = self.provider.complete(request).await?;
        let message = response.message;

        // ── AwaitingModel ──
        if message.tool_calls.is_empty() {
            if message.has_text() {
                return Ok(message.content);
            }
            return Err(ExecutionError::UnexpectedResponse {
                agent: self.config.name.clone(),
                stage: "initial",
            }
            .into());
        }

        // ── AwaitingToolResults ──
        let tool_calls = message.tool_calls.clone();
        debug!(tool_count = tool_calls.len(), "Executing tool calls");
        conversation.push(message);

        let mut outcomes = Vec::with_capacity(tool_calls.len());
        for call in &tool_calls {
            let outcome = self.execute_tool_call(call).await;
            conversation.push(Message::tool_result(&call.id, &call.name, &outcome));
            outcomes.push(outcome);
        }
        let buffer = outcomes.join("\n");

        conversation.push(Message::user(format!(
            "Based on the results of the tools used, please provide a final response to the original task: {task}"
        )));

        // Follow-up: no tools advertised, so no further tool round.
        let follow_up = self.provider.complete(self.request(&conversation)).await?;
        let message = follow_up.message;

        if !message.tool_calls.is_empty() {
            warn!(
                agent = %self.config.name,
                ignored = message.tool_calls.len(),
                "Ignoring tool calls in follow-up response"
            );
        }

        match (message.has_text(), buffer.is_empty()) {
            (true, true) => Ok(message.content),
            (true, false) => Ok(format!("{buffer}\n\n{}", message.content)),
            (false, false) => Ok(buffer),
            (false, true) => Err(ExecutionError::EmptyResult {
                agent: self.config.name.clone(),
            }
            .into()),
        }
    }

    fn build_conversation(
        &self,
        task: &str,
        memory: &SharedMemory,
        history: &[Message],
    ) -> Result<Conversation, rustcrew_core::Error> {
        let snapshot = memory.to_json()?;
        debug!(entries = memory.len(), bytes = snapshot.len(), "Shared memory snapshot");

        let mut conversation = Conversation::new();
        conversation.push(Message::system(format!(
            "You are {}, an AI assistant with the goal: {}.",
            self.config.name, self.config.goal
        )));
        for message in history {
            conversation.push(message.clone());
        }
        conversation.push(Message::system(format!("Shared crew knowledge: {snapshot}")));
        conversation.push(Message::user(task));
        if let Some(expected) = &self.config.expected_output {
            conversation.push(Message::system(format!("Expected output format: {expected}")));
        }
        Ok(conversation)
    }

    fn request(&self, conversation: &Conversation) -> ProviderRequest {
        ProviderRequest::new(&self.config.model, conversation.messages.clone())
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens)
    }

    /// Run one requested tool call and describe the outcome.
    ///
    /// Never fails: unknown tools, unparsable arguments and tool errors all
    /// become notices so sibling calls still run.
    async fn execute_tool_call(&self, call: &MessageToolCall) -> String {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(agent = %self.config.name, tool = %call.name, "Tool not found");
            return format!("Tool {} not found.", call.name);
        };

        let raw = if call.arguments.trim().is_empty() {
            "{}"
        } else {
            call.arguments.as_str()
        };
        let arguments: serde_json::Value = match serde_json::from_str(raw) {
            Ok(arguments) => arguments,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Failed to parse tool arguments");
                return format!("Error parsing arguments for tool {}: {e}", call.name);
            }
        };

        let start = Instant::now();
        let result = tool.execute(arguments).await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        self.event_bus.publish(CrewEvent::ToolExecuted {
            agent: self.config.name.clone(),
            tool: call.name.clone(),
            success: matches!(&result, Ok(r) if r.success),
            duration_ms,
            timestamp: chrono::Utc::now(),
        });

        match result {
            Ok(output) if output.success => {
                debug!(tool = %call.name, duration_ms, "Tool executed");
                format!("Tool {} output: {}", call.name, output.output)
            }
            Ok(output) => {
                warn!(tool = %call.name, output = %output.output, "Tool reported failure");
                format!("Tool {} failed: {}", call.name, output.output)
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                format!("Error executing tool {}: {e}", call.name)
            }
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.config.name)
            .field("goal", &self.config.goal)
            .field("model", &self.config.model)
            .field("provider", &self.provider.name())
            .field("tools", &self.tools)
            .finish()
    }
}
