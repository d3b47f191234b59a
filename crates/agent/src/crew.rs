//! Crew: routes tasks to agents, merges results, synthesizes a report.
//!
//! # Architecture
//!
//! ```text
//!   task ──▶ ┌──────────┐   select   ┌─────────┐
//!            │   Crew   │ ─────────▶ │  Agent  │ ── tools
//!            └────┬─────┘ ◀───────── └─────────┘
//!                 │          result
//!                 ▼
//!          SharedMemory { task → (agent, result) }
//!                 │
//!                 ▼
//!        achieve_goal() ──▶ "Final Summary"
//! ```
//!
//! All methods that touch shared memory take `&mut self`, so tasks run one
//! at a time and each agent sees the memory as of the start of its task.

use std::sync::Arc;

use rustcrew_core::error::ExecutionError;
use rustcrew_core::event::{CrewEvent, EventBus};
use rustcrew_core::memory::{MemoryRecord, SharedMemory};
use rustcrew_core::message::Message;
use rustcrew_core::provider::{Provider, ProviderRequest};
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::selection::{AgentSelector, KeywordSelector};

/// Shared-memory key the synthesis is stored under.
pub const FINAL_SUMMARY_KEY: &str = "Final Summary";

/// Task used to pick the synthesizing agent.
pub const SUMMARY_ROUTING_TASK: &str = "summarize";

/// Attribution for entries written without an agent.
pub const CREW_AGENT_LABEL: &str = "Crew";

/// What happened to an assigned task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// An agent performed the task and the result was stored.
    Completed { agent: String, result: String },

    /// No agent matched. Shared memory is unchanged.
    NoSuitableAgent { task: String },
}

impl AssignOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// The user-facing text: the result, or the no-agent message.
    pub fn into_text(self) -> String {
        match self {
            Self::Completed { result, .. } => result,
            Self::NoSuitableAgent { task } => no_agent_message(&task),
        }
    }
}

fn no_agent_message(task: &str) -> String {
    format!("No suitable agent found for task: {task}")
}

/// A crew-level completion service, independent of the agents.
struct CrewModel {
    provider: Arc<dyn Provider>,
    model: String,
}

/// Orchestrates a set of agents towards one goal.
pub struct Crew {
    goal: String,
    agents: Vec<Agent>,
    selector: Box<dyn AgentSelector>,
    memory: SharedMemory,
    chat_history: Vec<Message>,
    model: Option<CrewModel>,
    event_bus: Arc<EventBus>,
}

impl Crew {
    /// Create an empty crew using keyword routing.
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            agents: Vec::new(),
            selector: Box::new(KeywordSelector),
            memory: SharedMemory::new(),
            chat_history: Vec::new(),
            model: None,
            event_bus: Arc::new(EventBus::default()),
        }
    }

    /// Replace the routing strategy.
    pub fn with_selector(mut self, selector: Box<dyn AgentSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Give the crew its own completion service, used by
    /// [`provide_final_response`](Self::provide_final_response) and by
    /// synthesis when the crew has no agents.
    pub fn with_model(mut self, provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        self.model = Some(CrewModel {
            provider,
            model: model.into(),
        });
        self
    }

    /// Seed every agent conversation with this history.
    pub fn with_chat_history(mut self, history: Vec<Message>) -> Self {
        self.chat_history = history;
        self
    }

    /// Publish crew and agent events on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        for agent in &mut self.agents {
            agent.set_event_bus(bus.clone());
        }
        self.event_bus = bus;
        self
    }

    /// Builder-style [`add_agent`](Self::add_agent).
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.add_agent(agent);
        self
    }

    /// Register an agent. Registration order is the routing tie-break.
    ///
    /// The agent is rebound to the crew's event bus.
    pub fn add_agent(&mut self, mut agent: Agent) {
        agent.set_event_bus(self.event_bus.clone());
        debug!(agent = %agent.name(), "Agent added to crew");
        self.agents.push(agent);
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn shared_memory(&self) -> &SharedMemory {
        &self.memory
    }

    pub fn chat_history(&self) -> &[Message] {
        &self.chat_history
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub fn selector_name(&self) -> &str {
        self.selector.name()
    }

    /// Route a task, run it, and store the result.
    ///
    /// A routing miss is `Ok(AssignOutcome::NoSuitableAgent)`. Agent failures
    /// propagate unchanged and leave shared memory untouched.
    pub async fn assign(&mut self, task: &str) -> Result<AssignOutcome, rustcrew_core::Error> {
        let Some(index) = self.selector.select(task, &self.agents).await? else {
            warn!(task = %task, selector = %self.selector.name(), "No suitable agent found");
            return Ok(AssignOutcome::NoSuitableAgent { task: task.into() });
        };

        let agent = &self.agents[index];
        let agent_name = agent.name().to_string();
        info!(agent = %agent_name, task = %task, "Assigning task");
        self.event_bus.publish(CrewEvent::AgentSelected {
            agent: agent_name.clone(),
            task: task.into(),
            timestamp: chrono::Utc::now(),
        });

        let result = agent
            .perform_task_with_history(task, &self.memory, &self.chat_history)
            .await?;

        self.record(task, &agent_name, &result);
        Ok(AssignOutcome::Completed {
            agent: agent_name,
            result,
        })
    }

    /// [`assign`](Self::assign), flattened to the user-facing text.
    pub async fn assign_task(&mut self, task: &str) -> Result<String, rustcrew_core::Error> {
        Ok(self.assign(task).await?.into_text())
    }

    /// Synthesize every shared-memory entry into a report and store it under
    /// [`FINAL_SUMMARY_KEY`], replacing any earlier summary.
    pub async fn achieve_goal(&mut self) -> Result<String, rustcrew_core::Error> {
        info!(goal = %self.goal, entries = self.memory.len(), "Crew working towards goal");
        let prompt = self.synthesis_prompt();

        let (agent_name, summary) = match self.summary_agent().await? {
            Some(index) => {
                let agent = &self.agents[index];
                debug!(agent = %agent.name(), "Synthesizing with agent");
                let summary = agent
                    .perform_task_with_history(&prompt, &self.memory, &self.chat_history)
                    .await?;
                (agent.name().to_string(), summary)
            }
            None => {
                let summary = self.complete_directly(prompt).await?;
                (CREW_AGENT_LABEL.to_string(), summary)
            }
        };

        self.record(FINAL_SUMMARY_KEY, &agent_name, &summary);
        info!(agent = %agent_name, "Crew summary complete");
        Ok(summary)
    }

    /// Ask the crew model for the final deliverable.
    ///
    /// Read-only: shared memory is not updated.
    pub async fn provide_final_response(&self) -> Result<String, rustcrew_core::Error> {
        let crew_model = self.model.as_ref().ok_or(ExecutionError::NoCrewModel)?;

        let mut messages = self.chat_history.clone();
        messages.push(Message::system(format!(
            "The crew has been working towards the following goal: {}",
            self.goal
        )));
        messages.push(Message::system(format!(
            "Shared crew knowledge: {}",
            self.memory.to_json()?
        )));
        messages.push(Message::user(
            "Using the crew's shared knowledge, provide the final response that fulfils the goal.",
        ));

        info!(goal = %self.goal, "Requesting final response");
        let response = crew_model
            .provider
            .complete(ProviderRequest::new(&crew_model.model, messages))
            .await?;

        if response.message.has_text() {
            Ok(response.message.content)
        } else {
            Err(ExecutionError::NoSummary {
                goal: self.goal.clone(),
            }
            .into())
        }
    }

    /// The synthesizing agent: the selector's pick for the summary routing task,
    /// else the first agent.
    async fn summary_agent(&self) -> Result<Option<usize>, rustcrew_core::Error> {
        if self.agents.is_empty() {
            return Ok(None);
        }
        let picked = self.selector.select(SUMMARY_ROUTING_TASK, &self.agents).await?;
        Ok(Some(picked.unwrap_or(0)))
    }

    async fn complete_directly(&self, prompt: String) -> Result<String, rustcrew_core::Error> {
        let no_summary = || ExecutionError::NoSummary {
            goal: self.goal.clone(),
        };
        let Some(crew_model) = &self.model else {
            warn!(goal = %self.goal, "No agent or crew model available for synthesis");
            return Err(no_summary().into());
        };

        let mut messages = self.chat_history.clone();
        messages.push(Message::user(prompt));
        let response = crew_model
            .provider
            .complete(ProviderRequest::new(&crew_model.model, messages))
            .await?;

        if response.message.has_text() {
            Ok(response.message.content)
        } else {
            Err(no_summary().into())
        }
    }

    fn synthesis_prompt(&self) -> String {
        let results = self
            .memory
            .iter()
            .map(|(task, record)| {
                format!(
                    "Task: {task}\nAgent: {}\nResult: {}",
                    record.agent, record.result
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "As the crew, we have been working towards the following goal: \"{goal}\"\n\
             Here are the results of our individual tasks:\n\n\
             {results}\n\n\
             Please synthesize these results into a structured report that addresses our crew's goal. \
             Use headings, and cover the key findings, the connections between different tasks, \
             the overall implications or conclusions for the goal, and suggested next steps.",
            goal = self.goal
        )
    }

    fn record(&mut self, task: &str, agent: &str, result: &str) {
        let replaced = self
            .memory
            .insert(task, MemoryRecord::new(agent, result))
            .is_some();
        info!(task = %task, agent = %agent, replaced, entries = self.memory.len(), "Shared memory updated");
        self.event_bus.publish(CrewEvent::SharedMemoryUpdated {
            task: task.into(),
            agent: agent.into(),
            timestamp: chrono::Utc::now(),
        });
    }
}

impl std::fmt::Debug for Crew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crew")
            .field("goal", &self.goal)
            .field("agents", &self.agents.iter().map(Agent::name).collect::<Vec<_>>())
            .field("selector", &self.selector.name())
            .field("entries", &self.memory.len())
            .field("has_model", &self.model.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ModelSelector;
    use crate::test_helpers::*;
    use rustcrew_core::Error;
    use rustcrew_core::agent::AgentConfig;
    use rustcrew_core::message::Role;

    fn agent(name: &str, goal: &str, provider: Arc<SequentialMockProvider>) -> Agent {
        Agent::new(AgentConfig::new(name, goal), provider)
    }

    #[tokio::test]
    async fn routes_to_writer_on_keyword() {
        let provider = Arc::new(SequentialMockProvider::single_text("Cats nap a lot."));
        let mut crew = Crew::new("Learn about cats")
            .with_agent(agent("Writer", "summarize text", provider.clone()));

        let outcome = crew.assign("please summarize text about cats").await.unwrap();

        assert_eq!(
            outcome,
            AssignOutcome::Completed {
                agent: "Writer".into(),
                result: "Cats nap a lot.".into()
            }
        );
    }

    #[tokio::test]
    async fn no_agent_is_a_message_and_memory_is_unchanged() {
        let provider = Arc::new(SequentialMockProvider::new(vec![]));
        let mut crew = Crew::new("goal").with_agent(agent("Writer", "summarize text", provider.clone()));

        let text = crew.assign_task("bake bread").await.unwrap();

        assert_eq!(text, "No suitable agent found for task: bake bread");
        assert!(crew.shared_memory().is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn single_turn_task_adds_one_entry() {
        let provider = Arc::new(SequentialMockProvider::single_text("A summary."));
        let mut crew = Crew::new("goal").with_agent(agent("Writer", "summarize text", provider));

        crew.assign_task("summarize the report").await.unwrap();

        let memory = crew.shared_memory();
        assert_eq!(memory.len(), 1);
        let record = memory.get("summarize the report").unwrap();
        assert_eq!(record.agent, "Writer");
        assert_eq!(record.result, "A summary.");
    }

    #[tokio::test]
    async fn repeated_task_overwrites_its_key() {
        let provider = Arc::new(SequentialMockProvider::texts(&["first", "second"]));
        let mut crew = Crew::new("goal").with_agent(agent("Writer", "summarize text", provider));

        crew.assign_task("summarize it").await.unwrap();
        crew.assign_task("summarize it").await.unwrap();

        assert_eq!(crew.shared_memory().len(), 1);
        assert_eq!(crew.shared_memory().get("summarize it").unwrap().result, "second");
    }

    #[tokio::test]
    async fn later_tasks_see_earlier_results() {
        let provider = Arc::new(SequentialMockProvider::texts(&["fact one", "written"]));
        let mut crew = Crew::new("goal")
            .with_agent(agent("Researcher", "research facts", provider.clone()))
            .with_agent(agent("Writer", "write articles", provider.clone()));

        crew.assign_task("research cats").await.unwrap();
        crew.assign_task("write about cats").await.unwrap();

        let requests = provider.requests();
        assert!(!requests[0].messages[1].content.contains("fact one"));
        assert!(requests[1].messages[1].content.contains("fact one"));
        assert!(requests[1].messages[0].content.starts_with("You are Writer"));
    }

    #[tokio::test]
    async fn agent_errors_propagate_and_leave_memory_alone() {
        let mut crew = Crew::new("goal").with_agent(Agent::new(
            AgentConfig::new("Writer", "summarize text"),
            Arc::new(FailingProvider),
        ));

        let err = crew.assign_task("summarize").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
        assert!(crew.shared_memory().is_empty());
    }

    #[tokio::test]
    async fn chat_history_reaches_agents() {
        let provider = Arc::new(SequentialMockProvider::single_text("ok"));
        let mut crew = Crew::new("goal")
            .with_chat_history(vec![Message::system("You are a writer working for company X.")])
            .with_agent(agent("Writer", "summarize text", provider.clone()));

        crew.assign_task("summarize").await.unwrap();

        let messages = &provider.requests()[0].messages;
        assert_eq!(messages[1].content, "You are a writer working for company X.");
    }

    #[tokio::test]
    async fn achieve_goal_lists_every_task_and_overwrites_summary() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "research result",
            "summary one",
            "summary two",
        ]));
        let mut crew = Crew::new("Understand cats")
            .with_agent(agent("Researcher", "research facts", provider.clone()))
            .with_agent(agent("Writer", "summarize text", provider.clone()));

        crew.assign_task("research cat sleep").await.unwrap();
        let first = crew.achieve_goal().await.unwrap();
        let second = crew.achieve_goal().await.unwrap();

        assert_eq!(first, "summary one");
        assert_eq!(second, "summary two");

        let synthesis = &provider.requests()[1];
        let prompt = &synthesis
            .messages
            .iter()
            .find(|m| m.role == Role::User)
            .unwrap()
            .content;
        assert!(prompt.contains("\"Understand cats\""));
        assert!(prompt.contains("Task: research cat sleep\nAgent: Researcher\nResult: research result"));
        assert!(synthesis.messages[0].content.starts_with("You are Writer"));

        let memory = crew.shared_memory();
        assert_eq!(memory.len(), 2);
        let summary = memory.get(FINAL_SUMMARY_KEY).unwrap();
        assert_eq!(summary.agent, "Writer");
        assert_eq!(summary.result, "summary two");
    }

    #[tokio::test]
    async fn synthesis_falls_back_to_first_agent() {
        let provider = Arc::new(SequentialMockProvider::single_text("summary"));
        let mut crew = Crew::new("goal")
            .with_agent(agent("Researcher", "research facts", provider.clone()))
            .with_agent(agent("Coder", "write code", provider.clone()));

        crew.achieve_goal().await.unwrap();

        assert_eq!(crew.shared_memory().get(FINAL_SUMMARY_KEY).unwrap().agent, "Researcher");
    }

    #[tokio::test]
    async fn synthesis_without_agents_uses_crew_model() {
        let provider = Arc::new(SequentialMockProvider::single_text("direct summary"));
        let mut crew = Crew::new("goal").with_model(provider.clone(), "gpt-4o");

        let summary = crew.achieve_goal().await.unwrap();

        assert_eq!(summary, "direct summary");
        assert_eq!(provider.requests()[0].model, "gpt-4o");
        assert_eq!(
            crew.shared_memory().get(FINAL_SUMMARY_KEY).unwrap().agent,
            CREW_AGENT_LABEL
        );
    }

    #[tokio::test]
    async fn synthesis_without_agents_or_model_fails() {
        let mut crew = Crew::new("goal");
        let err = crew.achieve_goal().await.unwrap_err();
        assert!(matches!(err, Error::Execution(ExecutionError::NoSummary { .. })));
        assert!(crew.shared_memory().is_empty());
    }

    #[tokio::test]
    async fn direct_synthesis_with_empty_text_fails() {
        let provider = Arc::new(SequentialMockProvider::single_text(""));
        let mut crew = Crew::new("goal").with_model(provider, "gpt-4o");
        let err = crew.achieve_goal().await.unwrap_err();
        assert!(matches!(err, Error::Execution(ExecutionError::NoSummary { .. })));
    }

    #[tokio::test]
    async fn final_response_requires_crew_model() {
        let crew = Crew::new("goal");
        let err = crew.provide_final_response().await.unwrap_err();
        assert!(matches!(err, Error::Execution(ExecutionError::NoCrewModel)));
    }

    #[tokio::test]
    async fn final_response_reads_memory_without_writing() {
        let crew_provider = Arc::new(SequentialMockProvider::single_text("The deliverable."));
        let agent_provider = Arc::new(SequentialMockProvider::single_text("facts"));
        let mut crew = Crew::new("Write a cat guide")
            .with_model(crew_provider.clone(), "gpt-4o")
            .with_chat_history(vec![Message::system("You work for company X.")])
            .with_agent(agent("Researcher", "research facts", agent_provider));

        crew.assign_task("research cats").await.unwrap();
        let response = crew.provide_final_response().await.unwrap();

        assert_eq!(response, "The deliverable.");
        assert_eq!(crew.shared_memory().len(), 1);

        let messages = &crew_provider.requests()[0].messages;
        assert_eq!(messages[0].content, "You work for company X.");
        assert!(messages[1].content.contains("Write a cat guide"));
        assert!(messages[2].content.contains("research cats"));
        assert_eq!(messages[3].role, Role::User);
    }

    #[tokio::test]
    async fn model_selector_drives_routing() {
        let routing = Arc::new(SequentialMockProvider::single_text("Researcher"));
        let worker = Arc::new(SequentialMockProvider::single_text("found it"));
        let mut crew = Crew::new("goal")
            .with_selector(Box::new(ModelSelector::new(routing, "gpt-4o")))
            .with_agent(agent("Writer", "summarize text", worker.clone()))
            .with_agent(agent("Researcher", "research facts", worker));

        let outcome = crew.assign("find out why cats purr").await.unwrap();
        assert_eq!(
            outcome,
            AssignOutcome::Completed {
                agent: "Researcher".into(),
                result: "found it".into()
            }
        );
        assert_eq!(crew.selector_name(), "model");
    }

    #[tokio::test]
    async fn publishes_selection_and_memory_events() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let provider = Arc::new(SequentialMockProvider::single_text("ok"));
        let mut crew = Crew::new("goal")
            .with_agent(agent("Writer", "summarize text", provider))
            .with_event_bus(bus.clone());

        crew.assign_task("summarize").await.unwrap();

        let kinds: Vec<&'static str> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|event| match event.as_ref() {
                CrewEvent::AgentSelected { .. } => "selected",
                CrewEvent::TaskCompleted { .. } => "completed",
                CrewEvent::SharedMemoryUpdated { .. } => "memory",
                CrewEvent::TaskFailed { .. } => "failed",
                CrewEvent::ToolExecuted { .. } => "tool",
            })
            .collect();
        assert_eq!(kinds, vec!["selected", "completed", "memory"]);
    }
}
