//! Crew event system: completion/failure notifications for observers.
//!
//! Results always travel back to the caller as return values. Events are an
//! extra, fire-and-forget channel for anything that wants to watch a crew
//! work (progress output, audit logs, tests).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All crew events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CrewEvent {
    /// An agent finished a task. Mutually exclusive with `TaskFailed`.
    TaskCompleted {
        agent: String,
        task: String,
        result: String,
        timestamp: DateTime<Utc>,
    },

    /// An agent failed a task. Mutually exclusive with `TaskCompleted`.
    TaskFailed {
        agent: String,
        task: String,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// A tool call was executed during a task
    ToolExecuted {
        agent: String,
        tool: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The crew routed a task to an agent
    AgentSelected {
        agent: String,
        task: String,
        timestamp: DateTime<Utc>,
    },

    /// The crew wrote a shared-memory entry
    SharedMemoryUpdated {
        task: String,
        agent: String,
        timestamp: DateTime<Utc>,
    },
}

impl CrewEvent {
    pub fn task_completed(agent: &str, task: &str, result: &str) -> Self {
        Self::TaskCompleted {
            agent: agent.to_string(),
            task: task.to_string(),
            result: result.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn task_failed(agent: &str, task: &str, error: &impl std::fmt::Display) -> Self {
        Self::TaskFailed {
            agent: agent.to_string(),
            task: task.to_string(),
            error: error.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// A broadcast-based event bus for crew events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
/// Subscribers receive every event published after they subscribed.
pub struct EventBus {
    sender: broadcast::Sender<Arc<CrewEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: CrewEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<CrewEvent>> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
