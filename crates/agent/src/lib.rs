//! Agents and crews: the task-routing and tool-turn core of RustCrew.
//!
//! A [`Crew`] owns a set of [`Agent`]s and a shared memory:
//!
//! 1. **Route** each task to an agent via an [`AgentSelector`]
//! 2. **Perform** it: the agent talks to its provider, runs at most one
//!    round of tool calls, and returns text
//! 3. **Merge** the result into shared memory under the task string
//! 4. **Synthesize** all results into a final summary
//!
//! Tasks run strictly one at a time; later tasks see earlier results.

pub mod agent;
pub mod crew;
pub mod selection;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use agent::Agent;
pub use crew::{AssignOutcome, CREW_AGENT_LABEL, Crew, FINAL_SUMMARY_KEY, SUMMARY_ROUTING_TASK};
pub use selection::{AgentSelector, KeywordSelector, ModelSelector};
