//! Agent selection: which agent in a crew handles a task.
//!
//! Two strategies are provided. A crew uses exactly one of them; there is no
//! fallback from one to the other.
//!
//! - [`KeywordSelector`]: the first agent (in registration order) whose goal
//!   contains any whitespace-separated word of the task, case-insensitively.
//! - [`ModelSelector`]: asks the completion service to name the best agent.
//!
//! "No suitable agent" is `Ok(None)`, never an error.

use std::sync::Arc;

use async_trait::async_trait;
use rustcrew_core::message::Message;
use rustcrew_core::provider::{Provider, ProviderRequest};
use tracing::debug;

use crate::agent::Agent;

/// A routing strategy over a crew's agents.
#[async_trait]
pub trait AgentSelector: Send + Sync {
    /// Strategy name, for logs.
    fn name(&self) -> &str;

    /// Index into `agents` of the agent that should handle `task`.
    async fn select(
        &self,
        task: &str,
        agents: &[Agent],
    ) -> Result<Option<usize>, rustcrew_core::Error>;
}

/// Substring heuristic over agent goals.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordSelector;

impl KeywordSelector {
    /// Synchronous form of [`AgentSelector::select`].
    pub fn pick(task: &str, agents: &[Agent]) -> Option<usize> {
        let words: Vec<String> = task.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return None;
        }
        agents.iter().position(|agent| {
            let goal = agent.goal().to_lowercase();
            words.iter().any(|word| goal.contains(word.as_str()))
        })
    }
}

#[async_trait]
impl AgentSelector for KeywordSelector {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn select(
        &self,
        task: &str,
        agents: &[Agent],
    ) -> Result<Option<usize>, rustcrew_core::Error> {
        Ok(Self::pick(task, agents))
    }
}

/// Lets the completion service pick the agent by name.
pub struct ModelSelector {
    provider: Arc<dyn Provider>,
    model: String,
}

impl ModelSelector {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn build_prompt(task: &str, agents: &[Agent]) -> String {
        let mut prompt = String::from("Available agents:\n");
        for agent in agents {
            let tools = agent.tools().names();
            let tools = if tools.is_empty() {
                "none".to_string()
            } else {
                tools.join(", ")
            };
            prompt.push_str(&format!(
                "- {} (goal: {}; tools: {})\n",
                agent.name(),
                agent.goal(),
                tools
            ));
        }
        prompt.push_str(&format!(
            "\nTask: {task}\n\nReply with only the name of the single agent best suited to this task, \
             or NONE if no agent fits."
        ));
        prompt
    }
}

#[async_trait]
impl AgentSelector for ModelSelector {
    fn name(&self) -> &str {
        "model"
    }

    async fn select(
        &self,
        task: &str,
        agents: &[Agent],
    ) -> Result<Option<usize>, rustcrew_core::Error> {
        if agents.is_empty() {
            return Ok(None);
        }

        let request = ProviderRequest::new(
            &self.model,
            vec![
                Message::system("You route tasks to the members of an AI agent crew."),
                Message::user(Self::build_prompt(task, agents)),
            ],
        )
        .with_temperature(0.0);

        let response = self.provider.complete(request).await?;
        let answer = response
            .message
            .content
            .trim()
            .trim_matches(is_quote)
            .to_lowercase();
        // A closing period may be sentence punctuation or part of the name.
        let unpunctuated = answer
            .strip_suffix('.')
            .map_or(answer.as_str(), |rest| rest.trim_matches(is_quote));

        debug!(answer = %answer, "Model selector answered");
        Ok(agents.iter().position(|agent| {
            let name = agent.name().to_lowercase();
            name == answer || name == unpunctuated
        }))
    }
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '`')
}

impl std::fmt::Debug for ModelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSelector")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use rustcrew_core::agent::AgentConfig;
    use rustcrew_core::tool::ToolRegistry;

    fn agent(name: &str, goal: &str) -> Agent {
        Agent::new(AgentConfig::new(name, goal), Arc::new(FailingProvider))
    }

    fn crew() -> Vec<Agent> {
        vec![
            agent("Researcher", "research topics and gather facts"),
            agent("Writer", "summarize text"),
        ]
    }

    #[test]
    fn keyword_routes_on_goal_substring() {
        let agents = crew();
        assert_eq!(
            KeywordSelector::pick("please summarize text about cats", &agents),
            Some(1)
        );
    }

    #[test]
    fn keyword_is_case_insensitive() {
        let agents = crew();
        assert_eq!(KeywordSelector::pick("SUMMARIZE this", &agents), Some(1));
    }

    #[test]
    fn keyword_first_registered_wins() {
        let agents = vec![
            agent("First", "summarize and research"),
            agent("Second", "summarize text"),
        ];
        assert_eq!(KeywordSelector::pick("summarize", &agents), Some(0));
    }

    #[test]
    fn keyword_no_match() {
        let agents = crew();
        assert_eq!(KeywordSelector::pick("bake bread", &agents), None);
    }

    #[test]
    fn keyword_ignores_repeated_spaces() {
        let agents = vec![agent("Writer", "summarize text")];
        assert_eq!(KeywordSelector::pick("bake  bread", &agents), None);
        assert_eq!(KeywordSelector::pick("   ", &agents), None);
    }

    #[tokio::test]
    async fn keyword_selector_trait_matches_pick() {
        let agents = crew();
        let picked = KeywordSelector.select("gather facts", &agents).await.unwrap();
        assert_eq!(picked, Some(0));
    }

    #[tokio::test]
    async fn model_selector_matches_trimmed_name() {
        let provider = Arc::new(SequentialMockProvider::single_text("  writer.\n"));
        let selector = ModelSelector::new(provider.clone(), "gpt-4o");
        let agents = crew();

        let picked = selector.select("make this shorter", &agents).await.unwrap();
        assert_eq!(picked, Some(1));

        let request = &provider.requests()[0];
        assert!(request.tools.is_empty());
        let prompt = &request.messages[1].content;
        assert!(prompt.contains("- Researcher (goal: research topics and gather facts; tools: none)"));
        assert!(prompt.contains("Task: make this shorter"));
    }

    #[tokio::test]
    async fn model_selector_lists_tools() {
        let provider = Arc::new(SequentialMockProvider::single_text("Writer"));
        let selector = ModelSelector::new(provider.clone(), "gpt-4o");
        let agents = vec![agent("Writer", "write files").with_tools(ToolRegistry::new().with(echo_tool()))];

        selector.select("write", &agents).await.unwrap();
        assert!(provider.requests()[0].messages[1].content.contains("tools: echo"));
    }

    #[tokio::test]
    async fn model_selector_keeps_dot_in_agent_name() {
        let agents = vec![agent("Dr.", "diagnose problems"), agent("Writer", "summarize text")];

        for answer in ["Dr.", "\"Dr.\"", "dr..", "`Dr.`"] {
            let provider = Arc::new(SequentialMockProvider::single_text(answer));
            let selector = ModelSelector::new(provider, "gpt-4o");
            assert_eq!(selector.select("check this", &agents).await.unwrap(), Some(0), "{answer}");
        }

        let provider = Arc::new(SequentialMockProvider::single_text("'Writer'."));
        let selector = ModelSelector::new(provider, "gpt-4o");
        assert_eq!(selector.select("shorten", &agents).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn model_selector_unknown_name_is_none() {
        let provider = Arc::new(SequentialMockProvider::single_text("NONE"));
        let selector = ModelSelector::new(provider, "gpt-4o");
        assert_eq!(selector.select("bake bread", &crew()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn model_selector_skips_call_without_agents() {
        let provider = Arc::new(SequentialMockProvider::new(vec![]));
        let selector = ModelSelector::new(provider.clone(), "gpt-4o");
        assert_eq!(selector.select("anything", &[]).await.unwrap(), None);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn model_selector_propagates_service_errors() {
        let selector = ModelSelector::new(Arc::new(FailingProvider), "gpt-4o");
        assert!(selector.select("anything", &crew()).await.is_err());
    }
}
