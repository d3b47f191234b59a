//! Build a crew from configuration.

use std::sync::Arc;

use rustcrew_agent::{Agent, AgentSelector, Crew, KeywordSelector, ModelSelector};
use rustcrew_config::{AgentEntry, AppConfig, HistoryEntry, SelectionStrategy};
use rustcrew_core::agent::AgentConfig;
use rustcrew_core::message::Message;
use rustcrew_core::provider::Provider;
use rustcrew_core::tool::ToolRegistry;

/// Errors turning a valid config into a crew.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("agent '{agent}' uses unknown tool '{tool}' (available: {available})")]
    UnknownTool {
        agent: String,
        tool: String,
        available: String,
    },

    #[error("no provider registered under '{0}'")]
    NoProvider(String),
}

/// The configured default provider.
pub fn default_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, WiringError> {
    rustcrew_providers::build_from_config(config)
        .default()
        .ok_or_else(|| WiringError::NoProvider(config.default_provider.clone()))
}

/// Build the crew described by `config.crew`, with every agent (and the
/// crew's own model) talking to `provider`.
pub fn build_crew(config: &AppConfig, provider: Arc<dyn Provider>) -> Result<Crew, WiringError> {
    let crew_config = &config.crew;

    let selector: Box<dyn AgentSelector> = match crew_config.selection {
        SelectionStrategy::Keyword => Box::new(KeywordSelector),
        SelectionStrategy::Model => {
            Box::new(ModelSelector::new(provider.clone(), &config.default_model))
        }
    };

    let mut crew = Crew::new(&crew_config.goal)
        .with_selector(selector)
        .with_model(provider.clone(), &config.default_model)
        .with_chat_history(crew_config.chat_history.iter().map(history_message).collect());

    for entry in &crew_config.agents {
        let agent = Agent::new(agent_config(config, entry), provider.clone())
            .with_tools(agent_tools(config, entry)?);
        crew.add_agent(agent);
    }

    tracing::debug!(
        agents = crew.agents().len(),
        selector = %crew.selector_name(),
        "Crew built from config"
    );
    Ok(crew)
}

/// Models the crew would request that are absent from `listed`, in
/// first-use order without duplicates.
pub fn unlisted_models(config: &AppConfig, listed: &[String]) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    let used = std::iter::once(config.default_model.as_str())
        .chain(config.crew.agents.iter().filter_map(|a| a.model.as_deref()));
    for model in used {
        if !listed.iter().any(|l| l == model) && !missing.iter().any(|m| m == model) {
            missing.push(model.to_string());
        }
    }
    missing
}

fn agent_config(config: &AppConfig, entry: &AgentEntry) -> AgentConfig {
    let mut agent = AgentConfig::new(&entry.name, &entry.goal)
        .with_model(entry.model.as_deref().unwrap_or(&config.default_model))
        .with_temperature(entry.temperature.unwrap_or(config.default_temperature))
        .with_max_tokens(config.default_max_tokens);
    if let Some(expected) = &entry.expected_output {
        agent = agent.with_expected_output(expected);
    }
    agent
}

fn agent_tools(config: &AppConfig, entry: &AgentEntry) -> Result<ToolRegistry, WiringError> {
    entry
        .tools
        .iter()
        .map(|name| {
            rustcrew_tools::builtin(name, &config.tools).ok_or_else(|| WiringError::UnknownTool {
                agent: entry.name.clone(),
                tool: name.clone(),
                available: rustcrew_tools::BUILTIN_TOOLS.join(", "),
            })
        })
        .collect()
}

fn history_message(entry: &HistoryEntry) -> Message {
    // Roles are checked when the config is loaded.
    match entry.role.as_str() {
        "user" => Message::user(&entry.content),
        "assistant" => Message::assistant(&entry.content),
        _ => Message::system(&entry.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustcrew_core::message::Role;

    fn provider() -> Arc<dyn Provider> {
        Arc::new(rustcrew_providers::OpenAiCompatProvider::openai("sk-test"))
    }

    #[test]
    fn default_config_builds_two_agents() {
        let config = AppConfig::default();
        let crew = build_crew(&config, provider()).unwrap();

        let names: Vec<_> = crew.agents().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["Researcher", "Writer"]);
        assert_eq!(crew.agents()[1].tools().names(), vec!["file_write"]);
        assert_eq!(crew.selector_name(), "keyword");
    }

    #[test]
    fn agent_settings_fall_back_to_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
default_model = "gpt-4o-mini"
default_temperature = 0.3

[[crew.agents]]
name = "Poet"
goal = "write poems"
temperature = 1.2

[[crew.agents]]
name = "Critic"
goal = "review poems"
model = "llama-3.1-70b"
"#,
        )
        .unwrap();
        let crew = build_crew(&config, provider()).unwrap();

        let poet = crew.agents()[0].config();
        assert_eq!(poet.model, "gpt-4o-mini");
        assert!((poet.temperature - 1.2).abs() < f32::EPSILON);
        assert_eq!(poet.max_tokens, Some(config.default_max_tokens));

        let critic = crew.agents()[1].config();
        assert_eq!(critic.model, "llama-3.1-70b");
        assert!((critic.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let config = AppConfig::from_toml_str(
            r#"
[[crew.agents]]
name = "Hacker"
goal = "break things"
tools = ["shell"]
"#,
        )
        .unwrap();

        match build_crew(&config, provider()) {
            Err(WiringError::UnknownTool { agent, tool, .. }) => {
                assert_eq!(agent, "Hacker");
                assert_eq!(tool, "shell");
            }
            other => panic!("expected UnknownTool, got {other:?}"),
        }
    }

    #[test]
    fn model_selection_and_history_are_wired() {
        let config = AppConfig::from_toml_str(
            r#"
[crew]
goal = "Write a cat guide"
selection = "model"
chat_history = [
  { role = "system", content = "You are a writer working for company X." },
  { role = "user", content = "Keep it short." },
]
"#,
        )
        .unwrap();
        let crew = build_crew(&config, provider()).unwrap();

        assert_eq!(crew.selector_name(), "model");
        assert_eq!(crew.goal(), "Write a cat guide");
        let history = crew.chat_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::System);
        assert_eq!(history[1].role, Role::User);
    }

    #[test]
    fn unlisted_models_covers_agent_overrides() {
        let config = AppConfig::from_toml_str(
            r#"
default_model = "gpt-4o-mini"

[[crew.agents]]
name = "Poet"
goal = "write poems"
model = "llama-3.1-70b"

[[crew.agents]]
name = "Critic"
goal = "review poems"
model = "llama-3.1-70b"
"#,
        )
        .unwrap();

        let listed = vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()];
        assert_eq!(unlisted_models(&config, &listed), vec!["llama-3.1-70b"]);

        let listed = vec!["gpt-4o-mini".to_string(), "llama-3.1-70b".to_string()];
        assert!(unlisted_models(&config, &listed).is_empty());
    }

    #[test]
    fn default_provider_comes_from_router() {
        let config = AppConfig::default();
        assert_eq!(default_provider(&config).unwrap().name(), "openai");
    }
}
