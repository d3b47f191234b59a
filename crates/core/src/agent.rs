//! Agent identity and configuration types.

use serde::{Deserialize, Serialize};

/// Immutable identity of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique name within a crew (e.g., "Writer")
    pub name: String,

    /// What this agent is for; also what keyword routing matches against
    pub goal: String,

    /// Required shape of the output, stated to the model when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,

    /// Model identifier passed to the completion service
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temp")]
    pub temperature: f32,

    /// Maximum tokens per completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_model() -> String {
    "gpt-4".into()
}
fn default_temp() -> f32 {
    0.7
}

impl AgentConfig {
    pub fn new(name: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            goal: goal.into(),
            expected_output: None,
            model: default_model(),
            temperature: default_temp(),
            max_tokens: None,
        }
    }

    pub fn with_expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = Some(expected.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}
