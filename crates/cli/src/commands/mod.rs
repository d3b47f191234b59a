pub mod agents;
pub mod doctor;
pub mod init;
pub mod run;
pub mod task;

use std::path::{Path, PathBuf};

use rustcrew_agent::Crew;
use rustcrew_config::AppConfig;

/// Providers that run locally and need no API key.
const KEYLESS_PROVIDERS: &[&str] = &["ollama", "vllm", "llamacpp", "llama.cpp"];

/// Where the config lives: the `--config` path, or the default.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map(Path::to_path_buf).unwrap_or_else(AppConfig::config_path)
}

pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match explicit {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}

/// Build the configured crew, refusing early when no key is set.
pub fn build_crew(
    config: &AppConfig,
    explicit: Option<&Path>,
) -> Result<Crew, Box<dyn std::error::Error>> {
    let keyed = config.has_api_key()
        || config
            .providers
            .get(&config.default_provider)
            .is_some_and(|p| p.api_key.is_some());
    if !keyed && !KEYLESS_PROVIDERS.contains(&config.default_provider.as_str()) {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    RUSTCREW_API_KEY=...   (generic)");
        eprintln!("    OPENAI_API_KEY=sk-...  (OpenAI)");
        eprintln!("    GROQ_API_KEY=gsk_...   (Groq, with RUSTCREW_PROVIDER=groq)");
        eprintln!();
        eprintln!("  Or add api_key to: {}", config_path(explicit).display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = rustcrew::default_provider(config)?;
    Ok(rustcrew::build_crew(config, provider)?)
}
