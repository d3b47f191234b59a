//! `rustcrew doctor`: diagnose configuration and provider health.

use std::path::Path;

use rustcrew_config::AppConfig;

pub async fn run(explicit: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 RustCrew Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;
    let path = super::config_path(explicit);

    if path.exists() {
        println!("  ✅ Config file found: {}", path.display());
    } else {
        println!("  ⚠️  No config file at {} — run `rustcrew init`", path.display());
        issues += 1;
    }

    let config = match super::load_config(explicit) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ {e}");
            println!("\n  ⚠️  Fix the config before running a crew.");
            return Ok(());
        }
    };

    println!("  ✅ Provider: {}", config.default_provider);
    println!("  ✅ Model: {}", config.default_model);
    println!(
        "  ✅ Crew: {} agent(s), {} task(s), {:?} selection",
        config.crew.agents.len(),
        config.crew.tasks.len(),
        config.crew.selection
    );

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key configured — set OPENAI_API_KEY or api_key in config");
        issues += 1;
    }

    issues += check_provider(&config).await;

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

async fn check_provider(config: &AppConfig) -> usize {
    let provider = match rustcrew::default_provider(config) {
        Ok(provider) => provider,
        Err(e) => {
            println!("  ❌ {e}");
            return 1;
        }
    };

    let issues = match provider.health_check().await {
        Ok(true) => {
            println!("  ✅ Provider reachable");
            0
        }
        Ok(false) => {
            println!("  ⚠️  Provider responded but reported unhealthy");
            1
        }
        Err(e) => {
            println!("  ❌ Provider unreachable: {e}");
            return 1;
        }
    };

    let listed = provider.list_models().await;
    issues + check_models(config, listed)
}

fn check_models(
    config: &AppConfig,
    listed: Result<Vec<String>, rustcrew_core::ProviderError>,
) -> usize {
    let listed = match listed {
        Ok(listed) if !listed.is_empty() => listed,
        Ok(_) => {
            println!("  ⚠️  Provider did not list its models; skipping model check");
            return 0;
        }
        Err(e) => {
            println!("  ⚠️  Could not list models: {e}");
            return 0;
        }
    };

    let missing = rustcrew::wiring::unlisted_models(config, &listed);
    if missing.is_empty() {
        println!("  ✅ All configured models offered by provider");
        0
    } else {
        for model in &missing {
            println!("  ⚠️  Model '{model}' not offered by {}", config.default_provider);
        }
        missing.len()
    }
}
