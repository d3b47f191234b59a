//! `rustcrew agents`: list the configured crew.

use std::path::Path;

pub fn run(explicit: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(explicit)?;
    let crew = &config.crew;

    println!("Goal: {}", crew.goal);
    println!("Selection: {:?}\n", crew.selection);

    if crew.agents.is_empty() {
        println!("  No agents configured. Add [[crew.agents]] entries to the config.");
        return Ok(());
    }

    for agent in &crew.agents {
        let model = agent.model.as_deref().unwrap_or(&config.default_model);
        println!("  {} ({model})", agent.name);
        println!("    goal:   {}", agent.goal);
        if let Some(expected) = &agent.expected_output {
            println!("    output: {expected}");
        }
        if !agent.tools.is_empty() {
            println!("    tools:  {}", agent.tools.join(", "));
        }
    }

    println!("\n  {} task(s) configured", crew.tasks.len());
    Ok(())
}
