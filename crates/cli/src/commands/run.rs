//! `rustcrew run`: work through the configured tasks, then synthesize.

use std::path::Path;

use rustcrew_agent::AssignOutcome;

pub async fn run(
    explicit: Option<&Path>,
    summarize: bool,
    final_response: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(explicit)?;
    let mut crew = super::build_crew(&config, explicit)?;
    let tasks = &config.crew.tasks;

    if tasks.is_empty() {
        println!("No tasks configured. Add `tasks = [...]` under [crew].");
        return Ok(());
    }

    let mut completed = 0usize;
    for (i, task) in tasks.iter().enumerate() {
        println!("\n── Task {}/{}: {task}", i + 1, tasks.len());
        match crew.assign(task).await {
            Ok(AssignOutcome::Completed { agent, result }) => {
                completed += 1;
                println!("[{agent}]\n{result}");
            }
            Ok(outcome @ AssignOutcome::NoSuitableAgent { .. }) => {
                println!("{}", outcome.into_text());
            }
            Err(e) => {
                // A failed task doesn't stop the run.
                tracing::error!(task = %task, error = %e, "Task failed");
            }
        }
    }

    if summarize && config.crew.summarize {
        println!("\n── Final Summary");
        let summary = crew.achieve_goal().await?;
        println!("{summary}");
    }

    if final_response {
        println!("\n── Final Response");
        let response = crew.provide_final_response().await?;
        println!("{response}");
    }

    println!("\n{completed}/{} task(s) completed", tasks.len());
    Ok(())
}
