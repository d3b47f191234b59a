//! `rustcrew task`: assign one ad-hoc task.

use std::path::Path;

pub async fn run(explicit: Option<&Path>, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(explicit)?;
    let mut crew = super::build_crew(&config, explicit)?;
    let result = crew.assign_task(text).await?;
    println!("{result}");
    Ok(())
}
