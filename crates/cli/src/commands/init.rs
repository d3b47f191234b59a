//! `rustcrew init`: write a starter crew manifest.

use std::path::Path;

use rustcrew_config::AppConfig;

pub fn run(explicit: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_path(explicit);

    if path.exists() && !force {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually, or re-run with --force to overwrite.");
        return Ok(());
    }

    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;

    println!("✅ Wrote config to: {}", path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set OPENAI_API_KEY (or api_key in the config)");
    println!("   2. Edit [crew] — goal, agents, tasks");
    println!("   3. Run `rustcrew run`");
    Ok(())
}
