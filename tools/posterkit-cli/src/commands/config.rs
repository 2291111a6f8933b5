//! Show or persist the application config.

use posterkit_common::config::AppConfig;

pub fn run(app_config: &AppConfig, save: bool) -> anyhow::Result<()> {
    let path = AppConfig::path();
    println!("Config file: {}", path.display());
    println!("{}", serde_json::to_string_pretty(app_config)?);

    if save {
        app_config.save()?;
        println!("\nSaved config to {}", path.display());
    }
    Ok(())
}
