//! Show or write the configuration file.

use snapstrip_common::AppConfig;

pub fn run(config: &AppConfig, write: bool) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if write {
        let path = config.save()?;
        println!();
        println!("Configuration written to: {}", path.display());
    } else {
        println!();
        println!("Config file: {}", AppConfig::path().display());
    }
    Ok(())
}
