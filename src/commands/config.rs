//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config set`: Set a configuration value
//! - `config path`: Print the config file location

use owo_colors::OwoColorize;

use crate::config::Config;
use crate::error::Result;

/// Show current configuration
pub fn cmd_config_show() -> Result<()> {
    let config = Config::load()?;
    println!("{}", "Configuration:".bold());
    println!("  api_key: {}", config.masked_api_key());
    println!("  target:  {}", config.target());
    Ok(())
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    println!("Set {}", key.cyan());
    Ok(())
}

/// Print the config file path
pub fn cmd_config_path() -> Result<()> {
    println!("{}", Config::config_path()?.display());
    Ok(())
}
