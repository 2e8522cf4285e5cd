use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use swipekit_session::SessionConfig;

/// Load the session configuration from a TOML file, or use defaults.
pub fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("invalid config file {}", path.display()))
}

/// Parse and validate a TOML session configuration.
pub fn parse_config(raw: &str) -> Result<SessionConfig> {
    let config: SessionConfig = toml::from_str(raw)?;
    config.validate()?;
    Ok(config)
}
