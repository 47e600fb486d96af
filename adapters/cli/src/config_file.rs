//! Loading session tuning from TOML documents.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use whack_core::SessionConfig;

/// Reads the configuration at `path`, falling back to defaults when absent.
pub(crate) fn load(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read session config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid session config at {}", path.display()))
}

/// Parses a possibly partial TOML document; omitted keys keep their defaults.
pub(crate) fn parse(contents: &str) -> Result<SessionConfig> {
    let config: SessionConfig =
        toml::from_str(contents).context("failed to parse session config toml contents")?;
    config.validate()?;
    Ok(config)
}

/// Renders the default configuration as a TOML document.
pub(crate) fn render_default() -> Result<String> {
    toml::to_string_pretty(&SessionConfig::default())
        .context("failed to render default session config")
}
