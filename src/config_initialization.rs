//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::adapters::toml_config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::cli::Cli;

/// Where the configuration came from, for the startup log line
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSources {
    pub file: Option<PathBuf>,
    pub env_overrides: usize,
    pub cli_overrides: usize,
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> Result<(AppConfig, ConfigSources)> {
    initialize_with_env(cli, |key| std::env::var(key).ok())
}

/// Same as [`initialize_configuration`] with an injectable environment
pub fn initialize_with_env<F>(cli: &Cli, lookup: F) -> Result<(AppConfig, ConfigSources)>
where
    F: Fn(&str) -> Option<String>,
{
    // Step 1 and 2: defaults, then the config file if any
    let (mut config, file) = load_config_file(cli.config.as_deref())?;

    // Step 3: environment variables
    let env_overrides = config
        .apply_env(lookup)
        .context("Failed to apply environment overrides")?;

    // Step 4: CLI arguments
    let cli_overrides = apply_cli_configuration_overrides(&mut config, cli);

    config.validate().context("Invalid configuration")?;

    Ok((
        config,
        ConfigSources {
            file,
            env_overrides,
            cli_overrides,
        },
    ))
}

/// Load the explicit config file, or `vid2gif.toml` when it exists
fn load_config_file(explicit: Option<&Path>) -> Result<(AppConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = AppConfig::load_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        return Ok((config, Some(path.to_path_buf())));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        let config = AppConfig::load_file(default_path)
            .with_context(|| format!("Failed to load configuration from {}", DEFAULT_CONFIG_FILE))?;
        return Ok((config, Some(default_path.to_path_buf())));
    }

    Ok((AppConfig::default(), None))
}

/// Apply CLI argument overrides to configuration
fn apply_cli_configuration_overrides(config: &mut AppConfig, cli: &Cli) -> usize {
    let mut cli_overrides = 0;

    if let Some(fps) = cli.fps {
        config.conversion.fps = fps;
        cli_overrides += 1;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
        cli_overrides += 1;
    }
    if cli.log_json {
        config.logging.json = true;
        cli_overrides += 1;
    }
    if cli.no_progress {
        config.logging.progress = false;
        cli_overrides += 1;
    }

    cli_overrides
}
