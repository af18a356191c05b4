//! Command implementations

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, info};

use crate::adapters::init_logging;
use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::Cli;
use crate::config_initialization::initialize_configuration;
use crate::domain::model::{ConvertRequest, ConvertResponse};
use crate::domain::rules::default_output_path;

/// Execute the conversion and return what should be printed on stdout
pub async fn convert(cli: Cli) -> Result<String> {
    let (config, sources) = initialize_configuration(&cli)?;
    init_logging(&config.logging.level, config.logging.json)
        .context("Failed to initialize logging")?;
    debug!(?sources, "Configuration loaded");

    let output_path = cli
        .output_path
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.video));
    let request = ConvertRequest::new(
        cli.video.clone(),
        output_path,
        config.convert_options(cli.original_size),
    )?;
    info!(options = ?request.options, "Conversion requested");

    let container = DefaultAppContainer::new(&config);
    let response = container.convert_interactor().execute(request).await?;

    if cli.json {
        return summary_json(&response);
    }
    Ok(response.output_path.display().to_string())
}

fn summary_json(response: &ConvertResponse) -> Result<String> {
    let summary = json!({
        "output_path": response.output_path.display().to_string(),
        "frame_count": response.frame_count,
        "width": response.video.width,
        "height": response.video.height,
        "total_packets": response.video.total_packets,
        "last_packet_timestamp": response.video.last_packet_timestamp,
    });
    serde_json::to_string_pretty(&summary).context("Failed to serialize conversion summary")
}
