//! CLI module for vid2gif
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::Parser;

pub mod commands;

/// vid2gif
///
/// Converts a video into an animated GIF by extracting frames with ffmpeg
/// and encoding them with gifski.
#[derive(Parser, Debug)]
#[command(name = "vid2gif")]
#[command(about = "vid2gif - Turn a video into an animated GIF")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Input video file path
    pub video: PathBuf,

    /// Keep the original resolution instead of downscaling wide videos
    #[arg(long)]
    pub original_size: bool,

    /// Target frame rate of the GIF [default: 12]
    #[arg(long)]
    pub fps: Option<f64>,

    /// Output file path (default: ./<video name>.gif)
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// Configuration file (default: ./vid2gif.toml when present)
    #[arg(long, env = "VID2GIF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Do not draw the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Print a JSON summary instead of the bare output path
    #[arg(long)]
    pub json: bool,
}
