//! vid2gif
//!
//! Converts a video file into an animated GIF. Frames are extracted with
//! ffmpeg into a temporary directory and encoded with gifski.
//!
//! # Usage
//!
//! ```bash
//! vid2gif clip.mp4
//! vid2gif clip.mp4 --fps 15 --original-size -o demo.gif
//! ```

use std::process::ExitCode;

use clap::Parser;

use vid2gif_cli::cli::{commands, Cli};

/// Main entry point for the vid2gif CLI application
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match commands::convert(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::from(1)
        }
    }
}
