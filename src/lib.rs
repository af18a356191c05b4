//! vid2gif CLI Library
//!
//! Coordinates `ffprobe`, `ffmpeg` and `gifski` to turn a video into an
//! animated GIF: resolve stream metadata, extract frames into a temporary
//! directory, encode them, and clean up on every exit path.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod ports;

// Re-export commonly used types
pub use app::ConvertInteractor;
pub use domain::errors::DomainError;
pub use domain::model::{ConvertOptions, ConvertRequest, ConvertResponse, VideoStreamInfo};
pub use ports::{ExecutePort, ProbePort, ProgressPort, StdoutSink};
