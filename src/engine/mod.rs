//! Conversion engine: frame extraction and GIF encoding runners

pub mod encode;
pub mod extract;

pub use encode::{FrameArgs, FrameEncoder};
pub use extract::FrameExtractor;

/// Executables the runners invoke
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Frame extractor executable
    pub ffmpeg: String,
    /// Animated image encoder executable
    pub gifski: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            gifski: "gifski".to_string(),
        }
    }
}
