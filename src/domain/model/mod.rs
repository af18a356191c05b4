// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;

use crate::domain::errors::DomainError;


/// Video stream information resolved from the metadata tool
#[derive(Debug, Clone, PartialEq)]
pub struct VideoStreamInfo {
    pub width: u32,
    pub height: u32,
    /// Packet count of the first video stream, when reported as a number
    pub total_packets: Option<u64>,
    /// Presentation timestamp of the last packet, in decimal seconds
    pub last_packet_timestamp: Option<String>,
}

impl VideoStreamInfo {
    /// Create new video stream info
    pub fn new(
        width: u32,
        height: u32,
        total_packets: Option<u64>,
        last_packet_timestamp: Option<String>,
    ) -> Self {
        Self {
            width,
            height,
            total_packets,
            last_packet_timestamp,
        }
    }

    /// Duration implied by the last packet timestamp, when it parses
    pub fn duration_seconds(&self) -> Option<f64> {
        self.last_packet_timestamp
            .as_deref()
            .and_then(|ts| ts.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite())
    }

    /// Frame rate inferred from packet count over duration
    pub fn inferred_frame_rate(&self) -> Option<f64> {
        let packets = self.total_packets? as f64;
        let duration = self.duration_seconds()?;
        let rate = packets / duration;
        rate.is_finite().then_some(rate)
    }
}

impl fmt::Display for VideoStreamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)?;
        if let Some(packets) = self.total_packets {
            write!(f, ", {} packets", packets)?;
        }
        if let Some(ts) = &self.last_packet_timestamp {
            write!(f, ", last pts {}s", ts)?;
        }
        Ok(())
    }
}

/// Frame extraction plan derived from stream info and user options
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionPlan {
    pub scale_filter: Option<String>,
    pub fps_filter: String,
    pub expected_frame_count: Option<u64>,
}

impl ExtractionPlan {
    /// Comma-joined filter chain for the extractor's `-vf` argument
    pub fn filter_chain(&self) -> String {
        match &self.scale_filter {
            Some(scale) => format!("{},{}", scale, self.fps_filter),
            None => self.fps_filter.clone(),
        }
    }
}

/// User options for a single conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub fps: f64,
    pub keep_original_size: bool,
    pub quality: u8,
    pub max_width: u32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            fps: 12.0,
            keep_original_size: false,
            quality: 80,
            max_width: 1024,
        }
    }
}

impl ConvertOptions {
    /// Reject option values the external tools cannot work with
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(DomainError::BadArgs(format!(
                "fps must be a positive number, got {}",
                self.fps
            )));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(DomainError::BadArgs(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        if self.max_width == 0 {
            return Err(DomainError::BadArgs(
                "max width must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Conversion request
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub options: ConvertOptions,
}

impl ConvertRequest {
    /// Create new convert request with validation
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        options: ConvertOptions,
    ) -> Result<Self, DomainError> {
        let input_path = input_path.into();
        if input_path.as_os_str().is_empty() {
            return Err(DomainError::BadArgs("input path cannot be empty".to_string()));
        }
        options.validate()?;

        Ok(Self {
            input_path,
            output_path: output_path.into(),
            options,
        })
    }
}

/// Conversion response
#[derive(Debug, Clone)]
pub struct ConvertResponse {
    pub output_path: PathBuf,
    pub frame_count: usize,
    pub video: VideoStreamInfo,
}

/// Pipeline state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    ResolvingInfo,
    ExtractingFrames,
    Encoding,
    Done,
    Failed,
}

impl PipelineState {
    /// True for `Done` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    /// Next state on success of the current one
    pub fn advance(self) -> Self {
        match self {
            PipelineState::Idle => PipelineState::ResolvingInfo,
            PipelineState::ResolvingInfo => PipelineState::ExtractingFrames,
            PipelineState::ExtractingFrames => PipelineState::Encoding,
            PipelineState::Encoding => PipelineState::Done,
            terminal => terminal,
        }
    }

    /// Next state on error; terminal states stay put
    pub fn fail(self) -> Self {
        if self.is_terminal() {
            self
        } else {
            PipelineState::Failed
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::ResolvingInfo => "resolving video info",
            PipelineState::ExtractingFrames => "extracting frames",
            PipelineState::Encoding => "encoding",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}
