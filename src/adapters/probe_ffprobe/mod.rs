//! FFprobe adapter for video metadata
//!
//! Resolves the dimensions, packet count and last packet timestamp of the
//! first video stream by running `ffprobe` and parsing its JSON output.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Guidance appended when `ffprobe` or `ffmpeg` cannot be launched
pub const FFMPEG_INSTALL_HINT: &str =
    "ffmpeg and ffprobe are required; install them from https://ffmpeg.org/download.html and make sure both are on your PATH.";

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    packets: Vec<ProbePacket>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: u32,
    height: u32,
    #[serde(default)]
    nb_read_packets: Option<NumberOrString>,
}

#[derive(Debug, Deserialize)]
struct ProbePacket {
    #[serde(default)]
    pts_time: Option<String>,
}

/// ffprobe prints counters as strings; accept plain numbers too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

impl NumberOrString {
    fn as_u64(&self) -> Option<u64> {
        match self {
            NumberOrString::Number(n) => Some(*n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Parse an ffprobe JSON payload into stream info.
///
/// The first stream and the last packet are authoritative.
pub fn parse_probe_output(payload: &[u8]) -> Result<VideoStreamInfo, DomainError> {
    let output: ProbeOutput =
        serde_json::from_slice(payload).map_err(|e| DomainError::Schema(e.to_string()))?;

    let stream = output.streams.first().ok_or_else(|| {
        DomainError::MissingData("unable to retrieve resolution of the video.".to_string())
    })?;
    let packet = output.packets.last().ok_or_else(|| {
        DomainError::MissingData("unable to retrieve packets of the video.".to_string())
    })?;

    Ok(VideoStreamInfo::new(
        stream.width,
        stream.height,
        stream.nb_read_packets.as_ref().and_then(NumberOrString::as_u64),
        packet.pts_time.clone(),
    ))
}

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    executor: Arc<dyn ExecutePort>,
    ffprobe: String,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter running `ffprobe` through `executor`
    pub fn new(executor: Arc<dyn ExecutePort>, ffprobe: impl Into<String>) -> Self {
        Self {
            executor,
            ffprobe: ffprobe.into(),
        }
    }

    fn probe_args(video_path: &Path) -> Vec<String> {
        [
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-count_packets",
            "-show_entries",
            "stream=width,height,nb_read_packets",
            "-show_entries",
            "packet=pts_time",
            "-of",
            "json",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(video_path.to_string_lossy().to_string()))
        .collect()
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn resolve(&self, video_path: &Path) -> Result<VideoStreamInfo, DomainError> {
        debug!(path = %video_path.display(), "Probing video");

        let mut payload = Vec::new();
        let mut sink = |chunk: &[u8]| payload.extend_from_slice(chunk);
        self.executor
            .execute(&self.ffprobe, &Self::probe_args(video_path), None, &mut sink)
            .await
            .map_err(|e| e.with_install_hint(FFMPEG_INSTALL_HINT))?;

        let info = parse_probe_output(&payload)?;
        info!(video = %info, "Resolved video stream");
        Ok(info)
    }
}
