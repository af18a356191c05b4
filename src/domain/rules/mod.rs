// Domain rules - Business logic and policies

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::model::*;


/// Width above which frames are downscaled unless the original size is kept
pub const DEFAULT_MAX_WIDTH: u32 = 1024;

/// Prefix of every extracted frame file
pub const FRAME_PREFIX: &str = "frame-";

/// Extension of every extracted frame file
pub const FRAME_EXTENSION: &str = "png";

/// Extractor output template for sequentially numbered frames
pub const FRAME_PATTERN: &str = "frame-%08d.png";

/// Wildcard matching every extracted frame
pub const FRAME_GLOB: &str = "frame-*.png";

static EXTRACT_FRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"frame=(\d+)").expect("valid extract progress regex"));

static ENCODE_FRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Frame (\d+) / \d+").expect("valid encode progress regex"));

/// Business rules for frame extraction planning
pub struct ExtractionPlanner;

impl ExtractionPlanner {
    /// Build the extraction plan for a stream and the user's options
    pub fn plan(info: &VideoStreamInfo, options: &ConvertOptions) -> ExtractionPlan {
        ExtractionPlan {
            scale_filter: Self::scale_filter(info, options.keep_original_size, options.max_width),
            fps_filter: Self::fps_filter(options.fps),
            expected_frame_count: Self::expected_frame_count(info, options.fps),
        }
    }

    /// Downscale filter, only when the width exceeds `max_width`.
    ///
    /// Height is always `-1` so the extractor keeps the aspect ratio. Tall
    /// videos under the width limit are left alone.
    pub fn scale_filter(
        info: &VideoStreamInfo,
        keep_original_size: bool,
        max_width: u32,
    ) -> Option<String> {
        if keep_original_size || info.width <= max_width {
            return None;
        }
        Some(format!("scale={}:-1", max_width))
    }

    /// Frame-rate filter
    pub fn fps_filter(fps: f64) -> String {
        format!("fps={}", fps)
    }

    /// Number of frames the extractor should produce at `target_fps`.
    ///
    /// `None` when the packet count or the last timestamp is missing or not
    /// numeric, or when the arithmetic does not produce a finite count.
    pub fn expected_frame_count(info: &VideoStreamInfo, target_fps: f64) -> Option<u64> {
        let packets = info.total_packets? as f64;
        let original_fps = info.inferred_frame_rate()?;
        let frames = (packets / (original_fps / target_fps)).floor();
        (frames.is_finite() && frames >= 0.0).then_some(frames as u64)
    }
}

/// Business rules for scraping progress out of subprocess output
pub struct ProgressParser;

impl ProgressParser {
    /// Last `frame=<N>` value in an extractor output chunk
    pub fn parse_extract_frame(chunk: &str) -> Option<u64> {
        Self::last_capture(&EXTRACT_FRAME_RE, chunk)
    }

    /// Last `Frame <N> / <total>` value in an encoder output chunk
    pub fn parse_encode_frame(chunk: &str) -> Option<u64> {
        Self::last_capture(&ENCODE_FRAME_RE, chunk)
    }

    /// Overall progress for an extractor chunk, within `[0, 0.5]`
    pub fn extract_progress(chunk: &str, expected_frames: Option<u64>) -> Option<f64> {
        let expected = expected_frames.filter(|&n| n > 0)?;
        let current = Self::parse_extract_frame(chunk)?;
        Some(Self::half(current, expected))
    }

    /// Overall progress for an encoder chunk, within `[0.5, 1.0]`
    pub fn encode_progress(chunk: &str, expected_frames: usize) -> Option<f64> {
        if expected_frames == 0 {
            return None;
        }
        let current = Self::parse_encode_frame(chunk)?;
        Some(0.5 + Self::half(current, expected_frames as u64))
    }

    fn half(current: u64, expected: u64) -> f64 {
        (current as f64 / expected as f64 / 2.0).min(0.5)
    }

    fn last_capture(re: &Regex, chunk: &str) -> Option<u64> {
        re.captures_iter(chunk)
            .last()
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Default output path: `<input stem>.gif` in the current directory
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "output".to_string());
    Path::new(".").join(format!("{}.gif", stem))
}

/// Extractor output template inside `dir`.
///
/// The extractor reads `%` as a template directive, so any `%` in the
/// directory itself is doubled.
pub fn frame_output_template(dir: &Path) -> String {
    let escaped = dir.to_string_lossy().replace('%', "%%");
    Path::new(&escaped)
        .join(FRAME_PATTERN)
        .to_string_lossy()
        .into_owned()
}

/// True for file names the extractor writes into the working directory
pub fn is_frame_file(name: &str) -> bool {
    name.starts_with(FRAME_PREFIX)
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext == FRAME_EXTENSION)
}
