//! Frame extraction runner
//!
//! Plans the filter chain, runs `ffmpeg` into the working directory and turns
//! its `-progress` output into the first half of the overall fraction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::probe_ffprobe::FFMPEG_INSTALL_HINT;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::{frame_output_template, ExtractionPlanner, ProgressParser};
use crate::ports::*;

/// Runs the frame extractor for one conversion
pub struct FrameExtractor {
    executor: Arc<dyn ExecutePort>,
    progress: Arc<dyn ProgressPort>,
    ffmpeg: String,
    working_dir: PathBuf,
    max_width: u32,
}

impl FrameExtractor {
    /// Create an extractor writing frames into `working_dir`
    pub fn new(
        executor: Arc<dyn ExecutePort>,
        progress: Arc<dyn ProgressPort>,
        ffmpeg: impl Into<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executor,
            progress,
            ffmpeg: ffmpeg.into(),
            working_dir: working_dir.into(),
            max_width: crate::domain::rules::DEFAULT_MAX_WIDTH,
        }
    }

    /// Override the downscale threshold
    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    /// Extract frames at `target_fps`, downscaling wide videos unless
    /// `keep_original_size` is set.
    ///
    /// Progress is reported up to 0.5 while the extractor runs and set to
    /// exactly 0.5 when it returns, whatever the outcome.
    pub async fn extract(
        &self,
        video_path: &Path,
        target_fps: f64,
        video_info: &VideoStreamInfo,
        keep_original_size: bool,
    ) -> Result<(), DomainError> {
        let options = ConvertOptions {
            fps: target_fps,
            keep_original_size,
            max_width: self.max_width,
            ..ConvertOptions::default()
        };
        let plan = ExtractionPlanner::plan(video_info, &options);
        info!(
            filters = %plan.filter_chain(),
            expected_frames = ?plan.expected_frame_count,
            "Extracting frames"
        );
        if plan.expected_frame_count.is_none() {
            debug!("Expected frame count unknown, extraction progress is indeterminate");
        }

        let args = self.extract_args(video_path, &plan);
        let expected = plan.expected_frame_count;
        let progress = Arc::clone(&self.progress);
        let mut sink = |chunk: &[u8]| {
            let text = String::from_utf8_lossy(chunk);
            if let Some(fraction) = ProgressParser::extract_progress(&text, expected) {
                progress.report(fraction);
            }
        };

        let result = self
            .executor
            .execute(&self.ffmpeg, &args, None, &mut sink)
            .await
            .map_err(|e| e.with_install_hint(FFMPEG_INSTALL_HINT));
        self.progress.report(0.5);
        result
    }

    fn extract_args(&self, video_path: &Path, plan: &ExtractionPlan) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-nostats".to_string(),
            "-progress".to_string(),
            "pipe:1".to_string(),
            "-i".to_string(),
            video_path.to_string_lossy().to_string(),
            "-vf".to_string(),
            plan.filter_chain(),
            frame_output_template(&self.working_dir),
        ]
    }
}
