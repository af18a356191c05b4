// Convert interactor - Orchestrates the video to GIF use case

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::{EngineConfig, FrameEncoder, FrameExtractor};
use crate::ports::*;

/// Prefix of every working directory created by the pipeline
pub const WORKING_DIR_PREFIX: &str = "vid2gif-";

/// Interactor for the conversion pipeline
///
/// Runs resolve, extract and encode in order. The working directory is
/// created only once metadata has been resolved and is removed on every
/// exit path.
pub struct ConvertInteractor {
    execute_port: Arc<dyn ExecutePort>,
    probe_port: Arc<dyn ProbePort>,
    progress_port: Arc<dyn ProgressPort>,
    engine: EngineConfig,
    temp_parent: Option<PathBuf>,
}

impl ConvertInteractor {
    /// Create new convert interactor with injected ports
    pub fn new(
        execute_port: Arc<dyn ExecutePort>,
        probe_port: Arc<dyn ProbePort>,
        progress_port: Arc<dyn ProgressPort>,
        engine: EngineConfig,
    ) -> Self {
        Self {
            execute_port,
            probe_port,
            progress_port,
            engine,
            temp_parent: None,
        }
    }

    /// Create working directories under `dir` instead of the system temp dir
    pub fn with_temp_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_parent = Some(dir.into());
        self
    }

    /// Execute the conversion
    pub async fn execute(&self, request: ConvertRequest) -> Result<ConvertResponse, DomainError> {
        info!(
            input = %request.input_path.display(),
            output = %request.output_path.display(),
            "Starting conversion"
        );
        self.progress_port.report(0.0);

        let mut state = PipelineState::Idle;
        Self::transition(&mut state, PipelineState::ResolvingInfo);
        let result = self.run(&request, &mut state).await;
        self.progress_port.finish();

        match &result {
            Ok(response) => info!(
                output = %response.output_path.display(),
                frames = response.frame_count,
                "Conversion finished"
            ),
            Err(e) => info!(error = %e, "Conversion failed"),
        }
        result
    }

    async fn run(
        &self,
        request: &ConvertRequest,
        state: &mut PipelineState,
    ) -> Result<ConvertResponse, DomainError> {
        let resolved = self.probe_port.resolve(&request.input_path).await;
        let video = Self::track(state, resolved)?;

        let working_dir = Self::track_failure(state, self.create_working_dir())?;
        let outcome = self.process(request, &video, &working_dir, state).await;
        Self::cleanup(working_dir);

        outcome.map(|frame_count| ConvertResponse {
            output_path: request.output_path.clone(),
            frame_count,
            video,
        })
    }

    async fn process(
        &self,
        request: &ConvertRequest,
        video: &VideoStreamInfo,
        working_dir: &TempDir,
        state: &mut PipelineState,
    ) -> Result<usize, DomainError> {
        let options = &request.options;

        let extractor = FrameExtractor::new(
            Arc::clone(&self.execute_port),
            Arc::clone(&self.progress_port),
            self.engine.ffmpeg.clone(),
            working_dir.path(),
        )
        .with_max_width(options.max_width);
        let extracted = extractor
            .extract(&request.input_path, options.fps, video, options.keep_original_size)
            .await;
        Self::track(state, extracted)?;

        let encoder = FrameEncoder::new(
            Arc::clone(&self.execute_port),
            Arc::clone(&self.progress_port),
            self.engine.gifski.clone(),
        )
        .with_quality(options.quality)
        .with_fps(options.fps);
        let encoded = encoder.encode(working_dir.path(), &request.output_path).await;
        Self::track(state, encoded)
    }

    fn create_working_dir(&self) -> Result<TempDir, DomainError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKING_DIR_PREFIX);
        let dir = match &self.temp_parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(|e| DomainError::Io(format!("failed to create working directory: {}", e)))?;

        debug!(path = %dir.path().display(), "Created working directory");
        Ok(dir)
    }

    /// Remove the working directory; failures are only logged
    fn cleanup(working_dir: TempDir) {
        let path = working_dir.path().to_path_buf();
        match working_dir.close() {
            Ok(()) => debug!(path = %path.display(), "Removed working directory"),
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove working directory"
            ),
        }
    }

    /// Advance on success, fail on error
    fn track<T>(state: &mut PipelineState, result: Result<T, DomainError>) -> Result<T, DomainError> {
        let next = if result.is_ok() {
            state.advance()
        } else {
            state.fail()
        };
        Self::transition(state, next);
        result
    }

    /// Fail on error, stay put on success
    fn track_failure<T>(
        state: &mut PipelineState,
        result: Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        if result.is_err() {
            let next = state.fail();
            Self::transition(state, next);
        }
        result
    }

    fn transition(state: &mut PipelineState, next: PipelineState) {
        if *state != next {
            debug!(from = %state, to = %next, "Pipeline state");
            *state = next;
        }
    }
}
