//! GIF encoding runner
//!
//! Runs `gifski` inside the working directory over the extracted frames. No
//! shell is involved: frames are either listed by name or, where the encoder
//! expands wildcards itself, passed as a single pattern.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use walkdir::WalkDir;

use crate::domain::errors::DomainError;
use crate::domain::rules::{is_frame_file, ProgressParser, FRAME_GLOB};
use crate::ports::*;

/// Guidance appended when `gifski` cannot be launched
pub const GIFSKI_INSTALL_HINT: &str =
    "gifski is required; install it from https://gif.ski (or `cargo install gifski`) and make sure it is on your PATH.";

/// How frame files are handed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameArgs {
    /// One argument per frame, named relative to the working directory
    Listed,
    /// A single `frame-*.png` wildcard expanded by the encoder
    Pattern,
}

impl FrameArgs {
    /// `Pattern` on Windows, whose command line is limited to 32K characters
    /// and where gifski expands wildcards itself; `Listed` elsewhere.
    pub fn native() -> Self {
        if cfg!(windows) {
            FrameArgs::Pattern
        } else {
            FrameArgs::Listed
        }
    }
}

/// Runs the animated image encoder for one conversion
pub struct FrameEncoder {
    executor: Arc<dyn ExecutePort>,
    progress: Arc<dyn ProgressPort>,
    gifski: String,
    quality: u8,
    fps: Option<f64>,
    frame_args: FrameArgs,
}

impl FrameEncoder {
    /// Create an encoder with the default quality of 80
    pub fn new(
        executor: Arc<dyn ExecutePort>,
        progress: Arc<dyn ProgressPort>,
        gifski: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            progress,
            gifski: gifski.into(),
            quality: 80,
            fps: None,
            frame_args: FrameArgs::native(),
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Playback rate of the output; should match the extraction rate
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn with_frame_args(mut self, frame_args: FrameArgs) -> Self {
        self.frame_args = frame_args;
        self
    }

    /// Encode every frame in `working_dir` into `output_path`.
    ///
    /// The expected total is the number of directory entries at call time.
    /// Progress runs from 0.5 to 1.0 and is set to exactly 1.0 when the
    /// encoder returns. Returns the number of frames handed to the encoder.
    pub async fn encode(&self, working_dir: &Path, output_path: &Path) -> Result<usize, DomainError> {
        let (entry_count, frames) = list_frames(working_dir)?;
        if frames.is_empty() {
            return Err(DomainError::MissingData(format!(
                "no frames were extracted into {}",
                working_dir.display()
            )));
        }
        // The encoder runs inside the working directory
        let output_path = std::path::absolute(output_path)?;
        info!(
            frames = frames.len(),
            output = %output_path.display(),
            quality = self.quality,
            "Encoding GIF"
        );

        let args = self.encode_args(&output_path, &frames);
        let progress = Arc::clone(&self.progress);
        let mut sink = |chunk: &[u8]| {
            let text = String::from_utf8_lossy(chunk);
            if let Some(fraction) = ProgressParser::encode_progress(&text, entry_count) {
                progress.report(fraction);
            }
        };

        let result = self
            .executor
            .execute(&self.gifski, &args, Some(working_dir), &mut sink)
            .await
            .map_err(|e| e.with_install_hint(GIFSKI_INSTALL_HINT));
        self.progress.report(1.0);
        result.map(|()| frames.len())
    }

    fn encode_args(&self, output_path: &Path, frames: &[PathBuf]) -> Vec<String> {
        let mut args = vec!["--quality".to_string(), self.quality.to_string()];
        if let Some(fps) = self.fps {
            args.push("--fps".to_string());
            args.push(fps.to_string());
        }
        args.push("-o".to_string());
        args.push(output_path.to_string_lossy().to_string());
        match self.frame_args {
            FrameArgs::Listed => {
                args.extend(frames.iter().map(|f| f.to_string_lossy().to_string()))
            }
            FrameArgs::Pattern => args.push(FRAME_GLOB.to_string()),
        }
        args
    }
}

/// Count the entries of `dir` and collect its frame file names in order
fn list_frames(dir: &Path) -> Result<(usize, Vec<PathBuf>), DomainError> {
    let mut entry_count = 0;
    let mut frames = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| DomainError::Io(e.to_string()))?;
        entry_count += 1;
        if entry.file_type().is_file() && is_frame_file(&entry.file_name().to_string_lossy()) {
            frames.push(PathBuf::from(entry.file_name()));
        }
    }

    Ok((entry_count, frames))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct ScriptedExec {
        chunks: Vec<&'static str>,
        outcome: Result<(), DomainError>,
        args: Mutex<Option<Vec<String>>>,
        current_dir: Mutex<Option<PathBuf>>,
    }

    impl ScriptedExec {
        fn new(chunks: Vec<&'static str>, outcome: Result<(), DomainError>) -> Arc<Self> {
            Arc::new(Self {
                chunks,
                outcome,
                args: Mutex::new(None),
                current_dir: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ExecutePort for ScriptedExec {
        async fn execute(
            &self,
            _command: &str,
            args: &[String],
            current_dir: Option<&Path>,
            on_stdout: StdoutSink<'_>,
        ) -> Result<(), DomainError> {
            *self.args.lock().unwrap() = Some(args.to_vec());
            *self.current_dir.lock().unwrap() = current_dir.map(Path::to_path_buf);
            for chunk in &self.chunks {
                on_stdout(chunk.as_bytes());
            }
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<f64>>);

    impl ProgressPort for Recorder {
        fn report(&self, fraction: f64) {
            self.0.lock().unwrap().push(fraction);
        }
    }

    fn write_frames(dir: &Path, count: usize) {
        // Written out of order on purpose
        for i in (1..=count).rev() {
            fs::write(dir.join(format!("frame-{:08}.png", i)), b"png").unwrap();
        }
    }

    #[tokio::test]
    async fn test_encode_passes_sorted_frames_and_reports_progress() {
        let dir = TempDir::new().unwrap();
        write_frames(dir.path(), 4);
        let exec = ScriptedExec::new(vec!["Frame 1 / 4\r", "Frame 2 / 4\rFrame 3 / 4\r"], Ok(()));
        let recorder = Arc::new(Recorder::default());
        let output = dir.path().join("out.gif");

        let encoder = FrameEncoder::new(exec.clone(), recorder.clone(), "gifski")
            .with_fps(12.0)
            .with_frame_args(FrameArgs::Listed);
        let frames = encoder.encode(dir.path(), &output).await.unwrap();

        assert_eq!(frames, 4);
        assert_eq!(*recorder.0.lock().unwrap(), vec![0.625, 0.875, 1.0]);

        let args = exec.args.lock().unwrap().clone().unwrap();
        let output_arg = output.to_string_lossy().to_string();
        assert_eq!(
            args[..6].to_vec(),
            vec!["--quality", "80", "--fps", "12", "-o", output_arg.as_str()]
        );
        assert_eq!(
            args[6..].to_vec(),
            vec![
                "frame-00000001.png",
                "frame-00000002.png",
                "frame-00000003.png",
                "frame-00000004.png",
            ]
        );
        assert_eq!(
            exec.current_dir.lock().unwrap().as_deref(),
            Some(dir.path())
        );
    }

    #[tokio::test]
    async fn test_encode_pattern_passes_single_wildcard() {
        let dir = TempDir::new().unwrap();
        write_frames(dir.path(), 3);
        let exec = ScriptedExec::new(vec![], Ok(()));
        let recorder = Arc::new(Recorder::default());

        let frames = FrameEncoder::new(exec.clone(), recorder, "gifski")
            .with_frame_args(FrameArgs::Pattern)
            .encode(dir.path(), &dir.path().join("out.gif"))
            .await
            .unwrap();

        assert_eq!(frames, 3);
        let args = exec.args.lock().unwrap().clone().unwrap();
        assert_eq!(args.last().map(String::as_str), Some("frame-*.png"));
        assert_eq!(args.iter().filter(|a| a.ends_with(".png")).count(), 1);
    }

    #[test]
    fn test_native_frame_args() {
        if cfg!(windows) {
            assert_eq!(FrameArgs::native(), FrameArgs::Pattern);
        } else {
            assert_eq!(FrameArgs::native(), FrameArgs::Listed);
        }
    }

    #[tokio::test]
    async fn test_relative_output_path_is_made_absolute() {
        let dir = TempDir::new().unwrap();
        write_frames(dir.path(), 1);
        let exec = ScriptedExec::new(vec![], Ok(()));
        let recorder = Arc::new(Recorder::default());

        FrameEncoder::new(exec.clone(), recorder, "gifski")
            .encode(dir.path(), Path::new("clip.gif"))
            .await
            .unwrap();

        let args = exec.args.lock().unwrap().clone().unwrap();
        let output = args.iter().position(|a| a == "-o").map(|i| &args[i + 1]).unwrap();
        assert!(Path::new(output).is_absolute());
        assert!(output.ends_with("clip.gif"));
    }

    // Tens of thousands of absolute paths overflow the 2 MB argument limit;
    // names relative to the working directory fit.
    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_long_clip_frame_list_fits_the_command_line() {
        use crate::adapters::ProcessExecAdapter;

        const FRAMES: usize = 60_000;
        let dir = TempDir::new().unwrap();
        for i in 1..=FRAMES {
            fs::File::create(dir.path().join(format!("frame-{:08}.png", i))).unwrap();
        }
        let recorder = Arc::new(Recorder::default());

        let frames = FrameEncoder::new(Arc::new(ProcessExecAdapter::new()), recorder.clone(), "true")
            .with_frame_args(FrameArgs::Listed)
            .encode(dir.path(), &dir.path().join("out.gif"))
            .await
            .unwrap();

        assert_eq!(frames, FRAMES);
        assert_eq!(*recorder.0.lock().unwrap(), vec![1.0]);
    }

    #[tokio::test]
    async fn test_encode_expected_total_counts_all_entries() {
        let dir = TempDir::new().unwrap();
        write_frames(dir.path(), 2);
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("extra.bin"), b"x").unwrap();
        let exec = ScriptedExec::new(vec!["Frame 2 / 2"], Ok(()));
        let recorder = Arc::new(Recorder::default());

        let frames = FrameEncoder::new(exec.clone(), recorder.clone(), "gifski")
            .with_quality(90)
            .encode(dir.path(), &dir.path().join("out.gif"))
            .await
            .unwrap();

        // Four entries in the directory, two of them frames
        assert_eq!(frames, 2);
        assert_eq!(*recorder.0.lock().unwrap(), vec![0.75, 1.0]);
        let args = exec.args.lock().unwrap().clone().unwrap();
        assert_eq!(args[1], "90");
        assert!(!args.contains(&"--fps".to_string()));
    }

    #[tokio::test]
    async fn test_encode_empty_directory_skips_encoder() {
        let dir = TempDir::new().unwrap();
        let exec = ScriptedExec::new(vec![], Ok(()));
        let recorder = Arc::new(Recorder::default());

        let err = FrameEncoder::new(exec.clone(), recorder.clone(), "gifski")
            .encode(dir.path(), &dir.path().join("out.gif"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::MissingData(_)));
        assert!(exec.args.lock().unwrap().is_none());
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_encode_failure_propagates_with_hint() {
        let dir = TempDir::new().unwrap();
        write_frames(dir.path(), 1);
        let exec = ScriptedExec::new(
            vec![],
            Err(DomainError::CommandNotFound {
                command: "gifski".to_string(),
            }),
        );
        let recorder = Arc::new(Recorder::default());

        let err = FrameEncoder::new(exec, recorder.clone(), "gifski")
            .encode(dir.path(), &dir.path().join("out.gif"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::MissingTool {
                command: "gifski".to_string(),
                hint: GIFSKI_INSTALL_HINT.to_string(),
            }
        );
        assert_eq!(*recorder.0.lock().unwrap(), vec![1.0]);
    }
}
