// Adapters - External system implementations

pub mod exec_process;
pub mod probe_ffprobe;
pub mod progress_indicatif;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_process::ProcessExecAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use progress_indicatif::{IndicatifProgress, ProgressState, SilentProgress};
pub use toml_config::AppConfig;
pub use tracing_log::{init_logging, LogLevel};
