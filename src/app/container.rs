use std::sync::Arc;

use crate::adapters::{
    AppConfig, FFprobeAdapter, IndicatifProgress, ProcessExecAdapter, SilentProgress,
};
use crate::app::convert_interactor::ConvertInteractor;
use crate::engine::EngineConfig;
use crate::ports::{ExecutePort, ProbePort, ProgressPort};

pub trait AppContainer: Send + Sync {
    fn convert_interactor(&self) -> Arc<ConvertInteractor>;
}

pub struct DefaultAppContainer {
    convert_interactor: Arc<ConvertInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> Self {
        let execute_port: Arc<dyn ExecutePort> = Arc::new(ProcessExecAdapter::new());
        let probe_port: Arc<dyn ProbePort> = Arc::new(FFprobeAdapter::new(
            Arc::clone(&execute_port),
            config.tools.ffprobe.clone(),
        ));
        let progress_port: Arc<dyn ProgressPort> = if config.logging.progress {
            Arc::new(IndicatifProgress::new("converting"))
        } else {
            Arc::new(SilentProgress::new())
        };

        let engine = EngineConfig {
            ffmpeg: config.tools.ffmpeg.clone(),
            gifski: config.tools.gifski.clone(),
        };

        let mut interactor = ConvertInteractor::new(execute_port, probe_port, progress_port, engine);
        if let Some(parent) = &config.conversion.temp_dir {
            interactor = interactor.with_temp_parent(parent);
        }

        Self {
            convert_interactor: Arc::new(interactor),
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn convert_interactor(&self) -> Arc<ConvertInteractor> {
        Arc::clone(&self.convert_interactor)
    }
}
