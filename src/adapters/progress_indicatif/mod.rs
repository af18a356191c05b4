// Progress adapters - Terminal progress bar and silent sink

use std::sync::atomic::{AtomicU64, Ordering};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::ports::ProgressPort;

/// Bar resolution; fractions are mapped onto this many steps
const BAR_STEPS: u64 = 1000;

/// Latest reported fraction, readable from any thread
#[derive(Debug, Default)]
pub struct ProgressState {
    bits: AtomicU64,
}

impl ProgressState {
    /// Store a fraction, clamped to `[0, 1]`
    pub fn set(&self, fraction: f64) {
        let clamped = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        self.bits.store(clamped.to_bits(), Ordering::Relaxed);
    }

    /// Latest stored fraction
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// Progress bar on stderr
pub struct IndicatifProgress {
    bar: ProgressBar,
    state: ProgressState,
}

impl IndicatifProgress {
    /// Create a progress bar labelled with `message`
    pub fn new(message: impl Into<String>) -> Self {
        let bar = ProgressBar::with_draw_target(Some(BAR_STEPS), ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {percent:>3}% {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("##-"));
        bar.set_message(message.into());

        Self {
            bar,
            state: ProgressState::default(),
        }
    }
}

impl ProgressPort for IndicatifProgress {
    fn report(&self, fraction: f64) {
        self.state.set(fraction);
        self.bar
            .set_position((self.state.get() * BAR_STEPS as f64).round() as u64);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Progress sink for `--no-progress`; reports go nowhere
#[derive(Debug, Default)]
pub struct SilentProgress;

impl SilentProgress {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressPort for SilentProgress {
    fn report(&self, _fraction: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_state_clamps() {
        let state = ProgressState::default();
        assert_eq!(state.get(), 0.0);
        state.set(0.42);
        assert_eq!(state.get(), 0.42);
        state.set(1.7);
        assert_eq!(state.get(), 1.0);
        state.set(-0.1);
        assert_eq!(state.get(), 0.0);
        state.set(f64::NAN);
        assert_eq!(state.get(), 0.0);
    }

    #[test]
    fn test_indicatif_progress_maps_fraction_to_bar() {
        let progress = IndicatifProgress::new("test");
        progress.report(0.75);
        assert_eq!(progress.bar.position(), 750);
        progress.report(3.0);
        assert_eq!(progress.bar.position(), BAR_STEPS);
        progress.finish();
        assert!(progress.bar.is_finished());
    }
}
