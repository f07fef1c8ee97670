//! Host-facing event interface.
//!
//! The core never holds a reference to presentation objects. Anything a host
//! wants to show (log pane, progress bar) arrives through a
//! [`SamplingObserver`]. Every message routed through [`report`] is also
//! emitted through `tracing`, so headless runs still get a full log.

use tracing::Level;

/// Receives log lines and progress ticks from the sampling pipeline
pub trait SamplingObserver {
    /// A human-readable line for the host's log display
    fn on_log(&mut self, _level: Level, _message: &str) {}

    /// Called after each completed pair during the copy phase
    fn on_progress(&mut self, _completed: usize, _total: usize) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SamplingObserver for NullObserver {}

/// Observer that keeps every event, handy for hosts that render after the fact
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub lines: Vec<(Level, String)>,
    pub progress: Vec<(usize, usize)>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any recorded line at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .iter()
            .any(|(l, msg)| *l == level && msg.contains(needle))
    }
}

impl SamplingObserver for RecordingObserver {
    fn on_log(&mut self, level: Level, message: &str) {
        self.lines.push((level, message.to_string()));
    }

    fn on_progress(&mut self, completed: usize, total: usize) {
        self.progress.push((completed, total));
    }
}

/// Emit a message through tracing and hand it to the observer
pub fn report(observer: &mut dyn SamplingObserver, level: Level, message: impl AsRef<str>) {
    let message = message.as_ref();
    match level {
        Level::ERROR => tracing::error!("{}", message),
        Level::WARN => tracing::warn!("{}", message),
        Level::INFO => tracing::info!("{}", message),
        Level::DEBUG => tracing::debug!("{}", message),
        _ => tracing::trace!("{}", message),
    }
    observer.on_log(level, message);
}
