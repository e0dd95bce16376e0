use crate::alignment::domain::prompt::GuideStatus;

/// Cross-cutting logger for sampling-session events.
///
/// Decouples the tick loop from any specific output mechanism so the GUI
/// (which renders status itself) and diagnostics runs can observe the same
/// loop without changing it.
pub trait SessionLogger: Send {
    /// Record the status an applied tick produced.
    fn tick(&mut self, seq: u64, status: GuideStatus);

    /// Record how long a named tick stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);
}

/// Silent logger that discards all events.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn tick(&mut self, _seq: u64, _status: GuideStatus) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// log-crate-backed logger. Status is logged on transitions only; per-tick
/// timings go to debug level to keep the 10 Hz loop quiet by default.
#[derive(Default)]
pub struct LogSessionLogger {
    last_status: Option<GuideStatus>,
}

impl LogSessionLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_status(&self) -> Option<GuideStatus> {
        self.last_status
    }
}

impl SessionLogger for LogSessionLogger {
    fn tick(&mut self, seq: u64, status: GuideStatus) {
        if self.last_status != Some(status) {
            log::info!("tick {seq}: status changed to {status:?}");
            self.last_status = Some(status);
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        log::debug!("{stage}: {duration_ms:.1}ms");
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullSessionLogger;
        logger.tick(1, GuideStatus::NoFace);
        logger.timing("detect", 12.0);
        logger.info("hello");
        // No panics = success
    }

    #[test]
    fn test_log_logger_tracks_last_status() {
        let mut logger = LogSessionLogger::new();
        assert!(logger.last_status().is_none());
        logger.tick(0, GuideStatus::NoFace);
        assert_eq!(logger.last_status(), Some(GuideStatus::NoFace));
        logger.tick(1, GuideStatus::Verified);
        assert_eq!(logger.last_status(), Some(GuideStatus::Verified));
    }

    #[test]
    fn test_log_logger_keeps_status_across_repeats() {
        let mut logger = LogSessionLogger::new();
        logger.tick(0, GuideStatus::Outside);
        logger.tick(1, GuideStatus::Outside);
        assert_eq!(logger.last_status(), Some(GuideStatus::Outside));
    }
}
