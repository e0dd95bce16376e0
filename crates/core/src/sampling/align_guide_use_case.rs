use std::time::Instant;

use crate::alignment::domain::evaluator::{evaluate, Alignment};
use crate::alignment::domain::guide_layout::GuideLayout;
use crate::alignment::domain::prompt::GuideStatus;
use crate::alignment::domain::reconciler::reconcile;
use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::sampling::session_logger::SessionLogger;
use crate::shared::frame::Frame;

/// What one applied tick produced.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub alignment: Alignment,
    pub status: GuideStatus,
    /// The detection the decision was based on, for the debug overlay.
    pub detection: Option<Detection>,
}

/// One sampling tick: detect, reconcile, evaluate.
///
/// Owns the detector and the session logger; holds no decision state of its
/// own, so each execution depends only on the frame and layout it is handed.
pub struct AlignGuideUseCase {
    detector: Box<dyn FaceDetector>,
    logger: Box<dyn SessionLogger>,
}

impl AlignGuideUseCase {
    pub fn new(detector: Box<dyn FaceDetector>, logger: Box<dyn SessionLogger>) -> Self {
        Self { detector, logger }
    }

    /// Run one tick. `None` means the tick was skipped (no usable
    /// geometry) and must leave all UI state untouched.
    ///
    /// A detector failure is not a skip: it degrades the tick to
    /// "no face" so stale positives cannot linger on screen.
    pub fn execute(&mut self, frame: &Frame, layout: &GuideLayout) -> Option<TickReport> {
        let guide_native = reconcile(layout, frame.size())?;

        let started = Instant::now();
        let detections = match self.detector.detect_all(frame) {
            Ok(detections) => detections,
            Err(e) => {
                log::warn!("detection failed for frame {}: {e}", frame.seq());
                Vec::new()
            }
        };
        self.logger
            .timing("detect", started.elapsed().as_secs_f64() * 1000.0);

        let alignment = evaluate(&detections, &guide_native);
        let status = GuideStatus::from_alignment(alignment);
        self.logger.tick(frame.seq(), status);

        Some(TickReport {
            alignment,
            status,
            detection: detections.into_iter().next(),
        })
    }
}
