//! Fixed-period sampling loop on a dedicated thread.
//!
//! The thread owns the frame source and the use case, reads the current
//! layout from a shared slot every tick, and publishes events over an
//! unbounded crossbeam channel. Detection runs inline, so ticks are serial
//! by construction; the `TickScheduler` stamps enforce the same discipline
//! against duplicates and post-cancellation completions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::alignment::domain::guide_layout::GuideLayout;
use crate::camera::domain::frame_source::FrameSource;
use crate::sampling::align_guide_use_case::{AlignGuideUseCase, TickReport};
use crate::sampling::tick_scheduler::TickScheduler;
use crate::shared::frame::Frame;
use crate::shared::geometry::NativeSize;

/// How long the source may stay not-ready before that is reported as a
/// camera failure rather than a warm-up.
const READY_TIMEOUT: Duration = Duration::from_secs(5);

pub enum SamplerEvent {
    /// First decodable dimensions observed.
    CameraReady(NativeSize),
    /// A freshly grabbed frame, for rendering. Sent even when the tick
    /// itself is skipped for missing layout.
    Frame(Frame),
    /// An applied tick's result.
    Tick { seq: u64, report: TickReport },
    /// The stream never became ready, or died.
    CameraFailed(String),
    /// The loop exited; nothing follows this event.
    Stopped,
}

/// Handle to a running sampler thread.
///
/// Dropping the handle stops the loop and joins the thread, so no detached
/// tick can outlive the owner.
pub struct SamplerHandle {
    events: Receiver<SamplerEvent>,
    cancelled: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SamplerHandle {
    pub fn events(&self) -> &Receiver<SamplerEvent> {
        &self.events
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawn the sampling loop on its own thread.
pub fn spawn(
    mut source: Box<dyn FrameSource>,
    mut use_case: AlignGuideUseCase,
    layout: Arc<Mutex<Option<GuideLayout>>>,
    period: Duration,
) -> SamplerHandle {
    let (tx, rx) = crossbeam_channel::unbounded::<SamplerEvent>();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = cancelled.clone();

    let thread = thread::spawn(move || {
        run(
            source.as_mut(),
            &mut use_case,
            &layout,
            period,
            &cancelled_clone,
            &tx,
        );
    });

    SamplerHandle {
        events: rx,
        cancelled,
        thread: Some(thread),
    }
}

/// The loop body. Runs until `cancelled` is set; sends `Stopped` last.
pub fn run(
    source: &mut dyn FrameSource,
    use_case: &mut AlignGuideUseCase,
    layout: &Mutex<Option<GuideLayout>>,
    period: Duration,
    cancelled: &AtomicBool,
    events: &Sender<SamplerEvent>,
) {
    let mut scheduler = TickScheduler::new();
    let loop_started = Instant::now();
    let mut announced_ready = false;
    let mut reported_stall = false;

    while !cancelled.load(Ordering::Relaxed) {
        let tick_started = Instant::now();

        let native = source.native_size();
        if !native.is_ready() {
            // Precondition branch: no decoded dimensions yet. No detector
            // call, no state change; surface a stall once it stops looking
            // like warm-up.
            if !reported_stall && loop_started.elapsed() > READY_TIMEOUT {
                reported_stall = true;
                let _ = events.send(SamplerEvent::CameraFailed(
                    "camera stream produced no frames".to_string(),
                ));
            }
            sleep_remainder(period, tick_started);
            continue;
        }

        if !announced_ready {
            announced_ready = true;
            let _ = events.send(SamplerEvent::CameraReady(native));
        }

        match source.grab() {
            Ok(frame) => {
                let _ = events.send(SamplerEvent::Frame(frame.clone()));
                let current_layout = *layout.lock().unwrap();
                if let Some(current_layout) = current_layout {
                    if let Some(seq) = scheduler.begin() {
                        let report = use_case.execute(&frame, &current_layout);
                        if scheduler.complete(seq) {
                            if let Some(report) = report {
                                let _ = events.send(SamplerEvent::Tick { seq, report });
                            }
                        }
                    }
                }
            }
            Err(e) => {
                log::warn!("frame grab failed: {e}");
            }
        }

        sleep_remainder(period, tick_started);
    }

    scheduler.cancel();
    let _ = events.send(SamplerEvent::Stopped);
}

/// Sleep out whatever is left of the period. A tick that overran its period
/// starts the next one immediately; overlap is impossible either way.
fn sleep_remainder(period: Duration, started: Instant) {
    let elapsed = started.elapsed();
    if elapsed < period {
        thread::sleep(period - elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::domain::prompt::GuideStatus;
    use crate::camera::domain::frame_source::CameraError;
    use crate::detection::domain::detection::Detection;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::sampling::session_logger::NullSessionLogger;
    use crate::shared::geometry::{NativeRect, ViewportRect};

    struct FakeSource {
        size: NativeSize,
        grabbed: u64,
    }

    impl FakeSource {
        fn ready(width: u32, height: u32) -> Self {
            Self {
                size: NativeSize::new(width, height),
                grabbed: 0,
            }
        }

        fn not_ready() -> Self {
            Self {
                size: NativeSize::new(0, 0),
                grabbed: 0,
            }
        }
    }

    impl FrameSource for FakeSource {
        fn native_size(&self) -> NativeSize {
            self.size
        }

        fn grab(&mut self) -> Result<Frame, CameraError> {
            if !self.size.is_ready() {
                return Err(CameraError::Stream("not ready".into()));
            }
            let frame = Frame::new(
                vec![0u8; (self.size.width * self.size.height * 3) as usize],
                self.size.width,
                self.size.height,
                self.grabbed,
            );
            self.grabbed += 1;
            Ok(frame)
        }
    }

    struct FakeDetector {
        detections: Vec<Detection>,
    }

    impl FaceDetector for FakeDetector {
        fn detect_all(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            Ok(self.detections.clone())
        }
    }

    fn use_case_with(detections: Vec<Detection>) -> AlignGuideUseCase {
        AlignGuideUseCase::new(
            Box::new(FakeDetector { detections }),
            Box::new(NullSessionLogger),
        )
    }

    fn shared_layout() -> Arc<Mutex<Option<GuideLayout>>> {
        Arc::new(Mutex::new(Some(GuideLayout::new(
            ViewportRect::new(0.0, 0.0, 64.0, 48.0),
            ViewportRect::new(8.0, 8.0, 32.0, 32.0),
        ))))
    }

    #[test]
    fn test_emits_ready_then_frames_and_ticks() {
        let detection = Detection::new(NativeRect::new(10.0, 10.0, 20.0, 20.0), 0.9);
        let handle = spawn(
            Box::new(FakeSource::ready(64, 48)),
            use_case_with(vec![detection]),
            shared_layout(),
            Duration::ZERO,
        );

        let mut saw_ready = false;
        let mut saw_frame = false;
        let mut tick_seqs = Vec::new();
        for event in handle.events().iter() {
            match event {
                SamplerEvent::CameraReady(size) => {
                    assert_eq!(size, NativeSize::new(64, 48));
                    saw_ready = true;
                }
                SamplerEvent::Frame(_) => saw_frame = true,
                SamplerEvent::Tick { seq, report } => {
                    tick_seqs.push(seq);
                    assert_eq!(report.status, GuideStatus::Verified);
                }
                _ => {}
            }
            if tick_seqs.len() >= 3 {
                break;
            }
        }
        handle.stop();

        assert!(saw_ready);
        assert!(saw_frame);
        assert!(tick_seqs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_not_ready_source_never_ticks() {
        let handle = spawn(
            Box::new(FakeSource::not_ready()),
            use_case_with(vec![]),
            shared_layout(),
            Duration::from_millis(1),
        );
        thread::sleep(Duration::from_millis(30));
        let events = handle.events().clone();
        handle.stop();

        for event in events.iter() {
            assert!(
                !matches!(
                    event,
                    SamplerEvent::Frame(_) | SamplerEvent::Tick { .. }
                ),
                "no frame or tick may be emitted before dimensions exist"
            );
        }
    }

    #[test]
    fn test_missing_layout_sends_frames_but_no_ticks() {
        let layout = Arc::new(Mutex::new(None));
        let handle = spawn(
            Box::new(FakeSource::ready(64, 48)),
            use_case_with(vec![]),
            layout,
            Duration::ZERO,
        );

        let mut frames = 0;
        for event in handle.events().iter() {
            match event {
                SamplerEvent::Frame(_) => frames += 1,
                SamplerEvent::Tick { .. } => panic!("tick without layout"),
                _ => {}
            }
            if frames >= 5 {
                break;
            }
        }
        handle.stop();
    }

    #[test]
    fn test_stop_ends_with_stopped_and_closes_channel() {
        let handle = spawn(
            Box::new(FakeSource::ready(64, 48)),
            use_case_with(vec![]),
            shared_layout(),
            Duration::ZERO,
        );

        let events = handle.events().clone();
        handle.stop();

        // After join, whatever is buffered ends with Stopped, then the
        // channel disconnects: teardown leaves nothing pending.
        let mut last_was_stopped = false;
        for event in events.iter() {
            last_was_stopped = matches!(event, SamplerEvent::Stopped);
        }
        assert!(last_was_stopped);
        assert!(events.try_recv().is_err());
    }
}
