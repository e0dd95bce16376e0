use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use facealign_core::alignment::domain::guide_layout::GuideLayout;
use facealign_core::camera::infrastructure::nokhwa_camera::NokhwaCamera;
use facealign_core::detection::domain::face_detector::FaceDetector;
use facealign_core::detection::infrastructure::onnx_blazeface_locator::{
    OnnxBlazefaceLocator, DEFAULT_CONFIDENCE,
};
use facealign_core::detection::infrastructure::onnx_landmark_refiner::LandmarkRefinedDetector;
use facealign_core::detection::infrastructure::resized_detector::ResizedDetector;
use facealign_core::sampling::align_guide_use_case::AlignGuideUseCase;
use facealign_core::sampling::infrastructure::threaded_sampler::{self, SamplerEvent};
use facealign_core::sampling::session_logger::LogSessionLogger;
use facealign_core::shared::constants::SAMPLE_PERIOD;

use super::model_cache::ModelCache;

pub enum WorkerMessage {
    DownloadProgress(u64, u64),
    DetectorFailed(String),
    CameraFailed(String),
    Sampler(SamplerEvent),
}

pub struct WorkerParams {
    pub camera_index: u32,
    pub model_cache: Arc<ModelCache>,
}

/// Handle owned by the GUI. Dropping it cancels the worker and joins its
/// thread, which in turn tears down the sampler loop and the camera.
pub struct WorkerHandle {
    events: Receiver<WorkerMessage>,
    layout: Arc<Mutex<Option<GuideLayout>>>,
    cancelled: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn events(&self) -> &Receiver<WorkerMessage> {
        &self.events
    }

    /// Publish the current on-screen geometry; the sampler reads it live
    /// on every tick.
    pub fn set_layout(&self, layout: GuideLayout) {
        *self.layout.lock().unwrap() = Some(layout);
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

pub fn spawn(params: WorkerParams) -> WorkerHandle {
    let (tx, rx) = crossbeam_channel::unbounded::<WorkerMessage>();
    let layout: Arc<Mutex<Option<GuideLayout>>> = Arc::new(Mutex::new(None));
    let cancelled = Arc::new(AtomicBool::new(false));

    let layout_clone = layout.clone();
    let cancelled_clone = cancelled.clone();
    let thread = thread::spawn(move || {
        run_worker(&tx, &cancelled_clone, layout_clone, &params);
    });

    WorkerHandle {
        events: rx,
        layout,
        cancelled,
        thread: Some(thread),
    }
}

fn run_worker(
    tx: &Sender<WorkerMessage>,
    cancelled: &Arc<AtomicBool>,
    layout: Arc<Mutex<Option<GuideLayout>>>,
    params: &WorkerParams,
) {
    let detector = match build_detector(params, tx, cancelled) {
        Ok(detector) => detector,
        Err(e) => {
            let _ = tx.send(WorkerMessage::DetectorFailed(e));
            return;
        }
    };

    if cancelled.load(Ordering::Relaxed) {
        return;
    }

    let camera = match NokhwaCamera::open(params.camera_index) {
        Ok(camera) => camera,
        Err(e) => {
            let _ = tx.send(WorkerMessage::CameraFailed(e.to_string()));
            return;
        }
    };

    let use_case = AlignGuideUseCase::new(detector, Box::new(LogSessionLogger::new()));
    let sampler = threaded_sampler::spawn(Box::new(camera), use_case, layout, SAMPLE_PERIOD);

    // Forward sampler events until cancellation or the loop ends. Dropping
    // the sampler handle afterwards joins its thread, so no tick survives
    // this function.
    for event in sampler.events().iter() {
        if cancelled.load(Ordering::Relaxed) {
            break;
        }
        let stopped = matches!(event, SamplerEvent::Stopped);
        let _ = tx.send(WorkerMessage::Sampler(event));
        if stopped {
            break;
        }
    }
    sampler.stop();
}

fn build_detector(
    params: &WorkerParams,
    tx: &Sender<WorkerMessage>,
    cancelled: &Arc<AtomicBool>,
) -> Result<Box<dyn FaceDetector>, String> {
    let tx_box = tx.clone();
    let blazeface_path = params.model_cache.wait_for_blazeface(
        &|dl, total| {
            let _ = tx_box.send(WorkerMessage::DownloadProgress(dl, total));
        },
        cancelled,
    )?;

    let tx_lm = tx.clone();
    let landmark_path = params.model_cache.wait_for_landmark(
        &|dl, total| {
            let _ = tx_lm.send(WorkerMessage::DownloadProgress(dl, total));
        },
        cancelled,
    )?;

    if cancelled.load(Ordering::Relaxed) {
        return Err("Cancelled".into());
    }

    let locator = OnnxBlazefaceLocator::new(&blazeface_path, DEFAULT_CONFIDENCE)
        .map_err(|e| e.to_string())?;
    let resized = ResizedDetector::new(
        Box::new(locator),
        OnnxBlazefaceLocator::WORKING_RESOLUTION,
    )
    .map_err(|e| e.to_string())?;
    let refined = LandmarkRefinedDetector::new(Box::new(resized), &landmark_path)
        .map_err(|e| e.to_string())?;

    Ok(Box::new(refined))
}
