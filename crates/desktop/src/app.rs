use std::time::Duration;

use iced::widget::image::Handle as VideoHandle;
use iced::widget::{canvas, checkbox, column, container, stack, text};
use iced::{ContentFit, Element, Length, Subscription, Task, Theme};

use facealign_core::alignment::domain::guide_layout::GuideLayout;
use facealign_core::alignment::domain::prompt::GuideStatus;
use facealign_core::detection::domain::detection::Detection;
use facealign_core::sampling::infrastructure::threaded_sampler::SamplerEvent;
use facealign_core::shared::constants::{GUIDE_HEIGHT, GUIDE_WIDTH};
use facealign_core::shared::frame::Frame;
use facealign_core::shared::geometry::{NativeSize, ViewportRect};

use crate::theme;
use crate::widgets::guide_overlay::GuideOverlay;
use crate::workers::model_cache::ModelCache;
use crate::workers::sampler_worker::{self, WorkerHandle, WorkerMessage, WorkerParams};

/// Rendered size of the video view. The stream is stretched to fill it
/// (`ContentFit::Fill`), so this is also the viewport rectangle the
/// reconciler scales against.
const VIDEO_VIEW_WIDTH: f64 = 640.0;
const VIDEO_VIEW_HEIGHT: f64 = 480.0;

/// How often the UI drains worker events.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    Poll,
    DebugOverlayToggled(bool),
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

enum Phase {
    /// Models resolving / camera opening.
    Starting,
    Running,
    CameraFailed(String),
    DetectorFailed(String),
}

pub struct App {
    worker: WorkerHandle,
    phase: Phase,
    status: GuideStatus,
    video_frame: Option<VideoHandle>,
    native_size: Option<NativeSize>,
    detection: Option<Detection>,
    show_debug_overlay: bool,
    download: Option<(u64, u64)>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let worker = sampler_worker::spawn(WorkerParams {
            camera_index: 0,
            model_cache: ModelCache::new(),
        });
        (
            Self {
                worker,
                phase: Phase::Starting,
                status: GuideStatus::NoFace,
                video_frame: None,
                native_size: None,
                detection: None,
                show_debug_overlay: false,
                download: None,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Poll => {
                let pending: Vec<WorkerMessage> = self.worker.events().try_iter().collect();
                for event in pending {
                    self.apply(event);
                }
            }
            Message::DebugOverlayToggled(enabled) => {
                self.show_debug_overlay = enabled;
            }
        }
        Task::none()
    }

    fn apply(&mut self, event: WorkerMessage) {
        match event {
            WorkerMessage::DownloadProgress(downloaded, total) => {
                self.download = Some((downloaded, total));
            }
            WorkerMessage::DetectorFailed(error) => {
                log::error!("detector unavailable: {error}");
                self.status = GuideStatus::DetectorUnavailable;
                self.phase = Phase::DetectorFailed(error);
            }
            WorkerMessage::CameraFailed(error) => {
                log::error!("camera unavailable: {error}");
                self.status = GuideStatus::CameraUnavailable;
                self.phase = Phase::CameraFailed(error);
            }
            WorkerMessage::Sampler(event) => self.apply_sampler(event),
        }
    }

    fn apply_sampler(&mut self, event: SamplerEvent) {
        match event {
            SamplerEvent::CameraReady(size) => {
                self.native_size = Some(size);
                self.download = None;
                self.phase = Phase::Running;
                // Publish the geometry the sampler should reconcile against.
                self.worker.set_layout(self.guide_layout());
            }
            SamplerEvent::Frame(frame) => {
                self.video_frame = Some(to_video_handle(&frame));
            }
            SamplerEvent::Tick { report, .. } => {
                self.status = report.status;
                self.detection = report.detection;
            }
            SamplerEvent::CameraFailed(error) => {
                log::error!("camera unavailable: {error}");
                self.status = GuideStatus::CameraUnavailable;
                self.phase = Phase::CameraFailed(error);
            }
            SamplerEvent::Stopped => {}
        }
    }

    /// Current viewport geometry: the video view with the guide centered in
    /// it. Overlay drawing and containment both use this one value.
    fn guide_layout(&self) -> GuideLayout {
        let video = ViewportRect::new(0.0, 0.0, VIDEO_VIEW_WIDTH, VIDEO_VIEW_HEIGHT);
        GuideLayout::centered(video, GUIDE_WIDTH, GUIDE_HEIGHT)
    }

    pub fn view(&self) -> Element<'_, Message> {
        let video: Element<'_, Message> = match &self.video_frame {
            Some(handle) => iced::widget::image(handle.clone())
                .width(Length::Fixed(VIDEO_VIEW_WIDTH as f32))
                .height(Length::Fixed(VIDEO_VIEW_HEIGHT as f32))
                .content_fit(ContentFit::Fill)
                .into(),
            None => container(text(self.starting_label()).size(14))
                .center_x(Length::Fixed(VIDEO_VIEW_WIDTH as f32))
                .center_y(Length::Fixed(VIDEO_VIEW_HEIGHT as f32))
                .into(),
        };

        let overlay = canvas(GuideOverlay {
            layout: self.guide_layout(),
            native: self.native_size,
            detection: self.detection.clone(),
            verified: self.status == GuideStatus::Verified,
            show_detection: self.show_debug_overlay,
        })
        .width(Length::Fixed(VIDEO_VIEW_WIDTH as f32))
        .height(Length::Fixed(VIDEO_VIEW_HEIGHT as f32));

        let surface = stack![video, overlay];

        let prompt = text(self.status.prompt()).size(18);

        let debug_toggle = checkbox("show detection box", self.show_debug_overlay)
            .on_toggle(Message::DebugOverlayToggled)
            .size(14);

        let mut content = column![surface, prompt].spacing(12);
        if let Some(detail) = self.failure_detail() {
            content = content.push(text(detail).size(12));
        }
        content = content.push(debug_toggle);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .padding(16)
            .into()
    }

    fn starting_label(&self) -> String {
        match (&self.phase, self.download) {
            (Phase::Starting, Some((downloaded, total))) if total > 0 => {
                let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
                format!("downloading face models... {pct}%")
            }
            (Phase::Starting, _) => "starting camera...".to_string(),
            (Phase::CameraFailed(_), _) => "no camera".to_string(),
            (Phase::DetectorFailed(_), _) => "no detector".to_string(),
            (Phase::Running, _) => "waiting for frames...".to_string(),
        }
    }

    fn failure_detail(&self) -> Option<&str> {
        match &self.phase {
            Phase::CameraFailed(error) | Phase::DetectorFailed(error) => Some(error),
            _ => None,
        }
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        iced::time::every(POLL_INTERVAL).map(|_| Message::Poll)
    }
}

/// RGB frame to an RGBA image handle for the video widget.
fn to_video_handle(frame: &Frame) -> VideoHandle {
    let rgb = frame.data();
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for px in rgb.chunks_exact(3) {
        rgba.extend_from_slice(px);
        rgba.push(0xff);
    }
    VideoHandle::from_rgba(frame.width(), frame.height(), rgba)
}
