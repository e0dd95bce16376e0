use iced::mouse;
use iced::widget::canvas;
use iced::{Point, Rectangle, Renderer, Size, Theme};

use facealign_core::alignment::domain::guide_layout::GuideLayout;
use facealign_core::detection::domain::detection::Detection;
use facealign_core::shared::geometry::NativeSize;

use crate::theme;

/// Canvas layered over the video view.
///
/// Draws the guide frame from the same `GuideLayout` the sampler uses for
/// containment, so what the user sees is exactly what is tested. The debug
/// detection box arrives in NativeVideo coordinates and is scaled to the
/// canvas bounds here; drawing never feeds back into the decision logic.
pub struct GuideOverlay {
    pub layout: GuideLayout,
    pub native: Option<NativeSize>,
    pub detection: Option<Detection>,
    pub verified: bool,
    pub show_detection: bool,
}

impl<Message> canvas::Program<Message> for GuideOverlay {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        // The canvas normally matches the video view 1:1; scale anyway so a
        // resized canvas keeps the guide where the sampler thinks it is.
        let video = self.layout.video;
        if video.width > 0.0 && video.height > 0.0 {
            let sx = bounds.width as f64 / video.width;
            let sy = bounds.height as f64 / video.height;
            let guide = self.layout.guide;
            let top_left = Point::new(
                ((guide.x - video.x) * sx) as f32,
                ((guide.y - video.y) * sy) as f32,
            );
            let size = Size::new((guide.width * sx) as f32, (guide.height * sy) as f32);

            let color = if self.verified {
                theme::verified_color()
            } else {
                theme::guide_color()
            };
            frame.stroke(
                &canvas::Path::rectangle(top_left, size),
                canvas::Stroke::default().with_width(3.0).with_color(color),
            );
        }

        if self.show_detection {
            if let (Some(native), Some(detection)) = (self.native, &self.detection) {
                if native.is_ready() {
                    // Canvas size is unrelated to the native resolution, so
                    // drawn coordinates are rescaled per axis.
                    let sx = bounds.width as f64 / native.width as f64;
                    let sy = bounds.height as f64 / native.height as f64;
                    let b = detection.bounds;

                    frame.stroke(
                        &canvas::Path::rectangle(
                            Point::new((b.x * sx) as f32, (b.y * sy) as f32),
                            Size::new((b.width * sx) as f32, (b.height * sy) as f32),
                        ),
                        canvas::Stroke::default()
                            .with_width(2.0)
                            .with_color(theme::detection_color()),
                    );

                    if let Some(landmarks) = &detection.landmarks {
                        for &(x, y) in landmarks.points() {
                            let dot = canvas::Path::circle(
                                Point::new((x * sx) as f32, (y * sy) as f32),
                                2.5,
                            );
                            frame.fill(&dot, theme::detection_color());
                        }
                    }
                }
            }
        }

        vec![frame.into_geometry()]
    }
}
