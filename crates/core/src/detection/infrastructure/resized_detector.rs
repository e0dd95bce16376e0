use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::geometry::{NativeRect, NativeSize};

/// Decorator that rescales a working-resolution detector's output into the
/// frame's NativeVideo space.
///
/// Locators that run on a downscaled copy (e.g. BlazeFace's 128×128 input)
/// report boxes in that working resolution; this adapter owns the single
/// correction step. When the working resolution already equals the frame's
/// native resolution it is a pass-through.
pub struct ResizedDetector {
    inner: Box<dyn FaceDetector>,
    working: NativeSize,
}

impl ResizedDetector {
    pub fn new(inner: Box<dyn FaceDetector>, working: NativeSize) -> Result<Self, &'static str> {
        if !working.is_ready() {
            return Err("working resolution must be nonzero");
        }
        Ok(Self { inner, working })
    }
}

impl FaceDetector for ResizedDetector {
    fn detect_all(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let detections = self.inner.detect_all(frame)?;
        let native = frame.size();
        if native == self.working {
            return Ok(detections);
        }

        let sx = native.width as f64 / self.working.width as f64;
        let sy = native.height as f64 / self.working.height as f64;

        Ok(detections
            .into_iter()
            .map(|d| {
                let bounds = NativeRect::new(
                    d.bounds.x * sx,
                    d.bounds.y * sy,
                    d.bounds.width * sx,
                    d.bounds.height * sy,
                );
                Detection {
                    bounds,
                    score: d.score,
                    landmarks: d.landmarks.map(|lm| lm.scaled(sx, sy)),
                }
            })
            .collect())
    }
}
