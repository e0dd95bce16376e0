use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for face detection over a single frame.
///
/// Output contract: detection boxes (and landmarks) are expressed in the
/// frame's NativeVideo pixel space. Locators that work at a fixed internal
/// resolution must be wrapped in `ResizedDetector` to satisfy this.
/// Implementations may hold ONNX sessions or other state, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect_all(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}
