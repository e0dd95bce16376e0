use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::geometry::NativeSize;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("failed to open camera: {0}")]
    Open(String),
    #[error("camera stream error: {0}")]
    Stream(String),
    #[error("failed to decode camera frame: {0}")]
    Decode(String),
}

/// Domain interface for a live frame producer.
///
/// `native_size` reports the decoded resolution and stays zero-sized until
/// the stream has produced its first decodable frame; callers must treat a
/// not-ready size as "skip this tick", never as an error.
pub trait FrameSource: Send {
    fn native_size(&self) -> NativeSize;

    fn grab(&mut self) -> Result<Frame, CameraError>;
}
