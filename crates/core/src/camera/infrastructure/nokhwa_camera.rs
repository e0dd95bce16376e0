use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::camera::domain::frame_source::{CameraError, FrameSource};
use crate::shared::frame::Frame;
use crate::shared::geometry::NativeSize;

/// Webcam frame source backed by `nokhwa`.
///
/// Frames are decoded to RGB at the capture boundary. The reported native
/// size comes from the negotiated stream format and is only meaningful once
/// the stream is open, which `open` guarantees.
pub struct NokhwaCamera {
    camera: Camera,
    seq: u64,
}

impl NokhwaCamera {
    /// Open the camera at `index` and start its stream.
    pub fn open(index: u32) -> Result<Self, CameraError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| CameraError::Open(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CameraError::Open(e.to_string()))?;
        log::info!(
            "Opened camera {index}: {}x{}",
            camera.resolution().width(),
            camera.resolution().height()
        );
        Ok(Self { camera, seq: 0 })
    }
}

impl FrameSource for NokhwaCamera {
    fn native_size(&self) -> NativeSize {
        let res = self.camera.resolution();
        NativeSize::new(res.width(), res.height())
    }

    fn grab(&mut self) -> Result<Frame, CameraError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::Stream(e.to_string()))?;
        let decoded: image::RgbImage = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Decode(e.to_string()))?;
        let (width, height) = decoded.dimensions();
        let frame = Frame::new(decoded.into_raw(), width, height, self.seq);
        self.seq += 1;
        Ok(frame)
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        // Stream teardown releases the device for other applications.
        let _ = self.camera.stop_stream();
    }
}
