use ndarray::ArrayView3;

use crate::shared::geometry::NativeSize;

/// A single captured camera frame: contiguous RGB bytes in row-major order.
///
/// Camera adapters decode to RGB at the capture boundary; everything
/// downstream treats pixel data as opaque. `seq` is the capture sequence
/// number assigned by the frame source.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    seq: u64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, seq: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * 3,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            seq,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn size(&self) -> NativeSize {
        NativeSize::new(self.width, self.height)
    }

    /// View as `(height, width, 3)` for tensor preprocessing.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape((self.height as usize, self.width as usize, 3), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Consume the frame, returning the raw RGB bytes.
    pub fn into_rgb(self) -> Vec<u8> {
        self.data
    }
}
