//! Landmark refinement decorator.
//!
//! Runs a second, small ONNX model over each detected face crop and attaches
//! 5-point landmarks to the detection. Must sit above `ResizedDetector` in
//! the stack so crops are taken from NativeVideo-space boxes.

use std::path::Path;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::infrastructure::execution_provider::preferred_execution_providers;
use crate::shared::frame::Frame;
use crate::shared::geometry::{NativeRect, NativeSize};

/// Landmark model input resolution (square crops).
const INPUT_SIZE: u32 = 112;

/// Number of output coordinates: 5 points × (x, y), normalized to the crop.
const NUM_COORDS: usize = 10;

pub struct LandmarkRefinedDetector {
    inner: Box<dyn FaceDetector>,
    session: ort::session::Session,
}

impl LandmarkRefinedDetector {
    pub fn new(
        inner: Box<dyn FaceDetector>,
        model_path: &Path,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;
        Ok(Self { inner, session })
    }

    fn refine(
        &mut self,
        frame: &Frame,
        detection: Detection,
    ) -> Result<Detection, Box<dyn std::error::Error>> {
        let crop = clamp_to_frame(&detection.bounds, frame.size());
        if crop.width < 1.0 || crop.height < 1.0 {
            // Nothing usable to crop; leave the detection unrefined.
            return Ok(detection);
        }

        let input_tensor = crop_to_tensor(frame, &crop, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        let coords = outputs[0].try_extract_array::<f32>()?;
        let data = coords.as_slice().ok_or("Cannot get landmark slice")?;
        if data.len() < NUM_COORDS {
            return Err(format!(
                "landmark model expected {NUM_COORDS} coordinates, got {}",
                data.len()
            )
            .into());
        }

        Ok(detection.with_landmarks(to_native_landmarks(&data[..NUM_COORDS], &crop)))
    }
}

impl FaceDetector for LandmarkRefinedDetector {
    fn detect_all(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let detections = self.inner.detect_all(frame)?;
        detections
            .into_iter()
            .map(|d| self.refine(frame, d))
            .collect()
    }
}

/// Intersect `bounds` with the frame rectangle.
fn clamp_to_frame(bounds: &NativeRect, size: NativeSize) -> NativeRect {
    let x1 = bounds.x.max(0.0);
    let y1 = bounds.y.max(0.0);
    let x2 = bounds.right().min(size.width as f64);
    let y2 = bounds.bottom().min(size.height as f64);
    NativeRect::new(x1, y1, (x2 - x1).max(0.0), (y2 - y1).max(0.0))
}

/// Crop `bounds` out of the frame, resize to `size × size`, normalize to
/// [0,1] NCHW float32.
fn crop_to_tensor(frame: &Frame, bounds: &NativeRect, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let fy = bounds.y + (y as f64 + 0.5) * bounds.height / s as f64;
        let src_y = (fy as usize).min(src_h - 1);
        for x in 0..s {
            let fx = bounds.x + (x as f64 + 0.5) * bounds.width / s as f64;
            let src_x = (fx as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    tensor
}

/// Map crop-normalized `(x, y)` pairs back into NativeVideo space.
fn to_native_landmarks(normalized: &[f32], crop: &NativeRect) -> FaceLandmarks {
    let mut points = [(0.0, 0.0); 5];
    for (i, p) in points.iter_mut().enumerate() {
        p.0 = crop.x + normalized[i * 2] as f64 * crop.width;
        p.1 = crop.y + normalized[i * 2 + 1] as f64 * crop.height;
    }
    FaceLandmarks::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![0u8; (width * height * 3) as usize], width, height, 0)
    }

    // ── clamp_to_frame ───────────────────────────────────────────────

    #[test]
    fn test_clamp_inside_is_noop() {
        let b = NativeRect::new(10.0, 10.0, 50.0, 50.0);
        assert_eq!(clamp_to_frame(&b, NativeSize::new(100, 100)), b);
    }

    #[test]
    fn test_clamp_trims_overhang() {
        let b = NativeRect::new(-10.0, 80.0, 50.0, 50.0);
        let clamped = clamp_to_frame(&b, NativeSize::new(100, 100));
        assert_relative_eq!(clamped.x, 0.0);
        assert_relative_eq!(clamped.width, 40.0);
        assert_relative_eq!(clamped.y, 80.0);
        assert_relative_eq!(clamped.height, 20.0);
    }

    #[test]
    fn test_clamp_fully_outside_collapses() {
        let b = NativeRect::new(200.0, 200.0, 50.0, 50.0);
        let clamped = clamp_to_frame(&b, NativeSize::new(100, 100));
        assert_relative_eq!(clamped.width, 0.0);
        assert_relative_eq!(clamped.height, 0.0);
    }

    // ── crop_to_tensor ───────────────────────────────────────────────

    #[test]
    fn test_crop_tensor_shape() {
        let f = frame(200, 100);
        let crop = NativeRect::new(20.0, 20.0, 60.0, 60.0);
        let tensor = crop_to_tensor(&f, &crop, INPUT_SIZE);
        assert_eq!(tensor.shape(), &[1, 3, 112, 112]);
    }

    #[test]
    fn test_crop_tensor_samples_crop_region() {
        // Left half of the frame is white, right half black; crop the left
        // half and every sampled pixel should be ~1.0.
        let mut data = vec![0u8; 100 * 100 * 3];
        for y in 0..100 {
            for x in 0..50 {
                let base = (y * 100 + x) * 3;
                data[base] = 255;
                data[base + 1] = 255;
                data[base + 2] = 255;
            }
        }
        let f = Frame::new(data, 100, 100, 0);
        let crop = NativeRect::new(0.0, 0.0, 50.0, 100.0);
        let tensor = crop_to_tensor(&f, &crop, 8);
        for y in 0..8 {
            for x in 0..8 {
                assert!((tensor[[0, 0, y, x]] - 1.0).abs() < 0.01);
            }
        }
    }

    // ── to_native_landmarks ──────────────────────────────────────────

    #[test]
    fn test_landmarks_map_into_crop_space() {
        let crop = NativeRect::new(100.0, 200.0, 50.0, 80.0);
        let normalized = [0.0f32, 0.0, 1.0, 1.0, 0.5, 0.5, 0.25, 0.75, 0.75, 0.25];
        let lm = to_native_landmarks(&normalized, &crop);
        let pts = lm.points();
        assert_relative_eq!(pts[0].0, 100.0);
        assert_relative_eq!(pts[0].1, 200.0);
        assert_relative_eq!(pts[1].0, 150.0);
        assert_relative_eq!(pts[1].1, 280.0);
        assert_relative_eq!(pts[2].0, 125.0);
        assert_relative_eq!(pts[2].1, 240.0);
    }
}
