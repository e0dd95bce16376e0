//! BlazeFace face locator using ONNX Runtime via `ort`.
//!
//! Emits boxes in the model's own 128×128 input square, NOT in frame
//! coordinates: wrap in `ResizedDetector` to satisfy the `FaceDetector`
//! output contract. Produces no landmarks; stack `LandmarkRefinedDetector`
//! on top when landmarks are wanted.

use std::path::Path;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::execution_provider::preferred_execution_providers;
use crate::shared::frame::Frame;
use crate::shared::geometry::{NativeRect, NativeSize};

/// BlazeFace model input resolution; also the space its boxes come out in.
const INPUT_SIZE: u32 = 128;

/// Default confidence threshold.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

pub struct OnnxBlazefaceLocator {
    session: ort::session::Session,
    confidence: f64,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceLocator {
    /// The fixed working resolution of this locator's output boxes.
    pub const WORKING_RESOLUTION: NativeSize = NativeSize {
        width: INPUT_SIZE,
        height: INPUT_SIZE,
    };

    /// Load a BlazeFace short-range ONNX model.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;
        Ok(Self {
            session,
            confidence,
            anchors: generate_anchors(),
        })
    }
}

impl FaceDetector for OnnxBlazefaceLocator {
    fn detect_all(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        // 1. Preprocess: resize to 128x128, normalize to [0,1], NCHW
        let input_tensor = preprocess(frame, INPUT_SIZE);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // BlazeFace outputs two tensors:
        // - regressors: [1, 896, 16] (box deltas + keypoints)
        // - classificators: [1, 896, 1] (confidence scores)
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }

        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        // 3. Decode anchor boxes + filter by confidence
        let mut raw_dets = Vec::new();
        let num_anchors = self.anchors.len().min(NUM_ANCHORS);

        for (i, &raw_score) in score_data.iter().enumerate().take(num_anchors) {
            let score = sigmoid(raw_score);
            if score < self.confidence as f32 {
                continue;
            }

            let anchor = &self.anchors[i];
            let reg_offset = i * 16;
            if reg_offset + 4 > reg_data.len() {
                break;
            }

            // Decode box center + size relative to anchor, in unit space
            let cx = anchor[0] + reg_data[reg_offset] / INPUT_SIZE as f32;
            let cy = anchor[1] + reg_data[reg_offset + 1] / INPUT_SIZE as f32;
            let w = reg_data[reg_offset + 2] / INPUT_SIZE as f32;
            let h = reg_data[reg_offset + 3] / INPUT_SIZE as f32;

            // Map to the model input square, clamped to its bounds
            let x1 = ((cx - w / 2.0) * INPUT_SIZE as f32).max(0.0);
            let y1 = ((cy - h / 2.0) * INPUT_SIZE as f32).max(0.0);
            let x2 = ((cx + w / 2.0) * INPUT_SIZE as f32).min(INPUT_SIZE as f32);
            let y2 = ((cy + h / 2.0) * INPUT_SIZE as f32).min(INPUT_SIZE as f32);

            raw_dets.push(RawDet {
                x1: x1 as f64,
                y1: y1 as f64,
                x2: x2 as f64,
                y2: y2 as f64,
                score: score as f64,
            });
        }

        // 4. NMS (leaves survivors ordered by descending score)
        let kept = nms(raw_dets, NMS_IOU_THRESH);

        // 5. Build detections in working-resolution space
        let detections = kept
            .iter()
            .map(|d| {
                Detection::new(
                    NativeRect::new(d.x1, d.y1, d.x2 - d.x1, d.y2 - d.y1),
                    d.score,
                )
            })
            .collect();

        Ok(detections)
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize frame to `size × size` and normalize to [0,1] NCHW float32.
/// Nearest-neighbor through precomputed per-axis index maps.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let s = size as usize;

    let index_map = |src_len: usize| -> Vec<usize> {
        (0..s)
            .map(|dst| (((dst as f64 + 0.5) * src_len as f64 / s as f64) as usize).min(src_len - 1))
            .collect()
    };
    let xs = index_map(frame.width() as usize);
    let ys = index_map(frame.height() as usize);

    ndarray::Array4::from_shape_fn((1, 3, s, s), |(_, c, y, x)| {
        src[[ys[y], xs[x], c]] as f32 / 255.0
    })
}

// ---------------------------------------------------------------------------
// Anchor generation (BlazeFace short-range)
// ---------------------------------------------------------------------------

/// Generate BlazeFace anchors for the short-range model.
///
/// Two feature maps: a 16×16 grid carrying 2 anchors per cell and an 8×8
/// grid carrying 6, all centered on their cells in unit coordinates.
fn generate_anchors() -> Vec<[f32; 2]> {
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(grid, per_cell) in &[(16usize, 2usize), (8, 6)] {
        for cell in 0..grid * grid {
            let cx = ((cell % grid) as f32 + 0.5) / grid as f32;
            let cy = ((cell / grid) as f32 + 0.5) / grid as f32;
            anchors.extend(std::iter::repeat([cx, cy]).take(per_cell));
        }
    }

    anchors
}

// ---------------------------------------------------------------------------
// NMS
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct RawDet {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    score: f64,
}

/// Greedy NMS: walk candidates best-first, keeping each one whose IoU with
/// every already-kept box stays at or below the threshold.
fn nms(mut dets: Vec<RawDet>, iou_thresh: f64) -> Vec<RawDet> {
    dets.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut keep: Vec<RawDet> = Vec::new();
    for det in dets {
        if keep.iter().all(|k| bbox_iou(k, &det) <= iou_thresh) {
            keep.push(det);
        }
    }
    keep
}

fn bbox_iou(a: &RawDet, b: &RawDet) -> f64 {
    let overlap_w = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let overlap_h = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let inter = overlap_w * overlap_h;
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
