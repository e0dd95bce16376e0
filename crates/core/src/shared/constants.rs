use std::time::Duration;

pub const BLAZEFACE_MODEL_NAME: &str = "blazeface_short_range.onnx";
pub const BLAZEFACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/facealign/releases/download/v0.1.0/blazeface_short_range.onnx";

pub const LANDMARK_MODEL_NAME: &str = "face_landmark_5pt.onnx";
pub const LANDMARK_MODEL_URL: &str =
    "https://github.com/neutrinographics/facealign/releases/download/v0.1.0/face_landmark_5pt.onnx";

/// Environment variable naming a directory searched for bundled models
/// before any download is attempted.
pub const MODEL_DIR_ENV: &str = "FACEALIGN_MODEL_DIR";

/// Interval between sampling ticks.
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(100);

/// Default on-screen size of the guide region, in viewport pixels.
pub const GUIDE_WIDTH: f64 = 260.0;
pub const GUIDE_HEIGHT: f64 = 340.0;
