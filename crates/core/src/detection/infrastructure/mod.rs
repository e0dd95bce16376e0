pub mod execution_provider;
pub mod model_resolver;
pub mod onnx_blazeface_locator;
pub mod onnx_landmark_refiner;
pub mod resized_detector;
