use ort::execution_providers::ExecutionProviderDispatch;

/// Preferred ONNX execution providers for the current platform.
///
/// An empty list means plain CPU; ort also falls back to CPU when a listed
/// provider cannot be registered at session build time.
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    #[allow(unused_mut)]
    let mut providers = Vec::new();

    #[cfg(target_os = "macos")]
    providers.push(ort::execution_providers::CoreMLExecutionProvider::default().build());

    #[cfg(target_os = "windows")]
    providers.push(ort::execution_providers::DirectMLExecutionProvider::default().build());

    providers
}
