pub mod model_cache;
pub mod sampler_worker;
