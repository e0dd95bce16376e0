pub mod threaded_sampler;
