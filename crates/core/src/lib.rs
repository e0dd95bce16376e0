pub mod alignment;
pub mod camera;
pub mod detection;
pub mod sampling;
pub mod shared;
