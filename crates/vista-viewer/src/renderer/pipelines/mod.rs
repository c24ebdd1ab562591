pub mod markers;
pub mod mesh;

pub use markers::{MarkerInstance, MarkerPipeline, MarkerUniforms};
pub use mesh::{MeshPipeline, MeshUniforms};
