pub mod camera;
pub mod gpu;
pub mod scene;

pub use camera::{Camera, fit_distance};
pub use gpu::{GpuState, MeshBuffers, generate_grid_vertices};
pub use scene::{ActiveMesh, MeshBackend, Scene, SwapOutcome};
