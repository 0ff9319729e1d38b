pub mod loader;
pub mod normalize;
pub mod parser;
pub mod types;

pub use loader::{LoadResult, LoadTicket, LoadedMesh, MeshLoader};
pub use normalize::normalize;
pub use parser::parse_obj;
pub use types::{Bounds, MeshTransform, TriangleMesh};
