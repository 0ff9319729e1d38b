//! Interactive viewer for OBJ meshes.
//!
//! Files are parsed and normalized on a background thread, swapped into a
//! single-mesh scene, framed by an orbit camera and drawn with wgpu every
//! frame until the viewer is torn down.

pub mod config;
pub mod error;
pub mod mesh;
pub mod renderer;
pub mod ui;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::{ViewerError, ViewerResult};
pub use viewer::{FrameStatus, Viewer, ViewerCore, ViewerNotice, ViewerStatus};
