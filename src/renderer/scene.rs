use glam::Vec3;

use crate::config::{GridConfig, LightConfig, ViewerConfig};
use crate::error::ViewerResult;
use crate::mesh::{Bounds, LoadTicket, TriangleMesh};
use crate::renderer::camera::Camera;

/// Whatever turns a CPU mesh into something drawable, and can give those
/// resources back.
pub trait MeshBackend {
    type Handle;

    fn upload_mesh(&mut self, mesh: &TriangleMesh) -> ViewerResult<Self::Handle>;
    fn release_mesh(&mut self, handle: Self::Handle);
}

pub struct ActiveMesh<H> {
    pub handle: H,
    pub generation: u64,
    pub file_name: String,
    pub triangle_count: usize,
    pub bounds: Bounds,
    pub degenerate: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapOutcome {
    Swapped { triangles: usize, degenerate: bool },
    Stale,
}

pub struct Scene<H> {
    pub camera: Camera,
    lights: Vec<LightConfig>,
    grid: GridConfig,

    active: Option<ActiveMesh<H>>,

    reference_size: f32,
    fit_padding: f32,
    fit_count: u64,
    surface_size: (u32, u32),
}

impl<H> Scene<H> {
    pub fn new(config: &ViewerConfig, width: u32, height: u32) -> Self {
        let mut scene = Self {
            camera: Camera::from_config(config),
            lights: config.lights.clone(),
            grid: config.grid,
            active: None,
            reference_size: config.reference_size,
            fit_padding: config.fit_padding,
            fit_count: 0,
            surface_size: (1, 1),
        };
        scene.resize(width, height);
        scene
    }

    pub fn lights(&self) -> &[LightConfig] {
        &self.lights
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn active_mesh(&self) -> Option<&ActiveMesh<H>> {
        self.active.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn fit_count(&self) -> u64 {
        self.fit_count
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    /// The only way a mesh enters or leaves the scene while it is mounted.
    ///
    /// Buffers for the new mesh are created before the old ones are given
    /// back, so a failed upload leaves the previous mesh on screen. A ticket
    /// that has been superseded is ignored.
    pub fn replace_active_mesh<B>(
        &mut self,
        backend: &mut B,
        ticket: &LoadTicket,
        file_name: &str,
        mesh: TriangleMesh,
    ) -> ViewerResult<SwapOutcome>
    where
        B: MeshBackend<Handle = H>,
    {
        let newer_than_active = self
            .active
            .as_ref()
            .is_none_or(|active| ticket.generation() > active.generation);
        if !ticket.is_current() || !newer_than_active {
            log::debug!(
                "discarding stale mesh '{}' (generation {})",
                file_name,
                ticket.generation()
            );
            return Ok(SwapOutcome::Stale);
        }

        let handle = backend.upload_mesh(&mesh)?;

        let bounds = mesh.bounds().unwrap_or(Bounds {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        });
        let incoming = ActiveMesh {
            handle,
            generation: ticket.generation(),
            file_name: file_name.to_string(),
            triangle_count: mesh.triangle_count(),
            bounds,
            degenerate: mesh.degenerate,
        };
        drop(mesh);

        if let Some(previous) = self.active.replace(incoming) {
            log::debug!("releasing mesh '{}'", previous.file_name);
            backend.release_mesh(previous.handle);
        }

        self.fit_camera();

        let outcome = SwapOutcome::Swapped {
            triangles: self.active.as_ref().map_or(0, |a| a.triangle_count),
            degenerate: self.active.as_ref().is_some_and(|a| a.degenerate),
        };
        log::info!("active mesh is now '{}' ({:?})", file_name, outcome);
        Ok(outcome)
    }

    fn fit_camera(&mut self) {
        let Some(active) = &self.active else {
            return;
        };
        self.camera
            .fit_to_bounds(&active.bounds, self.fit_padding, self.reference_size);
        self.fit_count += 1;
        log::debug!(
            "fit #{}: distance {:.3}, near {:.4}, far {:.1}",
            self.fit_count,
            self.camera.distance(),
            self.camera.near,
            self.camera.far
        );
    }

    /// Applies a new surface size. Zero-sized surfaces (minimised windows)
    /// are ignored and reported as `false`.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.surface_size = (width, height);
        self.camera.set_aspect(width as f32, height as f32);
        true
    }

    /// Gives back the active mesh's resources. Used on teardown.
    pub fn clear<B>(&mut self, backend: &mut B)
    where
        B: MeshBackend<Handle = H>,
    {
        if let Some(previous) = self.active.take() {
            backend.release_mesh(previous.handle);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ViewerError;
    use crate::mesh::{MeshLoader, normalize, parse_obj};
    use approx::assert_relative_eq;

    /// Backend that hands out numbered handles and remembers what is live.
    #[derive(Default)]
    pub(crate) struct RecordingBackend {
        pub next: u32,
        pub live: Vec<u32>,
        pub released: Vec<u32>,
        pub fail_next_upload: bool,
    }

    impl MeshBackend for RecordingBackend {
        type Handle = u32;

        fn upload_mesh(&mut self, _mesh: &TriangleMesh) -> ViewerResult<u32> {
            if std::mem::take(&mut self.fail_next_upload) {
                return Err(ViewerError::Gpu("out of memory".into()));
            }
            self.next += 1;
            self.live.push(self.next);
            Ok(self.next)
        }

        fn release_mesh(&mut self, handle: u32) {
            self.live.retain(|h| *h != handle);
            self.released.push(handle);
        }
    }

    fn mesh(src: &str) -> TriangleMesh {
        let mut mesh = parse_obj(src).unwrap();
        normalize(&mut mesh, 4.0);
        mesh
    }

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
    const QUAD: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";

    #[test]
    fn swapping_releases_the_previous_mesh() {
        let config = ViewerConfig::default();
        let loader = MeshLoader::new(4.0);
        let mut scene = Scene::new(&config, 800, 600);
        let mut backend = RecordingBackend::default();

        let first = loader.supersede();
        let outcome = scene
            .replace_active_mesh(&mut backend, &first, "a.obj", mesh(TRIANGLE))
            .unwrap();
        assert_eq!(
            outcome,
            SwapOutcome::Swapped {
                triangles: 1,
                degenerate: false
            }
        );

        let second = loader.supersede();
        scene
            .replace_active_mesh(&mut backend, &second, "b.obj", mesh(QUAD))
            .unwrap();

        assert_eq!(backend.live, vec![2]);
        assert_eq!(backend.released, vec![1]);
        let active = scene.active_mesh().unwrap();
        assert_eq!(active.handle, 2);
        assert_eq!(active.file_name, "b.obj");
        assert_eq!(active.triangle_count, 2);
    }

    #[test]
    fn stale_tickets_are_a_no_op() {
        let config = ViewerConfig::default();
        let loader = MeshLoader::new(4.0);
        let mut scene = Scene::new(&config, 800, 600);
        let mut backend = RecordingBackend::default();

        let a = loader.supersede();
        let b = loader.supersede();

        scene
            .replace_active_mesh(&mut backend, &b, "b.obj", mesh(QUAD))
            .unwrap();
        let late = scene
            .replace_active_mesh(&mut backend, &a, "a.obj", mesh(TRIANGLE))
            .unwrap();

        assert_eq!(late, SwapOutcome::Stale);
        assert_eq!(scene.active_mesh().unwrap().file_name, "b.obj");
        assert_eq!(backend.next, 1);
        assert_eq!(scene.fit_count(), 1);
    }

    #[test]
    fn failed_upload_keeps_the_previous_mesh() {
        let config = ViewerConfig::default();
        let loader = MeshLoader::new(4.0);
        let mut scene = Scene::new(&config, 800, 600);
        let mut backend = RecordingBackend::default();

        let a = loader.supersede();
        scene
            .replace_active_mesh(&mut backend, &a, "a.obj", mesh(TRIANGLE))
            .unwrap();
        let camera_before = scene.camera.position;

        backend.fail_next_upload = true;
        let b = loader.supersede();
        let err = scene
            .replace_active_mesh(&mut backend, &b, "b.obj", mesh(QUAD))
            .unwrap_err();

        assert!(matches!(err, ViewerError::Gpu(_)));
        assert_eq!(scene.active_mesh().unwrap().file_name, "a.obj");
        assert_eq!(backend.live, vec![1]);
        assert!(backend.released.is_empty());
        assert_eq!(scene.camera.position, camera_before);
    }

    #[test]
    fn camera_is_fitted_once_per_swap() {
        let config = ViewerConfig::default();
        let loader = MeshLoader::new(4.0);
        let mut scene = Scene::new(&config, 800, 600);
        let mut backend = RecordingBackend::default();
        assert_eq!(scene.fit_count(), 0);

        for i in 0..3 {
            let ticket = loader.supersede();
            scene
                .replace_active_mesh(&mut backend, &ticket, "m.obj", mesh(TRIANGLE))
                .unwrap();
            assert_eq!(scene.fit_count(), i + 1);
        }

        scene.camera.update();
        assert_eq!(scene.fit_count(), 3);

        let expected = crate::renderer::camera::fit_distance(4.0, scene.camera.fov, 1.4);
        assert_relative_eq!(scene.camera.distance(), expected, epsilon = 1e-4);
        assert_relative_eq!(scene.camera.near, 0.04);
    }

    #[test]
    fn resize_tracks_every_new_size() {
        let config = ViewerConfig::default();
        let mut scene: Scene<u32> = Scene::new(&config, 800, 600);
        assert_relative_eq!(scene.camera.aspect, 800.0 / 600.0);

        assert!(scene.resize(1024, 256));
        assert_eq!(scene.surface_size(), (1024, 256));
        assert_relative_eq!(scene.camera.aspect, 4.0);

        assert!(!scene.resize(0, 256));
        assert_eq!(scene.surface_size(), (1024, 256));
        assert_relative_eq!(scene.camera.aspect, 4.0);
    }

    #[test]
    fn clear_releases_everything() {
        let config = ViewerConfig::default();
        let loader = MeshLoader::new(4.0);
        let mut scene = Scene::new(&config, 800, 600);
        let mut backend = RecordingBackend::default();

        let t = loader.supersede();
        scene
            .replace_active_mesh(&mut backend, &t, "a.obj", mesh(TRIANGLE))
            .unwrap();
        scene.clear(&mut backend);

        assert!(scene.active_mesh().is_none());
        assert!(backend.live.is_empty());
        scene.clear(&mut backend);
        assert_eq!(backend.released, vec![1]);
    }

    #[test]
    fn empty_and_degenerate_meshes_can_become_active() {
        let config = ViewerConfig::default();
        let loader = MeshLoader::new(4.0);
        let mut scene = Scene::new(&config, 800, 600);
        let mut backend = RecordingBackend::default();

        let t = loader.supersede();
        let outcome = scene
            .replace_active_mesh(&mut backend, &t, "point.obj", mesh("v 1 1 1\nv 1 1 1\nv 1 1 1\nf 1 2 3\n"))
            .unwrap();
        assert_eq!(
            outcome,
            SwapOutcome::Swapped {
                triangles: 1,
                degenerate: true
            }
        );
        assert!(scene.camera.near > 0.0);

        let t = loader.supersede();
        scene
            .replace_active_mesh(&mut backend, &t, "empty.obj", mesh("# empty\n"))
            .unwrap();
        assert_eq!(scene.active_mesh().unwrap().triangle_count, 0);
        assert!(scene.camera.position.is_finite());
    }
}
