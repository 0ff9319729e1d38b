use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};

use crate::config::ViewerConfig;
use crate::mesh::Bounds;

const MIN_POLAR: f32 = 1e-4;
const MIN_RADIUS: f32 = 1e-4;

/// Distance at which an object of size `max_dim` fills the vertical field of
/// view, times `padding`.
pub fn fit_distance(max_dim: f32, fov: f32, padding: f32) -> f32 {
    (max_dim / (2.0 * (fov / 2.0).tan())) * padding
}

pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,

    // pending orbit motion, bled off a little every update
    delta_theta: f32,
    delta_phi: f32,
    zoom_scale: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl Camera {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            position: config.camera_position,
            target: config.camera_target,

            fov: config.fov_degrees.to_radians(),
            aspect: 16.0 / 9.0,
            near: config.near,
            far: config.far,

            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,

            delta_theta: 0.0,
            delta_phi: 0.0,
            zoom_scale: 1.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Queues a rotation from a pointer drag of `(dx, dy)` pixels over a
    /// viewport `viewport_height` pixels tall. A full-height drag turns the
    /// camera once around the target.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.delta_theta -= TAU * dx / height * self.rotate_speed;
        self.delta_phi -= TAU * dy / height * self.rotate_speed;
    }

    /// Positive `steps` zoom in, negative zoom out.
    pub fn zoom(&mut self, steps: f32) {
        let factor = 0.95f32.powf(self.zoom_speed);
        self.zoom_scale *= factor.powf(steps);
    }

    /// Advances the damped orbit by one frame. Returns whether the camera
    /// moved.
    pub fn update(&mut self) -> bool {
        let offset = self.position - self.target;
        let mut radius = offset.length();
        if radius < MIN_RADIUS {
            return false;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.delta_theta * self.damping_factor;
        phi += self.delta_phi * self.damping_factor;
        phi = phi.clamp(MIN_POLAR, PI - MIN_POLAR);
        radius = (radius * self.zoom_scale).max(MIN_RADIUS);

        let sin_phi = phi.sin();
        let new_offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        let moved = new_offset.distance_squared(offset) > f32::EPSILON * radius * radius;
        self.position = self.target + new_offset;

        self.delta_theta *= 1.0 - self.damping_factor;
        self.delta_phi *= 1.0 - self.damping_factor;
        self.zoom_scale = 1.0;

        moved
    }

    /// Re-frames the camera on `bounds`, keeping the current viewing
    /// direction. Near and far are derived from the bounds alone.
    ///
    /// A zero-extent box is framed as if it were `fallback_size` wide.
    pub fn fit_to_bounds(&mut self, bounds: &Bounds, padding: f32, fallback_size: f32) {
        let mut max_dim = bounds.max_dim();
        if !(max_dim > 0.0) {
            max_dim = fallback_size;
        }
        let center = bounds.center();
        let distance = fit_distance(max_dim, self.fov, padding);

        let direction = (self.position - self.target)
            .try_normalize()
            .unwrap_or(Vec3::Z);

        self.target = center;
        self.position = center + direction * distance;
        self.near = max_dim / 100.0;
        self.far = max_dim * 100.0;
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height;
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube(half: f32) -> Bounds {
        Bounds {
            min: Vec3::splat(-half),
            max: Vec3::splat(half),
        }
    }

    #[test]
    fn fit_distance_matches_the_closed_form() {
        let fov = 60.0f32.to_radians();
        // tan(30°) = 1/√3, so 4 / (2/√3) * 1.4 = 2√3 * 1.4
        assert_relative_eq!(fit_distance(4.0, fov, 1.4), 2.0 * 3f32.sqrt() * 1.4, epsilon = 1e-5);
    }

    #[test]
    fn doubling_the_mesh_doubles_the_distance() {
        let mut small = Camera::default();
        small.fit_to_bounds(&cube(1.0), 1.4, 4.0);
        let mut large = Camera::default();
        large.fit_to_bounds(&cube(2.0), 1.4, 4.0);

        assert_relative_eq!(large.distance(), 2.0 * small.distance(), epsilon = 1e-4);
    }

    #[test]
    fn fit_keeps_the_viewing_direction() {
        let mut camera = Camera::default();
        let before = (camera.position - camera.target).normalize();

        let bounds = Bounds {
            min: Vec3::new(1.0, 1.0, 1.0),
            max: Vec3::new(3.0, 2.0, 1.5),
        };
        camera.fit_to_bounds(&bounds, 1.4, 4.0);

        let after = (camera.position - camera.target).normalize();
        assert_relative_eq!(before.dot(after), 1.0, epsilon = 1e-5);
        assert_eq!(camera.target, bounds.center());
        assert_relative_eq!(camera.distance(), fit_distance(2.0, camera.fov, 1.4), epsilon = 1e-4);
    }

    #[test]
    fn clip_planes_are_rederived_not_accumulated() {
        let mut camera = Camera::default();
        camera.fit_to_bounds(&cube(50.0), 1.4, 4.0);
        assert_relative_eq!(camera.near, 1.0);
        assert_relative_eq!(camera.far, 10_000.0);

        camera.fit_to_bounds(&cube(2.0), 1.4, 4.0);
        assert_relative_eq!(camera.near, 0.04);
        assert_relative_eq!(camera.far, 400.0);
    }

    #[test]
    fn zero_extent_bounds_fall_back_to_the_reference_size() {
        let mut camera = Camera::default();
        let point = Bounds {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        };
        camera.fit_to_bounds(&point, 1.4, 4.0);
        assert!(camera.near > 0.0);
        assert_relative_eq!(camera.distance(), fit_distance(4.0, camera.fov, 1.4), epsilon = 1e-4);
    }

    #[test]
    fn rotation_survives_a_refit() {
        let mut camera = Camera::default();
        camera.rotate(200.0, -50.0, 800.0);
        for _ in 0..120 {
            camera.update();
        }
        let rotated = (camera.position - camera.target).normalize();

        camera.fit_to_bounds(&cube(2.0), 1.4, 4.0);
        let after = (camera.position - camera.target).normalize();
        assert_relative_eq!(rotated.dot(after), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn orbit_motion_is_damped_and_keeps_distance() {
        let mut camera = Camera::default();
        let distance = camera.distance();
        camera.rotate(100.0, 0.0, 600.0);

        let mut steps = Vec::new();
        let mut last = camera.position;
        for _ in 0..10 {
            assert!(camera.update());
            steps.push(camera.position.distance(last));
            last = camera.position;
        }

        assert!(steps.windows(2).all(|w| w[1] < w[0]));
        assert_relative_eq!(camera.distance(), distance, epsilon = 1e-3);
    }

    #[test]
    fn zoom_in_shrinks_the_orbit_once() {
        let mut camera = Camera::default();
        let distance = camera.distance();
        camera.zoom(1.0);
        camera.update();
        assert_relative_eq!(camera.distance(), distance * 0.95f32.powf(1.2), epsilon = 1e-4);

        camera.update();
        assert_relative_eq!(camera.distance(), distance * 0.95f32.powf(1.2), epsilon = 1e-4);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut camera = Camera::default();
        camera.rotate(0.0, 100_000.0, 600.0);
        for _ in 0..200 {
            camera.update();
        }
        let offset = camera.position - camera.target;
        assert!(offset.y > 0.0);
        assert!(glam::Vec2::new(offset.x, offset.z).length() > 0.0);
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn aspect_follows_resizes() {
        let mut camera = Camera::default();
        camera.set_aspect(800.0, 600.0);
        assert_relative_eq!(camera.aspect, 800.0 / 600.0);
        camera.set_aspect(300.0, 900.0);
        assert_relative_eq!(camera.aspect, 1.0 / 3.0);
    }
}
