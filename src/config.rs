use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional { position: Vec3 },
    Point { position: Vec3, range: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightConfig {
    pub kind: LightKind,
    pub color: u32,
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialConfig {
    pub color: u32,
    pub metalness: f32,
    pub roughness: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    pub size: f32,
    pub divisions: u32,
    pub center_color: u32,
    pub line_color: u32,
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    /// Largest bounding dimension every mesh is rescaled to.
    pub reference_size: f32,
    pub fit_padding: f32,

    pub fov_degrees: f32,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub near: f32,
    pub far: f32,

    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,

    pub background: u32,
    pub material: MaterialConfig,
    pub lights: Vec<LightConfig>,
    pub grid: GridConfig,

    pub vsync: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            reference_size: 4.0,
            fit_padding: 1.4,

            fov_degrees: 60.0,
            camera_position: Vec3::new(6.0, 4.0, 6.0),
            camera_target: Vec3::ZERO,
            near: 0.1,
            far: 1000.0,

            damping_factor: 0.12,
            rotate_speed: 0.5,
            zoom_speed: 1.2,

            background: 0x111111,
            material: MaterialConfig {
                color: 0x4a90e2,
                metalness: 0.15,
                roughness: 0.55,
            },
            lights: vec![
                LightConfig {
                    kind: LightKind::Ambient,
                    color: 0xffffff,
                    intensity: 0.5,
                },
                LightConfig {
                    kind: LightKind::Directional {
                        position: Vec3::new(10.0, 10.0, 10.0),
                    },
                    color: 0xffffff,
                    intensity: 0.9,
                },
                LightConfig {
                    kind: LightKind::Directional {
                        position: Vec3::new(-8.0, 5.0, -5.0),
                    },
                    color: 0xffffff,
                    intensity: 0.4,
                },
                LightConfig {
                    kind: LightKind::Point {
                        position: Vec3::new(0.0, 5.0, 0.0),
                        range: 100.0,
                    },
                    color: 0xffffff,
                    intensity: 0.6,
                },
            ],
            grid: GridConfig {
                size: 20.0,
                divisions: 20,
                center_color: 0x555555,
                line_color: 0x333333,
                height: -2.0,
            },

            vsync: true,
        }
    }
}

/// Converts a 0xRRGGBB sRGB colour into linear RGB, which is what the
/// sRGB surface expects us to write.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}
