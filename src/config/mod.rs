use crate::autoscale::AutoScale;
use crate::camera::{Camera, DEFAULT_FIELD_OF_VIEW, RESET_ORIENTATION, RESET_POSITION};
use crate::marcher::{MarchConfig, Scene, Sphere, DEFAULT_MAX_RAY_STEP, DEFAULT_MIN_DISTANCE};
use crate::math::{v, V3};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{fs, io};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max_ray_step must be at least 1")]
    ZeroStep,
    #[error("min_distance must be positive and finite, got {0}")]
    InvalidMinDistance(f64),
    #[error("render target must not be empty, got {width}x{height}")]
    EmptyTarget { width: u32, height: u32 },
    #[error("render target must be at least as wide as it is tall, got {width}x{height}")]
    NarrowTarget { width: u32, height: u32 },
    #[error("field of view must be between 0 and 180 degrees, got {0}")]
    InvalidFieldOfView(f64),
    #[error("sphere radius must not be negative, got {0}")]
    NegativeRadius(f64),
    #[error("could not read settings: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: V3,
    pub orientation: V3,
    pub field_of_view: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            position: RESET_POSITION,
            orientation: RESET_ORIENTATION,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarcherSettings {
    pub max_ray_step: u32,
    pub min_distance: f64,
}

impl Default for MarcherSettings {
    fn default() -> Self {
        MarcherSettings {
            max_ray_step: DEFAULT_MAX_RAY_STEP,
            min_distance: DEFAULT_MIN_DISTANCE,
        }
    }
}

/// A sphere as written in the settings file; checked when the scene is built.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SphereSettings {
    pub center: V3,
    pub radius: f64,
}

/// Everything the application reads at startup. Every field has a default, so an
/// empty JSON object is a valid settings file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: Resolution,
    /// Size the target starts at, and drops back to on camera moves while auto-scaling.
    pub initial_target: Resolution,
    pub auto_scale: bool,
    pub camera: CameraSettings,
    pub marcher: MarcherSettings,
    pub spheres: Vec<SphereSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            window: Resolution {
                width: 800,
                height: 800,
            },
            initial_target: Resolution {
                width: 10,
                height: 10,
            },
            auto_scale: true,
            camera: CameraSettings::default(),
            marcher: MarcherSettings::default(),
            spheres: vec![
                SphereSettings {
                    center: v(10., 0., 15.),
                    radius: 4.,
                },
                SphereSettings {
                    center: v(1., 0., 10.),
                    radius: 3.,
                },
            ],
        }
    }
}

impl Settings {
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading settings from {}", path.display());
        let input = fs::read_to_string(path)?;
        let settings = Self::from_json(&input)?;
        info!("{} spheres", settings.spheres.len());
        Ok(settings)
    }

    /// Rejects anything that would otherwise only show up mid-render.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera()?;
        self.march_config()?;
        self.scene()?;
        for Resolution { width, height } in [self.window, self.initial_target] {
            check_target_size(width, height)?;
        }
        Ok(())
    }

    pub fn camera(&self) -> Result<Camera, ConfigError> {
        let c = &self.camera;
        Camera::new(c.position, c.orientation, c.field_of_view)
    }

    pub fn march_config(&self) -> Result<MarchConfig, ConfigError> {
        MarchConfig::new(self.marcher.max_ray_step, self.marcher.min_distance)
    }

    pub fn scene(&self) -> Result<Scene, ConfigError> {
        self.spheres
            .iter()
            .map(|s| Sphere::new(s.center, s.radius))
            .collect::<Result<Vec<_>, _>>()
            .map(Scene::new)
    }

    pub fn auto_scale(&self) -> AutoScale {
        AutoScale::new(self.auto_scale)
    }
}

/// Targets must be non-empty and no narrower than they are tall.
pub fn check_target_size(width: u32, height: u32) -> Result<(), ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::EmptyTarget { width, height });
    }
    if width < height {
        return Err(ConfigError::NarrowTarget { width, height });
    }
    Ok(())
}
