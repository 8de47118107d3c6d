use crate::config::ConfigError;
use crate::math::{abs, sub, Ray, V3};
use image::Rgba;

/// Distance estimator: an upper bound on the distance from `x` to the nearest surface.
pub trait Renderable {
    fn sdf(&self, x: &V3) -> f64;
}

/// Only built through `Sphere::new`, so every sphere in a scene has a valid radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    center: V3,
    radius: f64,
}

impl Sphere {
    pub fn new(center: V3, radius: f64) -> Result<Self, ConfigError> {
        if !(radius >= 0.) {
            return Err(ConfigError::NegativeRadius(radius));
        }
        Ok(Sphere { center, radius })
    }

    pub fn center(&self) -> V3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Renderable for Sphere {
    /// Clamped at zero, so points inside the sphere read as on the surface.
    fn sdf(&self, x: &V3) -> f64 {
        (abs(&sub(x, &self.center)) - self.radius).max(0.)
    }
}

/// Flat list of spheres, evaluated brute force.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    spheres: Vec<Sphere>,
}

impl Scene {
    pub fn new(spheres: Vec<Sphere>) -> Self {
        Scene { spheres }
    }

    pub fn push(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }
}

impl Renderable for Scene {
    /// Minimum over all spheres. An empty scene places no constraint and returns infinity.
    fn sdf(&self, x: &V3) -> f64 {
        self.spheres
            .iter()
            .map(|s| s.sdf(x))
            .fold(f64::INFINITY, f64::min)
    }
}

pub const DEFAULT_MAX_RAY_STEP: u32 = 100;
pub const DEFAULT_MIN_DISTANCE: f64 = 1e-6;

/// Misses closer than `min_distance * MISS_RANGE` get a red tint.
const MISS_RANGE: f64 = 1e5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchConfig {
    max_ray_step: u32,
    min_distance: f64,
}

impl MarchConfig {
    pub fn new(max_ray_step: u32, min_distance: f64) -> Result<Self, ConfigError> {
        if max_ray_step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        if !(min_distance > 0.) || !min_distance.is_finite() {
            return Err(ConfigError::InvalidMinDistance(min_distance));
        }
        Ok(MarchConfig {
            max_ray_step,
            min_distance,
        })
    }

    pub fn max_ray_step(&self) -> u32 {
        self.max_ray_step
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }
}

impl Default for MarchConfig {
    fn default() -> Self {
        MarchConfig {
            max_ray_step: DEFAULT_MAX_RAY_STEP,
            min_distance: DEFAULT_MIN_DISTANCE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarchResult {
    /// Surface reached on iteration `steps`.
    Hit { steps: u32 },
    /// Step budget exhausted; `smallest` is the closest the ray came to any surface.
    Miss { smallest: f64 },
}

/// Sphere-traces `ray` through `s`. Always terminates within `max_ray_step` iterations.
pub fn march(s: &impl Renderable, ray: &Ray, config: &MarchConfig) -> MarchResult {
    let mut total = 0.;
    let mut smallest = f64::INFINITY;
    for step in 0..config.max_ray_step {
        let distance = s.sdf(&ray.at(total));
        smallest = smallest.min(distance);
        if distance <= config.min_distance {
            return MarchResult::Hit { steps: step };
        }
        total += distance;
    }
    MarchResult::Miss { smallest }
}

/// Grey for hits, brighter when fewer steps were needed; red for misses, brighter the
/// closer the ray passed to a surface.
pub fn shade(result: MarchResult, config: &MarchConfig) -> Rgba<u8> {
    match result {
        MarchResult::Hit { steps } => {
            let c = ((1. - steps as f64 / config.max_ray_step as f64) * 255.) as u8;
            Rgba([c, c, c, 255])
        }
        MarchResult::Miss { smallest } => {
            let range = config.min_distance * MISS_RANGE;
            let r = ((1. - smallest.min(range) / range) * 255.) as u8;
            Rgba([r, 0, 0, 255])
        }
    }
}

pub fn render(s: &Scene, ray: &Ray, config: &MarchConfig) -> Rgba<u8> {
    shade(march(s, ray, config), config)
}

/// Per-pixel coloring strategy used by the render target.
pub trait Tracer: Sync {
    fn trace(&self, scene: &Scene, ray: &Ray) -> Rgba<u8>;
}

impl Tracer for MarchConfig {
    fn trace(&self, scene: &Scene, ray: &Ray) -> Rgba<u8> {
        render(scene, ray, self)
    }
}

impl<F> Tracer for F
where
    F: Fn(&Scene, &Ray) -> Rgba<u8> + Sync,
{
    fn trace(&self, scene: &Scene, ray: &Ray) -> Rgba<u8> {
        self(scene, ray)
    }
}
