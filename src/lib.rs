pub mod app;
pub mod autoscale;
pub mod camera;
pub mod config;
pub mod marcher;
pub mod math;
pub mod target;

pub use app::{App, Control};
pub use camera::{Camera, Key, KeyState};
pub use config::{ConfigError, Settings};
pub use marcher::{march, render, MarchConfig, MarchResult, Renderable, Scene, Sphere, Tracer};
pub use target::RenderTarget;
