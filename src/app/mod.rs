use crate::autoscale::AutoScale;
use crate::camera::{Camera, KeyState};
use crate::config::{ConfigError, Resolution, Settings};
use crate::marcher::{MarchConfig, Scene};
use crate::math::V3;
use crate::target::RenderTarget;
use log::{debug, info};
use std::time::{Duration, Instant};

/// Change in `max_ray_step` per step command.
pub const STEP_INCREMENT: u32 = 10;

/// Runtime settings commands, one per shell key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    ToggleAutoScale,
    MoreSteps,
    FewerSteps,
    GrowTarget,
    ShrinkTarget,
    Rerender,
}

/// Application state threaded through the frame loop.
pub struct App {
    pub scene: Scene,
    pub camera: Camera,
    config: MarchConfig,
    target: RenderTarget,
    initial_target: Resolution,
    auto_scale: AutoScale,
    scene_updated: bool,
    last_render: Option<Duration>,
}

impl App {
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let initial_target = settings.initial_target;
        Ok(App {
            scene: settings.scene()?,
            camera: settings.camera()?,
            config: settings.march_config()?,
            target: RenderTarget::new(initial_target.width, initial_target.height)?,
            initial_target,
            auto_scale: settings.auto_scale(),
            scene_updated: true,
            last_render: None,
        })
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub fn march_config(&self) -> &MarchConfig {
        &self.config
    }

    pub fn auto_scale(&self) -> &AutoScale {
        &self.auto_scale
    }

    pub fn scene_updated(&self) -> bool {
        self.scene_updated
    }

    /// Wall time of the most recent full traversal.
    pub fn last_render(&self) -> Option<Duration> {
        self.last_render
    }

    pub fn request_render(&mut self) {
        self.scene_updated = true;
    }

    /// Moves the camera. With auto-scale on, refinement restarts from the initial size.
    pub fn set_camera_position(&mut self, position: V3) -> Result<(), ConfigError> {
        self.camera.position = position;
        self.restart_refinement()
    }

    pub fn set_target_size(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        self.target.resize(width, height)?;
        self.scene_updated = true;
        Ok(())
    }

    pub fn set_auto_scale(&mut self, enabled: bool) {
        self.auto_scale.enabled = enabled;
        self.scene_updated = true;
    }

    pub fn set_march_config(&mut self, config: MarchConfig) {
        self.config = config;
        self.scene_updated = true;
    }

    /// Drops back to the initial size only when auto-scale will grow it again;
    /// otherwise the chosen resolution is kept and just re-rendered.
    fn restart_refinement(&mut self) -> Result<(), ConfigError> {
        if !self.auto_scale.enabled {
            self.scene_updated = true;
            return Ok(());
        }
        let Resolution { width, height } = self.initial_target;
        self.set_target_size(width, height)
    }

    /// Applies one settings command from the shell.
    pub fn apply(&mut self, control: Control, window: Resolution) -> Result<(), ConfigError> {
        match control {
            Control::ToggleAutoScale => {
                self.set_auto_scale(!self.auto_scale.enabled);
                info!("auto-scale {}", if self.auto_scale.enabled { "on" } else { "off" });
            }
            Control::MoreSteps | Control::FewerSteps => {
                let steps = self.config.max_ray_step();
                let steps = match control {
                    Control::MoreSteps => steps.saturating_add(STEP_INCREMENT),
                    _ => steps.saturating_sub(STEP_INCREMENT).max(1),
                };
                self.set_march_config(MarchConfig::new(steps, self.config.min_distance())?);
                info!("max_ray_step = {}", steps);
            }
            Control::GrowTarget | Control::ShrinkTarget => {
                let Resolution { width, height } = self.target.size();
                let (width, height) = match control {
                    Control::GrowTarget => (
                        (width + width / 10 + 1).min(window.width),
                        (height + height / 10 + 1).min(window.height),
                    ),
                    _ => (
                        (width - width / 10).saturating_sub(1).max(1),
                        (height - height / 10).saturating_sub(1).max(1),
                    ),
                };
                self.set_target_size(width, height.min(width))?;
                info!("target size = {}x{}", self.target.width(), self.target.height());
            }
            Control::Rerender => {
                self.request_render();
                info!("re-render requested");
            }
        }
        Ok(())
    }

    /// Runs one frame: applies input, grows the target if the policy allows, and
    /// re-renders when something changed. Returns whether a render happened.
    pub fn frame(
        &mut self,
        keys: &KeyState,
        elapsed: Duration,
        window: Resolution,
    ) -> Result<bool, ConfigError> {
        if self.camera.handle_movement(keys, elapsed.as_secs_f64()) {
            debug!("camera moved to {:?}", self.camera.position);
            self.restart_refinement()?;
        }
        if !self.scene_updated {
            return Ok(false);
        }

        match self
            .auto_scale
            .next_size(self.target.size(), window, elapsed)
        {
            Some(Resolution { width, height }) => self.target.resize(width, height)?,
            None => self.scene_updated = false,
        }
        self.render();
        Ok(true)
    }

    /// Renders the current target once, regardless of the update flag.
    pub fn render(&mut self) {
        let start = Instant::now();
        self.target.each(&self.scene, &self.camera, &self.config);
        let took = start.elapsed();
        self.last_render = Some(took);
        debug!(
            "rendered {}x{} in {:?}",
            self.target.width(),
            self.target.height(),
            took
        );
        if !self.scene_updated {
            info!(
                "settled at {}x{} ({:?} per frame)",
                self.target.width(),
                self.target.height(),
                took
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Key;
    use crate::config::SphereSettings;
    use crate::math::{v, O};

    const FAST: Duration = Duration::from_millis(16);

    fn res(width: u32, height: u32) -> Resolution {
        Resolution { width, height }
    }

    fn unit_sphere_settings() -> Settings {
        Settings {
            window: res(40, 30),
            spheres: vec![SphereSettings {
                center: O,
                radius: 1.,
            }],
            ..Settings::default()
        }
    }

    #[test]
    fn first_frame_renders() {
        let mut app = App::new(&unit_sphere_settings()).unwrap();
        assert!(app.scene_updated());
        assert!(app.frame(&KeyState::default(), FAST, res(40, 30)).unwrap());
        assert_eq!(app.target().size(), res(12, 12));
        assert!(app.last_render().is_some());
    }

    #[test]
    fn grows_until_window_then_idles() {
        let mut app = App::new(&unit_sphere_settings()).unwrap();
        let keys = KeyState::default();
        let mut frames = 0;
        while app.frame(&keys, FAST, res(40, 30)).unwrap() {
            frames += 1;
            assert!(frames < 100);
        }
        assert_eq!(app.target().size(), res(40, 30));
        assert!(!app.scene_updated());
        assert!(!app.frame(&keys, FAST, res(40, 30)).unwrap());
    }

    #[test]
    fn without_auto_scale_renders_once() {
        let mut app = App::new(&Settings {
            auto_scale: false,
            ..unit_sphere_settings()
        })
        .unwrap();
        let keys = KeyState::default();
        assert!(app.frame(&keys, FAST, res(40, 30)).unwrap());
        assert_eq!(app.target().size(), res(10, 10));
        assert!(!app.frame(&keys, FAST, res(40, 30)).unwrap());
    }

    #[test]
    fn movement_restarts_refinement() {
        let mut app = App::new(&unit_sphere_settings()).unwrap();
        let idle = KeyState::default();
        while app.frame(&idle, FAST, res(40, 30)).unwrap() {}
        let forward: KeyState = [Key::Forward].into_iter().collect();
        assert!(app.frame(&forward, FAST, res(40, 30)).unwrap());
        assert_eq!(app.target().size(), res(12, 12));
        assert_ne!(app.camera.position, v(0., 0., 20.));
    }

    #[test]
    fn movement_keeps_manual_size_without_auto_scale() {
        let mut app = App::new(&Settings {
            auto_scale: false,
            ..unit_sphere_settings()
        })
        .unwrap();
        app.set_target_size(40, 30).unwrap();
        let forward: KeyState = [Key::Forward].into_iter().collect();
        assert!(app.frame(&forward, FAST, res(40, 30)).unwrap());
        let idle = KeyState::default();
        for _ in 0..20 {
            app.frame(&idle, FAST, res(40, 30)).unwrap();
        }
        assert_eq!(app.target().size(), res(40, 30));

        app.set_camera_position(v(0., 0., 30.)).unwrap();
        assert!(app.scene_updated());
        assert_eq!(app.target().size(), res(40, 30));
    }

    #[test]
    fn slow_frame_stops_growth_but_still_renders() {
        let mut app = App::new(&unit_sphere_settings()).unwrap();
        let slow = Duration::from_millis(800);
        assert!(app.frame(&KeyState::default(), slow, res(40, 30)).unwrap());
        assert_eq!(app.target().size(), res(10, 10));
        assert!(!app.scene_updated());
    }

    #[test]
    fn setters_request_render() {
        let mut app = App::new(&Settings {
            auto_scale: false,
            ..unit_sphere_settings()
        })
        .unwrap();
        let keys = KeyState::default();
        app.frame(&keys, FAST, res(40, 30)).unwrap();

        app.set_march_config(MarchConfig::new(5, 1e-3).unwrap());
        assert!(app.scene_updated());
        assert!(app.frame(&keys, FAST, res(40, 30)).unwrap());

        app.set_target_size(20, 10).unwrap();
        assert!(app.frame(&keys, FAST, res(40, 30)).unwrap());
        assert_eq!(app.target().size(), res(20, 10));

        assert!(app.set_target_size(10, 20).is_err());

        app.set_camera_position(v(0., 0., 30.)).unwrap();
        assert_eq!(app.target().size(), res(20, 10));
        assert!(app.scene_updated());
    }

    #[test]
    fn camera_edit_restarts_refinement_with_auto_scale() {
        let mut app = App::new(&unit_sphere_settings()).unwrap();
        app.set_target_size(40, 30).unwrap();
        app.set_camera_position(v(0., 0., 30.)).unwrap();
        assert_eq!(app.target().size(), res(10, 10));
        assert!(app.scene_updated());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = Settings {
            initial_target: res(5, 10),
            ..Settings::default()
        };
        assert!(matches!(
            App::new(&settings),
            Err(ConfigError::NarrowTarget { .. })
        ));
    }
}
