use crate::config::ConfigError;
use crate::math::{normalize, rotate, v, Ray, V2, V3, B1, B2, B3};
use std::collections::HashSet;

pub const DEFAULT_FIELD_OF_VIEW: f64 = 90.;
pub const RESET_POSITION: V3 = V3 {
    x: 0.,
    y: 0.,
    z: 20.,
};
pub const RESET_ORIENTATION: V3 = V3 {
    x: 0.,
    y: 0.,
    z: -1.,
};

/// Logical movement keys; the window shell maps physical keys onto these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    Reset,
}

/// Which keys were held down this frame.
#[derive(Clone, Debug, Default)]
pub struct KeyState {
    down: HashSet<Key>,
}

impl KeyState {
    pub fn press(&mut self, key: Key) {
        self.down.insert(key);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }
}

impl FromIterator<Key> for KeyState {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        KeyState {
            down: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: V3,
    /// A view direction, not Euler angles.
    pub orientation: V3,
    field_of_view: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            position: RESET_POSITION,
            orientation: RESET_ORIENTATION,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
        }
    }
}

impl Camera {
    pub fn new(position: V3, orientation: V3, field_of_view: f64) -> Result<Self, ConfigError> {
        let mut camera = Camera {
            position,
            orientation,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
        };
        camera.set_field_of_view(field_of_view)?;
        Ok(camera)
    }

    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    /// Degrees, strictly between 0 and 180.
    pub fn set_field_of_view(&mut self, degrees: f64) -> Result<(), ConfigError> {
        if !(degrees > 0. && degrees < 180.) {
            return Err(ConfigError::InvalidFieldOfView(degrees));
        }
        self.field_of_view = degrees;
        Ok(())
    }

    pub fn right(&self) -> V3 {
        rotate(&B1, &self.orientation)
    }

    pub fn up(&self) -> V3 {
        rotate(&B2, &self.orientation)
    }

    pub fn forward(&self) -> V3 {
        rotate(&B3, &self.orientation)
    }

    /// Pinhole projection of `pixel` (fractions of the image in `[0, 1]`) into a world ray.
    ///
    /// Expects `image_size.x >= image_size.y`; the render target enforces that on resize.
    /// The view-plane point has the camera position subtracted before normalizing, so
    /// the direction depends on where the camera sits as well as on the pixel.
    pub fn to_ray(&self, pixel: V2, image_size: V2) -> Ray {
        let angle = (self.field_of_view.to_radians() / 2.).tan();
        let aspect_ratio = image_size.x / image_size.y;
        let x = (2. * (pixel.x * image_size.x + 0.5) / image_size.x - 1.) * angle * aspect_ratio;
        let y = (1. - 2. * (pixel.y * image_size.y + 0.5) / image_size.y) * angle;
        Ray {
            origin: self.position,
            direction: normalize(&(v(x, y, -1.) - self.position)),
        }
    }

    /// Applies one frame of keyboard input. Returns whether the camera changed.
    ///
    /// Reset wins over everything else held the same frame. Movement keys add up
    /// without normalizing, so diagonals are faster.
    pub fn handle_movement(&mut self, keys: &KeyState, elapsed: f64) -> bool {
        if keys.is_down(Key::Reset) {
            self.position = RESET_POSITION;
            self.orientation = RESET_ORIENTATION;
            return true;
        }

        let axes = [
            (Key::Forward, Key::Back, B3),
            (Key::Right, Key::Left, B1),
            (Key::Up, Key::Down, B2),
        ];
        let mut updated = false;
        for (plus, minus, axis) in axes {
            for (key, sign) in [(plus, 1.), (minus, -1.)] {
                if keys.is_down(key) {
                    let direction = rotate(&axis, &self.orientation);
                    self.position += direction * sign * elapsed;
                    updated = true;
                }
            }
        }
        updated
    }
}
