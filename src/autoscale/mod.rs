use crate::config::Resolution;
use std::time::Duration;

/// Frames slower than this stop the target from growing.
pub const DEFAULT_MAX_FRAME_TIME: Duration = Duration::from_millis(500);

/// Grows the render target by roughly 10% a frame until it fills the window, as long
/// as frames stay fast enough.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoScale {
    pub enabled: bool,
    pub max_frame_time: Duration,
}

impl Default for AutoScale {
    fn default() -> Self {
        AutoScale::new(true)
    }
}

impl AutoScale {
    pub fn new(enabled: bool) -> Self {
        AutoScale {
            enabled,
            max_frame_time: DEFAULT_MAX_FRAME_TIME,
        }
    }

    /// The size to render the next frame at, or `None` to keep the current one.
    ///
    /// Each axis grows by `size / 10 + 1` and is clamped to the window. The height is
    /// additionally clamped to the width so the target never becomes taller than wide.
    pub fn next_size(
        &self,
        current: Resolution,
        window: Resolution,
        last_frame: Duration,
    ) -> Option<Resolution> {
        if !self.enabled || last_frame > self.max_frame_time {
            return None;
        }
        if current.width >= window.width && current.height >= window.height {
            return None;
        }
        let grow = |size: u32, limit: u32| (size + size / 10 + 1).min(limit);
        let width = grow(current.width, window.width);
        let height = grow(current.height, window.height).min(width);
        let next = Resolution { width, height };
        (next != current).then_some(next)
    }
}
