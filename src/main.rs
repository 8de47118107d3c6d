use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use marcher::config::Resolution;
use marcher::math::v;
use marcher::{App, Control, Key, KeyState, Settings};
use minifb::{KeyRepeat, ScaleMode, Window, WindowOptions};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON settings file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Render one frame at the window size to this PNG instead of opening a window.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    no_auto_scale: bool,

    /// Start the camera here instead of the configured position.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    position: Option<Vec<f64>>,
}

const KEY_MAP: [(minifb::Key, Key); 7] = [
    (minifb::Key::W, Key::Forward),
    (minifb::Key::S, Key::Back),
    (minifb::Key::A, Key::Left),
    (minifb::Key::D, Key::Right),
    (minifb::Key::Space, Key::Up),
    (minifb::Key::LeftShift, Key::Down),
    (minifb::Key::R, Key::Reset),
];

/// Settings commands fire once per press rather than while held.
const CONTROL_MAP: [(minifb::Key, Control); 6] = [
    (minifb::Key::T, Control::ToggleAutoScale),
    (minifb::Key::RightBracket, Control::MoreSteps),
    (minifb::Key::LeftBracket, Control::FewerSteps),
    (minifb::Key::Equal, Control::GrowTarget),
    (minifb::Key::Minus, Control::ShrinkTarget),
    (minifb::Key::F5, Control::Rerender),
];

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    settings.window.width = args.width.unwrap_or(settings.window.width);
    settings.window.height = args.height.unwrap_or(settings.window.height);
    settings.auto_scale &= !args.no_auto_scale;

    let mut app = App::new(&settings).context("invalid settings")?;
    if let Some(p) = args.position.as_deref() {
        if let [x, y, z] = *p {
            app.set_camera_position(v(x, y, z))?;
        }
    }

    match args.output {
        Some(path) => render_to_file(&mut app, settings.window, path),
        None => window_loop(&mut app, settings.window),
    }
}

fn render_to_file(app: &mut App, size: Resolution, path: PathBuf) -> Result<()> {
    app.set_target_size(size.width, size.height)?;
    let start = Instant::now();
    app.render();
    info!("render took {} s", start.elapsed().as_secs_f32());
    app.target()
        .save(&path)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// `None` for minimized windows and sizes that do not fit the target's `u32` axes.
fn window_resolution(width: usize, height: usize) -> Option<Resolution> {
    let width = u32::try_from(width).ok()?;
    let height = u32::try_from(height).ok()?;
    (width > 0 && height > 0).then_some(Resolution { width, height })
}

fn window_loop(app: &mut App, size: Resolution) -> Result<()> {
    let mut window = Window::new(
        "marcher",
        size.width as usize,
        size.height as usize,
        WindowOptions {
            resize: true,
            scale_mode: ScaleMode::Stretch,
            ..WindowOptions::default()
        },
    )
    .context("failed to open window")?;
    window.set_target_fps(60);

    let mut buffer = app.target().to_u32_buffer();
    let mut last = Instant::now();
    while window.is_open() && !window.is_key_down(minifb::Key::Escape) {
        let elapsed = last.elapsed();
        last = Instant::now();

        let keys: KeyState = KEY_MAP
            .iter()
            .filter(|(physical, _)| window.is_key_down(*physical))
            .map(|(_, key)| *key)
            .collect();
        let (width, height) = window.get_size();
        let Some(window_size) = window_resolution(width, height) else {
            window.update();
            continue;
        };

        for (physical, control) in CONTROL_MAP {
            if window.is_key_pressed(physical, KeyRepeat::No) {
                if let Err(e) = app.apply(control, window_size) {
                    warn!("{:?} rejected: {}", control, e);
                }
            }
        }

        match app.frame(&keys, elapsed, window_size) {
            Ok(true) => {
                buffer = app.target().to_u32_buffer();
                let target = app.target();
                window.set_title(&format!(
                    "marcher {}x{} {:.1} ms",
                    target.width(),
                    target.height(),
                    app.last_render().unwrap_or_default().as_secs_f64() * 1000.
                ));
            }
            Ok(false) => {}
            Err(e) => {
                warn!("{}", e);
                app.set_auto_scale(false);
            }
        }

        let target = app.target();
        window
            .update_with_buffer(&buffer, target.width() as usize, target.height() as usize)
            .context("failed to present frame")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_sizes_convert_or_skip() {
        assert_eq!(
            window_resolution(800, 600),
            Some(Resolution {
                width: 800,
                height: 600
            })
        );
        assert_eq!(window_resolution(0, 600), None);
        assert_eq!(window_resolution(800, 0), None);
        if let Ok(too_wide) = usize::try_from(u64::from(u32::MAX) + 1) {
            assert_eq!(window_resolution(too_wide, 600), None);
        }
    }
}
