use crate::camera::Camera;
use crate::config::{check_target_size, ConfigError, Resolution};
use crate::marcher::{Scene, Tracer};
use crate::math::v2;
use image::{ImageResult, Rgba, RgbaImage};
use log::debug;
use rayon::prelude::*;
use std::path::Path;

/// RGBA8 pixel buffer the frame is rendered into.
pub struct RenderTarget {
    image: RgbaImage,
}

impl RenderTarget {
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        check_target_size(width, height)?;
        Ok(RenderTarget {
            image: RgbaImage::new(width, height),
        })
    }

    /// Reallocates the buffer. The old contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        check_target_size(width, height)?;
        self.image = RgbaImage::new(width, height);
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> Resolution {
        Resolution {
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Fills every pixel with the tracer's color for the camera ray through it.
    ///
    /// Rows are rendered in parallel; each pixel is written exactly once.
    pub fn each(&mut self, scene: &Scene, camera: &Camera, tracer: &impl Tracer) {
        let (w, h) = self.image.dimensions();
        let size = v2(w as f64, h as f64);
        debug!(
            "tracing {}x{} from {:?}",
            w,
            h,
            camera.to_ray(v2(0.5, 0.5), size).origin
        );
        let row_len = w as usize * 4;
        self.image
            .par_chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, p) in row.chunks_exact_mut(4).enumerate() {
                    let pixel = v2(x as f64 / size.x, y as f64 / size.y);
                    let ray = camera.to_ray(pixel, size);
                    p.copy_from_slice(&tracer.trace(scene, &ray).0);
                }
            });
    }

    /// Packs pixels as `0RGB` words, the layout minifb expects.
    pub fn to_u32_buffer(&self) -> Vec<u32> {
        self.image
            .pixels()
            .map(|Rgba([r, g, b, _])| rgb_to_u32(*r, *g, *b))
            .collect()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.image.save(path)
    }
}

pub fn rgb_to_u32(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}
