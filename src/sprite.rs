// Copyright (c) 2026 rezky_nightky

use std::path::Path;

use image::imageops::FilterType;

/// Cached stamp size, in logical pixels of the source asset.
pub const STAMP_W: u32 = 32;
pub const STAMP_H: u32 = 48;

/// Footprint actually drawn into the low-resolution buffer. The stamp keeps
/// enough detail to downsample cleanly; buffer pixels are far coarser.
pub const DRAW_W: i32 = 4;
pub const DRAW_H: i32 = 6;

/// Optional droplet stamp, decoded once from a user-supplied image and read
/// every frame. Missing or undecodable assets leave the engine on the
/// synthetic streak path.
#[derive(Clone, Debug)]
pub struct Sprite {
    stamp: Vec<f32>,
    draw: [f32; (DRAW_W * DRAW_H) as usize],
}

impl Sprite {
    pub fn load(path: &Path) -> Option<Self> {
        let img = image::open(path).ok()?;
        let small = img
            .resize_exact(STAMP_W, STAMP_H, FilterType::Nearest)
            .to_rgba8();

        let has_alpha = small.pixels().any(|p| p.0[3] < 255);
        let stamp: Vec<f32> = small
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                if has_alpha {
                    a as f32 / 255.0
                } else {
                    // Fully opaque sources: treat luminance as coverage.
                    (r as u32 + g as u32 + b as u32) as f32 / (3.0 * 255.0)
                }
            })
            .collect();

        Some(Self::from_stamp(stamp))
    }

    fn from_stamp(stamp: Vec<f32>) -> Self {
        let mut draw = [0.0f32; (DRAW_W * DRAW_H) as usize];
        for dy in 0..DRAW_H {
            for dx in 0..DRAW_W {
                let sx = (dx as u32 * STAMP_W) / DRAW_W as u32;
                let sy = (dy as u32 * STAMP_H) / DRAW_H as u32;
                draw[(dy * DRAW_W + dx) as usize] = stamp[(sy * STAMP_W + sx) as usize];
            }
        }
        Self { stamp, draw }
    }

    pub fn draw_size() -> (i32, i32) {
        (DRAW_W, DRAW_H)
    }

    #[allow(dead_code)]
    pub fn stamp_len(&self) -> usize {
        self.stamp.len()
    }

    /// Coverage of the draw raster at (dx, dy), 0..1.
    pub fn coverage(&self, dx: i32, dy: i32) -> f32 {
        if dx < 0 || dy < 0 || dx >= DRAW_W || dy >= DRAW_H {
            return 0.0;
        }
        self.draw[(dy * DRAW_W + dx) as usize]
    }

    #[cfg(test)]
    pub fn solid() -> Self {
        Self::from_stamp(vec![1.0; (STAMP_W * STAMP_H) as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_stamp_covers_the_whole_draw_raster() {
        let s = Sprite::solid();
        assert_eq!(s.stamp_len(), (STAMP_W * STAMP_H) as usize);
        for dy in 0..DRAW_H {
            for dx in 0..DRAW_W {
                assert_eq!(s.coverage(dx, dy), 1.0);
            }
        }
        assert_eq!(s.coverage(-1, 0), 0.0);
        assert_eq!(s.coverage(DRAW_W, 0), 0.0);
    }

    #[test]
    fn missing_asset_yields_none() {
        assert!(Sprite::load(Path::new("/nonexistent/drop.png")).is_none());
    }
}
