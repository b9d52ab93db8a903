// Copyright (c) 2026 rezky_nightky

use crate::charset::RAMP_LEN;
use crate::frame::{Cell, Frame};
use crate::palette::RenderStyle;

/// Below this many visible columns the buffer downscales by 2, else by 3.
pub const SCALE_NARROW_COLS: u16 = 160;

/// Ground line sits this many buffer pixels above the bottom edge.
const GROUND_INSET: i32 = 4;

/// Simulation alphas are tuned for additive compositing on a dark page;
/// terminal cells need a push to land on a visible ramp level.
const DISPLAY_GAIN: f32 = 3.4;

/// Offscreen pixel surface the simulation draws into. One f32 coverage
/// value per pixel, max-blended; presentation magnifies each pixel to a
/// `scale x scale` block of cells, nearest-neighbor.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    width: u16,
    height: u16,
    scale: u16,
    ground_y: i32,
    data: Vec<f32>,
}

impl PixelBuffer {
    pub fn new() -> Self {
        let mut buf = Self {
            width: 1,
            height: 1,
            scale: 2,
            ground_y: 0,
            data: vec![0.0; 1],
        };
        buf.resize(1, 1);
        buf
    }

    /// Recompute both coordinate spaces from the visible geometry. Zero or
    /// near-zero surfaces clamp to a 1x1 buffer instead of failing.
    pub fn resize(&mut self, cols: u16, lines: u16) {
        self.scale = if cols < SCALE_NARROW_COLS { 2 } else { 3 };
        self.width = (cols / self.scale).max(1);
        self.height = (lines / self.scale).max(1);
        self.ground_y = (self.height as i32 - GROUND_INSET).max(0);
        self.data.clear();
        self.data
            .resize(self.width as usize * self.height as usize, 0.0);
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    #[allow(dead_code)]
    pub fn scale(&self) -> u16 {
        self.scale
    }

    pub fn ground_y(&self) -> i32 {
        self.ground_y
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    pub fn plot(&mut self, x: i32, y: i32, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        if alpha > self.data[idx] {
            self.data[idx] = alpha;
        }
    }

    #[allow(dead_code)]
    pub fn sample(&self, x: i32, y: i32) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0.0;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    #[allow(dead_code)]
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&a| a <= 0.0)
    }

    fn level(&self, alpha: f32) -> usize {
        ((alpha * DISPLAY_GAIN).clamp(0.0, 1.0) * (RAMP_LEN - 1) as f32).round() as usize
    }

    /// Magnify the buffer onto the visible frame. Every visible cell is
    /// rewritten (blank where the pixel quantizes to nothing); the frame's
    /// diff layer keeps the terminal write small.
    pub fn present(&self, frame: &mut Frame, style: &RenderStyle) {
        let bg = style.palette.bg;
        for y in 0..frame.height {
            let by = (y / self.scale) as i32;
            for x in 0..frame.width {
                let bx = (x / self.scale) as i32;
                let level = self.level(self.sample(bx, by));
                let cell = if level == 0 {
                    Cell::blank_with_bg(bg)
                } else {
                    Cell::shaded(
                        style.ramp[level],
                        style.fg_for_level(level),
                        bg,
                        level == RAMP_LEN - 1,
                    )
                };
                frame.set(x, y, cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::build_ramp;
    use crate::palette::build_palette;
    use crate::runtime::{ColorMode, ColorScheme, GlyphSet};

    fn style() -> RenderStyle {
        RenderStyle {
            ramp: build_ramp(GlyphSet::Ascii),
            palette: build_palette(ColorScheme::Rain, ColorMode::Mono, true),
            color_mode: ColorMode::Mono,
        }
    }

    #[test]
    fn resize_picks_scale_from_width_and_clamps_to_one() {
        let mut buf = PixelBuffer::new();
        buf.resize(120, 40);
        assert_eq!(buf.scale(), 2);
        assert_eq!((buf.width(), buf.height()), (60, 20));

        buf.resize(240, 60);
        assert_eq!(buf.scale(), 3);
        assert_eq!((buf.width(), buf.height()), (80, 20));

        buf.resize(0, 0);
        assert_eq!((buf.width(), buf.height()), (1, 1));
    }

    #[test]
    fn ground_line_is_inset_from_bottom() {
        let mut buf = PixelBuffer::new();
        buf.resize(240, 60);
        assert_eq!(buf.ground_y(), 16);

        buf.resize(4, 4);
        assert_eq!(buf.ground_y(), 0);
    }

    #[test]
    fn plot_max_blends_and_ignores_out_of_bounds() {
        let mut buf = PixelBuffer::new();
        buf.resize(120, 40);
        buf.plot(3, 3, 0.4);
        buf.plot(3, 3, 0.2);
        assert_eq!(buf.sample(3, 3), 0.4);
        buf.plot(-1, 3, 0.9);
        buf.plot(3, 999, 0.9);
        assert_eq!(buf.sample(-1, 3), 0.0);
    }

    #[test]
    fn present_magnifies_one_pixel_to_a_scale_block() {
        let mut buf = PixelBuffer::new();
        buf.resize(120, 40);
        buf.plot(0, 0, 1.0);

        let mut frame = Frame::new(120, 40, None);
        frame.clear_dirty();
        buf.present(&mut frame, &style());

        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_ne!(frame.get(x, y).unwrap().ch, ' ');
        }
        assert_eq!(frame.get(2, 0).unwrap().ch, ' ');
    }

    #[test]
    fn faint_pixels_quantize_to_blank() {
        let mut buf = PixelBuffer::new();
        buf.resize(120, 40);
        buf.plot(5, 5, 0.01);

        let mut frame = Frame::new(120, 40, None);
        frame.clear_dirty();
        buf.present(&mut frame, &style());
        assert_eq!(frame.get(10, 10).unwrap().ch, ' ');
    }
}
