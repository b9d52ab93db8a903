// Copyright (c) 2026 rezky_nightky

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
};

use crate::buffer::PixelBuffer;
use crate::sprite::Sprite;

/// Horizontal wraparound margin, in buffer pixels.
pub const WRAP_MARGIN: f32 = 4.0;

/// How strongly the wind scalar couples into horizontal motion. Faster
/// droplets drift more, selling the depth illusion.
const WIND_COUPLING: f32 = 0.18;

/// Sprites read dimmer than streaks at the same alpha.
const SPRITE_ALPHA_FLOOR: f32 = 0.14;

const THICK_CHANCE: f32 = 0.18;

#[derive(Clone, Copy, Debug)]
pub struct Droplet {
    pub x: f32,
    pub y: f32,
    pub v: f32,
    pub drift: f32,
    pub a: f32,
    pub w: u8,
    pub len: u8,
}

/// Pre-built distributions for droplet state. Rebuilt whenever the buffer
/// geometry changes, since the position ranges depend on it.
#[derive(Clone, Debug)]
pub struct DropletSamplers {
    x: Uniform<f32>,
    spawn_y: Uniform<f32>,
    respawn_y: Uniform<f32>,
    v: Uniform<f32>,
    len: Uniform<u8>,
    alpha: Uniform<f32>,
    drift: Uniform<f32>,
    chance: Uniform<f32>,
}

impl DropletSamplers {
    pub fn new(buffer_w: u16, buffer_h: u16) -> Self {
        let ow = buffer_w.max(1) as f32;
        let oh = buffer_h.max(1) as f32;
        Self {
            x: Uniform::new(0.0, ow).expect("valid range"),
            spawn_y: Uniform::new(-oh, 0.0).expect("valid range"),
            respawn_y: Uniform::new(-0.35 * oh, 0.0).expect("valid range"),
            v: Uniform::new(0.85, 2.25).expect("valid range"),
            len: Uniform::new_inclusive(5, 11).expect("valid range"),
            alpha: Uniform::new(0.08, 0.16).expect("valid range"),
            drift: Uniform::new(-0.08, 0.08).expect("valid range"),
            chance: Uniform::new(0.0, 1.0).expect("valid range"),
        }
    }
}

impl Droplet {
    pub fn spawn(s: &DropletSamplers, mt: &mut StdRng) -> Self {
        Self {
            x: s.x.sample(mt),
            y: s.spawn_y.sample(mt),
            v: s.v.sample(mt),
            drift: s.drift.sample(mt),
            a: s.alpha.sample(mt),
            w: if s.chance.sample(mt) < THICK_CHANCE { 2 } else { 1 },
            len: s.len.sample(mt),
        }
    }

    /// Fresh randomized state after a ground crossing. Same as `spawn`
    /// except the respawn band sits closer to the top edge.
    pub fn respawn(&mut self, s: &DropletSamplers, mt: &mut StdRng) {
        *self = Droplet::spawn(s, mt);
        self.y = s.respawn_y.sample(mt);
    }

    /// Integrate one frame of motion and wrap horizontally.
    pub fn advance(&mut self, wind: f32, buffer_w: u16) {
        self.y += self.v;
        self.x += wind * self.v * WIND_COUPLING + self.drift;

        let ow = buffer_w as f32;
        if self.x < -WRAP_MARGIN {
            self.x = ow + WRAP_MARGIN;
        } else if self.x > ow + WRAP_MARGIN {
            self.x = -WRAP_MARGIN;
        }
    }

    /// Rendered size in buffer pixels: the sprite raster when a stamp is
    /// loaded, else thickness by streak length.
    pub fn footprint(&self, sprite: Option<&Sprite>) -> (i32, i32) {
        match sprite {
            Some(_) => Sprite::draw_size(),
            None => (self.w as i32, self.len as i32),
        }
    }

    pub fn draw(&self, buf: &mut PixelBuffer, sprite: Option<&Sprite>) {
        let x = self.x.round() as i32;
        let y = self.y.round() as i32;

        match sprite {
            Some(sp) => {
                let (dw, dh) = Sprite::draw_size();
                let a = self.a.max(SPRITE_ALPHA_FLOOR);
                let left = x - dw / 2;
                for dy in 0..dh {
                    for dx in 0..dw {
                        let c = sp.coverage(dx, dy);
                        if c > 0.0 {
                            buf.plot(left + dx, y + dy, a * c);
                        }
                    }
                }
            }
            None => {
                // Dotted vertical streak, every second pixel.
                let mut k = 0i32;
                while k < self.len as i32 {
                    for ox in 0..self.w as i32 {
                        buf.plot(x + ox, y + k, self.a);
                    }
                    k += 2;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn spawn_stays_inside_the_documented_ranges() {
        let mut mt = StdRng::seed_from_u64(1);
        let s = DropletSamplers::new(80, 20);
        for _ in 0..500 {
            let d = Droplet::spawn(&s, &mut mt);
            assert!(d.x >= 0.0 && d.x < 80.0);
            assert!(d.y >= -20.0 && d.y < 0.0);
            assert!(d.v >= 0.85 && d.v < 2.25);
            assert!((5..=11).contains(&d.len));
            assert!(d.a >= 0.08 && d.a < 0.16);
            assert!(d.w == 1 || d.w == 2);
            assert!(d.drift.abs() <= 0.08);
        }
    }

    #[test]
    fn respawn_lands_in_the_upper_band() {
        let mut mt = StdRng::seed_from_u64(2);
        let s = DropletSamplers::new(80, 20);
        let mut d = Droplet::spawn(&s, &mut mt);
        for _ in 0..200 {
            d.respawn(&s, &mut mt);
            assert!(d.y >= -7.0 && d.y < 0.0);
        }
    }

    #[test]
    fn advance_keeps_x_within_the_wrap_margin_every_step() {
        let mut mt = StdRng::seed_from_u64(3);
        let s = DropletSamplers::new(40, 20);
        let mut d = Droplet::spawn(&s, &mut mt);
        for i in 0..2000 {
            let wind = if i % 2 == 0 { 0.35 } else { -0.35 };
            d.advance(wind, 40);
            assert!(d.x >= -WRAP_MARGIN && d.x <= 40.0 + WRAP_MARGIN);
        }
    }

    #[test]
    fn y_increases_monotonically_until_reset() {
        let mut mt = StdRng::seed_from_u64(4);
        let s = DropletSamplers::new(40, 20);
        let mut d = Droplet::spawn(&s, &mut mt);
        let mut prev = d.y;
        for _ in 0..50 {
            d.advance(0.0, 40);
            assert!(d.y > prev);
            prev = d.y;
        }
    }

    #[test]
    fn streak_draw_plots_dotted_run_of_droplet_alpha() {
        let mut buf = PixelBuffer::new();
        buf.resize(120, 60);
        let d = Droplet {
            x: 10.0,
            y: 5.0,
            v: 1.0,
            drift: 0.0,
            a: 0.12,
            w: 1,
            len: 6,
        };
        d.draw(&mut buf, None);
        assert_eq!(buf.sample(10, 5), 0.12);
        assert_eq!(buf.sample(10, 6), 0.0);
        assert_eq!(buf.sample(10, 7), 0.12);
        assert_eq!(buf.sample(10, 9), 0.12);
        assert_eq!(buf.sample(10, 11), 0.0);
    }

    #[test]
    fn sprite_draw_centers_and_boosts_alpha() {
        let mut buf = PixelBuffer::new();
        buf.resize(120, 60);
        let d = Droplet {
            x: 10.0,
            y: 5.0,
            v: 1.0,
            drift: 0.0,
            a: 0.08,
            w: 1,
            len: 6,
        };
        let sp = Sprite::solid();
        d.draw(&mut buf, Some(&sp));
        let (dw, dh) = Sprite::draw_size();
        assert_eq!(d.footprint(Some(&sp)), (dw, dh));
        for dy in 0..dh {
            for dx in 0..dw {
                assert_eq!(buf.sample(10 - dw / 2 + dx, 5 + dy), 0.14);
            }
        }
    }
}
