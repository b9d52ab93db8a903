// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    seq::index,
};

use crate::buffer::PixelBuffer;

const DIAGONALS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];

const SPLASH_BASE_ALPHA: f32 = 0.22;
const SPLASH_CORE_WINDOW: f32 = 0.35;
const RIPPLE_BASE_ALPHA: f32 = 0.09;
const RIPPLE_ANGLE_STEP: f32 = std::f32::consts::PI / 8.0;

#[derive(Clone, Copy, Debug)]
pub struct SplashPart {
    pub dx: f32,
    pub dy: f32,
    pub dist: f32,
    pub crown: bool,
}

/// Burst of pixels spawned at every ground crossing. Geometry is fixed at
/// spawn; only the age-derived alpha and ray offsets change per frame.
#[derive(Clone, Debug)]
pub struct Splash {
    pub x: i32,
    pub y: i32,
    pub born: Instant,
    pub life: Duration,
    pub parts: Vec<SplashPart>,
}

/// Expanding ring spawned on a small fraction of ground crossings.
#[derive(Clone, Copy, Debug)]
pub struct Ripple {
    pub x: i32,
    pub y: i32,
    pub born: Instant,
    pub life: Duration,
    pub max_radius: i32,
}

/// Both short-lived effect pools plus their spawn distributions.
#[derive(Clone, Debug)]
pub struct Effects {
    pub splashes: Vec<Splash>,
    pub ripples: Vec<Ripple>,

    rand_life_ms: Uniform<u16>,
    rand_diag_count: Uniform<usize>,
    rand_diag_dist: Uniform<f32>,
    rand_crown_count: Uniform<usize>,
    rand_crown_dx: Uniform<f32>,
    rand_crown_dy: Uniform<f32>,
    rand_crown_dist: Uniform<f32>,
    rand_ripple_life_ms: Uniform<u16>,
    rand_ripple_radius: Uniform<i32>,
}

impl Effects {
    pub fn new() -> Self {
        Self {
            splashes: Vec::new(),
            ripples: Vec::new(),
            rand_life_ms: Uniform::new_inclusive(170, 230).expect("valid range"),
            rand_diag_count: Uniform::new_inclusive(2, 4).expect("valid range"),
            rand_diag_dist: Uniform::new(1.2, 2.4).expect("valid range"),
            rand_crown_count: Uniform::new_inclusive(1, 2).expect("valid range"),
            rand_crown_dx: Uniform::new(-0.35, 0.35).expect("valid range"),
            rand_crown_dy: Uniform::new(-1.6, -1.05).expect("valid range"),
            rand_crown_dist: Uniform::new(0.7, 1.2).expect("valid range"),
            rand_ripple_life_ms: Uniform::new_inclusive(520, 820).expect("valid range"),
            rand_ripple_radius: Uniform::new_inclusive(4, 8).expect("valid range"),
        }
    }

    pub fn clear(&mut self) {
        self.splashes.clear();
        self.ripples.clear();
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.splashes.is_empty() && self.ripples.is_empty()
    }

    /// 2-4 diagonal rays sampled without replacement from the four
    /// diagonal directions, plus 1-2 near-vertical crown parts.
    pub fn spawn_splash(&mut self, x: f32, y: f32, now: Instant, mt: &mut StdRng) {
        let life = Duration::from_millis(self.rand_life_ms.sample(mt) as u64);

        let diag_count = self.rand_diag_count.sample(mt);
        let mut parts = Vec::with_capacity(diag_count + 2);
        for i in index::sample(mt, DIAGONALS.len(), diag_count).iter() {
            let (dx, dy) = DIAGONALS[i];
            parts.push(SplashPart {
                dx,
                dy,
                dist: self.rand_diag_dist.sample(mt),
                crown: false,
            });
        }

        for _ in 0..self.rand_crown_count.sample(mt) {
            parts.push(SplashPart {
                dx: self.rand_crown_dx.sample(mt),
                dy: self.rand_crown_dy.sample(mt),
                dist: self.rand_crown_dist.sample(mt),
                crown: true,
            });
        }

        self.splashes.push(Splash {
            x: x.round() as i32,
            y: y.round() as i32,
            born: now,
            life,
            parts,
        });
    }

    pub fn spawn_ripple(&mut self, x: f32, y: f32, now: Instant, mt: &mut StdRng) {
        let life = Duration::from_millis(self.rand_ripple_life_ms.sample(mt) as u64);
        self.ripples.push(Ripple {
            x: x.round() as i32,
            y: y.round() as i32,
            born: now,
            life,
            max_radius: self.rand_ripple_radius.sample(mt),
        });
    }

    /// Advance both pools, dropping entities whose age fraction reached 1
    /// and drawing the survivors.
    pub fn advance_and_draw(&mut self, now: Instant, buf: &mut PixelBuffer) {
        self.splashes.retain(|s| {
            let p = age_fraction(now, s.born, s.life);
            if p >= 1.0 {
                return false;
            }
            draw_splash(s, p, buf);
            true
        });

        self.ripples.retain(|r| {
            let p = age_fraction(now, r.born, r.life);
            if p >= 1.0 {
                return false;
            }
            draw_ripple(r, p, buf);
            true
        });
    }

    /// Move every birth timestamp forward, so a pause does not age the
    /// pools while the clock keeps running.
    pub fn shift(&mut self, delta: Duration) {
        for s in &mut self.splashes {
            s.born += delta;
        }
        for r in &mut self.ripples {
            r.born += delta;
        }
    }
}

fn age_fraction(now: Instant, born: Instant, life: Duration) -> f32 {
    let life_s = life.as_secs_f32();
    if life_s <= 0.0 {
        return 1.0;
    }
    now.saturating_duration_since(born).as_secs_f32() / life_s
}

fn draw_splash(s: &Splash, p: f32, buf: &mut PixelBuffer) {
    let base = SPLASH_BASE_ALPHA * (1.0 - p);

    // Central pixel fades out within the first third of the life.
    if p < SPLASH_CORE_WINDOW {
        buf.plot(s.x, s.y, (base * (1.0 - p * 1.8)).max(0.0));
    }

    for part in &s.parts {
        let dist = part.dist * (0.3 + p);
        let px = (s.x as f32 + part.dx * dist).round() as i32;
        let py = (s.y as f32 + part.dy * dist).round() as i32;
        buf.plot(px, py, base);
    }
}

fn draw_ripple(r: &Ripple, p: f32, buf: &mut PixelBuffer) {
    let ri = (r.max_radius as f32 * p).round().max(1.0);
    let alpha = RIPPLE_BASE_ALPHA * (1.0 - p);

    // Discretized ring; nearby angles can land on the same integer point,
    // so deduplicate before plotting.
    let mut pts: Vec<(i32, i32)> = Vec::with_capacity(16);
    let mut a = 0.0f32;
    while a < std::f32::consts::TAU {
        let px = (a.cos() * ri).round() as i32;
        let py = (a.sin() * ri).round() as i32;
        if !pts.contains(&(px, py)) {
            pts.push((px, py));
        }
        a += RIPPLE_ANGLE_STEP;
    }
    for (dx, dy) in pts {
        buf.plot(r.x + dx, r.y + dy, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn buf() -> PixelBuffer {
        let mut b = PixelBuffer::new();
        b.resize(240, 90);
        b
    }

    #[test]
    fn splash_parts_are_distinct_diagonals_plus_crowns() {
        let t0 = Instant::now();
        let mut mt = StdRng::seed_from_u64(11);
        let mut fx = Effects::new();

        for _ in 0..100 {
            fx.clear();
            fx.spawn_splash(20.0, 30.0, t0, &mut mt);
            let s = &fx.splashes[0];

            let rays: Vec<_> = s.parts.iter().filter(|p| !p.crown).collect();
            let crowns: Vec<_> = s.parts.iter().filter(|p| p.crown).collect();

            assert!((2..=4).contains(&rays.len()));
            assert!((1..=2).contains(&crowns.len()));

            for (i, a) in rays.iter().enumerate() {
                assert_eq!(a.dx.abs(), 1.0);
                assert_eq!(a.dy.abs(), 1.0);
                for b in rays.iter().skip(i + 1) {
                    assert!((a.dx, a.dy) != (b.dx, b.dy), "duplicate diagonal");
                }
            }
            for c in crowns {
                assert!(c.dy < -1.0);
                assert!(c.dx.abs() <= 0.35);
            }

            let life = s.life.as_millis();
            assert!((170..=230).contains(&life));
        }
    }

    #[test]
    fn splash_is_removed_exactly_when_age_reaches_life() {
        let t0 = Instant::now();
        let mut mt = StdRng::seed_from_u64(12);
        let mut fx = Effects::new();
        let mut b = buf();

        fx.spawn_splash(20.0, 30.0, t0, &mut mt);
        let life = fx.splashes[0].life;

        fx.advance_and_draw(t0 + life - Duration::from_millis(1), &mut b);
        assert_eq!(fx.splashes.len(), 1);

        fx.advance_and_draw(t0 + life, &mut b);
        assert!(fx.splashes.is_empty());
    }

    #[test]
    fn ripple_ring_grows_with_age() {
        let t0 = Instant::now();
        let mut mt = StdRng::seed_from_u64(13);
        let mut fx = Effects::new();

        fx.spawn_ripple(40.0, 20.0, t0, &mut mt);
        let r = fx.ripples[0];

        let mut early = buf();
        fx.advance_and_draw(t0 + r.life / 10, &mut early);
        let mut late = buf();
        fx.advance_and_draw(t0 + (r.life * 9) / 10, &mut late);

        let spread = |b: &PixelBuffer| {
            let mut max_d2 = 0i32;
            for y in 0..b.height() as i32 {
                for x in 0..b.width() as i32 {
                    if b.sample(x, y) > 0.0 {
                        let (dx, dy) = (x - r.x, y - r.y);
                        max_d2 = max_d2.max(dx * dx + dy * dy);
                    }
                }
            }
            max_d2
        };
        assert!(spread(&late) > spread(&early));
        assert!(fx.ripples.len() == 1);

        let mut done = buf();
        fx.advance_and_draw(t0 + r.life, &mut done);
        assert!(fx.ripples.is_empty());
    }

    #[test]
    fn splash_core_pixel_disappears_after_the_first_third() {
        let t0 = Instant::now();
        let mut mt = StdRng::seed_from_u64(14);
        let mut fx = Effects::new();
        fx.spawn_splash(20.0, 20.0, t0, &mut mt);
        let s = fx.splashes[0].clone();

        let mut early = buf();
        fx.advance_and_draw(t0 + Duration::from_millis(1), &mut early);
        assert!(early.sample(s.x, s.y) > 0.0);

        // Past the core window the center only lights up if some ray
        // happens to cross it, so use a fresh pool with rays stripped.
        fx.clear();
        let mut bare = s;
        bare.parts.clear();
        let (born, life) = (bare.born, bare.life);
        fx.splashes.push(bare);
        let mut late = buf();
        fx.advance_and_draw(born + (life * 2) / 5, &mut late);
        assert_eq!(late.sample(20, 20), 0.0);
    }

    #[test]
    fn shift_delays_expiry() {
        let t0 = Instant::now();
        let mut mt = StdRng::seed_from_u64(15);
        let mut fx = Effects::new();
        let mut b = buf();

        fx.spawn_splash(20.0, 30.0, t0, &mut mt);
        let life = fx.splashes[0].life;

        fx.shift(Duration::from_millis(500));
        fx.advance_and_draw(t0 + life, &mut b);
        assert_eq!(fx.splashes.len(), 1);
    }
}
