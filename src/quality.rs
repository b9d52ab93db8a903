// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crate::buffer::SCALE_NARROW_COLS;

pub const SAMPLE_WINDOW: Duration = Duration::from_millis(1200);
pub const FPS_LOW: f32 = 52.0;
pub const FPS_HIGH: f32 = 58.0;
pub const SHRINK_FACTOR: f32 = 0.88;
pub const GROW_STEP: usize = 10;

/// Population floor and ceiling as a function of viewport width. Narrow
/// surfaces get a lower band.
pub fn drop_bounds(cols: u16) -> (usize, usize) {
    if cols < SCALE_NARROW_COLS {
        (40, 140)
    } else {
        (60, 260)
    }
}

/// Hysteresis step: multiplicative shrink below the low threshold,
/// fixed additive growth above the high one, nothing in between.
pub fn adjust(target: usize, fps: f32, min: usize, max: usize) -> usize {
    if fps < FPS_LOW && target > min {
        ((target as f32 * SHRINK_FACTOR).floor() as usize).max(min)
    } else if fps > FPS_HIGH && target < max {
        (target + GROW_STEP).min(max)
    } else {
        target
    }
}

/// Rolling frame counter. Feeds one realized-fps figure per window into
/// `adjust`.
#[derive(Clone, Copy, Debug)]
pub struct FpsGovernor {
    frames: u32,
    window_start: Instant,
}

impl FpsGovernor {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.frames = 0;
        self.window_start = now;
    }

    /// Count one frame; when the window has elapsed, report the realized
    /// frame rate and open a fresh window.
    pub fn sample(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < SAMPLE_WINDOW {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32().max(f32::EPSILON);
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }

    pub fn shift(&mut self, delta: Duration) {
        self.window_start += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_feed_shrinks_but_never_below_the_floor() {
        let (min, max) = (40, 140);
        let mut target = 140;
        let mut last = target;
        for _ in 0..50 {
            target = adjust(target, 45.0, min, max);
            assert!(target <= last);
            assert!(target >= min);
            last = target;
        }
        assert_eq!(target, min);
    }

    #[test]
    fn fast_feed_grows_but_never_above_the_ceiling() {
        let (min, max) = (60, 260);
        let mut target = 60;
        for _ in 0..50 {
            let next = adjust(target, 60.0, min, max);
            assert!(next >= target);
            assert!(next <= max);
            target = next;
        }
        assert_eq!(target, max);
    }

    #[test]
    fn mid_band_leaves_the_target_alone() {
        assert_eq!(adjust(100, 55.0, 60, 260), 100);
    }

    #[test]
    fn governor_reports_once_per_window() {
        let t0 = Instant::now();
        let mut g = FpsGovernor::new(t0);

        let mut fps = None;
        for i in 1..=80u64 {
            let now = t0 + Duration::from_millis(i * 16);
            if let Some(f) = g.sample(now) {
                fps = Some((i, f));
                break;
            }
        }
        let (frame, fps) = fps.expect("window elapsed");
        assert_eq!(frame, 75); // first frame at or past 1.2s
        assert!((fps - 62.5).abs() < 1.0);
    }

    #[test]
    fn bounds_follow_viewport_width() {
        assert_eq!(drop_bounds(100), (40, 140));
        assert_eq!(drop_bounds(200), (60, 260));
    }
}
