// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
};

/// Fraction of the remaining distance to the target closed per tick.
pub const EASE: f32 = 0.02;

/// Slowly-varying horizontal bias shared by every droplet. The target is
/// re-rolled on a randomized schedule; `current` only ever eases toward it.
#[derive(Clone, Debug)]
pub struct Wind {
    current: f32,
    target: f32,
    next_retarget: Instant,
    rand_target: Uniform<f32>,
    rand_interval_ms: Uniform<u16>,
}

impl Wind {
    pub fn new(now: Instant, max: f32, interval_ms: (u16, u16)) -> Self {
        let max = max.max(0.001);
        let (lo, hi) = if interval_ms.0 <= interval_ms.1 {
            interval_ms
        } else {
            (interval_ms.1, interval_ms.0)
        };
        Self {
            current: 0.0,
            target: 0.0,
            next_retarget: now,
            rand_target: Uniform::new(-max, max).expect("valid range"),
            rand_interval_ms: Uniform::new_inclusive(lo.max(1), hi.max(1)).expect("valid range"),
        }
    }

    #[allow(dead_code)]
    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn tick(&mut self, now: Instant, mt: &mut StdRng) -> f32 {
        if now >= self.next_retarget {
            self.target = self.rand_target.sample(mt);
            let ms = self.rand_interval_ms.sample(mt) as u64;
            self.next_retarget = now + Duration::from_millis(ms);
        }
        self.current += (self.target - self.current) * EASE;
        self.current
    }

    pub fn shift(&mut self, delta: Duration) {
        self.next_retarget += delta;
    }
}
