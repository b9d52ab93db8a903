// Copyright (c) 2026 rezky_nightky

use std::time::Instant;

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
};

use crate::buffer::PixelBuffer;
use crate::droplet::{Droplet, DropletSamplers};
use crate::frame::Frame;
use crate::palette::RenderStyle;
use crate::quality::{self, FpsGovernor};
use crate::splash::Effects;
use crate::sprite::Sprite;
use crate::wind::Wind;

/// Baseline droplet count per buffer-pixel of width, before density and
/// the floor/ceiling clamp.
const POPULATION_PER_WIDTH: f32 = 0.28;

pub struct EngineOptions {
    pub density: f32,
    pub wind_max: f32,
    pub wind_interval_ms: (u16, u16),
    pub ripple_chance: f32,
    pub sprite: Option<Sprite>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            density: 1.0,
            wind_max: 0.35,
            wind_interval_ms: (1500, 3200),
            ripple_chance: 0.035,
            sprite: None,
        }
    }
}

/// The whole simulation: droplet pool, wind, impact effects, quality
/// governor and the offscreen buffer they draw into. Owned by the frame
/// loop; every mutation happens inside `step` or between frames.
pub struct RainEngine {
    running: bool,
    paused: bool,
    pause_time: Option<Instant>,

    cols: u16,
    lines: u16,

    buffer: PixelBuffer,
    drops: Vec<Droplet>,
    samplers: DropletSamplers,
    wind: Wind,
    effects: Effects,
    governor: FpsGovernor,

    drop_target: usize,
    drop_min: usize,
    drop_max: usize,

    density: f32,
    ripple_chance: f32,
    sprite: Option<Sprite>,

    rand_chance: Uniform<f32>,
    mt: StdRng,
}

impl RainEngine {
    pub fn new(opts: EngineOptions, mt: StdRng, now: Instant) -> Self {
        let buffer = PixelBuffer::new();
        let samplers = DropletSamplers::new(buffer.width(), buffer.height());
        Self {
            running: false,
            paused: false,
            pause_time: None,
            cols: 0,
            lines: 0,
            buffer,
            drops: Vec::new(),
            samplers,
            wind: Wind::new(now, opts.wind_max, opts.wind_interval_ms),
            effects: Effects::new(),
            governor: FpsGovernor::new(now),
            drop_target: 0,
            drop_min: 0,
            drop_max: 0,
            density: opts.density.clamp(0.01, 5.0),
            ripple_chance: opts.ripple_chance.clamp(0.0, 1.0),
            sprite: opts.sprite,
            rand_chance: Uniform::new(0.0, 1.0).expect("valid range"),
            mt,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    #[allow(dead_code)]
    pub fn drop_count(&self) -> usize {
        self.drops.len()
    }

    pub fn drop_target(&self) -> usize {
        self.drop_target
    }

    pub fn set_density(&mut self, density: f32) {
        self.density = density.clamp(0.01, 5.0);
        self.retarget_population();
    }

    /// Full geometry measurement: resize the buffer, rebuild the samplers
    /// and re-derive the population band from the new width.
    fn measure(&mut self, cols: u16, lines: u16) {
        self.cols = cols;
        self.lines = lines;
        self.buffer.resize(cols, lines);
        self.samplers = DropletSamplers::new(self.buffer.width(), self.buffer.height());
        let (min, max) = quality::drop_bounds(cols);
        self.drop_min = min;
        self.drop_max = max;
        self.retarget_population();
    }

    fn retarget_population(&mut self) {
        let wanted =
            (self.buffer.width() as f32 * POPULATION_PER_WIDTH * self.density).floor() as usize;
        self.ensure_population(wanted.clamp(self.drop_min, self.drop_max));
    }

    /// Resize the pool to exactly `target`: append freshly randomized
    /// droplets or truncate from the end.
    pub fn ensure_population(&mut self, target: usize) {
        self.drop_target = target;
        while self.drops.len() < target {
            self.drops.push(Droplet::spawn(&self.samplers, &mut self.mt));
        }
        self.drops.truncate(target);
    }

    pub fn start(&mut self, now: Instant, cols: u16, lines: u16) {
        if self.running {
            return;
        }
        self.measure(cols, lines);
        self.governor.restart(now);
        self.paused = false;
        self.pause_time = None;
        self.running = true;
    }

    /// Idempotent. Leaves both drawing surfaces blank and every transient
    /// effect list empty, so a later `start` begins from a clean slate.
    pub fn stop(&mut self, frame: &mut Frame) {
        self.running = false;
        self.paused = false;
        self.pause_time = None;
        self.buffer.clear();
        self.effects.clear();
        frame.clear();
    }

    /// Re-measure while running; droplets keep falling, out-of-range x
    /// values are corrected by the next wraparound.
    pub fn resize(&mut self, cols: u16, lines: u16) {
        self.measure(cols, lines);
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        self.paused = !self.paused;
        if self.paused {
            self.pause_time = Some(now);
        } else if let Some(pt) = self.pause_time.take() {
            let elapsed = now.saturating_duration_since(pt);
            self.effects.shift(elapsed);
            self.wind.shift(elapsed);
            self.governor.shift(elapsed);
        }
    }

    /// One complete simulation frame: wind, droplets (collisions feed the
    /// effect pools), effects, composite to the visible frame, then a
    /// quality-governor sample.
    pub fn step(&mut self, now: Instant, frame: &mut Frame, style: &RenderStyle) {
        if !self.running || self.paused {
            return;
        }

        let wind = self.wind.tick(now, &mut self.mt);

        self.buffer.clear();

        let ground = self.buffer.ground_y();
        let buffer_w = self.buffer.width();
        for i in 0..self.drops.len() {
            let mut d = self.drops[i];
            d.advance(wind, buffer_w);

            let (_, fh) = d.footprint(self.sprite.as_ref());
            let bottom = d.y.round() as i32 + fh;
            if bottom > ground {
                self.effects.spawn_splash(d.x, ground as f32, now, &mut self.mt);
                if self.rand_chance.sample(&mut self.mt) < self.ripple_chance {
                    self.effects
                        .spawn_ripple(d.x, (ground + 1) as f32, now, &mut self.mt);
                }
                d.respawn(&self.samplers, &mut self.mt);
                self.drops[i] = d;
                continue;
            }

            d.draw(&mut self.buffer, self.sprite.as_ref());
            self.drops[i] = d;
        }

        self.effects.advance_and_draw(now, &mut self.buffer);

        self.buffer.present(frame, style);

        if let Some(fps) = self.governor.sample(now) {
            let next = quality::adjust(self.drop_target, fps, self.drop_min, self.drop_max);
            if next != self.drop_target {
                self.ensure_population(next);
            }
        }
    }
}
