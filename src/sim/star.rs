// star.rs - Twinkling background stars
//
// Drift with toroidal wrap; opacity bounces inside [0, 1].

use super::{MAX_STARS, SmallRng, centered, oscillate, unit, wrap};
use crate::config::CosmosConfig;
use crate::render::{Rgb, Surface};

const GLOW: f32 = 10.0;

pub struct Stars {
    // Position
    pub x: [f32; MAX_STARS],
    pub y: [f32; MAX_STARS],

    // Velocity
    pub vx: [f32; MAX_STARS],
    pub vy: [f32; MAX_STARS],

    // Visual
    pub size: [f32; MAX_STARS],
    pub opacity: [f32; MAX_STARS],
    pub fade: [f32; MAX_STARS],  // signed twinkle rate per tick

    // Count
    pub n: usize,
}

impl Stars {
    pub fn new() -> Self {
        Self {
            x: [0.0; MAX_STARS],
            y: [0.0; MAX_STARS],
            vx: [0.0; MAX_STARS],
            vy: [0.0; MAX_STARS],
            size: [0.0; MAX_STARS],
            opacity: [0.0; MAX_STARS],
            fade: [0.0; MAX_STARS],
            n: 0,
        }
    }

    pub fn clear(&mut self) {
        self.n = 0;
    }

    /// Scatter `count` stars uniformly over the screen
    pub fn spawn(&mut self, count: usize, w: f32, h: f32, cfg: &CosmosConfig, rng: &mut SmallRng) {
        for _ in 0..count {
            if self.n >= MAX_STARS { return; }

            let i = self.n;
            self.x[i] = unit(rng) * w;
            self.y[i] = unit(rng) * h;
            self.size[i] = cfg.star_size.sample(rng);
            self.vx[i] = centered(rng, cfg.star_speed);
            self.vy[i] = centered(rng, cfg.star_speed);
            self.opacity[i] = unit(rng);
            self.fade[i] = centered(rng, cfg.star_fade);
            self.n += 1;
        }
    }

    /// Move, twinkle and wrap at the current screen bounds
    pub fn update(&mut self, w: f32, h: f32) {
        for i in 0..self.n {
            let (o, f) = oscillate(self.opacity[i], self.fade[i], 0.0, 1.0);
            self.opacity[i] = o;
            self.fade[i] = f;

            self.x[i] = wrap(self.x[i] + self.vx[i], 0.0, w);
            self.y[i] = wrap(self.y[i] + self.vy[i], 0.0, h);
        }
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        for i in 0..self.n {
            surface.fill_circle(self.x[i], self.y[i], self.size[i], Rgb::WHITE.alpha(self.opacity[i]), GLOW);
        }
    }
}

impl Default for Stars {
    fn default() -> Self {
        Self::new()
    }
}
