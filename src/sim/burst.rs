// burst.rs - Explosion particles
//
// Spawned in batches at a point, fly outward with drag, and die when
// their life runs out. The only 2D entity with a finite lifespan.

use std::f32::consts::TAU;

use super::{MAX_BURST, SmallRng, unit};
use crate::config::CosmosConfig;
use crate::render::{Rgba, Surface};

const GLOW: f32 = 20.0;

pub struct Bursts {
    // Position
    pub x: [f32; MAX_BURST],
    pub y: [f32; MAX_BURST],

    // Heading (unit vector) and scalar speed
    pub dx: [f32; MAX_BURST],
    pub dy: [f32; MAX_BURST],
    pub speed: [f32; MAX_BURST],

    // Visual
    pub size: [f32; MAX_BURST],
    pub hue: [f32; MAX_BURST],

    // Lifetime: starts at 1, loses `decay` per tick
    pub life: [f32; MAX_BURST],
    pub decay: [f32; MAX_BURST],

    // Count
    pub n: usize,
}

impl Bursts {
    pub fn new() -> Self {
        Self {
            x: [0.0; MAX_BURST],
            y: [0.0; MAX_BURST],
            dx: [0.0; MAX_BURST],
            dy: [0.0; MAX_BURST],
            speed: [0.0; MAX_BURST],
            size: [0.0; MAX_BURST],
            hue: [0.0; MAX_BURST],
            life: [0.0; MAX_BURST],
            decay: [0.0; MAX_BURST],
            n: 0,
        }
    }

    pub fn clear(&mut self) {
        self.n = 0;
    }

    /// Emit up to `count` particles from (cx, cy). Returns how many fit.
    pub fn spawn(&mut self, cx: f32, cy: f32, count: usize, cfg: &CosmosConfig, rng: &mut SmallRng) -> usize {
        let mut made = 0;
        for _ in 0..count {
            if self.n >= MAX_BURST { break; }

            let i = self.n;
            let angle = unit(rng) * TAU;
            self.x[i] = cx;
            self.y[i] = cy;
            self.dx[i] = angle.cos();
            self.dy[i] = angle.sin();
            self.speed[i] = cfg.burst_speed.sample(rng);
            self.size[i] = cfg.burst_size.sample(rng);
            self.hue[i] = cfg.burst_hue.sample(rng);
            self.life[i] = 1.0;
            self.decay[i] = cfg.burst_decay.sample(rng);
            self.n += 1;
            made += 1;
        }
        made
    }

    /// Advance and drop every particle whose life reached zero this tick
    pub fn update(&mut self, drag: f32) {
        let mut write = 0;

        for read in 0..self.n {
            let life = self.life[read] - self.decay[read];
            if life <= 0.0 { continue; }

            let speed = self.speed[read];
            self.x[write] = self.x[read] + self.dx[read] * speed;
            self.y[write] = self.y[read] + self.dy[read] * speed;
            self.dx[write] = self.dx[read];
            self.dy[write] = self.dy[read];
            self.speed[write] = speed * drag;
            self.size[write] = self.size[read];
            self.hue[write] = self.hue[read];
            self.life[write] = life;
            self.decay[write] = self.decay[read];
            write += 1;
        }

        self.n = write;
    }

    /// Only live particles are stored, so everything here is drawn.
    pub fn draw(&self, surface: &mut impl Surface) {
        for i in 0..self.n {
            let color = Rgba::hsla(self.hue[i], 1.0, 0.5, self.life[i]);
            surface.fill_circle(self.x[i], self.y[i], self.size[i], color, GLOW);
        }
    }
}

impl Default for Bursts {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Span;
    use crate::sim::seeded;

    #[test]
    fn spawn_starts_at_origin_with_full_life() {
        let mut b = Bursts::new();
        let made = b.spawn(400.0, 300.0, 50, &CosmosConfig::default(), &mut seeded(1));
        assert_eq!(made, 50);
        for i in 0..b.n {
            assert_eq!((b.x[i], b.y[i], b.life[i]), (400.0, 300.0, 1.0));
            let norm = b.dx[i] * b.dx[i] + b.dy[i] * b.dy[i];
            assert!((norm - 1.0).abs() < 1e-4);
            assert!((0.01..=0.03).contains(&b.decay[i]));
        }
    }

    #[test]
    fn spawn_is_capped() {
        let mut b = Bursts::new();
        let cfg = CosmosConfig::default();
        let mut rng = seeded(2);
        b.spawn(0.0, 0.0, MAX_BURST - 10, &cfg, &mut rng);
        assert_eq!(b.spawn(0.0, 0.0, 50, &cfg, &mut rng), 10);
        assert_eq!(b.n, MAX_BURST);
    }

    #[test]
    fn speed_decays_by_drag() {
        let mut b = Bursts::new();
        let mut cfg = CosmosConfig::default();
        cfg.burst_speed = Span(5.0, 5.0);
        b.spawn(0.0, 0.0, 1, &cfg, &mut seeded(3));
        b.update(0.98);
        assert!((b.speed[0] - 4.9).abs() < 1e-5);
        let travelled = (b.x[0] * b.x[0] + b.y[0] * b.y[0]).sqrt();
        assert!((travelled - 5.0).abs() < 1e-4);
    }

    #[test]
    fn removed_in_the_tick_life_runs_out() {
        let mut b = Bursts::new();
        let mut cfg = CosmosConfig::default();
        cfg.burst_decay = Span(0.25, 0.25);
        b.spawn(0.0, 0.0, 10, &cfg, &mut seeded(4));
        for _ in 0..3 {
            b.update(0.98);
            assert_eq!(b.n, 10);
        }
        b.update(0.98);
        assert_eq!(b.n, 0);
    }

    #[test]
    fn compaction_keeps_survivors_intact() {
        let mut b = Bursts::new();
        b.n = 3;
        for i in 0..3 {
            b.life[i] = 1.0;
            b.hue[i] = i as f32;
        }
        b.decay[0] = 0.1;
        b.decay[1] = 2.0;
        b.decay[2] = 0.1;
        b.update(1.0);
        assert_eq!(b.n, 2);
        assert_eq!(&b.hue[..2], &[0.0, 2.0]);
    }
}
