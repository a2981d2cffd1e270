// node.rs - Network web nodes
//
// Bounce off the screen edges instead of wrapping. Positions are clamped
// into bounds every tick so float drift, or a shrinking screen, can never
// leave a node outside.

use super::{MAX_NODES, SmallRng, centered, unit};
use crate::config::NetworkConfig;
use crate::render::{Rgba, Surface};

const GLOW: f32 = 30.0;

pub struct Nodes {
    // Position
    pub x: [f32; MAX_NODES],
    pub y: [f32; MAX_NODES],

    // Velocity
    pub vx: [f32; MAX_NODES],
    pub vy: [f32; MAX_NODES],

    // Visual
    pub radius: [f32; MAX_NODES],
    pub hue: [f32; MAX_NODES],

    // Count
    pub n: usize,
}

impl Nodes {
    pub fn new() -> Self {
        Self {
            x: [0.0; MAX_NODES],
            y: [0.0; MAX_NODES],
            vx: [0.0; MAX_NODES],
            vy: [0.0; MAX_NODES],
            radius: [0.0; MAX_NODES],
            hue: [0.0; MAX_NODES],
            n: 0,
        }
    }

    pub fn clear(&mut self) {
        self.n = 0;
    }

    pub fn spawn(&mut self, count: usize, w: f32, h: f32, cfg: &NetworkConfig, rng: &mut SmallRng) {
        for _ in 0..count {
            if self.n >= MAX_NODES { return; }

            let i = self.n;
            self.x[i] = unit(rng) * w;
            self.y[i] = unit(rng) * h;
            self.vx[i] = centered(rng, cfg.node_speed);
            self.vy[i] = centered(rng, cfg.node_speed);
            self.radius[i] = cfg.node_radius.sample(rng);
            self.hue[i] = unit(rng) * 360.0;
            self.n += 1;
        }
    }

    pub fn update(&mut self, w: f32, h: f32) {
        for i in 0..self.n {
            let (x, vx) = bounce(self.x[i] + self.vx[i], self.vx[i], w);
            let (y, vy) = bounce(self.y[i] + self.vy[i], self.vy[i], h);
            self.x[i] = x;
            self.y[i] = y;
            self.vx[i] = vx;
            self.vy[i] = vy;
        }
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        for i in 0..self.n {
            let color = Rgba::hsla(self.hue[i], 1.0, 0.6, 1.0);
            surface.fill_circle(self.x[i], self.y[i], self.radius[i], color, GLOW);
        }
    }
}

impl Default for Nodes {
    fn default() -> Self {
        Self::new()
    }
}

/// Reflect the velocity back inside [0, max] on contact and clamp.
#[inline]
fn bounce(p: f32, v: f32, max: f32) -> (f32, f32) {
    if p < 0.0 {
        (0.0, v.abs())
    } else if p > max {
        (max, -v.abs())
    } else {
        (p, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(x: f32, y: f32, vx: f32, vy: f32) -> Nodes {
        let mut n = Nodes::new();
        n.n = 1;
        n.x[0] = x;
        n.y[0] = y;
        n.vx[0] = vx;
        n.vy[0] = vy;
        n
    }

    #[test]
    fn bounces_off_right_edge() {
        let mut n = one(799.0, 300.0, 1.5, 0.0);
        n.update(800.0, 600.0);
        assert_eq!(n.x[0], 800.0);
        assert_eq!(n.vx[0], -1.5);
        n.update(800.0, 600.0);
        assert_eq!(n.x[0], 798.5);
    }

    #[test]
    fn bounces_off_top_edge() {
        let mut n = one(10.0, 0.5, 0.0, -1.0);
        n.update(800.0, 600.0);
        assert_eq!(n.y[0], 0.0);
        assert_eq!(n.vy[0], 1.0);
    }

    #[test]
    fn clamped_after_shrink_even_when_heading_inward() {
        let mut n = one(700.0, 500.0, -1.0, -1.0);
        n.update(400.0, 300.0);
        assert_eq!((n.x[0], n.y[0]), (400.0, 300.0));
        n.update(400.0, 300.0);
        assert!(n.x[0] <= 400.0 && n.y[0] <= 300.0);
    }
}
