// nebula.rs - Soft glowing gas clouds
//
// Large radial-gradient blobs. They wrap with a margin of their own radius
// so a cloud leaves the screen completely before reappearing, and pulse
// their opacity inside a configured band.

use super::{MAX_NEBULAE, SmallRng, centered, oscillate, unit, wrap};
use crate::config::{CosmosConfig, Span};
use crate::render::{Rgba, Stop, Surface};

const HUE_SHIFT: f32 = 30.0;

pub struct Nebulae {
    // Position
    pub x: [f32; MAX_NEBULAE],
    pub y: [f32; MAX_NEBULAE],

    // Velocity
    pub vx: [f32; MAX_NEBULAE],
    pub vy: [f32; MAX_NEBULAE],

    // Visual
    pub radius: [f32; MAX_NEBULAE],
    pub hue: [f32; MAX_NEBULAE],
    pub opacity: [f32; MAX_NEBULAE],
    pub pulse: [f32; MAX_NEBULAE],  // signed

    // Opacity band shared by every cloud
    pub band: Span,

    // Count
    pub n: usize,
}

impl Nebulae {
    pub fn new(band: Span) -> Self {
        Self {
            x: [0.0; MAX_NEBULAE],
            y: [0.0; MAX_NEBULAE],
            vx: [0.0; MAX_NEBULAE],
            vy: [0.0; MAX_NEBULAE],
            radius: [0.0; MAX_NEBULAE],
            hue: [0.0; MAX_NEBULAE],
            opacity: [0.0; MAX_NEBULAE],
            pulse: [0.0; MAX_NEBULAE],
            band,
            n: 0,
        }
    }

    pub fn clear(&mut self) {
        self.n = 0;
    }

    pub fn spawn(&mut self, count: usize, w: f32, h: f32, cfg: &CosmosConfig, rng: &mut SmallRng) {
        for _ in 0..count {
            if self.n >= MAX_NEBULAE { return; }

            let i = self.n;
            self.x[i] = unit(rng) * w;
            self.y[i] = unit(rng) * h;
            self.radius[i] = cfg.nebula_radius.sample(rng);
            self.vx[i] = centered(rng, cfg.nebula_speed);
            self.vy[i] = centered(rng, cfg.nebula_speed);
            self.hue[i] = unit(rng) * 360.0;
            self.opacity[i] = self.band.sample(rng);
            self.pulse[i] = cfg.nebula_pulse.sample(rng);
            self.n += 1;
        }
    }

    pub fn update(&mut self, w: f32, h: f32) {
        let (lo, hi) = (self.band.min(), self.band.max());

        for i in 0..self.n {
            let r = self.radius[i];
            self.x[i] = wrap(self.x[i] + self.vx[i], -r, w + r);
            self.y[i] = wrap(self.y[i] + self.vy[i], -r, h + r);

            let (o, p) = oscillate(self.opacity[i], self.pulse[i], lo, hi);
            self.opacity[i] = o;
            self.pulse[i] = p;
        }
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        for i in 0..self.n {
            let (hue, o) = (self.hue[i], self.opacity[i]);
            let stops = [
                Stop::new(0.0, Rgba::hsla(hue, 1.0, 0.5, o)),
                Stop::new(0.5, Rgba::hsla(hue + HUE_SHIFT, 1.0, 0.5, o * 0.5)),
                Stop::new(1.0, Rgba::TRANSPARENT),
            ];
            surface.radial_gradient(self.x[i], self.y[i], self.radius[i], &stops);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Tally;
    use crate::sim::seeded;

    fn clouds() -> Nebulae {
        let cfg = CosmosConfig::default();
        let mut n = Nebulae::new(cfg.nebula_opacity);
        n.spawn(15, 800.0, 600.0, &cfg, &mut seeded(5));
        n
    }

    #[test]
    fn opacity_stays_in_band() {
        let mut n = clouds();
        for _ in 0..10_000 {
            n.update(800.0, 600.0);
            for i in 0..n.n {
                assert!((0.1..=0.4).contains(&n.opacity[i]), "{}", n.opacity[i]);
            }
        }
    }

    #[test]
    fn wraps_only_after_fully_leaving() {
        let mut n = Nebulae::new(Span(0.1, 0.4));
        n.n = 1;
        n.radius[0] = 100.0;
        n.opacity[0] = 0.2;
        n.x[0] = -50.0;
        n.vx[0] = -1.0;
        n.update(800.0, 600.0);
        // Still partly visible: no teleport yet
        assert_eq!(n.x[0], -51.0);

        n.x[0] = -100.0;
        n.update(800.0, 600.0);
        assert_eq!(n.x[0], 900.0);
    }

    #[test]
    fn draws_gradients() {
        let n = clouds();
        let mut tally = Tally::new(800, 600);
        n.draw(&mut tally);
        assert_eq!(tally.gradients, 15);
        assert!(tally.max_alpha <= 0.4 + 1e-6);
    }
}
