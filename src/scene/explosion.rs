// explosion.rs - One-shot 3D particle burst
//
// Every particle starts at the ignition point with a uniformly random
// direction on the unit sphere and a random speed. The burst runs for a
// fixed lifetime and is then finished; it never respawns on its own.

use glam::Vec3;
use rand::Rng;

use super::MAX_EXPLOSION;
use crate::config::Span;

// Distance per second per unit of speed (0.05 world units per 60 Hz frame)
const TRAVEL: f32 = 3.0;

pub struct Explosion {
    pub pos: [Vec3; MAX_EXPLOSION],
    pub vel: [Vec3; MAX_EXPLOSION],
    pub n: usize,

    pub age: f32,
    pub lifetime: f32,
    pub opacity: f32,
    active: bool,
}

impl Explosion {
    pub fn new(lifetime: f32) -> Self {
        Self {
            pos: [Vec3::ZERO; MAX_EXPLOSION],
            vel: [Vec3::ZERO; MAX_EXPLOSION],
            n: 0,
            age: 0.0,
            lifetime,
            opacity: 1.0,
            active: false,
        }
    }

    /// Restart at `origin` with `count` particles (capped at capacity).
    pub fn ignite(&mut self, origin: Vec3, count: usize, speed: Span, rng: &mut impl Rng) {
        use std::f32::consts::TAU;

        self.n = count.min(MAX_EXPLOSION);
        for i in 0..self.n {
            let theta = rng.random::<f32>() * TAU;
            let phi = (rng.random::<f32>() * 2.0 - 1.0).acos();
            let dir = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            self.pos[i] = origin;
            self.vel[i] = dir * speed.sample(rng);
        }
        self.age = 0.0;
        self.opacity = 1.0;
        self.active = true;
    }

    /// Move every particle. Returns true on the tick the lifetime runs out.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        for i in 0..self.n {
            self.pos[i] += self.vel[i] * (dt * TRAVEL);
        }
        self.age += dt;
        self.age >= self.lifetime
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn finished(&self) -> bool {
        self.active && self.age >= self.lifetime
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.n = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::seeded;

    #[test]
    fn directions_are_unit_scaled_by_speed() {
        let mut e = Explosion::new(0.8);
        let mut rng = seeded(3);
        e.ignite(Vec3::ZERO, 800, Span(2.0, 5.0), &mut rng);
        assert_eq!(e.n, 800);
        for i in 0..e.n {
            let s = e.vel[i].length();
            assert!((2.0 - 1e-4..=5.0 + 1e-4).contains(&s), "speed {s}");
        }
    }

    #[test]
    fn spreads_in_every_octant() {
        let mut e = Explosion::new(0.8);
        let mut rng = seeded(4);
        e.ignite(Vec3::ZERO, 800, Span(2.0, 5.0), &mut rng);
        let mut seen = [false; 8];
        for v in &e.vel[..e.n] {
            let k = (v.x > 0.0) as usize | ((v.y > 0.0) as usize) << 1 | ((v.z > 0.0) as usize) << 2;
            seen[k] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn finishes_after_lifetime() {
        let mut e = Explosion::new(0.8);
        let mut rng = seeded(5);
        e.ignite(Vec3::new(0.0, 0.1, 0.0), 10, Span(2.0, 5.0), &mut rng);
        let mut ticks = 0;
        while !e.update(0.1) {
            ticks += 1;
            assert!(ticks < 20);
        }
        assert!(e.finished());
        e.hide();
        assert!(!e.is_active());
        assert!(!e.update(0.1));
    }

    #[test]
    fn capped_at_capacity() {
        let mut e = Explosion::new(0.8);
        let mut rng = seeded(6);
        e.ignite(Vec3::ZERO, MAX_EXPLOSION + 10, Span(1.0, 1.0), &mut rng);
        assert_eq!(e.n, MAX_EXPLOSION);
    }
}
