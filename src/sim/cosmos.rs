// cosmos.rs - Starfield background with nebulae and periodic bursts
//
// Per tick: fade the previous frame (trails), then nebulae, stars and
// burst particles update and draw in that order, then the burst timer
// may fire a new burst at a random point.

use log::debug;

use super::{Bursts, Nebulae, Simulation, SmallRng, Stars, seeded, unit};
use crate::config::CosmosConfig;
use crate::render::Surface;

pub struct CosmosWorld {
    // Screen dimensions
    w: u32,
    h: u32,

    config: CosmosConfig,

    // Entities
    stars: Stars,
    nebulae: Nebulae,
    bursts: Bursts,

    // Ticks since the last automatic burst
    burst_timer: u32,
    frame: u64,

    rng: SmallRng,
}

impl CosmosWorld {
    pub fn new(w: u32, h: u32, config: CosmosConfig, seed: u64) -> Self {
        let mut rng = seeded(seed);
        let (fw, fh) = (w as f32, h as f32);

        let mut stars = Stars::new();
        stars.spawn(config.star_count, fw, fh, &config, &mut rng);

        let mut nebulae = Nebulae::new(config.nebula_opacity);
        nebulae.spawn(config.nebula_count, fw, fh, &config, &mut rng);

        let mut world = Self {
            w,
            h,
            config,
            stars,
            nebulae,
            bursts: Bursts::new(),
            burst_timer: 0,
            frame: 0,
            rng,
        };

        if world.config.initial_burst {
            let count = world.config.burst_count;
            world.burst(fw / 2.0, fh / 2.0, count);
        }
        world
    }

    /// Emit a burst of `count` particles at (x, y). Returns how many fit.
    pub fn burst(&mut self, x: f32, y: f32, count: usize) -> usize {
        let made = self.bursts.spawn(x, y, count, &self.config, &mut self.rng);
        debug!("cosmos: burst of {made} at ({x:.0}, {y:.0}), {} live", self.bursts.n);
        made
    }

    pub fn config(&self) -> &CosmosConfig { &self.config }
    pub fn stars(&self) -> &Stars { &self.stars }
    pub fn nebulae(&self) -> &Nebulae { &self.nebulae }
    pub fn bursts(&self) -> &Bursts { &self.bursts }
    pub fn frame(&self) -> u64 { self.frame }
    pub fn width(&self) -> u32 { self.w }
    pub fn height(&self) -> u32 { self.h }

    fn periodic_burst(&mut self) {
        let Some(interval) = self.config.burst_interval else { return };

        self.burst_timer += 1;
        if self.burst_timer < interval { return; }
        self.burst_timer = 0;

        let large = unit(&mut self.rng) < self.config.large_burst_chance;
        let count = if large { self.config.large_burst_count } else { self.config.burst_count };
        let x = unit(&mut self.rng) * self.w as f32;
        let y = unit(&mut self.rng) * self.h as f32;
        self.burst(x, y, count);
    }
}

impl Simulation for CosmosWorld {
    fn resize(&mut self, w: u32, h: u32) {
        self.w = w;
        self.h = h;
    }

    fn tick(&mut self, _dt: f32, surface: &mut impl Surface) {
        let (w, h) = (self.w as f32, self.h as f32);

        surface.fade(self.config.trail_alpha);

        self.nebulae.update(w, h);
        self.nebulae.draw(surface);

        self.stars.update(w, h);
        self.stars.draw(surface);

        self.bursts.update(self.config.burst_drag);
        self.bursts.draw(surface);

        self.periodic_burst();
        self.frame += 1;
    }
}
