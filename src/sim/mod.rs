// sim/ - 2D canvas simulations
//
// Entity storage is Structure-of-Arrays, one module per entity kind.
// Each world owns its entities exclusively and advances every one of them
// exactly once per tick.

mod burst;
mod cosmos;
mod nebula;
mod network;
mod node;
mod star;

pub use burst::Bursts;
pub use cosmos::CosmosWorld;
pub use nebula::Nebulae;
pub use network::{Link, NetworkWorld};
pub use node::Nodes;
pub use star::Stars;

use rand::Rng;
pub use rand::SeedableRng;
pub use rand::rngs::SmallRng;

use crate::render::Surface;

// Capacity limits
pub const MAX_STARS: usize = 1024;
pub const MAX_NEBULAE: usize = 64;
pub const MAX_BURST: usize = 2048;
pub const MAX_NODES: usize = 256;

/// A world the render loop can drive.
pub trait Simulation {
    /// New pixel dimensions. Takes effect on the next tick.
    fn resize(&mut self, w: u32, h: u32);

    /// Advance one frame and draw it. `dt` is seconds since the previous
    /// frame; frame-stepped worlds ignore it.
    fn tick(&mut self, dt: f32, surface: &mut impl Surface);
}

/// Deterministic generator for a world.
pub fn seeded(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Uniform in [0, 1).
#[inline(always)]
pub fn unit(rng: &mut SmallRng) -> f32 {
    rng.random::<f32>()
}

/// Uniform in [-span/2, span/2).
#[inline(always)]
pub fn centered(rng: &mut SmallRng, span: f32) -> f32 {
    (unit(rng) - 0.5) * span
}

/// Toroidal wrap: leaving past one bound re-enters at the other.
#[inline]
pub fn wrap(v: f32, lo: f32, hi: f32) -> f32 {
    if v < lo {
        hi
    } else if v > hi {
        lo
    } else {
        v
    }
}

/// Step `value` by `rate` and reflect at the band edges.
///
/// Returns the new value, clamped into [lo, hi], and the new rate. On
/// reaching a bound the rate is pointed back into the band, so a value
/// that starts outside the band is pulled in rather than trapped. A zero
/// rate holds the value.
#[inline]
pub fn oscillate(value: f32, rate: f32, lo: f32, hi: f32) -> (f32, f32) {
    let v = value + rate;
    if v <= lo {
        (lo, rate.abs())
    } else if v >= hi {
        (hi, -rate.abs())
    } else {
        (v, rate)
    }
}
