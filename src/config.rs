// config.rs - Tunable parameters for every visual
//
// All fields default to the values the site ships with, so a host can pass
// `{}` (or nothing) and override only what it cares about. Loaded from JSON
// in the browser and from TOML by the poster binary.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::Rgb;
use crate::scene::MAX_EXPLOSION;
use crate::sim::{MAX_BURST, MAX_NEBULAE, MAX_NODES, MAX_STARS};

/// Closed interval sampled uniformly. Serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span(pub f32, pub f32);

impl Span {
    #[inline]
    pub fn min(self) -> f32 { self.0 }

    #[inline]
    pub fn max(self) -> f32 { self.1 }

    pub fn sample(self, rng: &mut impl Rng) -> f32 {
        if self.0 >= self.1 {
            return self.0;
        }
        rng.random_range(self.0..=self.1)
    }

    fn check(self, name: &str) -> Result<()> {
        if !self.0.is_finite() || !self.1.is_finite() || self.0 > self.1 {
            return Err(Error::invalid(format!("{name}: [{}, {}] is not an ordered range", self.0, self.1)));
        }
        Ok(())
    }
}

/// Reject NaN and infinities, which TOML accepts as `nan` and `inf`.
fn finite(name: &str, v: f32) -> Result<()> {
    if !v.is_finite() {
        return Err(Error::invalid(format!("{name} must be finite, got {v}")));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cosmos: CosmosConfig,
    pub network: NetworkConfig,
    pub nucleus: NucleusConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cosmos: CosmosConfig::default(),
            network: NetworkConfig::default(),
            nucleus: NucleusConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.cosmos.validate()?;
        self.network.validate()?;
        self.nucleus.validate()
    }
}

/// Starfield, nebulae and bursts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CosmosConfig {
    pub star_count: usize,
    pub star_size: Span,
    /// Max per-axis speed; velocities are sampled in [-speed/2, speed/2].
    pub star_speed: f32,
    /// Max twinkle rate; fade speeds are sampled in [-fade/2, fade/2].
    pub star_fade: f32,

    pub nebula_count: usize,
    pub nebula_radius: Span,
    pub nebula_speed: f32,
    /// Opacity band each cloud pulses within.
    pub nebula_opacity: Span,
    pub nebula_pulse: Span,

    pub burst_count: usize,
    pub burst_speed: Span,
    pub burst_size: Span,
    pub burst_decay: Span,
    pub burst_drag: f32,
    pub burst_hue: Span,
    /// Ticks between automatic bursts. `None` disables them.
    pub burst_interval: Option<u32>,
    pub large_burst_chance: f32,
    pub large_burst_count: usize,
    pub initial_burst: bool,

    /// Alpha of the black fill laid over the previous frame.
    pub trail_alpha: f32,
}

impl Default for CosmosConfig {
    fn default() -> Self {
        Self {
            star_count: 300,
            star_size: Span(1.0, 4.0),
            star_speed: 1.5,
            star_fade: 0.03,
            nebula_count: 15,
            nebula_radius: Span(100.0, 300.0),
            nebula_speed: 0.5,
            nebula_opacity: Span(0.1, 0.4),
            nebula_pulse: Span(0.01, 0.03),
            burst_count: 50,
            burst_speed: Span(2.0, 7.0),
            burst_size: Span(2.0, 6.0),
            burst_decay: Span(0.01, 0.03),
            burst_drag: 0.98,
            burst_hue: Span(180.0, 240.0),
            burst_interval: Some(120),
            large_burst_chance: 0.15,
            large_burst_count: 120,
            initial_burst: true,
            trail_alpha: 0.1,
        }
    }
}

impl CosmosConfig {
    fn validate(&self) -> Result<()> {
        if self.star_count > MAX_STARS {
            return Err(Error::invalid(format!("star_count {} exceeds {MAX_STARS}", self.star_count)));
        }
        if self.nebula_count > MAX_NEBULAE {
            return Err(Error::invalid(format!("nebula_count {} exceeds {MAX_NEBULAE}", self.nebula_count)));
        }
        if self.burst_count > MAX_BURST || self.large_burst_count > MAX_BURST {
            return Err(Error::invalid(format!("burst counts must not exceed {MAX_BURST}")));
        }
        finite("star_speed", self.star_speed)?;
        finite("star_fade", self.star_fade)?;
        finite("nebula_speed", self.nebula_speed)?;
        finite("burst_drag", self.burst_drag)?;
        self.star_size.check("star_size")?;
        self.nebula_radius.check("nebula_radius")?;
        self.nebula_opacity.check("nebula_opacity")?;
        self.nebula_pulse.check("nebula_pulse")?;
        self.burst_speed.check("burst_speed")?;
        self.burst_size.check("burst_size")?;
        self.burst_decay.check("burst_decay")?;
        self.burst_hue.check("burst_hue")?;

        if self.nebula_opacity.min() < 0.0 || self.nebula_opacity.max() > 1.0 {
            return Err(Error::invalid("nebula_opacity must lie within [0, 1]"));
        }
        // Non-positive decay would make burst particles immortal.
        if self.burst_decay.min() <= 0.0 {
            return Err(Error::invalid("burst_decay must be positive"));
        }
        if !(0.0..=1.0).contains(&self.burst_drag) {
            return Err(Error::invalid("burst_drag must lie within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.large_burst_chance) {
            return Err(Error::invalid("large_burst_chance must lie within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.trail_alpha) {
            return Err(Error::invalid("trail_alpha must lie within [0, 1]"));
        }
        if self.burst_interval == Some(0) {
            return Err(Error::invalid("burst_interval must be at least 1 tick"));
        }
        Ok(())
    }
}

/// Bouncing nodes joined by pulsing lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub node_count: usize,
    pub node_speed: f32,
    pub node_radius: Span,
    pub connection_distance: f32,
    pub pulse_step: f32,
    pub trail_alpha: f32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_count: 80,
            node_speed: 3.0,
            node_radius: Span(4.0, 10.0),
            connection_distance: 200.0,
            pulse_step: 0.05,
            trail_alpha: 0.02,
        }
    }
}

impl NetworkConfig {
    fn validate(&self) -> Result<()> {
        if self.node_count > MAX_NODES {
            return Err(Error::invalid(format!("node_count {} exceeds {MAX_NODES}", self.node_count)));
        }
        finite("node_speed", self.node_speed)?;
        finite("connection_distance", self.connection_distance)?;
        finite("pulse_step", self.pulse_step)?;
        self.node_radius.check("node_radius")?;
        if self.connection_distance <= 0.0 {
            return Err(Error::invalid("connection_distance must be positive"));
        }
        if !(0.0..=1.0).contains(&self.trail_alpha) {
            return Err(Error::invalid("trail_alpha must lie within [0, 1]"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitConfig {
    pub radius: f32,
    pub speed: f32,
    pub phase: f32,
    /// `#rrggbb`
    pub color: String,
}

impl OrbitConfig {
    fn new(radius: f32, speed: f32, phase: f32, color: &str) -> Self {
        Self { radius, speed, phase, color: color.to_string() }
    }
}

/// Hero nucleus scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NucleusConfig {
    pub orbits: Vec<OrbitConfig>,
    pub orbit_tilt: f32,
    pub hover_speedup: f32,
    /// Rate (1/s) at which orbit speed approaches its hover target.
    pub hover_response: f32,
    /// Idle core rotation in rad/s around (x, y).
    pub idle_spin: (f32, f32),
    pub explosion_count: usize,
    pub explosion_speed: Span,
    pub explosion_lifetime: f32,
    pub camera_distance: f32,
    pub fov_degrees: f32,
}

impl Default for NucleusConfig {
    fn default() -> Self {
        use std::f32::consts::PI;
        Self {
            orbits: vec![
                OrbitConfig::new(3.0, 0.5, 0.0, "#FF6A00"),
                OrbitConfig::new(3.2, 0.4, PI / 2.0, "#FFA733"),
                OrbitConfig::new(2.8, 0.6, PI, "#002B5C"),
                OrbitConfig::new(3.5, 0.35, PI * 1.5, "#FF6A00"),
            ],
            orbit_tilt: 0.3,
            hover_speedup: 1.8,
            hover_response: 6.0,
            idle_spin: (0.03, 0.06),
            explosion_count: 800,
            explosion_speed: Span(2.0, 5.0),
            explosion_lifetime: 0.8,
            camera_distance: 8.0,
            fov_degrees: 50.0,
        }
    }
}

impl NucleusConfig {
    fn validate(&self) -> Result<()> {
        finite("orbit_tilt", self.orbit_tilt)?;
        finite("idle_spin.0", self.idle_spin.0)?;
        finite("idle_spin.1", self.idle_spin.1)?;
        finite("explosion_lifetime", self.explosion_lifetime)?;
        finite("hover_speedup", self.hover_speedup)?;
        finite("hover_response", self.hover_response)?;
        finite("camera_distance", self.camera_distance)?;
        for (i, orbit) in self.orbits.iter().enumerate() {
            finite(&format!("orbit {i} radius"), orbit.radius)?;
            finite(&format!("orbit {i} speed"), orbit.speed)?;
            finite(&format!("orbit {i} phase"), orbit.phase)?;
            if orbit.radius <= 0.0 {
                return Err(Error::invalid(format!("orbit {i}: radius must be positive")));
            }
            Rgb::from_hex(&orbit.color)
                .ok_or_else(|| Error::invalid(format!("orbit {i}: bad color {:?}", orbit.color)))?;
        }
        if self.explosion_count > MAX_EXPLOSION {
            return Err(Error::invalid(format!("explosion_count {} exceeds {MAX_EXPLOSION}", self.explosion_count)));
        }
        self.explosion_speed.check("explosion_speed")?;
        if self.explosion_lifetime <= 0.0 {
            return Err(Error::invalid("explosion_lifetime must be positive"));
        }
        if self.hover_speedup <= 0.0 || self.hover_response < 0.0 {
            return Err(Error::invalid("hover_speedup must be positive and hover_response non-negative"));
        }
        if self.camera_distance <= 0.0 || !(1.0..179.0).contains(&self.fov_degrees) {
            return Err(Error::invalid("camera_distance must be positive and fov_degrees within (1, 179)"));
        }
        Ok(())
    }
}
