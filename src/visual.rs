// visual.rs - Pick one of the visuals by name
//
// Used by hosts that don't care which concrete world they drive: the
// raster frame buffer export and the poster renderer.

use std::fmt;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::fallback;
use crate::hero::Hero;
use crate::render::Surface;
use crate::sim::{CosmosWorld, NetworkWorld, Simulation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Cosmos,
    Network,
    Nucleus,
    Fallback,
}

impl VisualKind {
    pub const ALL: [VisualKind; 4] = [Self::Cosmos, Self::Network, Self::Nucleus, Self::Fallback];

    pub fn name(self) -> &'static str {
        match self {
            Self::Cosmos => "cosmos",
            Self::Network => "network",
            Self::Nucleus => "nucleus",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for VisualKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VisualKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid(format!("unknown visual {s:?}")))
    }
}

pub enum Visual {
    Cosmos(CosmosWorld),
    Network(NetworkWorld),
    Nucleus(Box<Hero>),
    /// Static reduced-motion figure; `querying` shows the progress bar
    Fallback { querying: bool, elapsed: f32 },
}

impl Visual {
    pub fn new(kind: VisualKind, w: u32, h: u32, config: &EngineConfig, seed: u64) -> Self {
        match kind {
            VisualKind::Cosmos => Self::Cosmos(CosmosWorld::new(w, h, config.cosmos.clone(), seed)),
            VisualKind::Network => Self::Network(NetworkWorld::new(w, h, config.network.clone(), seed)),
            VisualKind::Nucleus => {
                let mut hero = Hero::new(config.nucleus.clone(), seed, false);
                hero.resize(w, h);
                Self::Nucleus(Box::new(hero))
            }
            VisualKind::Fallback => Self::Fallback { querying: false, elapsed: 0.0 },
        }
    }

    pub fn kind(&self) -> VisualKind {
        match self {
            Self::Cosmos(_) => VisualKind::Cosmos,
            Self::Network(_) => VisualKind::Network,
            Self::Nucleus(_) => VisualKind::Nucleus,
            Self::Fallback { .. } => VisualKind::Fallback,
        }
    }

    /// Start a query on the nucleus, or show the progress bar on the
    /// fallback. No effect on the 2D worlds.
    pub fn trigger_query(&mut self) {
        match self {
            Self::Nucleus(hero) => {
                hero.trigger_query();
            }
            Self::Fallback { querying, .. } => *querying = true,
            _ => {}
        }
    }
}

impl Simulation for Visual {
    fn resize(&mut self, w: u32, h: u32) {
        match self {
            Self::Cosmos(world) => world.resize(w, h),
            Self::Network(world) => world.resize(w, h),
            Self::Nucleus(hero) => hero.resize(w, h),
            Self::Fallback { .. } => {}
        }
    }

    fn tick(&mut self, dt: f32, surface: &mut impl Surface) {
        match self {
            Self::Cosmos(world) => world.tick(dt, surface),
            Self::Network(world) => world.tick(dt, surface),
            Self::Nucleus(hero) => hero.tick(dt, surface),
            Self::Fallback { querying, elapsed } => {
                *elapsed += dt;
                fallback::draw(surface, *querying, *elapsed);
            }
        }
    }
}
