// ============================================================================
// NUCLEUS ENGINE - Animated visuals for a marketing front-end
// ============================================================================
//
// 2D canvas worlds (starfield with nebulae and bursts, living network),
// a 3D hero nucleus driven by animation timelines, a static reduced-motion
// fallback, and the render loop that ticks them once per display frame.
//
// Everything but `web` is host-agnostic and runs natively; the poster
// binary renders any visual to PNG through the software raster.

pub mod config;
pub mod driver;
pub mod easing;
pub mod error;
pub mod fallback;
pub mod hero;
pub mod render;
pub mod scene;
pub mod sequencer;
pub mod sim;
pub mod stats;
pub mod timeline;
pub mod visual;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{CosmosConfig, EngineConfig, NetworkConfig, NucleusConfig, Span};
pub use driver::{FrameHost, FrameId, LoopState, RenderLoop};
pub use error::{Error, Result};
pub use hero::{Hero, QueryPhase};
pub use render::{Raster, Rgb, Rgba, Surface};
pub use scene::NucleusScene;
pub use sequencer::{Hooks, SequenceState, Sequencer};
pub use sim::{CosmosWorld, NetworkWorld, Simulation};
pub use stats::{Counter, StatsResponse, StatsView};
pub use timeline::{Animatable, Timeline, Tween};
pub use visual::{Visual, VisualKind};
