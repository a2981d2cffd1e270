//! Hero nucleus controller.
//!
//! Ties the 3D scene, the query sequencer and the reduced-motion fallback
//! together. A query runs:
//!
//! 1. the sequencer spins and collapses the nucleus,
//! 2. its trigger ignites the explosion,
//! 3. once the explosion has run its lifetime it is hidden, the nucleus
//!    scales back, and the completion callback fires.
//!
//! With reduced motion the scene is never advanced; the query simply
//! completes after [`REDUCED_MOTION_DWELL`] seconds.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info};

use crate::config::NucleusConfig;
use crate::fallback;
use crate::render::Surface;
use crate::scene::{NucleusScene, SceneFrame};
use crate::sequencer::{Hooks, Sequencer};
use crate::sim::Simulation;
use crate::timeline::{Animatable, Callback, Channel, Property, Target};

/// Reduced-motion query length: the spin-and-collapse plus the explosion.
pub const REDUCED_MOTION_DWELL: f32 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryPhase {
    Idle,
    /// Sequencer timeline running
    Collapsing,
    /// Explosion running
    Exploding,
    /// Reduced-motion wait; seconds left
    Dwell(f32),
}

pub struct Hero {
    scene: NucleusScene,
    sequencer: Sequencer,
    phase: QueryPhase,
    reduced_motion: bool,
    ignite: Rc<Cell<bool>>,
    on_complete: Option<Callback>,
    size: (u32, u32),
}

impl Hero {
    pub fn new(config: NucleusConfig, seed: u64, reduced_motion: bool) -> Self {
        Self {
            scene: NucleusScene::new(config, seed),
            sequencer: Sequencer::new(),
            phase: QueryPhase::Idle,
            reduced_motion,
            ignite: Rc::new(Cell::new(false)),
            on_complete: None,
            size: (0, 0),
        }
    }

    /// Callback fired once at the end of every query.
    pub fn on_query_complete(&mut self, f: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(f));
    }

    pub fn is_querying(&self) -> bool {
        self.phase != QueryPhase::Idle
    }

    pub fn phase(&self) -> QueryPhase { self.phase }
    pub fn reduced_motion(&self) -> bool { self.reduced_motion }
    pub fn scene(&self) -> &NucleusScene { &self.scene }
    pub fn size(&self) -> (u32, u32) { self.size }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.scene.set_hovered(hovered);
    }

    /// Begin a query. Ignored, returning false, while one is in flight.
    pub fn trigger_query(&mut self) -> bool {
        if self.is_querying() {
            debug!("hero: query already in flight");
            return false;
        }
        if self.reduced_motion {
            self.phase = QueryPhase::Dwell(REDUCED_MOTION_DWELL);
        } else {
            self.scene.reset_results();
            self.scene.set_querying(true);
            let ignite = self.ignite.clone();
            self.sequencer.start(Target::Nucleus, Hooks::new().on_trigger(move || ignite.set(true)));
            self.phase = QueryPhase::Collapsing;
        }
        info!("hero: query started (reduced motion: {})", self.reduced_motion);
        true
    }

    /// Switch presentation. A query in flight is carried over as a dwell.
    pub fn set_reduced_motion(&mut self, on: bool) {
        if on == self.reduced_motion {
            return;
        }
        self.reduced_motion = on;
        if matches!(self.phase, QueryPhase::Collapsing | QueryPhase::Exploding) {
            self.abort_scene();
            self.phase = QueryPhase::Dwell(REDUCED_MOTION_DWELL);
        }
        info!("hero: reduced motion {}", if on { "on" } else { "off" });
    }

    /// Fade out the explosion and bring the results panel in.
    pub fn reveal_results(&mut self) {
        self.sequencer.reveal(Hooks::new());
    }

    /// Advance the query state machine and, with full motion, the scene.
    pub fn advance(&mut self, dt: f32) {
        if let QueryPhase::Dwell(left) = self.phase {
            let left = left - dt;
            if left <= 0.0 {
                self.finish();
            } else {
                self.phase = QueryPhase::Dwell(left);
            }
        }
        if self.reduced_motion {
            return;
        }

        self.scene.step(dt);
        self.sequencer.advance(dt, &mut self.scene);
        if self.ignite.replace(false) {
            self.scene.ignite();
            self.phase = QueryPhase::Exploding;
        }

        if self.phase == QueryPhase::Exploding && self.scene.explosion().finished() {
            self.scene.hide_explosion();
            self.sequencer.reset(Target::Nucleus);
            self.scene.set_querying(false);
            self.finish();
        }
    }

    /// End a reduced-motion dwell now. Hosts that wait on a wall-clock
    /// timer call this instead of ticking. False if no dwell was pending.
    pub fn complete_dwell(&mut self) -> bool {
        if !matches!(self.phase, QueryPhase::Dwell(_)) {
            return false;
        }
        self.finish();
        true
    }

    fn finish(&mut self) {
        self.phase = QueryPhase::Idle;
        info!("hero: query complete");
        if let Some(cb) = self.on_complete.as_mut() {
            cb();
        }
    }

    /// Fallback markup, only meaningful with reduced motion.
    pub fn markup(&self) -> String {
        fallback::markup(self.is_querying())
    }

    pub fn snapshot(&self) -> SceneFrame {
        self.scene.snapshot()
    }

    /// Stop every timeline and abandon any query, without firing
    /// callbacks. A later `trigger_query` starts afresh.
    pub fn stop(&mut self) {
        self.abort_scene();
        if self.phase != QueryPhase::Idle {
            info!("hero: query abandoned");
        }
        self.phase = QueryPhase::Idle;
    }

    /// Drop the query's timelines and put the scene back at rest.
    fn abort_scene(&mut self) {
        self.sequencer.stop();
        self.scene.hide_explosion();
        self.scene.set(Property::new(Target::Nucleus, Channel::Scale), 1.0);
        self.scene.set_querying(false);
        self.ignite.set(false);
    }
}

impl Simulation for Hero {
    fn resize(&mut self, w: u32, h: u32) {
        self.size = (w, h);
    }

    fn tick(&mut self, dt: f32, surface: &mut impl Surface) {
        self.advance(dt);
        if !self.reduced_motion {
            self.scene.draw(surface);
        }
    }
}
