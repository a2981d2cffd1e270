//! Query animation sequencing.
//!
//! The [`Sequencer`] owns at most one query timeline plus the short
//! settle (scale reset) and reveal timelines. Starting a new query drops
//! whatever was in flight first, so a superseded timeline never fires its
//! callbacks and never writes again.

use std::f32::consts::PI;

use log::{debug, info};

use crate::easing::Ease;
use crate::timeline::{Animatable, Callback, Channel, Property, Target, Timeline, Tween};

const SPIN: f32 = 4.0 * PI;
const SPIN_SECS: f32 = 0.35;
const SHRINK_TO: f32 = 0.3;
const SHRINK_SECS: f32 = 0.2;
const SHRINK_OVERLAP: f32 = -0.1;
const SETTLE_SECS: f32 = 0.5;
const FADE_SECS: f32 = 0.3;
const REVEAL_SECS: f32 = 0.5;
const REVEAL_OVERLAP: f32 = -0.1;

/// Callbacks handed to [`Sequencer::start`] and [`Sequencer::reveal`].
#[derive(Default)]
pub struct Hooks {
    /// Fired once mid-sequence, as the core collapses.
    pub on_trigger: Option<Callback>,
    /// Fired once when the timeline completes.
    pub on_complete: Option<Callback>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_trigger(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_trigger = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Idle,
    Running,
    Completed,
}

pub struct Sequencer {
    state: SequenceState,
    active: Option<Timeline>,
    settle: Option<Timeline>,
    reveal: Option<Timeline>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self { state: SequenceState::Idle, active: None, settle: None, reveal: None }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SequenceState::Running
    }

    /// Length of the query timeline in seconds.
    pub fn query_duration() -> f32 {
        (SPIN_SECS + SHRINK_OVERLAP).max(0.0) + SHRINK_SECS
    }

    /// Spin `target` a full two turns, collapse it, then fire the trigger.
    pub fn start(&mut self, target: Target, hooks: Hooks) {
        if self.active.take().is_some() {
            debug!("sequencer: superseding running timeline");
        }
        self.settle = None;
        self.reveal = None;

        let spin = Property::new(target, Channel::RotationY);
        let scale = Property::new(target, Channel::Scale);

        let mut timeline = Timeline::new()
            .tween(Tween::new(SPIN_SECS, Ease::PowerIn(2)).by(spin, SPIN), 0.0)
            .tween(Tween::new(SHRINK_SECS, Ease::PowerIn(2)).to(scale, SHRINK_TO), SHRINK_OVERLAP);

        let Hooks { on_trigger, on_complete } = hooks;
        if let Some(mut trigger) = on_trigger {
            timeline = timeline.call(0.0, move || trigger());
        }
        if let Some(mut done) = on_complete {
            timeline = timeline.on_complete(move || done());
        }

        self.active = Some(timeline);
        self.state = SequenceState::Running;
        info!("sequencer: query started");
    }

    /// Scale `target` back to 1. Rotation is left as is. Any running query
    /// timeline is dropped without callbacks.
    pub fn reset(&mut self, target: Target) {
        self.active = None;
        let scale = Property::new(target, Channel::Scale);
        self.settle = Some(Timeline::new().tween(Tween::new(SETTLE_SECS, Ease::PowerOut(2)).to(scale, 1.0), 0.0));
        self.state = SequenceState::Idle;
    }

    /// Fade the explosion out and bring the results panel in.
    pub fn reveal(&mut self, hooks: Hooks) {
        let fade = Property::new(Target::Explosion, Channel::Opacity);
        let shown = Property::new(Target::Results, Channel::Opacity);
        let rise = Property::new(Target::Results, Channel::PositionY);

        let mut timeline = Timeline::new()
            .tween(Tween::new(FADE_SECS, Ease::PowerOut(2)).to(fade, 0.0), 0.0)
            .tween(Tween::new(REVEAL_SECS, Ease::PowerOut(2)).to(shown, 1.0).to(rise, 0.0), REVEAL_OVERLAP);
        if let Some(mut done) = hooks.on_complete {
            timeline = timeline.on_complete(move || done());
        }
        self.reveal = Some(timeline);
    }

    /// Drop every timeline. Nothing fires.
    pub fn stop(&mut self) {
        self.active = None;
        self.settle = None;
        self.reveal = None;
        if self.state == SequenceState::Running {
            self.state = SequenceState::Idle;
        }
    }

    /// Advance all live timelines by `dt` seconds.
    pub fn advance(&mut self, dt: f32, scene: &mut impl Animatable) {
        if let Some(tl) = self.active.as_mut() {
            if tl.advance(dt, scene) {
                self.active = None;
                self.state = SequenceState::Completed;
                info!("sequencer: query timeline complete");
            }
        }
        if let Some(tl) = self.settle.as_mut() {
            if tl.advance(dt, scene) {
                self.settle = None;
            }
        }
        if let Some(tl) = self.reveal.as_mut() {
            if tl.advance(dt, scene) {
                self.reveal = None;
            }
        }
    }

    /// True while any timeline still has work to do.
    pub fn is_animating(&self) -> bool {
        self.active.is_some() || self.settle.is_some() || self.reveal.is_some()
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Default)]
    struct Props(HashMap<Property, f32>);

    impl Animatable for Props {
        fn get(&self, p: Property) -> f32 {
            self.0.get(&p).copied().unwrap_or(match p.channel {
                Channel::Scale | Channel::Opacity => 1.0,
                _ => 0.0,
            })
        }

        fn set(&mut self, p: Property, v: f32) {
            self.0.insert(p, v);
        }
    }

    const SPIN_Y: Property = Property::new(Target::Nucleus, Channel::RotationY);
    const SCALE: Property = Property::new(Target::Nucleus, Channel::Scale);

    fn counted() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, move || h.set(h.get() + 1))
    }

    fn run(seq: &mut Sequencer, props: &mut Props, secs: f32) {
        let steps = (secs / 0.016).ceil() as usize;
        for _ in 0..steps {
            seq.advance(0.016, props);
        }
    }

    #[test]
    fn full_sequence() {
        let (triggers, trigger) = counted();
        let (completes, complete) = counted();
        let mut seq = Sequencer::new();
        let mut props = Props::default();

        seq.start(Target::Nucleus, Hooks::new().on_trigger(trigger).on_complete(complete));
        assert_eq!(seq.state(), SequenceState::Running);

        run(&mut seq, &mut props, 0.2);
        assert_eq!(triggers.get(), 0);

        run(&mut seq, &mut props, 1.0);
        assert_eq!(triggers.get(), 1);
        assert_eq!(completes.get(), 1);
        assert_eq!(seq.state(), SequenceState::Completed);
        assert!((props.get(SPIN_Y) - 4.0 * PI).abs() < 1e-4);
        assert!((props.get(SCALE) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn second_start_supersedes_first() {
        let (first, first_done) = counted();
        let (second, second_done) = counted();
        let (first_trig, trigger) = counted();
        let mut seq = Sequencer::new();
        let mut props = Props::default();

        seq.start(Target::Nucleus, Hooks::new().on_trigger(trigger).on_complete(first_done));
        run(&mut seq, &mut props, 0.1);
        let mid = props.get(SPIN_Y);

        seq.start(Target::Nucleus, Hooks::new().on_complete(second_done));
        run(&mut seq, &mut props, 1.0);

        assert_eq!(first.get(), 0);
        assert_eq!(first_trig.get(), 0);
        assert_eq!(second.get(), 1);
        // The second spin is relative to where the first left off
        assert!((props.get(SPIN_Y) - (mid + 4.0 * PI)).abs() < 1e-3);
        assert!((props.get(SCALE) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn stop_is_silent() {
        let (done, cb) = counted();
        let mut seq = Sequencer::new();
        let mut props = Props::default();
        seq.start(Target::Nucleus, Hooks::new().on_complete(cb));
        run(&mut seq, &mut props, 0.1);
        seq.stop();
        let frozen = props.get(SPIN_Y);
        run(&mut seq, &mut props, 1.0);
        assert_eq!(done.get(), 0);
        assert_eq!(props.get(SPIN_Y), frozen);
        assert_eq!(seq.state(), SequenceState::Idle);
        assert!(!seq.is_animating());
    }

    #[test]
    fn reset_restores_scale_only() {
        let mut seq = Sequencer::new();
        let mut props = Props::default();
        seq.start(Target::Nucleus, Hooks::new());
        run(&mut seq, &mut props, 1.0);
        let spun = props.get(SPIN_Y);

        seq.reset(Target::Nucleus);
        assert_eq!(seq.state(), SequenceState::Idle);
        run(&mut seq, &mut props, 0.6);
        assert_eq!(props.get(SCALE), 1.0);
        assert_eq!(props.get(SPIN_Y), spun);
    }

    #[test]
    fn reset_when_idle_is_harmless() {
        let mut seq = Sequencer::new();
        let mut props = Props::default();
        seq.reset(Target::Nucleus);
        run(&mut seq, &mut props, 0.6);
        assert_eq!(props.get(SCALE), 1.0);
    }

    #[test]
    fn start_cancels_pending_reset() {
        let mut seq = Sequencer::new();
        let mut props = Props::default();
        props.set(SCALE, 0.3);
        seq.reset(Target::Nucleus);
        run(&mut seq, &mut props, 0.1);
        seq.start(Target::Nucleus, Hooks::new());
        run(&mut seq, &mut props, 1.0);
        assert!((props.get(SCALE) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn reveal_fades_and_raises() {
        let (done, cb) = counted();
        let mut seq = Sequencer::new();
        let mut props = Props::default();
        let y = Property::new(Target::Results, Channel::PositionY);
        let shown = Property::new(Target::Results, Channel::Opacity);
        props.set(y, 20.0);
        props.set(shown, 0.0);

        seq.reveal(Hooks::new().on_complete(cb));
        run(&mut seq, &mut props, 1.0);
        assert_eq!(props.get(Property::new(Target::Explosion, Channel::Opacity)), 0.0);
        assert_eq!(props.get(shown), 1.0);
        assert_eq!(props.get(y), 0.0);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn query_duration_matches_layout() {
        assert!((Sequencer::query_duration() - 0.45).abs() < 1e-6);
    }
}
