//! Declarative animation timelines.
//!
//! A [`Timeline`] is an ordered list of steps laid out on a time axis:
//! property tweens and fire-and-forget calls. Each step is placed at the
//! current end of the timeline plus an offset, so a negative offset overlaps
//! the previous step. The timeline is advanced by the frame delta and
//! writes interpolated values into an [`Animatable`] target.
//!
//! Start values are captured when a tween first becomes active, not when
//! the timeline is built. Dropping a timeline cancels it: no callback fires
//! and nothing is written afterwards.

use crate::easing::{Ease, lerp};

/// Boxed side effect run by a timeline.
pub type Callback = Box<dyn FnMut()>;

/// Object a timeline step writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Core mesh of the hero scene
    Nucleus,
    /// 3D particle explosion
    Explosion,
    /// Results panel revealed after a query
    Results,
}

/// Animatable channel of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    RotationX,
    RotationY,
    RotationZ,
    PositionX,
    PositionY,
    PositionZ,
    /// Uniform scale
    Scale,
    Opacity,
}

/// Property path: which channel of which target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Property {
    pub target: Target,
    pub channel: Channel,
}

impl Property {
    pub const fn new(target: Target, channel: Channel) -> Self {
        Self { target, channel }
    }
}

/// Anything a timeline can animate. Unknown properties read as 0 and
/// ignore writes.
pub trait Animatable {
    fn get(&self, property: Property) -> f32;
    fn set(&mut self, property: Property, value: f32);
}

/// Where a tweened property ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum End {
    /// Absolute value
    To(f32),
    /// Relative to the value when the tween starts
    By(f32),
}

impl End {
    fn resolve(self, from: f32) -> f32 {
        match self {
            End::To(v) => v,
            End::By(d) => from + d,
        }
    }
}

/// Interpolation of one or more properties over a duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    channels: Vec<(Property, End)>,
    duration: f32,
    ease: Ease,
}

impl Tween {
    pub fn new(duration: f32, ease: Ease) -> Self {
        Self { channels: Vec::new(), duration: duration.max(0.0), ease }
    }

    pub fn to(mut self, property: Property, value: f32) -> Self {
        self.channels.push((property, End::To(value)));
        self
    }

    pub fn by(mut self, property: Property, delta: f32) -> Self {
        self.channels.push((property, End::By(delta)));
        self
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

enum Step {
    Tween {
        start: f32,
        end: f32,
        tween: Tween,
        // (from, to) per channel, captured on activation
        span: Option<Vec<(f32, f32)>>,
        done: bool,
    },
    Call {
        at: f32,
        callback: Callback,
        fired: bool,
    },
}

pub struct Timeline {
    steps: Vec<Step>,
    duration: f32,
    elapsed: f32,
    started: bool,
    complete: bool,
    on_start: Option<Callback>,
    on_complete: Option<Callback>,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            duration: 0.0,
            elapsed: 0.0,
            started: false,
            complete: false,
            on_start: None,
            on_complete: None,
        }
    }

    pub fn on_start(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_start = Some(Box::new(callback));
        self
    }

    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Append a tween at the current end plus `offset` seconds.
    pub fn tween(mut self, tween: Tween, offset: f32) -> Self {
        let start = (self.duration + offset).max(0.0);
        let end = start + tween.duration;
        self.duration = self.duration.max(end);
        self.steps.push(Step::Tween { start, end, tween, span: None, done: false });
        self
    }

    /// Append a call at the current end plus `offset` seconds.
    pub fn call(mut self, offset: f32, callback: impl FnMut() + 'static) -> Self {
        let at = (self.duration + offset).max(0.0);
        self.duration = self.duration.max(at);
        self.steps.push(Step::Call { at, callback: Box::new(callback), fired: false });
        self
    }

    /// Total length in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Normalized position of the playhead in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.started { 1.0 } else { 0.0 };
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Move the playhead forward by `dt` seconds and write every active
    /// tween into `target`. Returns true on the call that completes the
    /// timeline.
    pub fn advance(&mut self, dt: f32, target: &mut impl Animatable) -> bool {
        if self.complete {
            return false;
        }
        if !self.started {
            self.started = true;
            if let Some(cb) = self.on_start.as_mut() {
                cb();
            }
        }
        self.elapsed += dt.max(0.0);
        let now = self.elapsed;
        let mut pending = false;

        for step in &mut self.steps {
            match step {
                Step::Tween { start, end, tween, span, done } => {
                    if *done {
                        continue;
                    }
                    if now < *start {
                        pending = true;
                        continue;
                    }
                    let span = span.get_or_insert_with(|| {
                        tween
                            .channels
                            .iter()
                            .map(|&(p, e)| {
                                let from = target.get(p);
                                (from, e.resolve(from))
                            })
                            .collect()
                    });
                    let t = if now >= *end || tween.duration <= 0.0 {
                        1.0
                    } else {
                        (now - *start) / tween.duration
                    };
                    let w = tween.ease.apply(t);
                    for (&(property, _), &(from, to)) in tween.channels.iter().zip(span.iter()) {
                        target.set(property, lerp(from, to, w));
                    }
                    if t >= 1.0 {
                        *done = true;
                    } else {
                        pending = true;
                    }
                }
                Step::Call { at, callback, fired } => {
                    if *fired {
                        continue;
                    }
                    if now < *at {
                        pending = true;
                        continue;
                    }
                    *fired = true;
                    callback();
                }
            }
        }

        if pending || now < self.duration {
            return false;
        }
        self.complete = true;
        if let Some(cb) = self.on_complete.as_mut() {
            cb();
        }
        true
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
