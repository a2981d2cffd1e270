//! Render loop driver.
//!
//! [`RenderLoop`] ticks a [`Simulation`] once per display frame until it is
//! stopped. The host side (frame scheduling, viewport size, resize
//! notifications) sits behind [`FrameHost`] so the loop runs the same in the
//! browser (`requestAnimationFrame`) and under test.
//!
//! Teardown is strict: `stop` cancels the pending frame and detaches the
//! resize listener, and a frame delivered after `stop` is ignored.

use log::{info, warn};

use crate::error::Result;
use crate::render::Surface;
use crate::sim::Simulation;

/// Longest frame gap fed to a simulation, in seconds. Background tabs can
/// stall for minutes; the scene should resume, not jump.
pub const MAX_DT: f32 = 0.1;

/// Handle of a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub i32);

/// What the loop needs from its environment.
pub trait FrameHost {
    /// Schedule one frame callback at the next display refresh.
    fn request_frame(&mut self) -> Result<FrameId>;

    fn cancel_frame(&mut self, id: FrameId);

    /// Current drawable size in pixels.
    fn viewport(&self) -> (u32, u32);

    fn attach_resize(&mut self) -> Result<()>;

    fn detach_resize(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

pub struct RenderLoop<H: FrameHost, D: Surface, S: Simulation> {
    host: H,
    surface: D,
    sim: S,
    state: LoopState,
    pending: Option<FrameId>,
    last_ms: Option<f64>,
    ticks: u64,
}

impl<H: FrameHost, D: Surface, S: Simulation> RenderLoop<H, D, S> {
    pub fn new(host: H, surface: D, sim: S) -> Self {
        Self {
            host,
            surface,
            sim,
            state: LoopState::Stopped,
            pending: None,
            last_ms: None,
            ticks: 0,
        }
    }

    /// Attach to the host and schedule the first frame. No-op if running.
    pub fn start(&mut self) -> Result<()> {
        if self.state == LoopState::Running {
            return Ok(());
        }
        self.host.attach_resize()?;
        self.resize();

        match self.host.request_frame() {
            Ok(id) => self.pending = Some(id),
            Err(e) => {
                self.host.detach_resize();
                return Err(e);
            }
        }
        self.state = LoopState::Running;
        self.last_ms = None;
        info!("render loop started at {}x{}", self.surface.width(), self.surface.height());
        Ok(())
    }

    /// Frame callback. `now_ms` is the host's frame timestamp.
    pub fn frame(&mut self, now_ms: f64) {
        if self.state != LoopState::Running {
            return;
        }
        self.pending = None;

        let dt = match self.last_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_DT),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);

        self.sim.tick(dt, &mut self.surface);
        self.ticks += 1;

        match self.host.request_frame() {
            Ok(id) => self.pending = Some(id),
            Err(e) => {
                warn!("render loop halted: {e}");
                self.stop();
            }
        }
    }

    /// Re-read the viewport and pass it to surface and simulation.
    pub fn resize(&mut self) {
        let (w, h) = self.host.viewport();
        if (w, h) != (self.surface.width(), self.surface.height()) {
            self.surface.resize(w, h);
        }
        self.sim.resize(w, h);
    }

    /// Cancel the pending frame and detach from the host.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        if let Some(id) = self.pending.take() {
            self.host.cancel_frame(id);
        }
        self.host.detach_resize();
        self.state = LoopState::Stopped;
        info!("render loop stopped after {} ticks", self.ticks);
    }

    pub fn state(&self) -> LoopState { self.state }
    pub fn ticks(&self) -> u64 { self.ticks }
    pub fn pending(&self) -> Option<FrameId> { self.pending }
    pub fn host(&self) -> &H { &self.host }
    pub fn host_mut(&mut self) -> &mut H { &mut self.host }
    pub fn surface(&self) -> &D { &self.surface }
    pub fn sim(&self) -> &S { &self.sim }
    pub fn sim_mut(&mut self) -> &mut S { &mut self.sim }
}

impl<H: FrameHost, D: Surface, S: Simulation> Drop for RenderLoop<H, D, S> {
    fn drop(&mut self) {
        self.stop();
    }
}
