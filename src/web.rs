// web.rs - Browser bindings
//
// Each exported handle owns one render loop over one canvas. The loop lives
// in an Rc<RefCell<..>>; the requestAnimationFrame and resize closures only
// hold Weak references, so dropping (or `free()`ing) the handle tears the
// loop down: the pending frame is cancelled and the listener detached.
//
// Callbacks into JS are deferred with spawn_local so JS can call back into
// the handle without hitting an outstanding borrow.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{self as web, HtmlCanvasElement, HtmlElement, MediaQueryList, Window};

use crate::config::EngineConfig;
use crate::driver::{FrameHost, FrameId, LoopState, RenderLoop};
use crate::error::{Error, Result};
use crate::hero::{Hero, REDUCED_MOTION_DWELL};
use crate::render::{CanvasSurface, Raster, Surface};
use crate::sim::{CosmosWorld, NetworkWorld, Simulation};
use crate::stats::{StatsResponse, StatsView};
use crate::visual::{Visual, VisualKind};

const STATS_URL: &str = "/api/stats";
const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

type Loop<S> = RenderLoop<WebHost, CanvasSurface, S>;
type Shared<S> = Rc<RefCell<Loop<S>>>;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    info!("nucleus-engine loaded");
}

// ============================================================================
// Host
// ============================================================================

pub struct WebHost {
    window: Window,
    canvas: HtmlCanvasElement,
    on_frame: Option<Closure<dyn FnMut(f64)>>,
    on_resize: Option<Closure<dyn FnMut()>>,
    listening: bool,
}

impl WebHost {
    fn new(window: Window, canvas: HtmlCanvasElement) -> Self {
        Self { window, canvas, on_frame: None, on_resize: None, listening: false }
    }
}

fn js_context(e: JsValue) -> Error {
    Error::missing_context(format!("{e:?}"))
}

fn js_fetch(e: JsValue) -> Error {
    Error::Fetch(format!("{e:?}"))
}

impl FrameHost for WebHost {
    fn request_frame(&mut self) -> Result<FrameId> {
        let cb = self
            .on_frame
            .as_ref()
            .ok_or_else(|| Error::missing_context("frame callback not installed"))?;
        self.window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .map(FrameId)
            .map_err(js_context)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if let Err(e) = self.window.cancel_animation_frame(id.0) {
            warn!("cancelAnimationFrame failed: {e:?}");
        }
    }

    /// Canvas layout size, or the window when the canvas isn't laid out.
    fn viewport(&self) -> (u32, u32) {
        let (w, h) = (self.canvas.client_width(), self.canvas.client_height());
        if w > 0 && h > 0 {
            return (w as u32, h as u32);
        }
        let dim = |v: std::result::Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as u32;
        (dim(self.window.inner_width()), dim(self.window.inner_height()))
    }

    fn attach_resize(&mut self) -> Result<()> {
        if self.listening {
            return Ok(());
        }
        let cb = self
            .on_resize
            .as_ref()
            .ok_or_else(|| Error::missing_context("resize callback not installed"))?;
        self.window
            .add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
            .map_err(js_context)?;
        self.listening = true;
        Ok(())
    }

    fn detach_resize(&mut self) {
        if !self.listening {
            return;
        }
        if let Some(cb) = self.on_resize.as_ref() {
            if let Err(e) = self.window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref()) {
                warn!("resize listener not removed: {e:?}");
            }
        }
        self.listening = false;
    }
}

/// Build a stopped loop over `canvas` with its host closures installed.
fn mount<S: Simulation + 'static>(canvas: HtmlCanvasElement, build: impl FnOnce(u32, u32) -> S) -> Result<Shared<S>> {
    let window = web::window().ok_or_else(|| Error::missing_context("no window"))?;
    let surface = CanvasSurface::new(canvas.clone())?;
    let host = WebHost::new(window, canvas);
    let (w, h) = host.viewport();
    let shared = Rc::new(RefCell::new(RenderLoop::new(host, surface, build(w, h))));

    let weak = Rc::downgrade(&shared);
    let on_frame = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
        with_loop(&weak, |l| l.frame(now));
    });
    let weak = Rc::downgrade(&shared);
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        with_loop(&weak, |l| l.resize());
    });
    {
        let mut l = shared.borrow_mut();
        l.host_mut().on_frame = Some(on_frame);
        l.host_mut().on_resize = Some(on_resize);
    }
    Ok(shared)
}

fn with_loop<S: Simulation>(weak: &Weak<RefCell<Loop<S>>>, f: impl FnOnce(&mut Loop<S>)) {
    let Some(shared) = weak.upgrade() else { return };
    match shared.try_borrow_mut() {
        Ok(mut l) => f(&mut l),
        Err(_) => warn!("render loop busy; callback dropped"),
    };
}

fn engine_config(json: Option<&str>) -> EngineConfig {
    match json.map(EngineConfig::from_json) {
        None => EngineConfig::default(),
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            warn!("{e}; using defaults");
            EngineConfig::default()
        }
    }
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * (1u64 << 53) as f64) as u64
}

fn set_display(el: &HtmlElement, visible: bool) {
    if let Err(e) = el.style().set_property("display", if visible { "" } else { "none" }) {
        warn!("cannot toggle display: {e:?}");
    }
}

// ============================================================================
// 2D backgrounds
// ============================================================================

#[wasm_bindgen]
pub struct CosmicBackground {
    inner: Option<Shared<CosmosWorld>>,
}

#[wasm_bindgen]
impl CosmicBackground {
    /// Starts immediately. Without a 2d context the handle is inert.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: Option<String>) -> CosmicBackground {
        let config = engine_config(config.as_deref()).cosmos;
        let seed = random_seed();
        let inner = mount(canvas, |w, h| CosmosWorld::new(w, h, config, seed))
            .and_then(|l| {
                l.borrow_mut().start()?;
                Ok(l)
            })
            .map_err(|e| warn!("cosmic background disabled: {e}"))
            .ok();
        Self { inner }
    }

    /// Burst at (x, y); `count` defaults to the configured burst size.
    pub fn burst(&self, x: f32, y: f32, count: Option<usize>) -> usize {
        let Some(inner) = self.inner.as_ref() else { return 0 };
        let mut l = inner.borrow_mut();
        let world = l.sim_mut();
        let count = count.unwrap_or(world.config().burst_count);
        world.burst(x, y, count)
    }

    pub fn is_running(&self) -> bool {
        self.inner.as_ref().is_some_and(|l| l.borrow().state() == LoopState::Running)
    }

    pub fn stop(&mut self) {
        if let Some(l) = self.inner.take() {
            l.borrow_mut().stop();
        }
    }
}

#[wasm_bindgen]
pub struct NetworkWeb {
    inner: Option<Shared<NetworkWorld>>,
}

#[wasm_bindgen]
impl NetworkWeb {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: Option<String>) -> NetworkWeb {
        let config = engine_config(config.as_deref()).network;
        let seed = random_seed();
        let inner = mount(canvas, |w, h| NetworkWorld::new(w, h, config, seed))
            .and_then(|l| {
                l.borrow_mut().start()?;
                Ok(l)
            })
            .map_err(|e| warn!("network web disabled: {e}"))
            .ok();
        Self { inner }
    }

    pub fn is_running(&self) -> bool {
        self.inner.as_ref().is_some_and(|l| l.borrow().state() == LoopState::Running)
    }

    pub fn stop(&mut self) {
        if let Some(l) = self.inner.take() {
            l.borrow_mut().stop();
        }
    }
}

// ============================================================================
// Hero
// ============================================================================

/// What the hero shows and where. Holds the loop weakly, so the media
/// query listener and dwell timers never keep a stopped hero alive.
#[derive(Clone)]
struct HeroView {
    shared: Weak<RefCell<Loop<Hero>>>,
    canvas: HtmlCanvasElement,
    fallback: Option<HtmlElement>,
}

impl HeroView {
    fn set_reduced_motion(&self, on: bool) {
        let Some(shared) = self.shared.upgrade() else { return };
        let querying = {
            let mut l = shared.borrow_mut();
            if l.sim().reduced_motion() == on {
                return;
            }
            l.sim_mut().set_reduced_motion(on);
            l.sim().is_querying()
        };
        self.present(on);
        if on && querying {
            self.schedule_dwell();
        }
    }

    /// Show the canvas and run the loop, or show the static fallback.
    fn present(&self, reduced: bool) {
        let Some(shared) = self.shared.upgrade() else { return };
        if reduced {
            shared.borrow_mut().stop();
            set_display(&self.canvas, false);
            if let Some(el) = self.fallback.as_ref() {
                set_display(el, true);
            }
            self.render_fallback();
        } else {
            if let Some(el) = self.fallback.as_ref() {
                set_display(el, false);
            }
            set_display(&self.canvas, true);
            if let Err(e) = shared.borrow_mut().start() {
                warn!("hero nucleus cannot animate: {e}");
            }
        }
    }

    fn render_fallback(&self) {
        let (Some(shared), Some(el)) = (self.shared.upgrade(), self.fallback.as_ref()) else { return };
        el.set_inner_html(&shared.borrow().sim().markup());
    }

    /// Finish the reduced-motion dwell on a wall-clock timer.
    fn schedule_dwell(&self) {
        let Some(window) = web::window() else { return };
        let view = self.clone();

        let cb = Closure::once_into_js(move || {
            let Some(shared) = view.shared.upgrade() else { return };
            let done = shared.borrow_mut().sim_mut().complete_dwell();
            if done {
                view.render_fallback();
            }
        });
        let ms = (REDUCED_MOTION_DWELL * 1000.0) as i32;
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms) {
            warn!("setTimeout failed: {e:?}");
        }
    }
}

/// `change` listener on the reduced-motion media query, removed on drop.
struct MotionWatch {
    query: MediaQueryList,
    on_change: Closure<dyn FnMut()>,
}

impl MotionWatch {
    fn new(window: &Window, view: HeroView) -> Result<Self> {
        let query = window
            .match_media(REDUCED_MOTION_QUERY)
            .map_err(js_context)?
            .ok_or_else(|| Error::missing_context("matchMedia unsupported"))?;
        let q = query.clone();
        let on_change = Closure::<dyn FnMut()>::new(move || {
            let on = q.matches();
            info!("reduced motion preference changed: {on}");
            view.set_reduced_motion(on);
        });
        query
            .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
            .map_err(js_context)?;
        Ok(Self { query, on_change })
    }
}

impl Drop for MotionWatch {
    fn drop(&mut self) {
        let cb = self.on_change.as_ref().unchecked_ref();
        if let Err(e) = self.query.remove_event_listener_with_callback("change", cb) {
            warn!("media query listener not removed: {e:?}");
        }
    }
}

#[wasm_bindgen]
pub struct HeroNucleus {
    inner: Option<Shared<Hero>>,
    view: HeroView,
    motion: Option<MotionWatch>,
}

#[wasm_bindgen]
impl HeroNucleus {
    /// `fallback` receives the static markup when reduced motion is on.
    /// The view follows later changes to the reduced-motion preference.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, fallback: Option<HtmlElement>, config: Option<String>) -> HeroNucleus {
        let config = engine_config(config.as_deref()).nucleus;
        let reduced = prefers_reduced_motion();
        let seed = random_seed();
        let inner = mount(canvas.clone(), |w, h| {
            let mut hero = Hero::new(config, seed, reduced);
            hero.resize(w, h);
            hero
        })
        .map_err(|e| warn!("hero nucleus disabled: {e}"))
        .ok();

        let shared = inner.as_ref().map(Rc::downgrade).unwrap_or_default();
        let view = HeroView { shared, canvas, fallback };
        let motion = match (inner.as_ref(), web::window()) {
            (Some(_), Some(window)) => MotionWatch::new(&window, view.clone())
                .map_err(|e| warn!("reduced motion changes will be missed: {e}"))
                .ok(),
            _ => None,
        };

        view.present(reduced);
        Self { inner, view, motion }
    }

    /// False if a query is already running or the handle is inert.
    pub fn trigger_query(&self) -> bool {
        let Some(inner) = self.inner.as_ref() else { return false };
        let (started, reduced) = {
            let mut l = inner.borrow_mut();
            let hero = l.sim_mut();
            (hero.trigger_query(), hero.reduced_motion())
        };
        if started && reduced {
            self.view.render_fallback();
            self.view.schedule_dwell();
        }
        started
    }

    pub fn set_hovered(&self, hovered: bool) {
        if let Some(inner) = self.inner.as_ref() {
            inner.borrow_mut().sim_mut().set_hovered(hovered);
        }
    }

    pub fn set_reduced_motion(&self, on: bool) {
        self.view.set_reduced_motion(on);
    }

    /// `callback` runs once after every query, outside any engine borrow.
    pub fn on_query_complete(&self, callback: js_sys::Function) {
        let Some(inner) = self.inner.as_ref() else { return };
        inner.borrow_mut().sim_mut().on_query_complete(move || {
            let callback = callback.clone();
            spawn_local(async move {
                if let Err(e) = callback.call0(&JsValue::NULL) {
                    warn!("query complete callback threw: {e:?}");
                }
            });
        });
    }

    pub fn reveal_results(&self) {
        if let Some(inner) = self.inner.as_ref() {
            inner.borrow_mut().sim_mut().reveal_results();
        }
    }

    /// Scene state as JSON.
    pub fn snapshot(&self) -> std::result::Result<String, JsError> {
        let inner = self.inner.as_ref().ok_or_else(|| JsError::new("hero nucleus is inert"))?;
        let frame = inner.borrow().sim().snapshot();
        serde_json::to_string(&frame).map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn is_querying(&self) -> bool {
        self.inner.as_ref().is_some_and(|l| l.borrow().sim().is_querying())
    }

    pub fn is_running(&self) -> bool {
        self.inner.as_ref().is_some_and(|l| l.borrow().state() == LoopState::Running)
    }

    pub fn stop(&mut self) {
        self.motion = None;
        if let Some(shared) = self.inner.take() {
            let mut l = shared.borrow_mut();
            l.sim_mut().stop();
            l.stop();
        }
    }
}

impl HeroNucleus {
    /// The media query whose `change` events drive the view.
    pub fn motion_query(&self) -> Option<MediaQueryList> {
        self.motion.as_ref().map(|m| m.query.clone())
    }
}

// ============================================================================
// Raster frame buffer
// ============================================================================

/// Software-rendered visual for hosts that blit with `putImageData`.
#[wasm_bindgen]
pub struct RasterScene {
    visual: Visual,
    raster: Raster,
}

#[wasm_bindgen]
impl RasterScene {
    #[wasm_bindgen(constructor)]
    pub fn new(kind: &str, w: u32, h: u32, config: Option<String>) -> std::result::Result<RasterScene, JsError> {
        let kind: VisualKind = kind.parse().map_err(|e: Error| JsError::new(&e.to_string()))?;
        let config = engine_config(config.as_deref());
        let raster = Raster::new(w, h).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self { visual: Visual::new(kind, w, h, &config, random_seed()), raster })
    }

    pub fn tick(&mut self, dt: f32) {
        self.visual.tick(dt, &mut self.raster);
    }

    pub fn resize(&mut self, w: u32, h: u32) -> std::result::Result<(), JsError> {
        self.raster.try_resize(w, h).map_err(|e| JsError::new(&e.to_string()))?;
        self.visual.resize(w, h);
        Ok(())
    }

    pub fn trigger_query(&mut self) {
        self.visual.trigger_query();
    }

    pub fn frame_ptr(&self) -> *const u8 { self.raster.ptr() }
    pub fn frame_len(&self) -> usize { self.raster.len() }
    pub fn width(&self) -> u32 { self.raster.width() }
    pub fn height(&self) -> u32 { self.raster.height() }
}

// ============================================================================
// Environment
// ============================================================================

#[wasm_bindgen]
pub fn prefers_reduced_motion() -> bool {
    web::window()
        .and_then(|w| w.match_media(REDUCED_MOTION_QUERY).ok().flatten())
        .is_some_and(|m| m.matches())
}

/// Fetch market stats and return the display view as JSON. Failures
/// produce the unavailable view, never an exception.
#[wasm_bindgen]
pub async fn fetch_stats(url: Option<String>) -> std::result::Result<String, JsError> {
    let url = url.unwrap_or_else(|| STATS_URL.to_string());
    let view = StatsView::from_result(fetch_response(&url).await);
    serde_json::to_string(&view).map_err(|e| JsError::new(&e.to_string()))
}

async fn fetch_response(url: &str) -> Result<StatsResponse> {
    let window = web::window().ok_or_else(|| Error::missing_context("no window"))?;
    let resp: web::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_fetch)?
        .dyn_into()
        .map_err(js_fetch)?;
    if !resp.ok() {
        return Err(Error::Fetch(format!("{url}: HTTP {}", resp.status())));
    }
    let text = JsFuture::from(resp.text().map_err(js_fetch)?).await.map_err(js_fetch)?;
    let text = text.as_string().ok_or_else(|| Error::Fetch(format!("{url}: body is not text")))?;
    StatsResponse::parse(&text)
}
