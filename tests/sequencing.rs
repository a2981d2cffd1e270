// Query sequencing and render loop lifecycle through the public API.

use std::cell::{Cell, RefCell};
use std::f32::consts::PI;
use std::rc::Rc;

use nucleus_engine::render::{Rgba, Stop, Surface};
use nucleus_engine::scene::NucleusScene;
use nucleus_engine::timeline::{Channel, Property, Target};
use nucleus_engine::{
    Animatable, FrameHost, FrameId, Hero, Hooks, LoopState, NucleusConfig, QueryPhase, RenderLoop, Result,
    SequenceState, Sequencer,
};
use pretty_assertions::assert_eq;

struct Blank;

impl Surface for Blank {
    fn width(&self) -> u32 { 640 }
    fn height(&self) -> u32 { 480 }
    fn resize(&mut self, _w: u32, _h: u32) {}
    fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _color: Rgba) {}
    fn fill_circle(&mut self, _x: f32, _y: f32, _r: f32, _color: Rgba, _glow: f32) {}
    fn radial_gradient(&mut self, _x: f32, _y: f32, _r: f32, _stops: &[Stop]) {}
    fn line(&mut self, _from: (f32, f32), _to: (f32, f32), _width: f32, _color: Rgba, _glow: f32) {}
}

#[derive(Default)]
struct Host {
    next: i32,
    live: Vec<FrameId>,
    listening: bool,
}

impl FrameHost for Host {
    fn request_frame(&mut self) -> Result<FrameId> {
        self.next += 1;
        self.live.push(FrameId(self.next));
        Ok(FrameId(self.next))
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.live.retain(|&f| f != id);
    }

    fn viewport(&self) -> (u32, u32) { (640, 480) }

    fn attach_resize(&mut self) -> Result<()> {
        self.listening = true;
        Ok(())
    }

    fn detach_resize(&mut self) {
        self.listening = false;
    }
}

const SPIN: Property = Property::new(Target::Nucleus, Channel::RotationY);
const SCALE: Property = Property::new(Target::Nucleus, Channel::Scale);

#[test]
fn restarting_a_query_completes_once_from_the_second() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (a, b) = (log.clone(), log.clone());
    let mut scene = NucleusScene::new(NucleusConfig::default(), 3);
    let mut seq = Sequencer::new();

    seq.start(Target::Nucleus, Hooks::new().on_complete(move || a.borrow_mut().push("first")));
    for _ in 0..10 {
        seq.advance(0.016, &mut scene);
    }
    let spun = scene.get(SPIN);
    seq.start(Target::Nucleus, Hooks::new().on_complete(move || b.borrow_mut().push("second")));
    for _ in 0..60 {
        seq.advance(0.016, &mut scene);
    }

    assert_eq!(*log.borrow(), vec!["second"]);
    assert_eq!(seq.state(), SequenceState::Completed);
    assert!((scene.get(SPIN) - (spun + 4.0 * PI)).abs() < 1e-3);
    assert!((scene.get(SCALE) - 0.3).abs() < 1e-6);
}

#[test]
fn hero_in_a_render_loop() {
    let done = Rc::new(Cell::new(0));
    let d = done.clone();
    let mut hero = Hero::new(NucleusConfig::default(), 5, false);
    hero.on_query_complete(move || d.set(d.get() + 1));

    let mut l = RenderLoop::new(Host::default(), Blank, hero);
    l.start().unwrap();
    l.sim_mut().trigger_query();

    let mut now = 0.0;
    for _ in 0..120 {
        l.frame(now);
        now += 16.0;
    }
    assert_eq!(done.get(), 1);
    assert_eq!(l.sim().phase(), QueryPhase::Idle);

    l.stop();
    let ticks = l.ticks();
    l.frame(now);
    assert_eq!(l.ticks(), ticks);
    assert_eq!(l.state(), LoopState::Stopped);
    assert!(!l.host().listening);
    assert!(l.pending().is_none());
}

#[test]
fn reduced_motion_hero_leaves_scene_untouched() {
    let done = Rc::new(Cell::new(0));
    let d = done.clone();
    let mut hero = Hero::new(NucleusConfig::default(), 5, true);
    hero.on_query_complete(move || d.set(d.get() + 1));
    let before = hero.snapshot();

    assert!(hero.trigger_query());
    assert!(!hero.trigger_query());
    for _ in 0..100 {
        hero.advance(0.016);
    }

    assert_eq!(hero.snapshot(), before);
    assert_eq!(done.get(), 1);
}

#[test]
fn dropping_the_loop_cancels_everything() {
    let host = Rc::new(RefCell::new(Vec::<FrameId>::new()));

    struct Shared(Rc<RefCell<Vec<FrameId>>>, i32);

    impl FrameHost for Shared {
        fn request_frame(&mut self) -> Result<FrameId> {
            self.1 += 1;
            self.0.borrow_mut().push(FrameId(self.1));
            Ok(FrameId(self.1))
        }
        fn cancel_frame(&mut self, id: FrameId) {
            self.0.borrow_mut().retain(|&f| f != id);
        }
        fn viewport(&self) -> (u32, u32) { (640, 480) }
        fn attach_resize(&mut self) -> Result<()> { Ok(()) }
        fn detach_resize(&mut self) {}
    }

    {
        let mut l = RenderLoop::new(Shared(host.clone(), 0), Blank, Hero::new(NucleusConfig::default(), 1, false));
        l.start().unwrap();
        assert_eq!(host.borrow().len(), 1);
    }
    assert!(host.borrow().is_empty());
}

#[test]
fn stopped_hero_accepts_a_new_query() {
    let done = Rc::new(Cell::new(0));
    let d = done.clone();
    let mut hero = Hero::new(NucleusConfig::default(), 9, false);
    hero.on_query_complete(move || d.set(d.get() + 1));

    assert!(hero.trigger_query());
    for _ in 0..20 {
        hero.advance(0.016);
    }
    assert_eq!(hero.phase(), QueryPhase::Collapsing);
    hero.stop();

    assert!(!hero.is_querying());
    assert!(!hero.snapshot().querying);
    assert_eq!(hero.snapshot().nucleus.scale, 1.0);
    assert!(hero.trigger_query());
    for _ in 0..100 {
        hero.advance(0.016);
    }
    assert_eq!(done.get(), 1);
    assert_eq!(hero.phase(), QueryPhase::Idle);
}
