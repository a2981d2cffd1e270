// scene/ - 3D hero nucleus
//
// A wireframe shell around an emissive core, a ring of orbiting nodes,
// three lights and a one-shot particle explosion, all projected through
// a perspective camera onto a 2D surface.
//
// Orbits run on their own clock. Hovering eases the clock rate up instead
// of rescaling elapsed time, so nodes speed up without jumping.

mod camera;
mod explosion;

pub use camera::{Camera, Projected};
pub use explosion::Explosion;

use std::f32::consts::{PI, TAU};

use glam::{EulerRot, Quat, Vec3};
use log::info;
use serde::Serialize;

use crate::config::NucleusConfig;
use crate::render::{Rgb, Rgba, Stop, Surface};
use crate::sim::{SmallRng, seeded};
use crate::timeline::{Animatable, Channel, Property, Target};

pub const MAX_EXPLOSION: usize = 2048;

const SHELL_RADIUS: f32 = 2.0;
const SHELL_OPACITY: f32 = 0.6;
const SHELL_COLOR: Rgb = Rgb::new(0xFF, 0x6A, 0x00);
const CORE_RADIUS: f32 = 1.5;
const CORE_COLOR: Rgb = Rgb::new(0xFF, 0xA7, 0x33);
const CORE_EMISSIVE: Rgb = Rgb::new(0xFF, 0x6A, 0x00);
const NODE_RADIUS: f32 = 0.1;
const SPARK_RADIUS: f32 = 0.05;
const SPARK_OPACITY: f32 = 0.8;

// Wireframe resolution
const MERIDIANS: usize = 12;
const PARALLELS: usize = 7;
const SEGMENTS: usize = 32;

/// Position, rotation (Euler, radians) and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Vec3::ZERO, scale: 1.0 }
    }
}

impl Transform {
    /// Local point to world space.
    pub fn apply(&self, local: Vec3) -> Vec3 {
        let q = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        q * (local * self.scale) + self.position
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    pub speed: f32,
    pub phase: f32,
    pub color: Rgb,
}

impl Orbit {
    /// Node position at orbit clock `clock`.
    pub fn position_at(&self, clock: f32, tilt: f32) -> Vec3 {
        let t = clock * self.speed + self.phase;
        Vec3::new(t.cos() * self.radius, (t * 0.5).sin() * self.radius * tilt, t.sin() * self.radius)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Point(Vec3),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Rgb,
    pub intensity: f32,
}

impl Light {
    /// Lambert contribution at `point` with surface `normal`.
    pub fn at(&self, point: Vec3, normal: Vec3) -> f32 {
        match self.kind {
            LightKind::Ambient => self.intensity,
            LightKind::Point(pos) => {
                let dir = (pos - point).normalize_or_zero();
                normal.dot(dir).max(0.0) * self.intensity
            }
        }
    }
}

/// Ambient, warm key from the upper right, blue fill from behind.
pub fn default_lights() -> [Light; 3] {
    [
        Light { kind: LightKind::Ambient, color: Rgb::WHITE, intensity: 0.5 },
        Light { kind: LightKind::Point(Vec3::splat(10.0)), color: Rgb::WHITE, intensity: 1.0 },
        Light {
            kind: LightKind::Point(Vec3::splat(-10.0)),
            color: Rgb::new(0x00, 0x2B, 0x5C),
            intensity: 0.5,
        },
    ]
}

/// Results panel that the reveal timeline fades in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Panel {
    pub opacity: f32,
    /// Vertical offset in CSS pixels; 0 when settled.
    pub y: f32,
}

impl Default for Panel {
    fn default() -> Self {
        Self { opacity: 0.0, y: 20.0 }
    }
}

/// Serializable snapshot of the scene for hosts and debugging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneFrame {
    pub elapsed: f32,
    pub nucleus: Transform,
    pub emissive: f32,
    pub orbit_speed: f32,
    pub orbits: Vec<Vec3>,
    pub querying: bool,
    pub explosion_live: usize,
    pub explosion_opacity: f32,
    pub results: Panel,
}

pub struct NucleusScene {
    config: NucleusConfig,
    camera: Camera,
    lights: [Light; 3],
    orbits: Vec<Orbit>,

    nucleus: Transform,
    explosion: Explosion,
    results: Panel,

    elapsed: f32,
    orbit_clock: f32,
    orbit_speed: f32,
    hovered: bool,
    querying: bool,

    rng: SmallRng,
}

impl NucleusScene {
    pub fn new(config: NucleusConfig, seed: u64) -> Self {
        let orbits = config
            .orbits
            .iter()
            .map(|o| Orbit {
                radius: o.radius,
                speed: o.speed,
                phase: o.phase,
                color: Rgb::from_hex(&o.color).unwrap_or(SHELL_COLOR),
            })
            .collect();

        Self {
            camera: Camera::new(config.camera_distance, config.fov_degrees),
            lights: default_lights(),
            orbits,
            nucleus: Transform::default(),
            explosion: Explosion::new(config.explosion_lifetime),
            results: Panel::default(),
            elapsed: 0.0,
            orbit_clock: 0.0,
            orbit_speed: 1.0,
            hovered: false,
            querying: false,
            rng: seeded(seed),
            config,
        }
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// While querying the core's idle spin is paused.
    pub fn set_querying(&mut self, querying: bool) {
        self.querying = querying;
    }

    pub fn hovered(&self) -> bool { self.hovered }
    pub fn querying(&self) -> bool { self.querying }
    pub fn elapsed(&self) -> f32 { self.elapsed }
    pub fn orbit_speed(&self) -> f32 { self.orbit_speed }
    pub fn nucleus(&self) -> &Transform { &self.nucleus }
    pub fn explosion(&self) -> &Explosion { &self.explosion }
    pub fn results(&self) -> &Panel { &self.results }
    pub fn orbits(&self) -> &[Orbit] { &self.orbits }

    /// Emissive intensity of the core, pulsing in [0.3, 0.7].
    pub fn emissive(&self) -> f32 {
        let pulse = (self.elapsed * 2.0).sin() * 0.5 + 0.5;
        0.3 + pulse * 0.4
    }

    /// Current world position of every orbiting node.
    pub fn orbit_positions(&self) -> Vec<Vec3> {
        self.orbits
            .iter()
            .map(|o| o.position_at(self.orbit_clock, self.config.orbit_tilt))
            .collect()
    }

    /// Light reaching `point` with `normal`, summed over all lights.
    pub fn illumination(&self, point: Vec3, normal: Vec3) -> f32 {
        self.lights.iter().map(|l| l.at(point, normal)).sum()
    }

    /// Start the explosion at the core.
    pub fn ignite(&mut self) {
        let count = self.config.explosion_count;
        let speed = self.config.explosion_speed;
        self.explosion.ignite(self.nucleus.position, count, speed, &mut self.rng);
        info!("scene: explosion of {count} particles");
    }

    pub fn hide_explosion(&mut self) {
        self.explosion.hide();
    }

    /// Put the results panel back in its hidden, lowered state.
    pub fn reset_results(&mut self) {
        self.results = Panel::default();
    }

    /// Advance clocks and idle motion. Returns true on the tick the
    /// explosion runs out.
    pub fn step(&mut self, dt: f32) -> bool {
        self.elapsed += dt;

        let target = if self.hovered { self.config.hover_speedup } else { 1.0 };
        let k = 1.0 - (-self.config.hover_response * dt).exp();
        self.orbit_speed += (target - self.orbit_speed) * k;
        self.orbit_clock += dt * self.orbit_speed;

        if !self.querying {
            let (sx, sy) = self.config.idle_spin;
            self.nucleus.rotation.x += sx * dt;
            self.nucleus.rotation.y += sy * dt;
        }
        self.nucleus.position.y = (self.elapsed * 0.8).sin() * 0.1;

        self.explosion.update(dt)
    }

    pub fn snapshot(&self) -> SceneFrame {
        SceneFrame {
            elapsed: self.elapsed,
            nucleus: self.nucleus,
            emissive: self.emissive(),
            orbit_speed: self.orbit_speed,
            orbits: self.orbit_positions(),
            querying: self.querying,
            explosion_live: if self.explosion.is_active() { self.explosion.n } else { 0 },
            explosion_opacity: self.explosion.opacity,
            results: self.results,
        }
    }

    /// Render the scene onto `surface`, far to near.
    pub fn draw(&self, surface: &mut impl Surface) {
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        surface.clear();

        let core = self.nucleus.position;
        let core_depth = self.camera.distance - core.z;

        // Nodes behind the core first
        let nodes = self.orbit_positions();
        for (orbit, &p) in self.orbits.iter().zip(&nodes) {
            if self.camera.distance - p.z > core_depth {
                self.draw_node(surface, orbit, p, w, h);
            }
        }

        self.draw_core(surface, w, h);
        self.draw_shell(surface, w, h);

        for (orbit, &p) in self.orbits.iter().zip(&nodes) {
            if self.camera.distance - p.z <= core_depth {
                self.draw_node(surface, orbit, p, w, h);
            }
        }

        if self.explosion.is_active() {
            self.draw_explosion(surface, w, h);
        }
    }

    fn draw_node(&self, surface: &mut impl Surface, orbit: &Orbit, p: Vec3, w: f32, h: f32) {
        let Some(s) = self.camera.project(p, w, h) else { return };
        let normal = (self.camera_position() - p).normalize_or_zero();
        let light = (self.illumination(p, normal) + 0.5).min(1.5);
        let color = shade(orbit.color, light);
        surface.fill_circle(s.x, s.y, (NODE_RADIUS * s.scale).max(1.0), color.alpha(1.0), NODE_RADIUS * s.scale * 4.0);
    }

    fn draw_core(&self, surface: &mut impl Surface, w: f32, h: f32) {
        let center = self.nucleus.position;
        let Some(s) = self.camera.project(center, w, h) else { return };
        let r = CORE_RADIUS * self.nucleus.scale * s.scale;

        // Brightest where the key light faces the camera
        let rim = center + Vec3::new(0.5, 0.5, 1.0).normalize() * CORE_RADIUS * self.nucleus.scale;
        let lit = self.illumination(rim, (rim - center).normalize_or_zero());
        let glow = self.emissive();
        let body = mix(shade(CORE_COLOR, lit.min(1.2)), CORE_EMISSIVE, glow * 0.5);

        surface.radial_gradient(s.x, s.y, r * 1.6, &[
            Stop::new(0.0, CORE_EMISSIVE.alpha(glow * 0.6)),
            Stop::new(0.6, CORE_EMISSIVE.alpha(glow * 0.25)),
            Stop::new(1.0, Rgba::TRANSPARENT),
        ]);
        surface.fill_circle(s.x, s.y, r, body.alpha(1.0), 0.0);

        let offset = r * 0.35;
        surface.radial_gradient(s.x + offset, s.y - offset, r * 0.6, &[
            Stop::new(0.0, Rgb::WHITE.alpha(0.35 * lit.min(1.0))),
            Stop::new(1.0, Rgba::TRANSPARENT),
        ]);
    }

    fn draw_shell(&self, surface: &mut impl Surface, w: f32, h: f32) {
        let color = SHELL_COLOR.alpha(SHELL_OPACITY);
        let mut ring = |points: &mut dyn Iterator<Item = Vec3>| {
            let mut last: Option<Projected> = None;
            for local in points {
                let p = self.camera.project(self.nucleus.apply(local), w, h);
                if let (Some(a), Some(b)) = (last, p) {
                    surface.line((a.x, a.y), (b.x, b.y), 1.0, color, 0.0);
                }
                last = p;
            }
        };

        for m in 0..MERIDIANS {
            let lon = m as f32 / MERIDIANS as f32 * TAU;
            ring(&mut (0..=SEGMENTS).map(|i| {
                let lat = i as f32 / SEGMENTS as f32 * PI;
                sphere(SHELL_RADIUS, lat, lon)
            }));
        }
        for p in 1..PARALLELS {
            let lat = p as f32 / PARALLELS as f32 * PI;
            ring(&mut (0..=SEGMENTS).map(|i| {
                let lon = i as f32 / SEGMENTS as f32 * TAU;
                sphere(SHELL_RADIUS, lat, lon)
            }));
        }
    }

    fn draw_explosion(&self, surface: &mut impl Surface, w: f32, h: f32) {
        let e = &self.explosion;
        let color = SHELL_COLOR.alpha(SPARK_OPACITY * e.opacity.clamp(0.0, 1.0));
        if color.a <= 0.0 {
            return;
        }
        for p in &e.pos[..e.n] {
            if let Some(s) = self.camera.project(*p, w, h) {
                surface.fill_circle(s.x, s.y, (SPARK_RADIUS * s.scale).max(0.75), color, 0.0);
            }
        }
    }

    fn camera_position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.camera.distance)
    }
}

impl Animatable for NucleusScene {
    fn get(&self, p: Property) -> f32 {
        match (p.target, p.channel) {
            (Target::Nucleus, Channel::RotationX) => self.nucleus.rotation.x,
            (Target::Nucleus, Channel::RotationY) => self.nucleus.rotation.y,
            (Target::Nucleus, Channel::RotationZ) => self.nucleus.rotation.z,
            (Target::Nucleus, Channel::PositionX) => self.nucleus.position.x,
            (Target::Nucleus, Channel::PositionY) => self.nucleus.position.y,
            (Target::Nucleus, Channel::PositionZ) => self.nucleus.position.z,
            (Target::Nucleus, Channel::Scale) => self.nucleus.scale,
            (Target::Explosion, Channel::Opacity) => self.explosion.opacity,
            (Target::Results, Channel::Opacity) => self.results.opacity,
            (Target::Results, Channel::PositionY) => self.results.y,
            _ => 0.0,
        }
    }

    fn set(&mut self, p: Property, v: f32) {
        match (p.target, p.channel) {
            (Target::Nucleus, Channel::RotationX) => self.nucleus.rotation.x = v,
            (Target::Nucleus, Channel::RotationY) => self.nucleus.rotation.y = v,
            (Target::Nucleus, Channel::RotationZ) => self.nucleus.rotation.z = v,
            (Target::Nucleus, Channel::PositionX) => self.nucleus.position.x = v,
            (Target::Nucleus, Channel::PositionY) => self.nucleus.position.y = v,
            (Target::Nucleus, Channel::PositionZ) => self.nucleus.position.z = v,
            (Target::Nucleus, Channel::Scale) => self.nucleus.scale = v,
            (Target::Explosion, Channel::Opacity) => self.explosion.opacity = v,
            (Target::Results, Channel::Opacity) => self.results.opacity = v,
            (Target::Results, Channel::PositionY) => self.results.y = v,
            _ => {}
        }
    }
}

#[inline]
fn sphere(r: f32, lat: f32, lon: f32) -> Vec3 {
    Vec3::new(r * lat.sin() * lon.cos(), r * lat.cos(), r * lat.sin() * lon.sin())
}

fn shade(c: Rgb, k: f32) -> Rgb {
    let f = |v: u8| (v as f32 * k).round().clamp(0.0, 255.0) as u8;
    Rgb::new(f(c.r), f(c.g), f(c.b))
}

fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let f = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb::new(f(a.r, b.r), f(a.g, b.g), f(a.b, b.b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Tally;

    fn scene() -> NucleusScene {
        NucleusScene::new(NucleusConfig::default(), 1)
    }

    #[test]
    fn orbit_formula() {
        let o = Orbit { radius: 3.0, speed: 0.5, phase: 0.0, color: Rgb::WHITE };
        let p = o.position_at(0.0, 0.3);
        assert_eq!(p, Vec3::new(3.0, 0.0, 0.0));

        let q = o.position_at(PI, 0.3);
        let t = PI * 0.5;
        assert!((q.x - t.cos() * 3.0).abs() < 1e-6);
        assert!((q.y - (t * 0.5).sin() * 0.9).abs() < 1e-6);
        assert!((q.z - t.sin() * 3.0).abs() < 1e-6);
    }

    #[test]
    fn hover_eases_speed_up_and_back() {
        let mut s = scene();
        s.set_hovered(true);
        s.step(0.016);
        assert!(s.orbit_speed() > 1.0 && s.orbit_speed() < 1.8);
        for _ in 0..300 {
            s.step(0.016);
        }
        assert!((s.orbit_speed() - 1.8).abs() < 1e-3);

        s.set_hovered(false);
        for _ in 0..300 {
            s.step(0.016);
        }
        assert!((s.orbit_speed() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn hover_does_not_jump_nodes() {
        let mut s = scene();
        for _ in 0..100 {
            s.step(0.016);
        }
        let before = s.orbit_positions();
        s.set_hovered(true);
        s.step(0.016);
        let after = s.orbit_positions();
        for (a, b) in before.iter().zip(&after) {
            assert!(a.distance(*b) < 0.1);
        }
    }

    #[test]
    fn idle_spin_pauses_while_querying() {
        let mut s = scene();
        s.step(1.0);
        let spun = s.nucleus().rotation;
        assert!((spun.y - 0.06).abs() < 1e-6);
        assert!((spun.x - 0.03).abs() < 1e-6);

        s.set_querying(true);
        s.step(1.0);
        assert_eq!(s.nucleus().rotation, spun);
    }

    #[test]
    fn pulse_and_bob_ranges() {
        let mut s = scene();
        for _ in 0..1000 {
            s.step(0.016);
            let e = s.emissive();
            assert!((0.3 - 1e-6..=0.7 + 1e-6).contains(&e));
            assert!(s.nucleus().position.y.abs() <= 0.1 + 1e-6);
        }
    }

    #[test]
    fn explosion_runs_its_lifetime() {
        let mut s = scene();
        s.ignite();
        assert_eq!(s.snapshot().explosion_live, 800);
        let mut done = false;
        for _ in 0..60 {
            if s.step(0.016) {
                done = true;
                break;
            }
        }
        assert!(done);
        assert!((s.explosion().age - 0.8).abs() < 0.02);
        s.hide_explosion();
        assert_eq!(s.snapshot().explosion_live, 0);
    }

    #[test]
    fn animatable_paths() {
        let mut s = scene();
        let scale = Property::new(Target::Nucleus, Channel::Scale);
        s.set(scale, 0.3);
        assert_eq!(s.nucleus().scale, 0.3);
        let fade = Property::new(Target::Explosion, Channel::Opacity);
        s.set(fade, 0.5);
        assert_eq!(s.get(fade), 0.5);
        let unknown = Property::new(Target::Explosion, Channel::RotationZ);
        s.set(unknown, 9.0);
        assert_eq!(s.get(unknown), 0.0);
    }

    #[test]
    fn collapse_leaves_orbits_alone() {
        let mut s = scene();
        let before = s.orbit_positions();
        s.set(Property::new(Target::Nucleus, Channel::Scale), 0.3);
        assert_eq!(s.orbit_positions(), before);
    }

    #[test]
    fn reset_results_hides_panel() {
        let mut s = scene();
        s.set(Property::new(Target::Results, Channel::Opacity), 1.0);
        s.set(Property::new(Target::Results, Channel::PositionY), 0.0);
        s.reset_results();
        assert_eq!(*s.results(), Panel::default());
    }

    #[test]
    fn key_light_faces_upper_right() {
        let s = scene();
        let toward = s.illumination(Vec3::ZERO, Vec3::ONE.normalize());
        let away = s.illumination(Vec3::ZERO, -Vec3::ONE.normalize());
        assert!(toward > away);
        assert!(away >= 0.5);
    }

    #[test]
    fn draw_paints_everything() {
        let mut s = scene();
        s.ignite();
        let mut tally = Tally::new(800, 600);
        s.draw(&mut tally);
        // clear, core halo and highlight
        assert_eq!(tally.rects, 1);
        assert_eq!(tally.gradients, 2);
        assert_eq!(tally.circles, 1 + 4 + 800);
        assert_eq!(tally.lines, MERIDIANS * SEGMENTS + (PARALLELS - 1) * SEGMENTS);
        assert!(tally.max_alpha <= 1.0);
    }

    #[test]
    fn snapshot_serializes() {
        let s = scene();
        let json = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(json["orbits"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["nucleus"]["scale"], 1.0);
        assert_eq!(json["querying"], false);
    }
}
