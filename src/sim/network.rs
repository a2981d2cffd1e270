// network.rs - "Living network" of connected nodes
//
// Every pair of nodes closer than the connection distance is joined by a
// line whose opacity falls off with distance and pulses with a phase
// shared by the whole frame. The pair scan is O(n^2); node count is capped
// at MAX_NODES so that stays cheap.

use log::info;

use super::{Nodes, Simulation, SmallRng, seeded};
use crate::config::NetworkConfig;
use crate::render::{Rgba, Surface};

const LINK_GLOW: f32 = 20.0;
const LINK_WIDTH: f32 = 4.0;
const LINK_ALPHA: f32 = 0.8;

/// A drawable connection between nodes `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    /// 1 when touching, 0 at the connection distance.
    pub strength: f32,
}

pub struct NetworkWorld {
    w: u32,
    h: u32,
    config: NetworkConfig,
    nodes: Nodes,
    phase: f32,
    frame: u64,
}

impl NetworkWorld {
    pub fn new(w: u32, h: u32, config: NetworkConfig, seed: u64) -> Self {
        let mut rng: SmallRng = seeded(seed);
        let mut nodes = Nodes::new();
        nodes.spawn(config.node_count, w as f32, h as f32, &config, &mut rng);
        info!("network: {} nodes on {}x{}", nodes.n, w, h);

        Self { w, h, config, nodes, phase: 0.0, frame: 0 }
    }

    pub fn nodes(&self) -> &Nodes { &self.nodes }
    pub fn frame(&self) -> u64 { self.frame }
    pub fn phase(&self) -> f32 { self.phase }
    pub fn width(&self) -> u32 { self.w }
    pub fn height(&self) -> u32 { self.h }

    /// Every pair within the connection distance, in scan order.
    pub fn links(&self) -> Vec<Link> {
        let max = self.config.connection_distance;
        let n = &self.nodes;
        let mut out = Vec::new();

        for a in 0..n.n {
            for b in a + 1..n.n {
                let dx = n.x[a] - n.x[b];
                let dy = n.y[a] - n.y[b];
                if dx.abs() >= max || dy.abs() >= max { continue; }

                let distance = (dx * dx + dy * dy).sqrt();
                if distance < max {
                    out.push(Link { a, b, distance, strength: 1.0 - distance / max });
                }
            }
        }
        out
    }

    /// Pulse multiplier in [0.4, 1.0] for links starting at node `a`.
    #[inline]
    pub fn pulse(&self, a: usize) -> f32 {
        (self.phase + a as f32 * 0.1).sin() * 0.3 + 0.7
    }

    fn draw_links(&self, surface: &mut impl Surface) {
        let n = &self.nodes;
        for link in self.links() {
            let (a, b) = (link.a, link.b);
            let hue = (n.hue[a] + n.hue[b]) / 2.0;
            let alpha = link.strength * self.pulse(a) * LINK_ALPHA;
            surface.line(
                (n.x[a], n.y[a]),
                (n.x[b], n.y[b]),
                link.strength * LINK_WIDTH,
                Rgba::hsla(hue, 1.0, 0.6, alpha),
                LINK_GLOW,
            );
        }
    }
}

impl Simulation for NetworkWorld {
    fn resize(&mut self, w: u32, h: u32) {
        self.w = w;
        self.h = h;
    }

    fn tick(&mut self, _dt: f32, surface: &mut impl Surface) {
        surface.fade(self.config.trail_alpha);
        self.phase += self.config.pulse_step;

        self.nodes.update(self.w as f32, self.h as f32);
        self.nodes.draw(surface);
        self.draw_links(surface);

        self.frame += 1;
    }
}
