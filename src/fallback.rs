//! Static nucleus for reduced-motion users.
//!
//! The figure is described once as a list of [`Shape`]s in a 200x200 view
//! box and rendered either as SVG markup for the DOM or onto a
//! [`Surface`] for the poster renderer.

use std::f32::consts::PI;
use std::fmt::Write as _;

use crate::render::{Rgb, Surface};

pub const VIEW_BOX: f32 = 200.0;

const ORANGE: Rgb = Rgb::new(0xFF, 0x6A, 0x00);
const AMBER: Rgb = Rgb::new(0xFF, 0xA7, 0x33);
const NAVY: Rgb = Rgb::new(0x00, 0x2B, 0x5C);

const DOTS: usize = 8;
const DOT_ORBIT: f32 = 90.0;

/// Progress bar shown while a reduced-motion query is in flight.
pub const BAR_WIDTH: f32 = 192.0;
pub const BAR_HEIGHT: f32 = 8.0;
pub const BAR_FILL: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Stroked circle
    Ring { cx: f32, cy: f32, r: f32, width: f32, color: Rgb, opacity: f32 },
    /// Filled circle
    Disc { cx: f32, cy: f32, r: f32, color: Rgb, opacity: f32 },
}

/// Shell ring, core and eight evenly spaced orbit dots.
pub fn figure() -> Vec<Shape> {
    let c = VIEW_BOX / 2.0;
    let mut shapes = vec![
        Shape::Ring { cx: c, cy: c, r: 80.0, width: 2.0, color: ORANGE, opacity: 0.6 },
        Shape::Disc { cx: c, cy: c, r: 60.0, color: AMBER, opacity: 0.8 },
    ];
    for i in 0..DOTS {
        let a = i as f32 * (2.0 * PI / DOTS as f32);
        shapes.push(Shape::Disc {
            cx: c + a.cos() * DOT_ORBIT,
            cy: c + a.sin() * DOT_ORBIT,
            r: 6.0,
            color: NAVY,
            opacity: 1.0,
        });
    }
    shapes
}

/// `<svg>` element for the figure.
pub fn svg() -> String {
    let mut out = format!(
        r#"<svg width="{0}" height="{0}" viewBox="0 0 {0} {0}" role="img" aria-label="Nucleus">"#,
        VIEW_BOX
    );
    for shape in figure() {
        // Writing into a String cannot fail
        let _ = match shape {
            Shape::Ring { cx, cy, r, width, color, opacity } => write!(
                out,
                r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r}" fill="none" stroke="{}" stroke-width="{width}" opacity="{opacity}"/>"#,
                color.hex()
            ),
            Shape::Disc { cx, cy, r, color, opacity } => write!(
                out,
                r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r}" fill="{}" opacity="{opacity}"/>"#,
                color.hex()
            ),
        };
    }
    out.push_str("</svg>");
    out
}

/// Complete fallback markup. The progress bar is included only while
/// `querying`.
pub fn markup(querying: bool) -> String {
    let mut out = String::from(r#"<div class="nucleus-fallback">"#);
    out.push_str(&svg());
    if querying {
        let _ = write!(
            out,
            r#"<div role="progressbar" aria-busy="true" style="width:{BAR_WIDTH}px;height:{BAR_HEIGHT}px;border-radius:9999px;overflow:hidden;background:#f3f4f6;margin:16px auto 0"><div style="width:{}%;height:100%;background:linear-gradient(to right,{},{});animation:pulse 2s ease-in-out infinite"></div></div>"#,
            (BAR_FILL * 100.0).round(),
            ORANGE.hex(),
            AMBER.hex(),
        );
    }
    out.push_str("</div>");
    out
}

/// Paint the figure centered on `surface`, plus the progress bar while
/// `querying`. `elapsed` drives the bar's pulse.
pub fn draw(surface: &mut impl Surface, querying: bool, elapsed: f32) {
    let (w, h) = (surface.width() as f32, surface.height() as f32);
    surface.clear();

    let k = (w.min(h) * 0.8 / VIEW_BOX).max(0.0);
    let ox = (w - VIEW_BOX * k) / 2.0;
    let oy = (h - VIEW_BOX * k) / 2.0;
    let at = |x: f32, y: f32| (ox + x * k, oy + y * k);

    for shape in figure() {
        match shape {
            Shape::Ring { cx, cy, r, width, color, opacity } => {
                let (x, y) = at(cx, cy);
                stroke_circle(surface, x, y, r * k, (width * k).max(1.0), color, opacity);
            }
            Shape::Disc { cx, cy, r, color, opacity } => {
                let (x, y) = at(cx, cy);
                surface.fill_circle(x, y, r * k, color.alpha(opacity), 0.0);
            }
        }
    }

    if querying {
        let bw = BAR_WIDTH * k;
        let bh = (BAR_HEIGHT * k).max(2.0);
        let bx = (w - bw) / 2.0;
        let by = oy + VIEW_BOX * k + bh;
        let pulse = 0.75 + 0.25 * (elapsed * PI).cos();
        surface.fill_rect(bx, by, bw, bh, Rgb::new(0xF3, 0xF4, 0xF6).alpha(1.0));
        surface.fill_rect(bx, by, bw * BAR_FILL, bh, ORANGE.alpha(pulse));
    }
}

fn stroke_circle(surface: &mut impl Surface, x: f32, y: f32, r: f32, width: f32, color: Rgb, opacity: f32) {
    const SEGMENTS: usize = 96;
    let color = color.alpha(opacity);
    let point = |i: usize| {
        let a = i as f32 / SEGMENTS as f32 * 2.0 * PI;
        (x + a.cos() * r, y + a.sin() * r)
    };
    for i in 0..SEGMENTS {
        surface.line(point(i), point(i + 1), width, color, 0.0);
    }
}
