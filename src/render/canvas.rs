// canvas.rs - Browser 2d context surface
//
// Thin mapping of `Surface` onto CanvasRenderingContext2d. Drawing calls
// that the browser rejects are logged and dropped; a frame is decorative.

use std::f64::consts::TAU;

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Rgba, Stop, Surface};
use crate::error::{Error, Result};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Acquires the 2d context of `canvas`.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| Error::missing_context(format!("{e:?}")))?
            .ok_or_else(|| Error::missing_context("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::missing_context("2d context has unexpected type"))?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn glow(&self, color: Rgba, blur: f32) {
        self.ctx.set_shadow_blur(blur as f64);
        if blur > 0.0 {
            self.ctx.set_shadow_color(&color.rgb.alpha(1.0).css());
        }
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> u32 { self.canvas.width() }
    fn height(&self) -> u32 { self.canvas.height() }

    fn resize(&mut self, w: u32, h: u32) {
        self.canvas.set_width(w);
        self.canvas.set_height(h);
    }

    fn clear(&mut self) {
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: Rgba, glow: f32) {
        self.glow(color, glow);
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.begin_path();
        if self.ctx.arc(x as f64, y as f64, r.max(0.0) as f64, 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
        self.ctx.set_shadow_blur(0.0);
    }

    fn radial_gradient(&mut self, x: f32, y: f32, r: f32, stops: &[Stop]) {
        if r <= 0.0 {
            return;
        }
        let (x, y, r) = (x as f64, y as f64, r as f64);
        let gradient = match self.ctx.create_radial_gradient(x, y, 0.0, x, y, r) {
            Ok(g) => g,
            Err(e) => {
                warn!("radial gradient skipped: {e:?}");
                return;
            }
        };
        for stop in stops {
            if let Err(e) = gradient.add_color_stop(stop.at.clamp(0.0, 1.0), &stop.color.css()) {
                warn!("gradient stop {} rejected: {e:?}", stop.at);
                return;
            }
        }
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(x - r, y - r, r * 2.0, r * 2.0);
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba, glow: f32) {
        self.glow(color, glow);
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.0 as f64, from.1 as f64);
        self.ctx.line_to(to.0 as f64, to.1 as f64);
        self.ctx.stroke();
        self.ctx.set_shadow_blur(0.0);
    }
}
