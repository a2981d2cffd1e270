// raster.rs - Software RGBA surface
//
// Straight-alpha RGBA8 buffer, row-major. JS hosts read it through
// `ptr()`/`len()` and blit with putImageData; the poster binary saves it
// as a PNG.

use log::warn;

use super::{Rgba, Stop, Surface};
use crate::error::{Error, Result};

/// Largest accepted side, matching what browsers allow for a canvas.
pub const MAX_SIDE: u32 = 16_384;

/// Byte length of a `w`×`h` RGBA buffer.
fn buffer_len(w: u32, h: u32) -> Result<usize> {
    if w > MAX_SIDE || h > MAX_SIDE {
        return Err(Error::invalid(format!("raster {w}x{h} exceeds {MAX_SIDE} per side")));
    }
    (w as usize)
        .checked_mul(h as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| Error::invalid(format!("raster {w}x{h} is too large")))
}

pub struct Raster {
    px: Vec<u8>,
    w: u32,
    h: u32,
}

impl Raster {
    pub fn new(w: u32, h: u32) -> Result<Self> {
        Ok(Self {
            px: vec![0; buffer_len(w, h)?],
            w,
            h,
        })
    }

    /// Reallocate for a new size. On error the raster keeps its old size.
    pub fn try_resize(&mut self, w: u32, h: u32) -> Result<()> {
        let len = buffer_len(w, h)?;
        self.w = w;
        self.h = h;
        self.px.clear();
        self.px.resize(len, 0);
        Ok(())
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.w as usize + x as usize) * 4
    }

    pub fn ptr(&self) -> *const u8 {
        self.px.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.px.len()
    }

    pub fn is_empty(&self) -> bool {
        self.px.is_empty()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.px
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.px
    }

    /// RGBA at (x, y), or `None` off-surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.w || y >= self.h {
            return None;
        }
        let i = self.index(x, y);
        Some([self.px[i], self.px[i + 1], self.px[i + 2], self.px[i + 3]])
    }

    /// Source-over blend of `c` at coverage `k` into pixel (x, y).
    #[inline]
    fn blend(&mut self, x: i32, y: i32, c: Rgba, k: f32) {
        if (x as u32) >= self.w || (y as u32) >= self.h {
            return;
        }
        let sa = c.a * k.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let i = self.index(x as u32, y as u32);
        let da = self.px[i + 3] as f32 / 255.0;
        let oa = sa + da * (1.0 - sa);
        if oa <= 0.0 {
            return;
        }
        let mix = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / oa;
            v.round().clamp(0.0, 255.0) as u8
        };
        self.px[i] = mix(c.rgb.r, self.px[i]);
        self.px[i + 1] = mix(c.rgb.g, self.px[i + 1]);
        self.px[i + 2] = mix(c.rgb.b, self.px[i + 2]);
        self.px[i + 3] = (oa * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Integer pixel box covering [x0,x1]×[y0,y1], clipped to the surface.
    fn clip(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Option<(i32, i32, i32, i32)> {
        let (w, h) = (self.w as i32, self.h as i32);
        let bx0 = (x0.floor() as i32).max(0);
        let by0 = (y0.floor() as i32).max(0);
        let bx1 = (x1.ceil() as i32).min(w - 1);
        let by1 = (y1.ceil() as i32).min(h - 1);
        if bx0 > bx1 || by0 > by1 {
            return None;
        }
        Some((bx0, by0, bx1, by1))
    }
}

/// Color at `t` along a sorted stop list.
fn sample_stops(stops: &[Stop], t: f32) -> Rgba {
    let Some(first) = stops.first() else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.at {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.at {
            let span = (b.at - a.at).max(f32::EPSILON);
            let k = ((t - a.at) / span).clamp(0.0, 1.0);
            let lerp = |p: u8, q: u8| (p as f32 + (q as f32 - p as f32) * k).round() as u8;
            let rgb = super::Rgb::new(
                lerp(a.color.rgb.r, b.color.rgb.r),
                lerp(a.color.rgb.g, b.color.rgb.g),
                lerp(a.color.rgb.b, b.color.rgb.b),
            );
            return rgb.alpha(a.color.a + (b.color.a - a.color.a) * k);
        }
    }
    stops[stops.len() - 1].color
}

impl Surface for Raster {
    fn width(&self) -> u32 { self.w }
    fn height(&self) -> u32 { self.h }

    fn resize(&mut self, w: u32, h: u32) {
        if let Err(e) = self.try_resize(w, h) {
            warn!("raster stays {}x{}: {e}", self.w, self.h);
        }
    }

    fn clear(&mut self) {
        self.px.fill(0);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, x + w - 1.0, y + h - 1.0) else { return };
        for py in y0..=y1 {
            for px in x0..=x1 {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: Rgba, glow: f32) {
        if glow > 0.0 {
            let halo = r + glow * 0.5;
            let stops = [
                Stop::new(0.0, color.rgb.alpha(color.a * 0.35)),
                Stop::new(1.0, color.rgb.alpha(0.0)),
            ];
            self.radial_gradient(x, y, halo, &stops);
        }
        let Some((x0, y0, x1, y1)) = self.clip(x - r, y - r, x + r, y + r) else { return };
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - x;
                let dy = py as f32 + 0.5 - y;
                let d = (dx * dx + dy * dy).sqrt();
                // Half-pixel antialiased rim
                self.blend(px, py, color, r + 0.5 - d);
            }
        }
    }

    fn radial_gradient(&mut self, x: f32, y: f32, r: f32, stops: &[Stop]) {
        if r <= 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(x - r, y - r, x + r, y + r) else { return };
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - x;
                let dy = py as f32 + 0.5 - y;
                let t = (dx * dx + dy * dy).sqrt() / r;
                if t > 1.0 {
                    continue;
                }
                self.blend(px, py, sample_stops(stops, t), 1.0);
            }
        }
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba, _glow: f32) {
        let hw = (width * 0.5).max(0.5);
        let (ax, ay) = from;
        let (bx, by) = to;
        let Some((x0, y0, x1, y1)) = self.clip(
            ax.min(bx) - hw,
            ay.min(by) - hw,
            ax.max(bx) + hw,
            ay.max(by) + hw,
        ) else {
            return;
        };
        let (ex, ey) = (bx - ax, by - ay);
        let len2 = ex * ex + ey * ey;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let (cx, cy) = (px as f32 + 0.5, py as f32 + 0.5);
                let t = if len2 > 0.0 {
                    (((cx - ax) * ex + (cy - ay) * ey) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let (qx, qy) = (ax + ex * t - cx, ay + ey * t - cy);
                let d = (qx * qx + qy * qy).sqrt();
                self.blend(px, py, color, hw + 0.5 - d);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Rgb;

    #[test]
    fn new_raster_is_transparent() {
        let r = Raster::new(4, 3).unwrap();
        assert_eq!(r.len(), 4 * 3 * 4);
        assert!(r.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn opaque_rect_overwrites() {
        let mut r = Raster::new(4, 4).unwrap();
        r.fill_rect(1.0, 1.0, 2.0, 2.0, Rgb::new(10, 20, 30).alpha(1.0));
        assert_eq!(r.pixel(1, 1), Some([10, 20, 30, 255]));
        assert_eq!(r.pixel(2, 2), Some([10, 20, 30, 255]));
        assert_eq!(r.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(r.pixel(3, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn fade_darkens_without_erasing() {
        let mut r = Raster::new(2, 2).unwrap();
        r.fill_rect(0.0, 0.0, 2.0, 2.0, Rgb::WHITE.alpha(1.0));
        r.fade(0.5);
        let [red, _, _, a] = r.pixel(0, 0).unwrap();
        assert_eq!(a, 255);
        assert!((125..=130).contains(&red), "{red}");
    }

    #[test]
    fn primitives_off_surface_are_ignored() {
        let mut r = Raster::new(8, 8).unwrap();
        r.fill_circle(-50.0, -50.0, 3.0, Rgb::WHITE.alpha(1.0), 10.0);
        r.radial_gradient(100.0, 4.0, 5.0, &[Stop::new(0.0, Rgb::WHITE.alpha(1.0))]);
        r.line((-10.0, -10.0), (-5.0, -1.0), 2.0, Rgb::WHITE.alpha(1.0), 0.0);
        assert!(r.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn circle_center_is_filled() {
        let mut r = Raster::new(16, 16).unwrap();
        r.fill_circle(8.0, 8.0, 3.0, Rgb::new(200, 0, 0).alpha(1.0), 0.0);
        assert_eq!(r.pixel(8, 8), Some([200, 0, 0, 255]));
        assert_eq!(r.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn line_covers_its_midpoint() {
        let mut r = Raster::new(16, 16).unwrap();
        r.line((2.0, 8.0), (14.0, 8.0), 2.0, Rgb::WHITE.alpha(1.0), 0.0);
        assert_eq!(r.pixel(8, 7).map(|p| p[3]), Some(255));
        assert_eq!(r.pixel(8, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn gradient_fades_to_edge() {
        let mut r = Raster::new(21, 21).unwrap();
        let stops = [
            Stop::new(0.0, Rgb::WHITE.alpha(1.0)),
            Stop::new(1.0, Rgb::WHITE.alpha(0.0)),
        ];
        r.radial_gradient(10.5, 10.5, 10.0, &stops);
        let center = r.pixel(10, 10).unwrap()[3];
        let rim = r.pixel(10, 1).unwrap()[3];
        assert!(center > 240, "{center}");
        assert!(rim < 40, "{rim}");
    }

    #[test]
    fn oversized_raster_is_rejected() {
        assert!(matches!(Raster::new(40_000, 30_000), Err(Error::InvalidConfig(_))));
        assert!(matches!(Raster::new(u32::MAX, u32::MAX), Err(Error::InvalidConfig(_))));
        assert!(Raster::new(MAX_SIDE, 1).is_ok());
    }

    #[test]
    fn oversized_resize_keeps_the_old_buffer() {
        let mut r = Raster::new(4, 4).unwrap();
        assert!(r.try_resize(70_000, 70_000).is_err());
        r.resize(70_000, 70_000);
        assert_eq!((r.width(), r.height(), r.len()), (4, 4, 64));
        r.fill_rect(0.0, 0.0, 4.0, 4.0, Rgb::WHITE.alpha(1.0));
        assert_eq!(r.pixel(3, 3), Some([255, 255, 255, 255]));
    }

    #[test]
    fn resize_reallocates_and_clears() {
        let mut r = Raster::new(4, 4).unwrap();
        r.fill_rect(0.0, 0.0, 4.0, 4.0, Rgb::WHITE.alpha(1.0));
        r.resize(2, 3);
        assert_eq!((r.width(), r.height(), r.len()), (2, 3, 24));
        assert!(r.pixels().iter().all(|&b| b == 0));
        assert_eq!(r.pixel(2, 0), None);
    }
}
