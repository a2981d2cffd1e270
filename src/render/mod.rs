// render/ - Drawing surfaces
//
// Simulations draw through the `Surface` trait and never touch a concrete
// backend. Two backends:
//   raster  - software RGBA buffer (native + wasm, read back by JS or saved as PNG)
//   canvas  - browser CanvasRenderingContext2d (wasm only)

mod raster;
#[cfg(target_arch = "wasm32")]
mod canvas;

pub use raster::Raster;
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

/// Opaque color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// HSL with hue in degrees (any value, wrapped), saturation and lightness in [0,1].
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(360.0) / 60.0;
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let to = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(to(r), to(g), to(b))
    }

    #[inline]
    pub fn alpha(self, a: f32) -> Rgba {
        Rgba { rgb: self, a: a.clamp(0.0, 1.0) }
    }

    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Color with straight (non-premultiplied) alpha in [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { rgb: Rgb::BLACK, a: 0.0 };

    pub fn hsla(h: f32, s: f32, l: f32, a: f32) -> Self {
        Rgb::from_hsl(h, s, l).alpha(a)
    }

    pub fn css(self) -> String {
        format!("rgba({}, {}, {}, {:.3})", self.rgb.r, self.rgb.g, self.rgb.b, self.a)
    }
}

/// One color stop of a radial gradient; `at` in [0,1] from center to edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub at: f32,
    pub color: Rgba,
}

impl Stop {
    pub const fn new(at: f32, color: Rgba) -> Self {
        Self { at, color }
    }
}

/// Something a simulation can draw onto.
///
/// Coordinates are in surface pixels, origin top-left. Implementations
/// must tolerate primitives that fall partly or wholly off the surface.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Changes pixel dimensions. Contents are discarded.
    fn resize(&mut self, w: u32, h: u32);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);

    /// Filled disc; `glow` is a blur radius for the soft halo (0 = none).
    fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: Rgba, glow: f32);

    /// Radial gradient filling the disc of radius `r`.
    fn radial_gradient(&mut self, x: f32, y: f32, r: f32, stops: &[Stop]);

    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba, glow: f32);

    /// Erase to fully transparent. Surfaces without alpha paint black.
    fn clear(&mut self) {
        let (w, h) = (self.width() as f32, self.height() as f32);
        self.fill_rect(0.0, 0.0, w, h, Rgb::BLACK.alpha(1.0));
    }

    /// Low-alpha black fill over the whole surface. Leaves motion trails.
    fn fade(&mut self, alpha: f32) {
        let (w, h) = (self.width() as f32, self.height() as f32);
        self.fill_rect(0.0, 0.0, w, h, Rgb::BLACK.alpha(alpha));
    }
}

/// Surface that only counts calls. Used by unit tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub w: u32,
    pub h: u32,
    pub rects: usize,
    pub circles: usize,
    pub gradients: usize,
    pub lines: usize,
    pub max_alpha: f32,
}

#[cfg(test)]
impl Tally {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h, ..Self::default() }
    }

    fn seen(&mut self, a: f32) {
        self.max_alpha = self.max_alpha.max(a);
    }
}

#[cfg(test)]
impl Surface for Tally {
    fn width(&self) -> u32 { self.w }
    fn height(&self) -> u32 { self.h }

    fn resize(&mut self, w: u32, h: u32) {
        self.w = w;
        self.h = h;
    }

    fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, color: Rgba) {
        self.rects += 1;
        self.seen(color.a);
    }

    fn fill_circle(&mut self, _x: f32, _y: f32, _r: f32, color: Rgba, _glow: f32) {
        self.circles += 1;
        self.seen(color.a);
    }

    fn radial_gradient(&mut self, _x: f32, _y: f32, _r: f32, stops: &[Stop]) {
        self.gradients += 1;
        for s in stops {
            self.seen(s.color.a);
        }
    }

    fn line(&mut self, _from: (f32, f32), _to: (f32, f32), _width: f32, color: Rgba, _glow: f32) {
        self.lines += 1;
        self.seen(color.a);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Rgb::from_hex("#FF6A00").unwrap();
        assert_eq!(c, Rgb::new(255, 106, 0));
        assert_eq!(c.hex(), "#FF6A00");
        assert_eq!(Rgb::from_hex("ffa733"), Some(Rgb::new(255, 167, 51)));
    }

    #[test]
    fn hex_rejects_garbage() {
        assert_eq!(Rgb::from_hex("#FF6A0"), None);
        assert_eq!(Rgb::from_hex("#GG0000"), None);
        assert_eq!(Rgb::from_hex("#ÿÿÿ"), None);
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(Rgb::from_hsl(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsl(120.0, 1.0, 0.5), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsl(240.0, 1.0, 0.5), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsl(360.0, 1.0, 0.5), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsl(-120.0, 1.0, 0.5), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsl(42.0, 0.0, 1.0), Rgb::WHITE);
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(Rgb::WHITE.alpha(1.7).a, 1.0);
        assert_eq!(Rgb::WHITE.alpha(-0.2).a, 0.0);
    }

    #[test]
    fn css_formatting() {
        assert_eq!(Rgb::new(1, 2, 3).alpha(0.5).css(), "rgba(1, 2, 3, 0.500)");
    }
}
