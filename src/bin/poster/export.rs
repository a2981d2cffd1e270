// export.rs - Raster to PNG

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use image::RgbaImage;

use nucleus_engine::{Raster, Surface};

/// Composite onto black and write an opaque PNG.
pub fn save_png(raster: &Raster, path: &Path) -> Result<()> {
    let (w, h) = (raster.width(), raster.height());
    let mut px = raster.pixels().to_vec();
    for p in px.chunks_exact_mut(4) {
        let a = p[3] as u32;
        for c in &mut p[..3] {
            *c = (*c as u32 * a / 255) as u8;
        }
        p[3] = 255;
    }

    let img = RgbaImage::from_raw(w, h, px).ok_or_else(|| anyhow!("raster size mismatch: {w}x{h}"))?;
    img.save(path).with_context(|| format!("saving {}", path.display()))
}
