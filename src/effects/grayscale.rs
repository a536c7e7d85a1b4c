use image::RgbaImage;
use rayon::prelude::*;

use crate::frames::store::FrameStore;

/// Unweighted mean of R, G and B, rounded to the nearest integer.
pub fn gray_level(r: u8, g: u8, b: u8) -> u8 {
    ((u16::from(r) + u16::from(g) + u16::from(b) + 1) / 3) as u8
}

/// Replace R, G and B of every pixel with their mean; alpha is left alone.
pub fn grayscale_in_place(raster: &mut RgbaImage) {
    for px in raster.pixels_mut() {
        let [r, g, b, _] = px.0;
        let v = gray_level(r, g, b);
        px.0[0] = v;
        px.0[1] = v;
        px.0[2] = v;
    }
}

/// Grayscale every frame. Idempotent; timing and size are unchanged.
#[tracing::instrument(skip(store), fields(frames = store.len()))]
pub fn grayscale_frames(store: &mut FrameStore) {
    store
        .frames_mut()
        .par_iter_mut()
        .for_each(|f| grayscale_in_place(&mut f.raster));
}

#[cfg(test)]
#[path = "../../tests/unit/effects/grayscale.rs"]
mod tests;
