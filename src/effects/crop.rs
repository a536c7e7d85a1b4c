use image::RgbaImage;
use rayon::prelude::*;

use crate::{
    foundation::{
        core::Canvas,
        error::{MemfyError, MemfyResult},
    },
    frames::store::{Frame, FrameStore},
};

fn one() -> f64 {
    1.0
}

/// Crop rectangle in canvas coordinates.
///
/// The on-screen rectangle keeps its authored `width`/`height` and an independent scale per
/// axis; the pixel size it selects is `width * scale_x` by `height * scale_y`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    /// Left edge in canvas pixels.
    pub left: f64,
    /// Top edge in canvas pixels.
    pub top: f64,
    /// Unscaled width.
    pub width: f64,
    /// Unscaled height.
    pub height: f64,
    /// Horizontal scale factor.
    #[serde(default = "one")]
    pub scale_x: f64,
    /// Vertical scale factor.
    #[serde(default = "one")]
    pub scale_y: f64,
}

impl Default for CropRect {
    /// The rectangle offered when a crop is started: 200x150 at (50, 50).
    fn default() -> Self {
        Self::new(50.0, 50.0, 200.0, 150.0)
    }
}

impl CropRect {
    /// Unscaled rectangle.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Same rectangle with the given per-axis scale.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Pixel size selected by the rectangle, rounded to whole pixels.
    pub fn effective_size(&self) -> MemfyResult<Canvas> {
        let w = self.width * self.scale_x;
        let h = self.height * self.scale_y;
        if !w.is_finite() || !h.is_finite() {
            return Err(MemfyError::validation("crop size must be finite"));
        }
        let (w, h) = (w.round(), h.round());
        if w < 1.0 || h < 1.0 {
            return Err(MemfyError::validation(format!(
                "crop must select at least 1x1 pixels, got {w}x{h}"
            )));
        }
        if w > f64::from(u32::MAX) || h > f64::from(u32::MAX) {
            return Err(MemfyError::validation("crop size is too large"));
        }
        Ok(Canvas::new(w as u32, h as u32))
    }

    /// Top-left corner rounded to whole pixels.
    pub fn offset(&self) -> MemfyResult<(i64, i64)> {
        if !self.left.is_finite() || !self.top.is_finite() {
            return Err(MemfyError::validation("crop position must be finite"));
        }
        Ok((self.left.round() as i64, self.top.round() as i64))
    }
}

/// Crop every frame of `store` to `rect`.
///
/// Each new raster is the old one shifted by `(-left, -top)` onto a transparent canvas of the
/// rectangle's effective size; anything outside the old raster stays transparent. The rectangle
/// is read against the store's current coordinates, so cropping twice with the same rectangle
/// crops twice. Durations and order are unchanged. All frames are built before the store is
/// touched.
#[tracing::instrument(skip(store), fields(frames = store.len()))]
pub fn crop_frames(store: &mut FrameStore, rect: &CropRect) -> MemfyResult<()> {
    if store.is_empty() {
        return Err(MemfyError::invalid_state("cannot crop: no frames loaded"));
    }
    let size = rect.effective_size()?;
    let (left, top) = rect.offset()?;

    let frames: Vec<Frame> = store
        .frames()
        .par_iter()
        .map(|f| Frame {
            raster: shifted_onto(&f.raster, -left, -top, size),
            duration_ms: f.duration_ms,
        })
        .collect();

    store.replace_frames(size, frames);
    tracing::debug!(width = size.width, height = size.height, "cropped frames");
    Ok(())
}

fn shifted_onto(src: &RgbaImage, x: i64, y: i64, size: Canvas) -> RgbaImage {
    let mut out = RgbaImage::new(size.width, size.height);
    image::imageops::replace(&mut out, src, x, y);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/crop.rs"]
mod tests;
