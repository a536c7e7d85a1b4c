use image::RgbaImage;

use crate::foundation::{
    core::Canvas,
    error::{MemfyError, MemfyResult},
};

/// One decoded still raster plus how long it stays on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Straight-alpha RGBA8 pixels.
    pub raster: RgbaImage,
    /// Display duration in milliseconds (always > 0).
    pub duration_ms: u32,
}

impl Frame {
    /// Build a frame, rejecting zero durations.
    pub fn new(raster: RgbaImage, duration_ms: u32) -> MemfyResult<Self> {
        if duration_ms == 0 {
            return Err(MemfyError::validation("frame duration must be > 0 ms"));
        }
        Ok(Self {
            raster,
            duration_ms,
        })
    }

    /// Raster width in pixels.
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    /// Raster height in pixels.
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Raster size as a [`Canvas`].
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width(), self.height())
    }
}

/// Ordered frames of one loaded animation.
///
/// Index order is playback order. All frames share the store's [`Canvas`] size; edits that change
/// the size (crop) resize every frame at once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameStore {
    canvas: Canvas,
    frames: Vec<Frame>,
}

impl FrameStore {
    /// Build a store from frames in playback order.
    ///
    /// The canvas size is taken from frame 0 and every other frame must match it.
    pub fn new(frames: Vec<Frame>) -> MemfyResult<Self> {
        let canvas = frames.first().map(Frame::canvas).unwrap_or_default();
        for (i, f) in frames.iter().enumerate() {
            if f.canvas() != canvas {
                return Err(MemfyError::validation(format!(
                    "frame {i} is {}x{}, expected {}x{}",
                    f.width(),
                    f.height(),
                    canvas.width,
                    canvas.height
                )));
            }
        }
        Ok(Self { canvas, frames })
    }

    /// Store with no frames (nothing loaded).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shared frame size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in playback order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at `index`, if any.
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Per-frame durations in playback order.
    pub fn durations_ms(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.duration_ms).collect()
    }

    /// Sum of all frame durations.
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.duration_ms)).sum()
    }

    pub(crate) fn frames_mut(&mut self) -> &mut [Frame] {
        &mut self.frames
    }

    /// Swap in a fully built set of resized frames.
    pub(crate) fn replace_frames(&mut self, canvas: Canvas, frames: Vec<Frame>) {
        debug_assert!(frames.iter().all(|f| f.canvas() == canvas));
        self.canvas = canvas;
        self.frames = frames;
    }
}

impl<'a> IntoIterator for &'a FrameStore {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
