use image::RgbaImage;

use crate::foundation::error::{MemfyError, MemfyResult};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Number of frames that will be pushed.
    pub frame_count: usize,
}

/// One composited output frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportFrame {
    /// Straight-alpha RGBA8 pixels.
    pub image: RgbaImage,
    /// Display duration in milliseconds, copied from the source frame.
    pub duration_ms: u32,
}

/// Consumer of composited frames.
///
/// Ordering contract: `push_frame` is called with indices `0, 1, 2, ...` in playback order,
/// between exactly one `begin` and one `end`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> MemfyResult<()>;
    /// Push the frame at playback position `idx`.
    fn push_frame(&mut self, idx: usize, frame: ExportFrame) -> MemfyResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> MemfyResult<()>;
}

/// In-memory sink for tests and inspection.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<ExportFrame>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames in playback order.
    pub fn frames(&self) -> &[ExportFrame] {
        &self.frames
    }

    /// `true` once `end` has been called.
    pub fn is_finished(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MemfyResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: ExportFrame) -> MemfyResult<()> {
        if idx != self.frames.len() {
            return Err(MemfyError::encode(format!(
                "frame {idx} pushed out of order (expected {})",
                self.frames.len()
            )));
        }
        self.frames.push(frame);
        Ok(())
    }

    fn end(&mut self) -> MemfyResult<()> {
        self.ended = true;
        Ok(())
    }
}
