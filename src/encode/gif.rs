use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{
    Delay, Frame as ImageFrame,
    codecs::gif::{GifEncoder, Repeat},
};

use crate::{
    assets::input::GIF_MEDIA_TYPE,
    encode::sink::{ExportFrame, FrameSink, SinkConfig},
    foundation::error::{MemfyError, MemfyResult},
    frames::store::FrameStore,
    overlay::model::OverlayModel,
    render::pipeline::export_frames,
};

/// File name of every exported animation.
pub const OUTPUT_FILE_NAME: &str = "edited.gif";

/// Lowest accepted `quality` value (best palette, slowest).
pub const MIN_QUALITY: i32 = 1;
/// Highest accepted `quality` value (fastest, coarsest palette).
pub const MAX_QUALITY: i32 = 30;

fn default_workers() -> usize {
    2
}

fn default_quality() -> i32 {
    10
}

fn default_asset_path() -> PathBuf {
    PathBuf::from("./")
}

/// Export settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EncodeOptions {
    /// Compositing worker threads (>= 1).
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Palette quality/speed trade-off; lower is better and slower. Clamped to 1..=30.
    #[serde(default = "default_quality")]
    pub quality: i32,
    /// Directory of side-loaded assets; fonts found here are used for text overlays.
    #[serde(default = "default_asset_path")]
    pub asset_path: PathBuf,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            quality: default_quality(),
            asset_path: default_asset_path(),
        }
    }
}

impl EncodeOptions {
    /// Reject settings that cannot run.
    pub fn validate(&self) -> MemfyResult<()> {
        if self.workers == 0 {
            return Err(MemfyError::validation("encode workers must be >= 1"));
        }
        Ok(())
    }

    /// `quality` clamped into the encoder's accepted range.
    pub fn encoder_speed(&self) -> i32 {
        self.quality.clamp(MIN_QUALITY, MAX_QUALITY)
    }
}

/// A finished GIF ready to be saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedGif {
    bytes: Vec<u8>,
}

impl EncodedGif {
    /// File name to save under.
    pub fn file_name(&self) -> &'static str {
        OUTPUT_FILE_NAME
    }

    /// Media type of the bytes.
    pub fn media_type(&self) -> &'static str {
        GIF_MEDIA_TYPE
    }

    /// Encoded GIF bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write `edited.gif` into `dir` (created if needed) and return its path.
    pub fn write_to_dir(&self, dir: &Path) -> MemfyResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        let path = dir.join(OUTPUT_FILE_NAME);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("write gif '{}'", path.display()))?;
        Ok(path)
    }
}

/// Sink that collects frames and encodes them as one looping GIF on `end`.
pub struct GifSink {
    speed: i32,
    cfg: Option<SinkConfig>,
    frames: Vec<ImageFrame>,
    output: Option<Vec<u8>>,
}

impl GifSink {
    /// New sink using the given encoder speed (1..=30, lower is better quality).
    pub fn new(speed: i32) -> Self {
        Self {
            speed: speed.clamp(MIN_QUALITY, MAX_QUALITY),
            cfg: None,
            frames: Vec::new(),
            output: None,
        }
    }

    /// Encoded output; fails unless `end` completed.
    pub fn into_encoded(self) -> MemfyResult<EncodedGif> {
        self.output
            .map(|bytes| EncodedGif { bytes })
            .ok_or_else(|| MemfyError::encode("gif sink finished without output"))
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> MemfyResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(MemfyError::encode("gif width/height must be non-zero"));
        }
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(MemfyError::encode(format!(
                "gif size {}x{} exceeds the format limit of 65535",
                cfg.width, cfg.height
            )));
        }
        self.cfg = Some(cfg);
        self.frames = Vec::with_capacity(cfg.frame_count);
        self.output = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: ExportFrame) -> MemfyResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MemfyError::encode("gif sink received a frame before begin"))?;
        if frame.image.dimensions() != (cfg.width, cfg.height) {
            return Err(MemfyError::encode(format!(
                "frame {idx} size mismatch: got {}x{}, expected {}x{}",
                frame.image.width(),
                frame.image.height(),
                cfg.width,
                cfg.height
            )));
        }

        self.frames.push(ImageFrame::from_parts(
            frame.image,
            0,
            0,
            Delay::from_numer_denom_ms(frame.duration_ms, 1),
        ));
        Ok(())
    }

    fn end(&mut self) -> MemfyResult<()> {
        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut bytes, self.speed);
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| MemfyError::encode(format!("configure gif encoder: {e}")))?;
            encoder
                .encode_frames(std::mem::take(&mut self.frames))
                .map_err(|e| MemfyError::encode(format!("encode gif frames: {e}")))?;
        }
        self.output = Some(bytes);
        Ok(())
    }
}

/// Composite overlays onto every frame and encode the result as a GIF.
///
/// Frame order and durations are preserved. An empty store fails before the encoder is touched.
#[tracing::instrument(skip_all, fields(frames = store.len(), overlays = overlays.len()))]
pub fn encode_gif(
    store: &FrameStore,
    overlays: &OverlayModel,
    opts: &EncodeOptions,
) -> MemfyResult<EncodedGif> {
    if store.is_empty() {
        return Err(MemfyError::encode("no frames"));
    }
    opts.validate()?;

    let mut sink = GifSink::new(opts.encoder_speed());
    export_frames(
        store,
        overlays,
        opts.workers,
        Some(opts.asset_path.as_path()),
        &mut sink,
    )?;
    let encoded = sink.into_encoded()?;
    tracing::debug!(bytes = encoded.bytes().len(), "encoded gif");
    Ok(encoded)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
