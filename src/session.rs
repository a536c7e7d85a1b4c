use std::{
    path::{Path, PathBuf},
    thread::JoinHandle,
};

use image::RgbaImage;

use crate::{
    assets::{
        decode::decode_gif,
        input::{ensure_gif_media_type, media_type_for_path, read_gif_file},
    },
    effects::{
        crop::{CropRect, crop_frames},
        grayscale::grayscale_frames,
    },
    encode::gif::{EncodeOptions, EncodedGif, encode_gif},
    foundation::error::{MemfyError, MemfyResult},
    frames::store::FrameStore,
    overlay::model::{OverlayModel, TextOverlay},
    render::cpu::FrameCompositor,
};

/// One editing session: the loaded frames, the overlays drawn over them, and a pending crop.
///
/// Every successful mutation bumps [`EditorSession::revision`], which background exports use to
/// tell which state they captured.
#[derive(Debug)]
pub struct EditorSession {
    store: Option<FrameStore>,
    overlays: OverlayModel,
    pending_crop: Option<CropRect>,
    asset_dir: PathBuf,
    revision: u64,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self {
            store: None,
            overlays: OverlayModel::new(),
            pending_crop: None,
            asset_dir: EncodeOptions::default().asset_path,
            revision: 0,
        }
    }
}

impl EditorSession {
    /// Session with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use fonts found in `dir` for previews (defaults to the export default, `./`).
    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = dir.into();
        self
    }

    /// Font directory used for previews.
    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    /// Default export settings for this session, reading fonts from the same directory as
    /// [`EditorSession::preview`].
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            asset_path: self.asset_dir.clone(),
            ..EncodeOptions::default()
        }
    }

    /// Load a GIF from disk, replacing the current frames.
    ///
    /// The declared type comes from the file extension; non-GIF files are refused unread.
    pub fn load_file(&mut self, path: &Path) -> MemfyResult<()> {
        let bytes = read_gif_file(path)?;
        self.load_bytes(media_type_for_path(path), &bytes)
    }

    /// Decode `bytes` declared as `media_type` and replace the current frames.
    ///
    /// On any error the previous frames stay untouched. Overlays are kept; a pending crop is
    /// discarded.
    pub fn load_bytes(&mut self, media_type: &str, bytes: &[u8]) -> MemfyResult<()> {
        ensure_gif_media_type(media_type)?;
        let store = decode_gif(bytes)?;
        tracing::info!(
            frames = store.len(),
            width = store.canvas().width,
            height = store.canvas().height,
            "loaded gif"
        );
        self.store = Some(store);
        self.pending_crop = None;
        self.bump();
        Ok(())
    }

    /// Loaded frames, if any.
    pub fn store(&self) -> Option<&FrameStore> {
        self.store.as_ref()
    }

    /// `true` once a GIF has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.store.is_some()
    }

    /// Current overlays.
    pub fn overlays(&self) -> &OverlayModel {
        &self.overlays
    }

    /// Mutable overlays; counts as a mutation.
    pub fn overlays_mut(&mut self) -> &mut OverlayModel {
        self.bump();
        &mut self.overlays
    }

    /// Mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Add a text overlay; returns its index.
    pub fn add_text(&mut self, text: TextOverlay) -> MemfyResult<usize> {
        self.require_loaded("add text")?;
        let idx = self.overlays.add_text(text)?;
        self.bump();
        Ok(idx)
    }

    /// Add the default "Text" overlay at (100, 100).
    pub fn add_placeholder_text(&mut self) -> MemfyResult<usize> {
        self.add_text(TextOverlay::placeholder())
    }

    /// Start a crop with the default rectangle and return it for adjustment.
    ///
    /// An already pending rectangle is replaced.
    pub fn begin_crop(&mut self) -> MemfyResult<&mut CropRect> {
        self.require_loaded("crop")?;
        Ok(self.pending_crop.insert(CropRect::default()))
    }

    /// The pending crop rectangle, if a crop was started.
    pub fn crop_rect_mut(&mut self) -> Option<&mut CropRect> {
        self.pending_crop.as_mut()
    }

    /// Crop every frame to the pending rectangle and clear it.
    pub fn apply_crop(&mut self) -> MemfyResult<()> {
        let rect = self
            .pending_crop
            .ok_or_else(|| MemfyError::invalid_state("no crop in progress"))?;
        self.crop(&rect)?;
        self.pending_crop = None;
        Ok(())
    }

    /// Discard the pending crop rectangle.
    pub fn cancel_crop(&mut self) {
        self.pending_crop = None;
    }

    /// Crop every frame to `rect`.
    pub fn crop(&mut self, rect: &CropRect) -> MemfyResult<()> {
        let store = self.loaded_store_mut("crop")?;
        crop_frames(store, rect)?;
        self.bump();
        Ok(())
    }

    /// Convert every frame to grayscale.
    pub fn apply_grayscale(&mut self) -> MemfyResult<()> {
        let store = self.loaded_store_mut("apply grayscale")?;
        grayscale_frames(store);
        self.bump();
        Ok(())
    }

    /// Frame `index` with all overlays drawn on it.
    pub fn preview(&self, index: usize) -> MemfyResult<RgbaImage> {
        let store = self.loaded_store("preview")?;
        let frame = store.frame(index).ok_or_else(|| {
            MemfyError::validation(format!(
                "frame index {index} out of range (len {})",
                store.len()
            ))
        })?;
        FrameCompositor::new(Some(self.asset_dir.as_path())).composite(frame, &self.overlays)
    }

    /// Composite overlays onto every frame and encode the result.
    pub fn export(&self, opts: &EncodeOptions) -> MemfyResult<EncodedGif> {
        let store = self.loaded_store("export")?;
        encode_gif(store, &self.overlays, opts)
    }

    /// Run [`EditorSession::export`] on a snapshot of the current state in a background thread.
    pub fn export_in_background(&self, opts: EncodeOptions) -> MemfyResult<ExportJob> {
        let store = self.loaded_store("export")?.clone();
        let overlays = self.overlays.clone();
        let revision = self.revision;
        let handle = std::thread::Builder::new()
            .name("memfy-export".to_string())
            .spawn(move || encode_gif(&store, &overlays, &opts))
            .map_err(|e| MemfyError::encode(format!("failed to spawn export thread: {e}")))?;
        tracing::debug!(revision, "started background export");
        Ok(ExportJob { handle, revision })
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn require_loaded(&self, action: &str) -> MemfyResult<()> {
        self.loaded_store(action).map(|_| ())
    }

    fn loaded_store(&self, action: &str) -> MemfyResult<&FrameStore> {
        self.store
            .as_ref()
            .ok_or_else(|| MemfyError::invalid_state(format!("cannot {action}: no GIF loaded")))
    }

    fn loaded_store_mut(&mut self, action: &str) -> MemfyResult<&mut FrameStore> {
        self.store
            .as_mut()
            .ok_or_else(|| MemfyError::invalid_state(format!("cannot {action}: no GIF loaded")))
    }
}

/// Handle to an export running off the calling thread.
#[derive(Debug)]
pub struct ExportJob {
    handle: JoinHandle<MemfyResult<EncodedGif>>,
    revision: u64,
}

impl ExportJob {
    /// Session revision the export was started from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// `true` once the export has finished (successfully or not).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until every frame is encoded and return the result.
    pub fn wait(self) -> MemfyResult<EncodedGif> {
        self.handle
            .join()
            .map_err(|_| MemfyError::encode("export thread panicked"))?
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
