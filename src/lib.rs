//! memfy is a GIF meme editor library.
//!
//! A loaded animation is decoded once into an ordered [`FrameStore`] of straight-alpha RGBA
//! rasters with per-frame durations. Destructive edits ([`crop_frames`], [`grayscale_frames`])
//! rewrite every frame at once. Text annotations live in a separate [`OverlayModel`] and only
//! touch pixels when a frame is previewed or exported.
//!
//! # Pipeline overview
//!
//! 1. **Accept**: the declared media type must be `image/gif` ([`ensure_gif_media_type`])
//! 2. **Decode**: GIF bytes -> [`FrameStore`] ([`decode_gif`])
//! 3. **Edit**: crop / grayscale on the store, text on the overlay model ([`EditorSession`])
//! 4. **Export**: composite overlays on a rayon pool and encode `edited.gif` ([`encode_gif`])
//!
//! Edits can also be described as JSON and replayed with [`EditScript`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod effects;
mod encode;
mod foundation;
mod frames;
mod overlay;
mod render;
mod script;
mod session;

pub use assets::decode::{DEFAULT_FRAME_DURATION_MS, decode_gif, duration_ms_from_delay_units};
pub use assets::input::{
    GIF_MEDIA_TYPE, ensure_gif_media_type, media_type_for_path, read_gif_file,
};
pub use effects::crop::{CropRect, crop_frames};
pub use effects::grayscale::{gray_level, grayscale_frames, grayscale_in_place};
pub use encode::gif::{
    EncodeOptions, EncodedGif, GifSink, MAX_QUALITY, MIN_QUALITY, OUTPUT_FILE_NAME, encode_gif,
};
pub use encode::sink::{ExportFrame, FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{Canvas, Point, Rgba8, Vec2};
pub use foundation::error::{MemfyError, MemfyResult};
pub use frames::store::{Frame, FrameStore};
pub use overlay::model::{DEFAULT_FONT_FAMILY, Overlay, OverlayModel, TextOverlay};
pub use render::cpu::FrameCompositor;
pub use render::pipeline::export_frames;
pub use render::text::{TextBrushRgba8, TextLayoutEngine};
pub use script::{EditOp, EditScript};
pub use session::{EditorSession, ExportJob};
