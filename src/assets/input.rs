use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{MemfyError, MemfyResult};

/// The only media type the editor accepts.
pub const GIF_MEDIA_TYPE: &str = "image/gif";

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Declared media type for a file, derived from its extension.
///
/// This mirrors how a file picker labels a selection; the contents are never inspected.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return FALLBACK_MEDIA_TYPE;
    };
    match ext.to_ascii_lowercase().as_str() {
        "gif" => GIF_MEDIA_TYPE,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        _ => FALLBACK_MEDIA_TYPE,
    }
}

/// Reject anything whose declared media type is not GIF.
pub fn ensure_gif_media_type(media_type: &str) -> MemfyResult<()> {
    if media_type.trim().eq_ignore_ascii_case(GIF_MEDIA_TYPE) {
        Ok(())
    } else {
        Err(MemfyError::input_rejected(format!(
            "expected a GIF file ({GIF_MEDIA_TYPE}), got '{media_type}'"
        )))
    }
}

/// Check the declared type of `path`, then read its bytes.
///
/// The type check happens first so a rejected file is never opened.
pub fn read_gif_file(path: &Path) -> MemfyResult<Vec<u8>> {
    ensure_gif_media_type(media_type_for_path(path))?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("read gif bytes from '{}'", path.display()))?;
    Ok(bytes)
}
