use std::path::Path;

use anyhow::Context as _;

use crate::{
    effects::crop::CropRect,
    encode::gif::EncodeOptions,
    foundation::error::{MemfyError, MemfyResult},
    overlay::model::TextOverlay,
    session::EditorSession,
};

/// One scripted edit.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Add a text overlay.
    Text(TextOverlay),
    /// Crop every frame.
    Crop(CropRect),
    /// Convert every frame to grayscale.
    Grayscale,
}

/// Ordered edits plus optional export settings, read from JSON.
///
/// ```json
/// {
///   "ops": [
///     { "op": "crop", "left": 10, "top": 10, "width": 120, "height": 80 },
///     { "op": "grayscale" },
///     { "op": "text", "content": "HI", "position": { "x": 4, "y": 4 }, "font_size": 24 }
///   ],
///   "export": { "workers": 4, "quality": 10 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditScript {
    /// Edits, applied in order.
    #[serde(default)]
    pub ops: Vec<EditOp>,
    /// Export settings; defaults apply when absent.
    #[serde(default)]
    pub export: Option<EncodeOptions>,
}

impl EditScript {
    /// Parse a script from JSON text.
    pub fn from_json_str(s: &str) -> MemfyResult<Self> {
        serde_json::from_str(s).map_err(|e| MemfyError::serde(format!("edit script: {e}")))
    }

    /// Read and parse a script file.
    pub fn from_path(path: &Path) -> MemfyResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read edit script '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Apply every op to `session` in order, stopping at the first failure.
    pub fn apply(&self, session: &mut EditorSession) -> MemfyResult<()> {
        for (i, op) in self.ops.iter().enumerate() {
            tracing::debug!(index = i, ?op, "applying edit");
            match op {
                EditOp::Text(t) => {
                    session.add_text(t.clone())?;
                }
                EditOp::Crop(rect) => session.crop(rect)?,
                EditOp::Grayscale => session.apply_grayscale()?,
            }
        }
        Ok(())
    }

    /// Export settings from the script, or defaults.
    pub fn encode_options(&self) -> EncodeOptions {
        self.export.clone().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../tests/unit/script.rs"]
mod tests;
