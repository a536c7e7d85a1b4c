use std::path::Path;

use crate::{
    foundation::{
        core::Rgba8,
        error::{MemfyError, MemfyResult},
    },
    overlay::model::DEFAULT_FONT_FAMILY,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Stateful helper for shaping text overlays with Parley.
///
/// System fonts are always available; fonts registered from bytes or a directory are tried
/// right after the requested family so a bundled font wins over the generic fallback.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered_families: Vec<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered_families: Vec::new(),
        }
    }

    /// Families registered through [`Self::register_font_bytes`], in registration order.
    pub fn registered_families(&self) -> &[String] {
        &self.registered_families
    }

    /// Register raw font bytes and return the primary family name.
    pub fn register_font_bytes(&mut self, font_bytes: Vec<u8>) -> MemfyResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            MemfyError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MemfyError::validation("registered font family has no name"))?
            .to_string();
        if !self.registered_families.contains(&family_name) {
            self.registered_families.push(family_name.clone());
        }
        Ok(family_name)
    }

    /// Register every `.ttf`/`.otf`/`.ttc` file directly inside `dir`; returns how many loaded.
    ///
    /// A missing directory or unreadable font is skipped.
    pub fn register_font_dir(&mut self, dir: &Path) -> usize {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return 0;
        };

        let mut paths: Vec<_> = rd
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_font_file(p))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            match self.register_font_bytes(bytes) {
                Ok(family) => {
                    tracing::debug!(path = %path.display(), %family, "registered font");
                    loaded += 1;
                }
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipped font"),
            }
        }
        loaded
    }

    /// Shape and lay out a single paragraph of text on one unbounded line box.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font_family: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> MemfyResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MemfyError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let stack = self.font_stack(font_family);
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(stack)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    fn font_stack(&self, requested: &str) -> String {
        let mut parts: Vec<&str> = requested
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let quoted: Vec<String> = self
            .registered_families
            .iter()
            .map(|f| format!("\"{f}\""))
            .collect();
        parts.extend(quoted.iter().map(String::as_str));
        parts.push(DEFAULT_FONT_FAMILY);
        parts.join(", ")
    }
}

fn is_font_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc")
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
