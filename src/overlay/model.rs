use crate::foundation::{
    core::{Point, Rgba8},
    error::{MemfyError, MemfyResult},
};

/// Font family used when a text overlay does not name one.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

/// Positioned text annotation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextOverlay {
    /// Text to draw.
    pub content: String,
    /// Top-left anchor in canvas coordinates.
    pub position: Point,
    /// Font size in pixels.
    pub font_size: f32,
    /// CSS-like family list, e.g. `"Inconsolata, monospace"`.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Fill color.
    #[serde(default)]
    pub color: Rgba8,
}

impl TextOverlay {
    /// White sans-serif text at `position`.
    pub fn new(content: impl Into<String>, position: Point, font_size: f32) -> Self {
        Self {
            content: content.into(),
            position,
            font_size,
            font_family: default_font_family(),
            color: Rgba8::WHITE,
        }
    }

    /// The annotation inserted by a bare "add text" action.
    pub fn placeholder() -> Self {
        Self::new("Text", Point::new(100.0, 100.0), 20.0)
    }

    /// Override the font family list.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Override the fill color.
    pub fn with_color(mut self, color: Rgba8) -> Self {
        self.color = color;
        self
    }

    /// Y coordinate of the first line's baseline: `position.y + font_size`.
    pub fn baseline_y(&self) -> f64 {
        self.position.y + f64::from(self.font_size)
    }

    /// Check size and position are usable.
    pub fn validate(&self) -> MemfyResult<()> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(MemfyError::validation(
                "text font_size must be finite and > 0",
            ));
        }
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(MemfyError::validation("text position must be finite"));
        }
        Ok(())
    }
}

/// Annotation kinds that can be composited onto exported frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    /// Positioned text.
    Text(TextOverlay),
}

impl Overlay {
    /// Canvas-space anchor of the overlay.
    pub fn position(&self) -> Point {
        match self {
            Self::Text(t) => t.position,
        }
    }

    /// Move the overlay so its anchor is at `to`.
    pub fn set_position(&mut self, to: Point) {
        match self {
            Self::Text(t) => t.position = to,
        }
    }
}

impl From<TextOverlay> for Overlay {
    fn from(value: TextOverlay) -> Self {
        Self::Text(value)
    }
}

/// User annotations, kept apart from frame pixels until export.
///
/// Insertion order is paint order. Every overlay applies to every exported frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayModel {
    objects: Vec<Overlay>,
}

impl OverlayModel {
    /// Empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append an overlay; returns its index.
    pub fn push(&mut self, overlay: impl Into<Overlay>) -> MemfyResult<usize> {
        let overlay = overlay.into();
        match &overlay {
            Overlay::Text(t) => t.validate()?,
        }
        self.objects.push(overlay);
        Ok(self.objects.len() - 1)
    }

    /// Append a text overlay; returns its index.
    pub fn add_text(&mut self, text: TextOverlay) -> MemfyResult<usize> {
        self.push(text)
    }

    /// Remove and return the overlay at `index`.
    pub fn remove(&mut self, index: usize) -> MemfyResult<Overlay> {
        if index >= self.objects.len() {
            return Err(MemfyError::validation(format!(
                "overlay index {index} out of range (len {})",
                self.objects.len()
            )));
        }
        Ok(self.objects.remove(index))
    }

    /// Mutable access to the overlay at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Overlay> {
        self.objects.get_mut(index)
    }

    /// Drop all overlays.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Overlays in paint order.
    pub fn iter(&self) -> std::slice::Iter<'_, Overlay> {
        self.objects.iter()
    }

    /// Number of overlays.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// `true` when there is nothing to composite.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<'a> IntoIterator for &'a OverlayModel {
    type Item = &'a Overlay;
    type IntoIter = std::slice::Iter<'a, Overlay>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/model.rs"]
mod tests;
