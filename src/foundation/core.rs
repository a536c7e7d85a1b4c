use crate::foundation::error::{MemfyError, MemfyResult};

pub use kurbo::{Point, Vec2};

/// Pixel dimensions of the editing canvas (and of every frame in a loaded store).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Construct a canvas size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of bytes of a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Straight (non-premultiplied) RGBA8 color.
///
/// Serialized as a CSS-style hex string (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn parse_hex(s: &str) -> MemfyResult<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return Err(MemfyError::validation(format!("invalid color '{s}'")));
        }

        let nibble = |i: usize| -> MemfyResult<u8> {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|_| MemfyError::validation(format!("invalid color '{s}'")))
        };
        let byte = |i: usize| -> MemfyResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| MemfyError::validation(format!("invalid color '{s}'")))
        };

        match hex.len() {
            3 => Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Ok(Self::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(MemfyError::validation(format!(
                "invalid color '{s}': expected #rgb, #rgba, #rrggbb or #rrggbbaa"
            ))),
        }
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::WHITE
    }
}

impl TryFrom<String> for Rgba8 {
    type Error = MemfyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<Rgba8> for String {
    fn from(value: Rgba8) -> Self {
        value.to_hex()
    }
}

impl std::str::FromStr for Rgba8 {
    type Err = MemfyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}
