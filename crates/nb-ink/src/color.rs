//! Pen colors.

use image::Rgba;

/// RGBA color, 4 × f32 in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional),
    /// the forms an `<input type="color">` and hand-written CSS produce.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim()).as_bytes();
        let channels: Vec<u8> = match digits.len() {
            3 | 4 => digits
                .iter()
                .map(|&c| nibble(c).map(|v| v * 17))
                .collect::<Option<_>>()?,
            6 | 8 => digits
                .chunks(2)
                .map(|pair| Some(nibble(pair[0])? << 4 | nibble(pair[1])?))
                .collect::<Option<_>>()?,
            _ => return None,
        };
        let alpha = channels.get(3).copied().unwrap_or(255);
        Some(Self::rgba(
            channels[0] as f32 / 255.0,
            channels[1] as f32 / 255.0,
            channels[2] as f32 / 255.0,
            alpha as f32 / 255.0,
        ))
    }

    /// Parse a pen color, falling back to black for anything unparsable.
    pub fn from_hex_or_black(hex: &str) -> Self {
        Self::from_hex(hex).unwrap_or_else(|| {
            log::warn!("unparsable pen color {hex:?}; using black");
            Self::BLACK
        })
    }

    pub fn to_rgba8(&self) -> Rgba<u8> {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([q(self.r), q(self.g), q(self.b), q(self.a)])
    }
}
