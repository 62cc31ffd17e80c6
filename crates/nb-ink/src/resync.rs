//! Bringing the surface back in line with layout and the stored snapshot.

use crate::snapshot::decode_data_url;
use crate::surface::InkSurface;

/// Layout size of the ink layer plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self { width, height, scale }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resync {
    /// Layout reported a zero dimension; the surface was left untouched.
    Skipped,
    /// The page has no ink.
    Blank,
    /// The snapshot was painted, stretched to the new size.
    Painted,
    /// The snapshot could not be decoded; the surface was left blank.
    Undecodable,
}

/// Resize `surface` to `size`, clear it, then repaint `snapshot` (a data URL,
/// empty for no ink) stretched over the whole surface.
pub fn resync(surface: &mut InkSurface, size: SurfaceSize, snapshot: &str) -> Resync {
    if !surface.resize(size.width, size.height, size.scale) {
        return Resync::Skipped;
    }
    surface.clear();
    if snapshot.is_empty() {
        return Resync::Blank;
    }
    match decode_data_url(snapshot) {
        Ok(image) => {
            surface.draw_stretched(&image);
            Resync::Painted
        }
        Err(e) => {
            log::warn!("failed to decode ink snapshot: {e}");
            Resync::Undecodable
        }
    }
}
