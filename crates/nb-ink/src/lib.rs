//! Freehand ink: smoothed strokes rasterized onto an RGBA surface and
//! persisted as PNG data URLs.

pub mod color;
pub mod resync;
pub mod snapshot;
pub mod stroke;
pub mod surface;

pub use color::Color;
pub use resync::{Resync, SurfaceSize, resync};
pub use snapshot::{PNG_DATA_URL_PREFIX, SnapshotError, decode_data_url, encode_png_data_url};
pub use stroke::{
    Composite, ERASER_SCALE, InkMode, PRESSURE_FLOOR, PenSettings, Segment, StrokeBuilder,
    StrokeStyle, effective_pressure,
};
pub use surface::{InkCanvas, InkSurface, RecordingCanvas};

impl InkSurface {
    /// Snapshot the surface as a PNG data URL; empty for a zero-sized surface.
    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        if self.pixel_width() == 0 || self.pixel_height() == 0 {
            return Ok(String::new());
        }
        encode_png_data_url(self.pixels())
    }
}
