//! The ink raster.
//!
//! [`InkSurface`] is a straight-alpha RGBA buffer sized in device pixels
//! (logical size × device pixel ratio). Drawing calls take logical
//! coordinates; the scale is applied when a segment is rasterized.

use crate::stroke::{Composite, Segment, StrokeStyle};
use image::{Rgba, RgbaImage, imageops};
use kurbo::{Affine, PathEl, Point, Rect, Shape};

/// Flattening tolerance in device pixels.
const FLATTEN_TOLERANCE: f64 = 0.1;

/// Anything segments can be stroked onto.
pub trait InkCanvas {
    fn stroke_segment(&mut self, segment: &Segment, style: &StrokeStyle);
}

/// Records segments instead of drawing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub segments: Vec<(Segment, StrokeStyle)>,
}

impl InkCanvas for RecordingCanvas {
    fn stroke_segment(&mut self, segment: &Segment, style: &StrokeStyle) {
        self.segments.push((*segment, *style));
    }
}

#[derive(Debug, Clone)]
pub struct InkSurface {
    pixels: RgbaImage,
    logical_width: f32,
    logical_height: f32,
    scale: f32,
}

impl Default for InkSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl InkSurface {
    /// A zero-sized surface; nothing draws until it is resized.
    pub fn new() -> Self {
        Self {
            pixels: RgbaImage::new(0, 0),
            logical_width: 0.0,
            logical_height: 0.0,
            scale: 1.0,
        }
    }

    pub fn with_size(logical_width: f32, logical_height: f32, scale: f32) -> Self {
        let mut surface = Self::new();
        surface.resize(logical_width, logical_height, scale);
        surface
    }

    /// Reallocate the backing buffer for a new layout size. The contents are
    /// discarded, as with a canvas whose width is reassigned.
    ///
    /// Returns `false` and leaves the surface alone when either dimension is
    /// not a positive number.
    pub fn resize(&mut self, logical_width: f32, logical_height: f32, scale: f32) -> bool {
        if !(logical_width > 0.0 && logical_height > 0.0) {
            return false;
        }
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let w = (logical_width * scale).floor() as u32;
        let h = (logical_height * scale).floor() as u32;
        self.pixels = RgbaImage::new(w, h);
        self.logical_width = logical_width;
        self.logical_height = logical_height;
        self.scale = scale;
        log::trace!("ink surface resized to {w}x{h} (scale {scale})");
        true
    }

    pub fn clear(&mut self) {
        self.pixels.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p[3] == 0)
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn logical_size(&self) -> (f32, f32) {
        (self.logical_width, self.logical_height)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Alpha at a logical coordinate, or `None` outside the surface.
    pub fn alpha_at(&self, x: f32, y: f32) -> Option<u8> {
        let px = (x * self.scale).floor();
        let py = (y * self.scale).floor();
        if px < 0.0 || py < 0.0 {
            return None;
        }
        self.pixels
            .get_pixel_checked(px as u32, py as u32)
            .map(|p| p[3])
    }

    /// Draw `image` over the whole surface, stretched to fit.
    pub fn draw_stretched(&mut self, image: &RgbaImage) {
        let (w, h) = self.pixels.dimensions();
        if w == 0 || h == 0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        let scaled;
        let src = if image.dimensions() == (w, h) {
            image
        } else {
            scaled = imageops::resize(image, w, h, imageops::FilterType::Triangle);
            &scaled
        };
        for (dst, src) in self.pixels.pixels_mut().zip(src.pixels()) {
            source_over(dst, *src, 1.0);
        }
    }

    /// Coverage of the stroked segment over the device-pixel rectangle it
    /// touches, one entry per pixel, row-major.
    fn coverage(&self, segment: &Segment, width: f32) -> Option<(Rect, Vec<f32>)> {
        let scale = self.scale as f64;
        let path = Affine::scale(scale) * segment.to_path();
        let half = (width as f64 * scale / 2.0).max(0.5);

        let bounds = path.bounding_box().inflate(half + 1.0, half + 1.0);
        let clip = Rect::new(
            bounds.x0.floor().max(0.0),
            bounds.y0.floor().max(0.0),
            bounds.x1.ceil().min(self.pixels.width() as f64),
            bounds.y1.ceil().min(self.pixels.height() as f64),
        );
        if clip.width() <= 0.0 || clip.height() <= 0.0 {
            return None;
        }

        let mut lines: Vec<(Point, Point)> = Vec::new();
        let mut last = segment.start();
        path.flatten(FLATTEN_TOLERANCE, |el| match el {
            PathEl::MoveTo(p) => last = p,
            PathEl::LineTo(p) => {
                lines.push((last, p));
                last = p;
            }
            _ => {}
        });
        if lines.is_empty() {
            lines.push((last, last));
        }

        let (cols, rows) = (clip.width() as usize, clip.height() as usize);
        let mut mask = vec![0.0f32; cols * rows];
        for row in 0..rows {
            for col in 0..cols {
                let center = Point::new(clip.x0 + col as f64 + 0.5, clip.y0 + row as f64 + 0.5);
                let d = lines
                    .iter()
                    .map(|&(a, b)| distance_to_segment(center, a, b))
                    .fold(f64::INFINITY, f64::min);
                mask[row * cols + col] = (half + 0.5 - d).clamp(0.0, 1.0) as f32;
            }
        }
        Some((clip, mask))
    }
}

impl InkCanvas for InkSurface {
    fn stroke_segment(&mut self, segment: &Segment, style: &StrokeStyle) {
        if !(style.width > 0.0) {
            return;
        }
        let Some((clip, mask)) = self.coverage(segment, style.width) else {
            return;
        };
        let cols = clip.width() as usize;
        let paint = style.color.to_rgba8();
        for (i, &cov) in mask.iter().enumerate() {
            if cov <= 0.0 {
                continue;
            }
            let x = clip.x0 as u32 + (i % cols) as u32;
            let y = clip.y0 as u32 + (i / cols) as u32;
            let dst = self.pixels.get_pixel_mut(x, y);
            match style.composite {
                Composite::SourceOver => source_over(dst, paint, cov),
                Composite::DestinationOut => destination_out(dst, style.color.a * cov),
            }
        }
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}

fn unit(v: u8) -> f32 {
    v as f32 / 255.0
}

fn byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Straight-alpha source-over with the source alpha scaled by `coverage`.
fn source_over(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let sa = unit(src[3]) * coverage;
    if sa <= 0.0 {
        return;
    }
    let da = unit(dst[3]);
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (unit(src[c]) * sa + unit(dst[c]) * da * (1.0 - sa)) / out_a;
        out[c] = byte(v);
    }
    out[3] = byte(out_a);
    *dst = Rgba(out);
}

/// Destination-out: keep the destination where the source is not.
fn destination_out(dst: &mut Rgba<u8>, source_alpha: f32) {
    let out_a = byte(unit(dst[3]) * (1.0 - source_alpha.clamp(0.0, 1.0)));
    *dst = if out_a == 0 {
        Rgba([0, 0, 0, 0])
    } else {
        Rgba([dst[0], dst[1], dst[2], out_a])
    };
}
