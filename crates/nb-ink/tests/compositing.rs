//! Integration tests: drawing, erasing, snapshotting and resync.

use kurbo::Point;
use nb_ink::*;
use pretty_assertions::assert_eq;

fn draw_stroke(surface: &mut InkSurface, mode: InkMode, pen: &PenSettings, points: &[(f64, f64)]) {
    let mut builder = StrokeBuilder::new();
    for &(x, y) in points {
        if let Some(segment) = builder.push(Point::new(x, y)) {
            let style = StrokeStyle::for_sample(mode, pen, None).unwrap();
            surface.stroke_segment(&segment, &style);
        }
    }
}

fn red_pen() -> PenSettings {
    PenSettings {
        color: Color::from_hex_or_black("#ff0000"),
        size: 3.0,
    }
}

fn thick_pen() -> PenSettings {
    PenSettings {
        color: Color::from_hex_or_black("#ff0000"),
        size: 10.0,
    }
}

const PATH: [(f64, f64); 5] = [
    (10.0, 10.0),
    (30.0, 12.0),
    (50.0, 20.0),
    (70.0, 35.0),
    (90.0, 50.0),
];

// ─── Draw ────────────────────────────────────────────────────────────────

#[test]
fn draw_paints_pen_color() {
    let mut surface = InkSurface::with_size(100.0, 60.0, 1.0);
    draw_stroke(&mut surface, InkMode::Draw, &red_pen(), &PATH);

    assert_eq!(surface.alpha_at(30.0, 12.0), Some(255));
    let px = surface.pixels().get_pixel(30, 12);
    assert_eq!(px.0, [255, 0, 0, 255]);
    assert_eq!(surface.alpha_at(90.0, 5.0), Some(0));
}

#[test]
fn single_sample_draws_nothing() {
    let mut surface = InkSurface::with_size(40.0, 40.0, 1.0);
    draw_stroke(&mut surface, InkMode::Draw, &red_pen(), &[(20.0, 20.0)]);
    assert!(surface.is_blank());
}

// ─── Erase ───────────────────────────────────────────────────────────────

#[test]
fn erase_over_draw_leaves_transparent_pixels() {
    let mut surface = InkSurface::with_size(100.0, 60.0, 1.0);
    draw_stroke(&mut surface, InkMode::Draw, &red_pen(), &PATH);
    assert!(!surface.is_blank());

    draw_stroke(&mut surface, InkMode::Erase, &red_pen(), &PATH);
    assert!(surface.is_blank());

    let snapshot = surface.snapshot().unwrap();
    let decoded = decode_data_url(&snapshot).unwrap();
    assert!(decoded.pixels().all(|p| p[3] == 0));
}

#[test]
fn erase_only_touches_pixels_under_the_eraser() {
    let mut surface = InkSurface::with_size(100.0, 60.0, 1.0);
    draw_stroke(
        &mut surface,
        InkMode::Draw,
        &red_pen(),
        &[(10.0, 30.0), (50.0, 30.0), (90.0, 30.0)],
    );
    draw_stroke(&mut surface, InkMode::Erase, &red_pen(), &[(50.0, 0.0), (50.0, 60.0)]);

    assert_eq!(surface.alpha_at(50.0, 30.0), Some(0));
    assert_eq!(surface.alpha_at(20.0, 30.0), Some(255));
    assert_eq!(surface.alpha_at(65.0, 30.0), Some(255));
}

#[test]
fn nan_sample_does_not_wipe_existing_ink() {
    let mut surface = InkSurface::with_size(100.0, 60.0, 1.0);
    draw_stroke(&mut surface, InkMode::Draw, &red_pen(), &PATH);
    draw_stroke(
        &mut surface,
        InkMode::Draw,
        &red_pen(),
        &[(5.0, 55.0), (f64::NAN, f64::NAN), (8.0, 55.0)],
    );

    assert_eq!(surface.alpha_at(30.0, 12.0), Some(255));
    let px = surface.pixels().get_pixel(30, 12);
    assert_eq!(px.0, [255, 0, 0, 255]);
}

// ─── Snapshot + resync ───────────────────────────────────────────────────

#[test]
fn resync_repaints_stored_ink_at_new_size() {
    let mut surface = InkSurface::with_size(100.0, 60.0, 1.0);
    draw_stroke(&mut surface, InkMode::Draw, &thick_pen(), &PATH);
    let snapshot = surface.snapshot().unwrap();

    let outcome = resync(&mut surface, SurfaceSize::new(200.0, 120.0, 1.0), &snapshot);
    assert_eq!(outcome, Resync::Painted);
    assert_eq!((surface.pixel_width(), surface.pixel_height()), (200, 120));
    assert!(!surface.is_blank());
    assert_eq!(surface.alpha_at(60.0, 24.0), Some(255));
}

#[test]
fn resync_with_high_dpi_scale() {
    let mut surface = InkSurface::with_size(100.0, 60.0, 1.0);
    draw_stroke(&mut surface, InkMode::Draw, &thick_pen(), &PATH);
    let snapshot = surface.snapshot().unwrap();

    resync(&mut surface, SurfaceSize::new(100.0, 60.0, 2.0), &snapshot);
    assert_eq!((surface.pixel_width(), surface.pixel_height()), (200, 120));
    assert_eq!(surface.alpha_at(30.0, 12.0), Some(255));
}

#[test]
fn resync_to_zero_size_is_a_no_op() {
    let mut surface = InkSurface::with_size(50.0, 50.0, 1.0);
    draw_stroke(&mut surface, InkMode::Draw, &red_pen(), &[(5.0, 5.0), (45.0, 45.0)]);

    assert_eq!(resync(&mut surface, SurfaceSize::new(0.0, 80.0, 1.0), ""), Resync::Skipped);
    assert_eq!(surface.pixel_width(), 50);
    assert!(!surface.is_blank());
}

#[test]
fn resync_with_empty_or_bad_snapshot_leaves_blank() {
    let mut surface = InkSurface::with_size(50.0, 50.0, 1.0);
    draw_stroke(&mut surface, InkMode::Draw, &red_pen(), &[(5.0, 5.0), (45.0, 45.0)]);

    assert_eq!(resync(&mut surface, SurfaceSize::new(50.0, 50.0, 1.0), ""), Resync::Blank);
    assert!(surface.is_blank());

    let outcome = resync(
        &mut surface,
        SurfaceSize::new(50.0, 50.0, 1.0),
        "data:image/png;base64,AAEC",
    );
    assert_eq!(outcome, Resync::Undecodable);
    assert!(surface.is_blank());
}

#[test]
fn zero_sized_surface_snapshots_to_empty() {
    assert_eq!(InkSurface::new().snapshot().unwrap(), "");
}
