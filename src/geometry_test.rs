#![allow(clippy::float_cmp)]

use super::*;

const TOLERANCE: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < TOLERANCE
}

// =============================================================
// GridMetrics construction
// =============================================================

#[test]
fn grid_rejects_zero_extent() {
    assert!(GridMetrics::new(0.0, 100.0).is_none());
    assert!(GridMetrics::new(100.0, 0.0).is_none());
}

#[test]
fn grid_rejects_negative_and_nan() {
    assert!(GridMetrics::new(-5.0, 100.0).is_none());
    assert!(GridMetrics::new(f64::NAN, 100.0).is_none());
    assert!(GridMetrics::new(100.0, f64::INFINITY).is_none());
}

#[test]
fn grid_from_container_trims_inset() {
    let grid = GridMetrics::from_container(Rect::new(10.0, 20.0, 1000.0, 800.0), 4.0).unwrap();
    assert_eq!(grid.width(), 996.0);
    assert_eq!(grid.height(), 796.0);
}

#[test]
fn grid_from_container_smaller_than_inset_is_none() {
    assert!(GridMetrics::from_container(Rect::new(0.0, 0.0, 3.0, 3.0), 4.0).is_none());
}

// =============================================================
// Conversions
// =============================================================

#[test]
fn one_pixel_on_996_wide_grid() {
    let grid = GridMetrics::new(996.0, 796.0).unwrap();
    assert!(approx(grid.x_to_percent(1.0), 100.0 / 996.0));
    assert!(approx(grid.y_to_percent(1.0), 100.0 / 796.0));
}

#[test]
fn fifty_pixels_is_about_five_percent() {
    let grid = GridMetrics::new(996.0, 796.0).unwrap();
    assert!((grid.x_to_percent(50.0) - 5.0201).abs() < 1e-4);
}

#[test]
fn round_trip_recovers_pixels() {
    let grid = GridMetrics::new(996.0, 796.0).unwrap();
    for px in [-250.0, -1.0, 0.0, 0.5, 13.0, 777.7] {
        assert!(approx(grid.x_to_pixels(grid.x_to_percent(px)), px));
        assert!(approx(grid.y_to_pixels(grid.y_to_percent(px)), px));
    }
}

#[test]
fn bounds_round_trip_recovers_all_axes() {
    let grid = GridMetrics::new(1280.0, 640.0).unwrap();
    let px = BoundsDelta { x: 20.0, y: -10.0, width: -20.0, height: 10.0 };
    let back = grid.bounds_to_pixels(grid.bounds_to_percent(px));
    assert!(approx(back.x, px.x));
    assert!(approx(back.y, px.y));
    assert!(approx(back.width, px.width));
    assert!(approx(back.height, px.height));
}

#[test]
fn width_uses_horizontal_extent_and_height_vertical() {
    let grid = GridMetrics::new(200.0, 100.0).unwrap();
    let pct = grid.bounds_to_percent(BoundsDelta { x: 0.0, y: 0.0, width: 10.0, height: 10.0 });
    assert!(approx(pct.width, 5.0));
    assert!(approx(pct.height, 10.0));
}

// =============================================================
// Point / Rect helpers
// =============================================================

#[test]
fn delta_from_subtracts_origin() {
    let d = Point::new(150.0, 40.0).delta_from(Point::new(100.0, 50.0));
    assert_eq!(d, PixelDelta { dx: 50.0, dy: -10.0 });
}

#[test]
fn translated_keeps_size() {
    let r = Rect::new(1.0, 2.0, 30.0, 40.0).translated(PixelDelta { dx: 5.0, dy: -2.0 });
    assert_eq!(r, Rect::new(6.0, 0.0, 30.0, 40.0));
}

#[test]
fn adjusted_applies_each_edge() {
    let r = Rect::new(10.0, 10.0, 100.0, 50.0).adjusted(BoundsDelta { x: 5.0, y: 0.0, width: -5.0, height: 7.0 });
    assert_eq!(r, Rect::new(15.0, 10.0, 95.0, 57.0));
}
