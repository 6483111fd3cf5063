//! Integration tests for bitmap rescaling to device resolution
//!
//! These tests verify that:
//!
//! 1. A zero-area target returns the original image with a recoverable condition
//! 2. Every draw receives the half-pixel source origin and the per-factor mode
//! 3. The CPU surface produces crisp integer upscales and fringe-free fractional ones
//! 4. Images survive a file round trip through the `image` crate

mod common;

use std::sync::Arc;

use common::{MARKER, hosts, recording_rescaler, test_bitmaps};
use dpi_awareness::awareness::{OsFeatureLevel, SimulatedHost};
use dpi_awareness::config::DpiConfig;
use dpi_awareness::scaling::{ImageRescaler, load_bitmap, save_bitmap};
use dpi_awareness::error::ErrorSeverity;
use dpi_awareness::{DpiServices, HasSeverity, Recoverable, ResamplingMode, Size};

#[test]
fn zero_target_is_recoverable() {
    let host = Arc::new(SimulatedHost::new(OsFeatureLevel::Tier3).with_dpi(144));
    let mut services = DpiServices::initialize(&DpiConfig::default(), host).unwrap();
    let icon = test_bitmaps::checkerboard(Size::new(6, 6), 2);

    let outcome = services
        .rescaler
        .rescale_to_size(&icon, Size::new(0, 0))
        .unwrap();

    assert!(!outcome.is_scaled());
    let condition = outcome.condition().unwrap();
    assert!(condition.is_recoverable());
    assert_eq!(condition.severity(), ErrorSeverity::Warning);
    assert_eq!(outcome.image(), &icon);
}

#[test]
fn one_dimension_zero_is_also_unscaled() {
    let mut rescaler = recording_rescaler(144);
    let icon = test_bitmaps::solid(Size::new(4, 4), [10, 20, 30, 255]);
    let outcome = rescaler.rescale_to_size(&icon, Size::new(6, 0)).unwrap();
    assert!(!outcome.is_scaled());
    assert!(rescaler.surface().calls.is_empty());
}

#[test]
fn draws_carry_origin_and_mode() {
    let cases = [
        (96, ResamplingMode::NearestNeighbor),
        (120, ResamplingMode::Bicubic),
        (144, ResamplingMode::Bicubic),
        (192, ResamplingMode::NearestNeighbor),
        (288, ResamplingMode::NearestNeighbor),
        (72, ResamplingMode::Bilinear),
    ];
    for (dpi, expected) in cases {
        let mut rescaler = recording_rescaler(dpi);
        let icon = test_bitmaps::solid(Size::new(10, 10), [0, 0, 0, 255]);
        let mut slot = Some(icon);
        rescaler.rescale_in_place(&mut slot).unwrap();

        let call = &rescaler.surface().calls[0];
        assert_eq!(call.mode, expected, "dpi {dpi}");
        assert_eq!((call.src_rect.x, call.src_rect.y), (-0.5, -0.5));
        assert_eq!(call.src_size, Size::new(10, 10));
        assert_eq!(call.dst_size, rescaler.units().to_device_size(Size::new(10, 10)));
        assert_eq!(slot.unwrap().pixel(0, 0), Some(MARKER));
    }
}

#[test]
fn integer_upscale_keeps_hard_edges() {
    let mut rescaler = ImageRescaler::new(hosts::units_at(192));
    let board = test_bitmaps::checkerboard(Size::new(4, 4), 1);

    let scaled = rescaler
        .rescale_to_size(&board, Size::new(8, 8))
        .unwrap()
        .into_image();

    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(scaled.pixel(x, y), board.pixel(x / 2, y / 2), "({x}, {y})");
        }
    }
}

#[test]
fn fractional_upscale_has_no_edge_fringe() {
    let mut rescaler = ImageRescaler::new(hosts::units_at(144));
    let white = test_bitmaps::solid(Size::new(16, 16), [255, 255, 255, 255]);

    let scaled = rescaler.scale_button_image(white).unwrap();
    assert_eq!(scaled.size(), Size::new(24, 24));
    for edge in [(23, 0), (0, 23), (23, 23), (12, 23), (23, 12)] {
        let px = scaled.pixel(edge.0, edge.1).unwrap();
        assert!(px.iter().all(|&c| c >= 250), "fringe at {edge:?}: {px:?}");
    }
}

#[test]
fn png_round_trip_through_rescale() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("logical.png");
    let output = dir.path().join("device.png");
    save_bitmap(&test_bitmaps::checkerboard(Size::new(5, 5), 1), &input).unwrap();

    let mut rescaler = ImageRescaler::new(hosts::units_at(192));
    let mut image = Some(load_bitmap(&input).unwrap());
    assert!(rescaler.rescale_in_place(&mut image).unwrap().is_replaced());
    save_bitmap(image.as_ref().unwrap(), &output).unwrap();

    let reloaded = load_bitmap(&output).unwrap();
    assert_eq!(reloaded.size(), Size::new(10, 10));
    assert_eq!(reloaded.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(reloaded.pixel(2, 0), Some([255, 255, 255, 255]));
}

#[test]
fn missing_input_file_reports_path() {
    let err = load_bitmap("/nonexistent/icon.png").unwrap_err();
    let context = err.context().context.as_deref().unwrap_or_default();
    assert!(context.contains("/nonexistent/icon.png"));
}
