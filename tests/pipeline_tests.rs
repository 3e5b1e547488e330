//! End-to-end segmentation of synthetic carriers
//!
//! The synthetic renderer knows where every grid line belongs, so these
//! tests check the whole chain (holder crop, rows, crosses, grid, segments)
//! against ground truth rather than against recorded output.

use carrier_grid::tools::synthetic::SyntheticCarrier;
use carrier_grid::{
    CalibrationFailure, CarrierConfig, CarrierError, GridSpec, segment_carrier, well_label,
};
use image::{DynamicImage, Rgb};

fn render(carrier: &SyntheticCarrier) -> DynamicImage {
    DynamicImage::ImageRgb8(carrier.render())
}

fn assert_grid_close(actual: &GridSpec, expected: &GridSpec, tolerance: i64) {
    for k in 0..5 {
        assert!(
            (actual.x_grid[k] - expected.x_grid[k]).abs() <= tolerance,
            "x_grid {:?} vs expected {:?}",
            actual.x_grid,
            expected.x_grid
        );
        assert!(
            (actual.y_grid[k] - expected.y_grid[k]).abs() <= tolerance,
            "y_grid {:?} vs expected {:?}",
            actual.y_grid,
            expected.y_grid
        );
    }
}

#[test]
fn scaled_carrier_is_segmented_exactly() {
    let carrier = SyntheticCarrier::scaled(5);
    let result = segment_carrier(&render(&carrier), &carrier.config()).unwrap();

    assert_eq!(
        (result.crop.left, result.crop.top),
        (carrier.frame_left, carrier.frame_top)
    );
    assert_eq!(
        (result.image.width(), result.image.height()),
        (carrier.frame_width, carrier.frame_height)
    );
    assert_eq!(result.rows.rows, vec![150, 270, 390]);
    assert_eq!(result.crosses.crosses.len(), 9);
    assert_eq!(result.grid, carrier.grid_lines());
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert!(result.tilt.is_none());
}

#[test]
fn segments_tile_the_grid_in_row_major_order() {
    let carrier = SyntheticCarrier::scaled(5);
    let result = segment_carrier(&render(&carrier), &carrier.config()).unwrap();
    let grid = carrier.grid_lines();

    assert_eq!(result.segments.len(), 16);
    for (i, segment) in result.segments.iter().enumerate() {
        let info = &segment.info;
        let (row, col) = (i / 4, i % 4);
        assert_eq!((info.row, info.col), (row, col));
        assert_eq!(info.well, well_label(i).unwrap());
        assert_eq!(
            info.x_range,
            (grid.x_grid[col] as u32, grid.x_grid[col + 1] as u32)
        );
        assert_eq!(
            info.y_range,
            (grid.y_grid[row] as u32, grid.y_grid[row + 1] as u32)
        );
        assert_eq!(info.shape, (120, 160, 3));
    }

    // Each segment holds one specimen surrounded by its bright margin
    let a1 = result.segments[0].image.to_rgb8();
    assert_eq!(*a1.get_pixel(80, 60), Rgb([115, 115, 115]));
    assert_eq!(*a1.get_pixel(2, 2), Rgb([255, 255, 255]));
}

#[test]
fn segmentation_is_deterministic() {
    let carrier = SyntheticCarrier::scaled(5);
    let image = render(&carrier);
    let first = segment_carrier(&image, &carrier.config()).unwrap();
    let second = segment_carrier(&image, &carrier.config()).unwrap();

    assert_eq!(first.rows.rows, second.rows.rows);
    assert_eq!(first.crosses.crosses, second.crosses.crosses);
    assert_eq!(first.grid, second.grid);
}

#[test]
fn tilted_carrier_is_straightened() {
    let carrier = SyntheticCarrier::scaled(5).with_tilt(2.0);
    let mut config = carrier.config();
    config.frame.rotate = true;

    let result = segment_carrier(&render(&carrier), &config).unwrap();
    let tilt = result.tilt.expect("rotation was requested");
    assert!(
        (tilt.radians_or_zero().to_degrees() - 2.0).abs() <= 0.5,
        "tilt {tilt:?}"
    );

    // The crop is the bounding box of the tilted holder, so the straightened
    // grid is shifted; its spacing must still match the carrier's.
    let expected = carrier.grid_lines();
    for k in 1..5 {
        let dx = result.grid.x_grid[k] - result.grid.x_grid[k - 1];
        let dy = result.grid.y_grid[k] - result.grid.y_grid[k - 1];
        assert!((dx - carrier.cell_width as i64).abs() <= 3, "x_grid {:?}", result.grid.x_grid);
        assert!((dy - carrier.cell_height as i64).abs() <= 3, "y_grid {:?}", result.grid.y_grid);
    }
    assert!(result.grid.x_grid[0] >= expected.x_grid[0]);
    assert!(result.grid.y_grid[0] >= expected.y_grid[0]);
    assert_eq!(result.segments.len(), 16);
}

#[test]
fn blank_photo_has_no_holder() {
    let blank = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(400, 300, Rgb([250, 250, 250])));
    let err = segment_carrier(&blank, &CarrierConfig::default()).unwrap_err();
    assert!(matches!(err, CarrierError::EmptyMask { .. }));
}

#[test]
fn missing_gap_row_fails_calibration() {
    // Solid specimens leave no bright gaps, so no marker rows exist
    let carrier = SyntheticCarrier {
        gap: 0,
        ..SyntheticCarrier::scaled(5)
    };
    let config = SyntheticCarrier::scaled(5).config();
    let err = segment_carrier(&render(&carrier), &config).unwrap_err();
    assert!(matches!(
        err,
        CarrierError::Calibration(CalibrationFailure::TooFewRows { .. })
    ));
}

#[test]
fn invalid_config_is_rejected_before_processing() {
    let carrier = SyntheticCarrier::scaled(5);
    let mut config = carrier.config();
    config.crosses.cross_width = config.crosses.cross_size + 1;
    let err = segment_carrier(&render(&carrier), &config).unwrap_err();
    assert!(matches!(err, CarrierError::InvalidConfig(_)));
}

#[test]
fn full_size_carrier_with_default_tuning() {
    let carrier = SyntheticCarrier::default();
    let result = segment_carrier(&render(&carrier), &CarrierConfig::default()).unwrap();

    assert_eq!(result.rows.rows, vec![750, 1350, 1950]);
    assert_grid_close(&result.grid, &carrier.grid_lines(), 1);
    assert_eq!(result.segments.len(), 16);
    assert_eq!(result.segments[0].info.shape, (600, 800, 3));
}

#[test]
fn square_cells_extrapolate_to_the_outer_boundary() {
    // 800 px pitch on both axes; the top grid line sits on the crop edge
    let carrier = SyntheticCarrier {
        cell_height: 800,
        grid_top: 0,
        ..SyntheticCarrier::default()
    };
    let result = segment_carrier(&render(&carrier), &CarrierConfig::default()).unwrap();

    assert_eq!(result.grid.y_grid, [0, 800, 1600, 2400, 3200]);
    assert_grid_close(&result.grid, &carrier.grid_lines(), 1);
    assert_eq!(result.segments.len(), 16);

    let spacing = result.grid.y_grid[3] - result.grid.y_grid[2];
    let a1 = &result.segments[0].info;
    assert_eq!(a1.well, "A1");
    assert_eq!(
        (a1.x_range.0 as i64, a1.y_range.0 as i64),
        (result.grid.x_grid[1] - spacing, result.grid.y_grid[1] - spacing)
    );
    assert_eq!((a1.x_range.0, a1.y_range.0), (150, 0));
}
