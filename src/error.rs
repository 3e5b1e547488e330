//! Error and warning types for the carrier segmentation pipeline.
//!
//! Fatal conditions are [`CarrierError`] values returned through `Result`;
//! conditions the pipeline can continue past are collected as
//! [`CarrierWarning`] values on the result and logged at `warn` level.

use serde::Serialize;
use std::fmt;

use crate::models::Axis;

/// Reason the alignment pattern could not be calibrated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalibrationFailure {
    /// The row search produced fewer than three candidate rows
    #[error("expected 3 marker rows, found {found}")]
    TooFewRows { found: usize },
    /// A row yielded a cross count other than three
    #[error("expected 3 crosses in row y={row_y}, found {found}")]
    RowCrossCount { row_y: usize, found: usize },
    /// Fewer (or more) than nine crosses reached the grid builder
    #[error("expected 9 cross marks, found {found}")]
    TooFewCrosses { found: usize },
    /// The extrapolated grid lines are not strictly increasing
    #[error("{axis} grid lines are not strictly increasing")]
    DegenerateGrid { axis: Axis },
}

/// Fatal pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum CarrierError {
    /// No holder silhouette survived thresholding and small-object removal.
    #[error(
        "no holder frame found (threshold={threshold}, max_object_size={max_object_size})"
    )]
    EmptyMask { threshold: f32, max_object_size: usize },

    /// The alignment pattern was not found with the expected marker count.
    #[error("calibration failed: {0}")]
    Calibration(#[from] CalibrationFailure),

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A well index outside 0..16 was requested.
    #[error("well index {0} out of range 0..16")]
    WellIndex(usize),

    /// Image decoding or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON configuration or metadata document could not be (de)serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Non-fatal conditions observed while processing one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CarrierWarning {
    /// The cross probe did not fit vertically at this row; the row was skipped.
    CrossOutOfBounds { row_y: usize },
    /// The detected middle reference line deviates from the midpoint of the
    /// outer two by more than `tolerance` pixels.
    MiddleLineDrift {
        axis: Axis,
        expected: f64,
        actual: f64,
        tolerance: f64,
    },
}

impl fmt::Display for CarrierWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrossOutOfBounds { row_y } => {
                write!(f, "cross probe does not fit at y={row_y}, row skipped")
            }
            Self::MiddleLineDrift {
                axis,
                expected,
                actual,
                tolerance,
            } => write!(
                f,
                "{axis} middle line at {actual:.1} deviates from uniform position {expected:.1} (tolerance {tolerance:.1}px)"
            ),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, CarrierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_failure_converts_and_formats() {
        let err: CarrierError = CalibrationFailure::TooFewRows { found: 2 }.into();
        assert!(matches!(
            err,
            CarrierError::Calibration(CalibrationFailure::TooFewRows { found: 2 })
        ));
        assert_eq!(err.to_string(), "calibration failed: expected 3 marker rows, found 2");
    }

    #[test]
    fn calibration_failure_is_the_error_source() {
        use std::error::Error;

        fn degenerate() -> Result<()> {
            let check: std::result::Result<(), CalibrationFailure> =
                Err(CalibrationFailure::DegenerateGrid { axis: Axis::X });
            check?;
            Ok(())
        }

        let err = degenerate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "calibration failed: x grid lines are not strictly increasing"
        );
        let source = err.source().expect("calibration failure is chained");
        assert_eq!(source.to_string(), "x grid lines are not strictly increasing");
    }

    #[test]
    fn warning_serializes_with_kind_tag() {
        let warning = CarrierWarning::CrossOutOfBounds { row_y: 12 };
        let json = serde_json::to_string(&warning).unwrap();
        assert_eq!(json, r#"{"kind":"cross_out_of_bounds","row_y":12}"#);
    }
}
