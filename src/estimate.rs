//! Classified fraction to physical area

use tracing::debug;

use crate::error::{Error, Result};
use crate::projection::ScaleModel;
use crate::types::Dimensions;

/// Square feet in one square meter
pub const SQ_FEET_PER_SQ_METER: f64 = 10.764;

/// Square meters in one square foot, applied to the feet figure as-is
pub const SQ_METERS_PER_SQ_FOOT: f64 = 0.092903;

/// Estimated lawn area for one viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaEstimate {
    pub square_feet: u64,
    pub square_meters: u64,
    /// Floor of the classified percentage, never above 100
    pub coverage_pct: u8,
    /// Ground area of the whole image before applying the green fraction
    pub total_square_meters: f64,
}

/// Converts classified/total pixel counts into area
///
/// `dims` must be the dimensions of the buffer that was classified and
/// `scale` must describe that same buffer.
pub fn estimate_area(
    classified_count: u64,
    total_count: u64,
    scale: &ScaleModel,
    dims: Dimensions,
) -> Result<AreaEstimate> {
    if total_count == 0 {
        return Err(Error::InvalidViewport("cannot estimate area of a zero-pixel image".to_string()));
    }
    if classified_count > total_count {
        return Err(Error::Classification(format!(
            "classified {} of only {} pixels",
            classified_count, total_count
        )));
    }

    let green_fraction = classified_count as f64 / total_count as f64;

    let width_meters = f64::from(dims.width) * scale.meters_per_pixel;
    let height_meters = f64::from(dims.height) * scale.meters_per_pixel;
    let total_square_meters = width_meters * height_meters;
    let total_square_feet = total_square_meters * SQ_FEET_PER_SQ_METER;

    let estimated_square_feet = total_square_feet * green_fraction;
    let estimated_square_meters = estimated_square_feet * SQ_METERS_PER_SQ_FOOT;
    let coverage_pct = (green_fraction * 100.0).floor().min(100.0) as u8;

    debug!(
        green_fraction,
        total_square_meters,
        square_feet = estimated_square_feet,
        "estimated area"
    );

    Ok(AreaEstimate {
        square_feet: estimated_square_feet.round() as u64,
        square_meters: estimated_square_meters.round() as u64,
        coverage_pct,
        total_square_meters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_scale() -> ScaleModel {
        ScaleModel { meters_per_pixel: 1.0, latitude_corrected: false }
    }

    #[test]
    fn test_quarter_of_two_by_two() {
        let estimate = estimate_area(1, 4, &unit_scale(), Dimensions::new(2, 2)).unwrap();

        assert_eq!(estimate.total_square_meters, 4.0);
        assert_eq!(estimate.coverage_pct, 25);
        assert_eq!(estimate.square_feet, 11);
        assert_eq!(estimate.square_meters, 1);
    }

    #[test]
    fn test_full_and_empty_coverage() {
        let dims = Dimensions::new(600, 400);
        let scale = ScaleModel { meters_per_pixel: 0.596, latitude_corrected: false };

        let full = estimate_area(240_000, 240_000, &scale, dims).unwrap();
        assert_eq!(full.coverage_pct, 100);

        let none = estimate_area(0, 240_000, &scale, dims).unwrap();
        assert_eq!(none.coverage_pct, 0);
        assert_eq!(none.square_feet, 0);
        assert_eq!(none.square_meters, 0);
    }

    #[test]
    fn test_coverage_floors() {
        let estimate = estimate_area(999, 1000, &unit_scale(), Dimensions::new(40, 25)).unwrap();
        assert_eq!(estimate.coverage_pct, 99);
    }

    #[test]
    fn test_linear_in_fraction() {
        let dims = Dimensions::new(600, 400);
        let scale = ScaleModel { meters_per_pixel: 0.298, latitude_corrected: true };

        let single = estimate_area(10_000, 240_000, &scale, dims).unwrap();
        let double = estimate_area(20_000, 240_000, &scale, dims).unwrap();

        let diff = double.square_feet as i64 - 2 * single.square_feet as i64;
        assert!(diff.abs() <= 1, "{} vs {}", double.square_feet, single.square_feet);
    }

    #[test]
    fn test_zero_pixels_rejected() {
        let err = estimate_area(0, 0, &unit_scale(), Dimensions::new(0, 0)).unwrap_err();
        assert!(matches!(err, Error::InvalidViewport(_)));
    }

    #[test]
    fn test_overcount_rejected() {
        let err = estimate_area(5, 4, &unit_scale(), Dimensions::new(2, 2)).unwrap_err();
        assert!(matches!(err, Error::Classification(_)));
    }
}
