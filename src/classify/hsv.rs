//! RGB to HSV conversion

/// A color in HSV space: hue in degrees [0, 360), saturation and value in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

/// Converts 8-bit RGB to HSV
///
/// The red-sector hue uses a truncating remainder (`%`), with negative
/// results shifted by 360 afterwards.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let c_max = r.max(g).max(b);
    let c_min = r.min(g).min(b);
    let delta = c_max - c_min;

    let mut hue = if delta == 0.0 {
        0.0
    } else if c_max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if c_max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    if hue < 0.0 {
        hue += 360.0;
    }

    let saturation = if c_max == 0.0 { 0.0 } else { delta / c_max * 100.0 };

    Hsv {
        hue,
        saturation,
        value: c_max * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primaries() {
        assert_eq!(rgb_to_hsv(255, 0, 0), Hsv { hue: 0.0, saturation: 100.0, value: 100.0 });
        assert_eq!(rgb_to_hsv(0, 255, 0), Hsv { hue: 120.0, saturation: 100.0, value: 100.0 });
        assert_eq!(rgb_to_hsv(0, 0, 255).hue, 240.0);
    }

    #[test]
    fn test_greys() {
        let white = rgb_to_hsv(255, 255, 255);
        assert_eq!(white.saturation, 0.0);
        assert_eq!(white.value, 100.0);

        let black = rgb_to_hsv(0, 0, 0);
        assert_eq!(black.value, 0.0);
        assert_eq!(black.hue, 0.0);
        assert_eq!(black.saturation, 0.0);
    }

    #[test]
    fn test_red_sector_wraps_positive() {
        // magenta-ish red: g < b puts the raw hue below zero
        let hsv = rgb_to_hsv(255, 0, 128);
        assert!(hsv.hue > 300.0 && hsv.hue < 360.0, "hue {}", hsv.hue);
    }

    #[test]
    fn test_yellow_and_cyan() {
        assert!((rgb_to_hsv(255, 255, 0).hue - 60.0).abs() < 1e-9);
        assert!((rgb_to_hsv(0, 255, 255).hue - 180.0).abs() < 1e-9);
    }
}
