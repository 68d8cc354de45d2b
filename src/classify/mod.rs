//! Vegetation classification
//!
//! Every pixel is converted to HSV and tested against [`VegetationThresholds`].
//! Rows are classified in parallel with rayon and merged back in scan order,
//! so the output is identical to a sequential walk of the buffer (see
//! [`VegetationClassifier::detections`]).

pub mod hsv;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::raster::RasterImage;

pub use hsv::{rgb_to_hsv, Hsv};

/// Color rule separating turf and foliage from pavement, roofs and shadow
///
/// Hue bounds are inclusive; saturation and value bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationThresholds {
    pub hue_min: f64,
    pub hue_max: f64,
    pub saturation_min: f64,
    pub value_min: f64,
    pub value_max: f64,
    /// Green must exceed this fraction of both red and blue
    pub green_dominance: f64,
}

impl Default for VegetationThresholds {
    fn default() -> Self {
        Self {
            hue_min: 40.0,
            hue_max: 200.0,
            saturation_min: 5.0,
            value_min: 5.0,
            value_max: 90.0,
            green_dominance: 0.9,
        }
    }
}

impl VegetationThresholds {
    /// Applies the rule to one 8-bit pixel
    pub fn is_vegetation(&self, r: u8, g: u8, b: u8) -> bool {
        let hsv = rgb_to_hsv(r, g, b);
        let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));

        hsv.hue >= self.hue_min
            && hsv.hue <= self.hue_max
            && hsv.saturation > self.saturation_min
            && hsv.value > self.value_min
            && hsv.value < self.value_max
            && g > r * self.green_dominance
            && g > b * self.green_dominance
    }
}

/// Position of a classified pixel, normalized by image width and height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

/// Outcome of one classifier pass
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub classified_count: u64,
    pub total_count: u64,
    /// Classified pixels in row-major scan order
    pub pixels: Vec<NormalizedPoint>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VegetationClassifier {
    thresholds: VegetationThresholds,
}

impl VegetationClassifier {
    pub fn new(thresholds: VegetationThresholds) -> Self {
        Self { thresholds }
    }

    /// Classifies every pixel of `raster`, sharding rows across the rayon pool
    pub fn classify(&self, raster: &RasterImage) -> Result<Classification> {
        let dims = raster.dimensions();
        let stride = raster.row_stride();

        if raster.pixels().len() != stride * dims.height as usize {
            return Err(Error::Classification(format!(
                "pixel buffer of {} bytes does not match {}x{}x{}",
                raster.pixels().len(),
                dims.width,
                dims.height,
                raster.channel_count()
            )));
        }

        if dims.pixel_count() == 0 {
            return Ok(Classification {
                classified_count: 0,
                total_count: 0,
                pixels: Vec::new(),
            });
        }

        let channels = raster.channel_count();
        let (width, height) = (f64::from(dims.width), f64::from(dims.height));

        let rows: Vec<Vec<NormalizedPoint>> = raster
            .pixels()
            .par_chunks(stride)
            .enumerate()
            .map(|(y, row)| {
                row.chunks_exact(channels)
                    .enumerate()
                    .filter(|(_, px)| self.thresholds.is_vegetation(px[0], px[1], px[2]))
                    .map(|(x, _)| NormalizedPoint {
                        x: x as f64 / width,
                        y: y as f64 / height,
                    })
                    .collect()
            })
            .collect();

        let pixels: Vec<NormalizedPoint> = rows.into_iter().flatten().collect();
        let classification = Classification {
            classified_count: pixels.len() as u64,
            total_count: dims.pixel_count(),
            pixels,
        };

        debug!(
            classified = classification.classified_count,
            total = classification.total_count,
            "classified raster"
        );

        Ok(classification)
    }

    /// Lazily yields classified pixels in scan order without materializing them
    ///
    /// Each call starts a fresh pass over the buffer.
    pub fn detections<'a>(&'a self, raster: &'a RasterImage) -> Detections<'a> {
        Detections {
            thresholds: &self.thresholds,
            pixels: raster.pixels().chunks_exact(raster.channel_count()),
            index: 0,
            width: raster.width() as usize,
            height: raster.height() as usize,
        }
    }
}

/// Iterator over classified pixels, see [`VegetationClassifier::detections`]
pub struct Detections<'a> {
    thresholds: &'a VegetationThresholds,
    pixels: std::slice::ChunksExact<'a, u8>,
    index: usize,
    width: usize,
    height: usize,
}

impl Iterator for Detections<'_> {
    type Item = NormalizedPoint;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let px = self.pixels.next()?;
            let index = self.index;
            self.index += 1;

            if self.thresholds.is_vegetation(px[0], px[1], px[2]) {
                return Some(NormalizedPoint {
                    x: (index % self.width) as f64 / self.width as f64,
                    y: (index / self.width) as f64 / self.height as f64,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RasterImage {
        RasterImage::from_rgb(2, 2, &[[0, 200, 0], [200, 0, 0], [0, 0, 0], [255, 255, 255]]).unwrap()
    }

    /// Deterministic pseudo-random image with a mix of greens and greys
    fn noisy(width: u32, height: u32) -> RasterImage {
        let mut state: u32 = 0x2545_F491;
        let mut rgb = Vec::with_capacity((width * height) as usize);
        for _ in 0..width * height {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let [r, g, b, _] = state.to_le_bytes();
            rgb.push([r / 2, g, b / 2]);
        }
        RasterImage::from_rgb(width, height, &rgb).unwrap()
    }

    #[test]
    fn test_default_thresholds() {
        let t = VegetationThresholds::default();
        assert!(t.is_vegetation(0, 200, 0));
        assert!(t.is_vegetation(60, 120, 50));
        assert!(!t.is_vegetation(200, 0, 0));
        assert!(!t.is_vegetation(0, 0, 0));
        assert!(!t.is_vegetation(255, 255, 255));
        assert!(!t.is_vegetation(0, 0, 255));
        // bright green sits above the value ceiling
        assert!(!t.is_vegetation(0, 255, 0));
        // teal passes hue but fails green dominance
        assert!(!t.is_vegetation(0, 100, 120));
    }

    #[test]
    fn test_thresholds_configurable() {
        let t = VegetationThresholds {
            value_max: 101.0,
            ..VegetationThresholds::default()
        };
        assert!(t.is_vegetation(0, 255, 0));
    }

    #[test]
    fn test_classify_sample() {
        let result = VegetationClassifier::default().classify(&sample()).unwrap();

        assert_eq!(result.classified_count, 1);
        assert_eq!(result.total_count, 4);
        assert_eq!(result.pixels, vec![NormalizedPoint { x: 0.0, y: 0.0 }]);
    }

    #[test]
    fn test_normalized_positions_scan_order() {
        let g = [30, 150, 40];
        let k = [0, 0, 0];
        let raster = RasterImage::from_rgb(4, 2, &[k, g, k, k, g, k, k, g]).unwrap();
        let result = VegetationClassifier::default().classify(&raster).unwrap();

        assert_eq!(
            result.pixels,
            vec![
                NormalizedPoint { x: 0.25, y: 0.0 },
                NormalizedPoint { x: 0.0, y: 0.5 },
                NormalizedPoint { x: 0.75, y: 0.5 },
            ]
        );
    }

    #[test]
    fn test_alpha_channel_ignored() {
        let raster = RasterImage::new(2, 1, 4, vec![0, 200, 0, 0, 200, 0, 0, 255]).unwrap();
        let result = VegetationClassifier::default().classify(&raster).unwrap();
        assert_eq!(result.classified_count, 1);
        assert_eq!(result.pixels[0], NormalizedPoint { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_deterministic() {
        let raster = noisy(97, 61);
        let classifier = VegetationClassifier::default();

        let first = classifier.classify(&raster).unwrap();
        let second = classifier.classify(&raster).unwrap();

        assert!(first.classified_count > 0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_matches_lazy_sequence() {
        let raster = noisy(128, 75);
        let classifier = VegetationClassifier::default();

        let parallel = classifier.classify(&raster).unwrap();
        let lazy: Vec<NormalizedPoint> = classifier.detections(&raster).collect();

        assert_eq!(parallel.pixels, lazy);
        assert_eq!(classifier.detections(&raster).count(), lazy.len());
    }

    #[test]
    fn test_empty_raster() {
        let raster = RasterImage::new(0, 5, 3, Vec::new()).unwrap();
        let result = VegetationClassifier::default().classify(&raster).unwrap();
        assert_eq!(result.total_count, 0);
        assert_eq!(result.classified_count, 0);
        assert!(result.pixels.is_empty());
    }
}
