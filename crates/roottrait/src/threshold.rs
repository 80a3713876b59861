//! Binarization of raw grayscale scans.
//!
//! Thin wrapper over `imageproc::contrast`; the rest of the pipeline only
//! sees foreground/background masks.

use image::GrayImage;
use imageproc::contrast::{self, ThresholdType};

/// Thresholding strategy for turning a scan into a binary network mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreshMethod {
    /// One global cutoff for the whole raster.
    Fixed,
    /// Per-pixel cutoff from the local block mean; robust to uneven
    /// illumination.
    Adaptive,
    /// Global cutoff pre-pass gating a local adaptive pass: a pixel is
    /// foreground only when both passes agree.
    DoubleAdaptive,
}

/// Thresholder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Strategy to apply.
    pub method: ThreshMethod,
    /// Inclusive global cutoff: pixel >= cutoff is foreground.
    pub cutoff: u8,
    /// Odd side length of the local-mean block for the adaptive passes.
    pub block_size: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            method: ThreshMethod::Fixed,
            cutoff: 183,
            block_size: 19,
        }
    }
}

/// Binarize `image` according to `config`.
///
/// Output pixels are 0 or 255. An entirely background result is valid here;
/// the contour isolator is the stage that rejects empty networks.
pub fn threshold(image: &GrayImage, config: &ThresholdConfig) -> GrayImage {
    let block_radius = (config.block_size.max(3)) / 2;
    match config.method {
        // imageproc compares strictly (> t); shift by one so the configured
        // cutoff itself lands in the foreground.
        ThreshMethod::Fixed => contrast::threshold(
            image,
            config.cutoff.saturating_sub(1),
            ThresholdType::Binary,
        ),
        ThreshMethod::Adaptive => contrast::adaptive_threshold(image, block_radius),
        ThreshMethod::DoubleAdaptive => {
            let global = contrast::threshold(
                image,
                config.cutoff.saturating_sub(1),
                ThresholdType::Binary,
            );
            let mut local = contrast::adaptive_threshold(image, block_radius);
            for (lp, gp) in local.pixels_mut().zip(global.pixels()) {
                if gp.0[0] == 0 {
                    lp.0[0] = 0;
                }
            }
            local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| image::Luma([(x + y * w).min(255) as u8]))
    }

    #[test]
    fn fixed_cutoff_is_inclusive() {
        let img = GrayImage::from_raw(3, 1, vec![182, 183, 184]).expect("raw fits");
        let cfg = ThresholdConfig::default();
        let mask = threshold(&img, &cfg);
        assert_eq!(mask.as_raw(), &vec![0, 255, 255]);
    }

    #[test]
    fn fixed_threshold_is_deterministic() {
        let img = gradient_image(16, 16);
        let cfg = ThresholdConfig::default();
        assert_eq!(threshold(&img, &cfg), threshold(&img, &cfg));
    }

    #[test]
    fn adaptive_splits_a_step_edge() {
        // Left half dark, right half bright; the local mean separates them
        // near the boundary regardless of any global cutoff.
        let img = GrayImage::from_fn(20, 8, |x, _| image::Luma([if x < 10 { 40 } else { 210 }]));
        let cfg = ThresholdConfig {
            method: ThreshMethod::Adaptive,
            ..Default::default()
        };
        let mask = threshold(&img, &cfg);
        // Probe next to the step, where the block mean sits strictly between
        // the two plateau values.
        assert_eq!(mask.get_pixel(10, 4).0[0], 255);
        assert_eq!(mask.get_pixel(9, 4).0[0], 0);
    }

    #[test]
    fn double_adaptive_gates_on_global_cutoff() {
        let img = GrayImage::from_fn(20, 8, |x, _| image::Luma([if x < 10 { 40 } else { 210 }]));
        let cfg = ThresholdConfig {
            method: ThreshMethod::DoubleAdaptive,
            ..Default::default()
        };
        let mask = threshold(&img, &cfg);
        // Below the global cutoff: background, whatever the local mean says.
        assert!((0..10).all(|x| mask.get_pixel(x, 4).0[0] == 0));
        // Bright pixel next to the dark half: above both cutoff and mean.
        assert_eq!(mask.get_pixel(10, 4).0[0], 255);
    }
}
