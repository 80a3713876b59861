//! Skeletonization of the refined network mask.
//!
//! Two reductions are offered. The morphological variant peels the network
//! with repeated erosion and collects what each opening removes; it preserves
//! topology well but keeps small spurs at corners. The medial-axis variant
//! keeps a pixel only where opposing background rays agree on its depth,
//! which yields thin center lines on elongated structures.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

use crate::geom::{self, FOREGROUND, CARDINALS};

/// Skeleton reduction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkeletonMethod {
    /// Iterated erode/open residue accumulation.
    Morphological,
    /// Cardinal background-ray depth comparison.
    MedialAxis,
}

/// Reduce `mask` to a skeleton with the requested method.
///
/// The output raster has the input dimensions, and every skeleton pixel is a
/// foreground pixel of the input. An empty input yields an empty skeleton.
pub fn skeletonize(mask: &GrayImage, method: SkeletonMethod) -> GrayImage {
    match method {
        SkeletonMethod::Morphological => morphological_skeleton(mask),
        SkeletonMethod::MedialAxis => medial_axis_skeleton(mask),
    }
}

/// Morphological skeleton by erosion residues.
///
/// Each round erodes the working mask with the 3x3 cross and re-dilates the
/// result; pixels the opening fails to recover belong to the current skeleton
/// layer. The loop stops once the opening is empty, after folding in the
/// final layer, so a shape thinner than the structuring element still
/// contributes its last remnant.
fn morphological_skeleton(mask: &GrayImage) -> GrayImage {
    let mut skeleton = GrayImage::new(mask.width(), mask.height());
    let mut current = mask.clone();
    let mut rounds = 0u32;
    loop {
        let eroded = erode(&current, Norm::L1, 1);
        let opened = dilate(&eroded, Norm::L1, 1);
        let mut opened_any = false;
        for ((sp, cp), op) in skeleton
            .pixels_mut()
            .zip(current.pixels())
            .zip(opened.pixels())
        {
            if op.0[0] != 0 {
                opened_any = true;
            } else if cp.0[0] != 0 {
                sp.0[0] = FOREGROUND;
            }
        }
        rounds += 1;
        if !opened_any {
            break;
        }
        // Erosion that removes nothing (a mask flush with every raster edge)
        // would otherwise loop forever.
        if geom::count_foreground(&eroded) == geom::count_foreground(&current) {
            for (sp, cp) in skeleton.pixels_mut().zip(current.pixels()) {
                if cp.0[0] != 0 {
                    sp.0[0] = FOREGROUND;
                }
            }
            break;
        }
        current = eroded;
    }
    tracing::debug!(rounds, "morphological skeleton converged");
    skeleton
}

/// Medial-axis skeleton from cardinal ray depths.
///
/// For each foreground pixel the distances to background along north, east,
/// south and west are sorted; the pixel survives only when the two smallest
/// agree, i.e. when it sits centered between its two nearest walls.
fn medial_axis_skeleton(mask: &GrayImage) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        let (xi, yi) = (x as i32, y as i32);
        if !geom::is_foreground(mask, xi, yi) {
            return Luma([0]);
        }
        let mut depths = CARDINALS.map(|d| geom::ray_distance(mask, xi, yi, d));
        depths.sort_unstable();
        if depths[0] == depths[1] {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}
