//! Largest-component isolation.
//!
//! A thresholded scan usually carries debris: specks of soil, scanner dust,
//! fragments of other plants. The network of interest is taken to be the
//! connected component with the largest boundary area; everything else is
//! cleared and kept aside in a diagnostic mask.

use image::{GrayImage, Luma};
use imageproc::contours::find_contours;
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use crate::error::AnalysisError;
use crate::geom::{self, FOREGROUND};

/// Width of the temporary background frame added around the mask before
/// tracing. Components touching the raster edge are otherwise not guaranteed
/// a closed boundary polygon.
const PAD: u32 = 1;

/// Result of isolating the largest foreground component.
///
/// All three rasters share the input dimensions. Owned per call site; there
/// is no cross-instance cache.
#[derive(Debug, Clone)]
pub struct IsolatedNetwork {
    /// Refined mask holding exactly one connected foreground component.
    pub mask: GrayImage,
    /// Closed full-resolution boundary of that component, in input
    /// coordinates.
    pub contour: Vec<Point<i32>>,
    /// Diagnostic mask of the pixels that were discarded: foreground in the
    /// input but not in the refined mask.
    pub removed: GrayImage,
}

/// Isolate the largest connected component of `mask`.
///
/// Pads with a one-pixel background frame, traces all boundaries with their
/// hole hierarchy at full resolution, keeps the boundary with the largest
/// enclosed (shoelace) area, redraws it filled on a cleared canvas, and
/// strips the frame again. Ties go to the first boundary in scan order.
///
/// Returns [`AnalysisError::EmptyNetwork`] when the mask has no foreground
/// at all, rather than selecting from an empty boundary list.
pub fn isolate(mask: &GrayImage) -> Result<IsolatedNetwork, AnalysisError> {
    let padded = geom::pad(mask, PAD);
    let contours = find_contours::<i32>(&padded);
    if contours.is_empty() {
        return Err(AnalysisError::EmptyNetwork);
    }

    let mut winner = 0usize;
    let mut winner_area = 0.0f64;
    for (i, c) in contours.iter().enumerate() {
        let area = geom::polygon_area(&c.points);
        if area > winner_area {
            winner_area = area;
            winner = i;
        }
    }

    let boundary = &contours[winner].points;
    if boundary.is_empty() {
        return Err(AnalysisError::EmptyContour);
    }
    tracing::debug!(
        n_contours = contours.len(),
        winner_area,
        n_points = boundary.len(),
        "isolated largest component"
    );

    // Fill only the winning boundary. Interior holes are filled along with
    // it, matching the boundary-redraw refinement this stage models.
    let mut canvas = GrayImage::new(padded.width(), padded.height());
    let polygon = open_polygon(boundary);
    if polygon.len() == 1 {
        canvas.put_pixel(polygon[0].x as u32, polygon[0].y as u32, Luma([FOREGROUND]));
    } else {
        draw_polygon_mut(&mut canvas, polygon, Luma([FOREGROUND]));
    }

    let refined = geom::unpad(&canvas, PAD);
    let contour = boundary
        .iter()
        .map(|p| Point::new(p.x - PAD as i32, p.y - PAD as i32))
        .collect();

    let mut removed = mask.clone();
    for (rp, fp) in removed.pixels_mut().zip(refined.pixels()) {
        if fp.0[0] != 0 {
            rp.0[0] = 0;
        }
    }

    Ok(IsolatedNetwork {
        mask: refined,
        contour,
        removed,
    })
}

/// Drop a repeated closing point; the polygon filler requires first != last.
fn open_polygon(points: &[Point<i32>]) -> &[Point<i32>] {
    match points {
        [first, .., last] if first == last => &points[..points.len() - 1],
        _ => points,
    }
}
