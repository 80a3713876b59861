//! Equivalent-ellipse fit for network boundaries.
//!
//! The boundary is summarized by the ellipse with the same second moments as
//! the point set. Only the axis lengths and orientation feed the trait
//! queries, so a moment fit is preferred over an algebraic conic solve: it
//! cannot produce hyperbolic solutions and degrades predictably on thin
//! point sets.

use imageproc::point::Point;
use nalgebra::{Matrix2, Vector2};

/// Minimum number of boundary points for a meaningful moment fit.
const MIN_POINTS: usize = 5;

/// Relative eigenvalue floor below which the point set is treated as
/// degenerate (collinear or single-point).
const DEGENERACY_RATIO: f64 = 1e-9;

/// Axis-aligned description of a fitted ellipse.
///
/// `width` and `height` are full axis lengths (major and minor, in that
/// order); `angle` is the major-axis orientation in radians, measured from
/// the +x axis in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Ellipse {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
}

impl Ellipse {
    /// Whether both axes are strictly positive and finite.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.height > 0.0
    }

    /// Major-to-minor axis ratio, or `None` for a degenerate ellipse.
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.is_valid().then(|| self.width / self.height)
    }
}

/// Fit the second-moment-equivalent ellipse to a boundary point set.
///
/// Returns `None` for fewer than five points or for a degenerate (collinear)
/// configuration. For a dense circular boundary of radius `r` the fitted
/// axes both approach `2r`.
pub fn fit_ellipse(points: &[Point<i32>]) -> Option<Ellipse> {
    if points.len() < MIN_POINTS {
        return None;
    }
    let n = points.len() as f64;
    let mut mean = Vector2::zeros();
    for p in points {
        mean += Vector2::new(p.x as f64, p.y as f64);
    }
    mean /= n;

    let mut cov = Matrix2::zeros();
    for p in points {
        let d = Vector2::new(p.x as f64 - mean.x, p.y as f64 - mean.y);
        cov += d * d.transpose();
    }
    cov /= n;

    let eigen = cov.symmetric_eigen();
    let (major_idx, minor_idx) = if eigen.eigenvalues[0] >= eigen.eigenvalues[1] {
        (0, 1)
    } else {
        (1, 0)
    };
    let major_var = eigen.eigenvalues[major_idx];
    let minor_var = eigen.eigenvalues[minor_idx];
    if major_var <= 0.0 || minor_var < major_var * DEGENERACY_RATIO {
        return None;
    }

    // A uniform ellipse boundary with semi-axis a has variance a^2 / 2 along
    // that axis, so the full axis is 2 * sqrt(2 * variance).
    let axis = |var: f64| 2.0 * (2.0 * var).sqrt();
    let dir = eigen.eigenvectors.column(major_idx).into_owned();
    Some(Ellipse {
        cx: mean.x,
        cy: mean.y,
        width: axis(major_var),
        height: axis(minor_var),
        angle: dir.y.atan2(dir.x),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn circle_points(cx: f64, cy: f64, r: f64, n: usize) -> Vec<Point<i32>> {
        (0..n)
            .map(|i| {
                let t = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                Point::new(
                    (cx + r * t.cos()).round() as i32,
                    (cy + r * t.sin()).round() as i32,
                )
            })
            .collect()
    }

    #[test]
    fn too_few_points_is_none() {
        let pts = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert!(fit_ellipse(&pts).is_none());
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let pts: Vec<Point<i32>> = (0..20).map(|x| Point::new(x, 7)).collect();
        assert!(fit_ellipse(&pts).is_none());
    }

    #[test]
    fn circle_axes_approach_the_diameter() {
        let r = 50.0;
        let ellipse = fit_ellipse(&circle_points(100.0, 100.0, r, 720)).expect("dense circle");
        assert!(ellipse.is_valid());
        assert_relative_eq!(ellipse.width, 2.0 * r, max_relative = 0.02);
        assert_relative_eq!(ellipse.height, 2.0 * r, max_relative = 0.02);
        assert_relative_eq!(ellipse.aspect_ratio().unwrap(), 1.0, max_relative = 0.02);
        assert_relative_eq!(ellipse.cx, 100.0, epsilon = 0.5);
        assert_relative_eq!(ellipse.cy, 100.0, epsilon = 0.5);
    }

    #[test]
    fn elongated_boundary_orients_along_x() {
        // Axis-aligned ellipse boundary, a = 60, b = 20.
        let pts: Vec<Point<i32>> = (0..720)
            .map(|i| {
                let t = 2.0 * std::f64::consts::PI * i as f64 / 720.0;
                Point::new(
                    (200.0 + 60.0 * t.cos()).round() as i32,
                    (200.0 + 20.0 * t.sin()).round() as i32,
                )
            })
            .collect();
        let ellipse = fit_ellipse(&pts).expect("dense boundary");
        assert!(ellipse.width > ellipse.height);
        assert_relative_eq!(ellipse.width, 120.0, max_relative = 0.03);
        assert_relative_eq!(ellipse.height, 40.0, max_relative = 0.03);
        // Major axis along x: angle close to 0 mod pi.
        let folded = ellipse.angle.abs().min((ellipse.angle.abs() - std::f64::consts::PI).abs());
        assert!(folded < 0.05, "angle = {}", ellipse.angle);
    }
}
