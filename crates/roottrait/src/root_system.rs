//! Pipeline orchestration and trait queries.
//!
//! A [`RootSystem`] runs threshold -> isolate -> skeletonize exactly once at
//! construction and owns the three resulting rasters immutably. Derived
//! geometry that several traits share (bounding box, fitted ellipse, convex
//! hull area, per-row crossing counts) is computed once alongside them, so
//! every trait query is a cheap pure read. Instances share nothing;
//! analyzing images in parallel is a matter of constructing one per image.

use image::GrayImage;
use imageproc::drawing::draw_polygon_mut;
use imageproc::geometry::convex_hull;
use imageproc::point::Point;

use crate::ellipse::{self, Ellipse};
use crate::error::AnalysisError;
use crate::geom::{self, FOREGROUND};
use crate::isolate;
use crate::skeleton::{self, SkeletonMethod};
use crate::threshold::{self, ThresholdConfig};

/// Sentinel returned by ratio traits whose denominator is degenerate.
const UNDEFINED: f64 = -1.0;

/// Start of the "lower two thirds" depth band, as a fraction of network
/// depth.
const LOWER_BAND_START: f64 = 0.33;

/// Percentile treated as the maximum root count (one standard deviation).
const MAX_ROOTS_PERCENTILE: f64 = 0.84;

/// Full pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub threshold: ThresholdConfig,
    pub skeleton: SkeletonMethod,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdConfig::default(),
            skeleton: SkeletonMethod::Morphological,
        }
    }
}

/// Contour bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy)]
struct BoundingBox {
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

/// One analyzed root-system image.
#[derive(Debug, Clone)]
pub struct RootSystem {
    mask: GrayImage,
    contour: Vec<Point<i32>>,
    skeleton: GrayImage,
    removed: GrayImage,
    // Derived geometry shared by several traits, fixed at construction.
    bbox: Option<BoundingBox>,
    fitted: Option<Ellipse>,
    convex_area: f64,
    network_area: u64,
    row_counts: Vec<u32>,
}

impl RootSystem {
    /// Analyze a grayscale scan.
    ///
    /// Fails only when no foreground component survives thresholding;
    /// degenerate geometry afterwards is reported through trait sentinels,
    /// never as an error.
    pub fn from_image(image: &GrayImage, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let mask = threshold::threshold(image, &config.threshold);
        let isolated = isolate::isolate(&mask)?;
        let skeleton = skeleton::skeletonize(&isolated.mask, config.skeleton);

        let network_area = geom::count_foreground(&isolated.mask);
        let bbox = bounding_box(&isolated.contour);
        let fitted = ellipse::fit_ellipse(&isolated.contour);
        let convex_area = convex_hull_area(&isolated.mask, &isolated.contour, network_area);
        let row_counts = row_crossing_counts(&isolated.mask);
        tracing::info!(
            network_area,
            convex_area,
            n_rows = row_counts.len(),
            "root system constructed"
        );

        Ok(Self {
            mask: isolated.mask,
            contour: isolated.contour,
            skeleton,
            removed: isolated.removed,
            bbox,
            fitted,
            convex_area,
            network_area,
            row_counts,
        })
    }

    // ── stored state ──────────────────────────────────────────────────────

    /// Refined binary mask: exactly one foreground component.
    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    /// Full-resolution boundary of the network.
    pub fn contour(&self) -> &[Point<i32>] {
        &self.contour
    }

    /// Skeleton raster, a foreground subset of [`Self::mask`].
    pub fn skeleton(&self) -> &GrayImage {
        &self.skeleton
    }

    /// Diagnostic raster of discarded debris components.
    pub fn removed_pixels(&self) -> &GrayImage {
        &self.removed
    }

    // ── area and boundary traits ──────────────────────────────────────────

    /// Number of network pixels. Unit: pixels.
    pub fn network_area(&self) -> f64 {
        self.network_area as f64
    }

    /// Number of network pixels with at least one background 8-neighbor.
    /// Unit: pixels.
    pub fn perimeter(&self) -> f64 {
        let mut count = 0u64;
        for (x, y, p) in self.mask.enumerate_pixels() {
            if p.0[0] == 0 {
                continue;
            }
            let boundary = geom::neighbors8(&self.mask, x as i32, y as i32)
                .any(|(nx, ny)| !geom::is_foreground(&self.mask, nx, ny));
            if boundary {
                count += 1;
            }
        }
        count as f64
    }

    /// Pixel area of the convex hull of the network boundary. Unit: pixels.
    pub fn convex_area(&self) -> f64 {
        self.convex_area
    }

    /// Ratio of network area to convex hull area.
    pub fn network_solidity(&self) -> f64 {
        if self.convex_area == 0.0 {
            return UNDEFINED;
        }
        self.network_area() / self.convex_area
    }

    // ── extent traits ─────────────────────────────────────────────────────

    /// Vertical extent of the boundary. Unit: pixels.
    pub fn network_depth(&self) -> f64 {
        match self.bbox {
            Some(b) => (b.max_y - b.min_y) as f64,
            None => UNDEFINED,
        }
    }

    /// Horizontal extent of the boundary. Unit: pixels.
    pub fn network_width(&self) -> f64 {
        match self.bbox {
            Some(b) => (b.max_x - b.min_x) as f64,
            None => UNDEFINED,
        }
    }

    /// Network width over network depth.
    pub fn network_width_to_depth_ratio(&self) -> f64 {
        let depth = self.network_depth();
        if depth <= 0.0 {
            return UNDEFINED;
        }
        self.network_width() / depth
    }

    // ── ellipse traits ────────────────────────────────────────────────────

    /// Rounded major axis of the best-fit ellipse, or -1 when the boundary
    /// is too degenerate to fit. Unit: pixels.
    pub fn major_axis(&self) -> f64 {
        match self.fitted {
            Some(e) => e.width.max(e.height).round(),
            None => UNDEFINED,
        }
    }

    /// Rounded minor axis of the best-fit ellipse, or -1 when the boundary
    /// is too degenerate to fit. Unit: pixels.
    pub fn minor_axis(&self) -> f64 {
        match self.fitted {
            Some(e) => e.width.min(e.height).round(),
            None => UNDEFINED,
        }
    }

    /// Minor over major axis.
    pub fn aspect_ratio(&self) -> f64 {
        let major = self.major_axis();
        if major <= 0.0 {
            return UNDEFINED;
        }
        self.minor_axis() / major
    }

    // ── row-sweep traits ──────────────────────────────────────────────────

    /// Median of the per-row root-crossing counts.
    pub fn median_number_of_roots(&self) -> f64 {
        median(&self.row_counts)
    }

    /// 84th-percentile of the sorted per-row root-crossing counts, taken as
    /// the effective maximum.
    pub fn maximum_number_of_roots(&self) -> f64 {
        if self.row_counts.is_empty() {
            return 0.0;
        }
        let mut sorted = self.row_counts.clone();
        sorted.sort_unstable();
        let index = (MAX_ROOTS_PERCENTILE * sorted.len() as f64).round() as usize;
        sorted[index.min(sorted.len() - 1)] as f64
    }

    /// Maximum over median number of roots.
    pub fn bushiness(&self) -> f64 {
        let median = self.median_number_of_roots();
        if median == 0.0 {
            return UNDEFINED;
        }
        self.maximum_number_of_roots() / median
    }

    /// Fraction of network pixels lying in the lower two thirds of the
    /// network depth band.
    ///
    /// Depth is used as an absolute row index, which is only meaningful when
    /// the network starts at the top of the image; the same assumption the
    /// row sweep makes.
    pub fn network_length_distribution(&self) -> f64 {
        if self.network_area == 0 {
            return UNDEFINED;
        }
        let depth = self.network_depth();
        if depth < 0.0 {
            return UNDEFINED;
        }
        let start = (LOWER_BAND_START * depth).round() as u32;
        let end = (depth as u32).min(self.mask.height().saturating_sub(1));
        let mut lower = 0u64;
        for y in start..=end {
            for x in 0..self.mask.width() {
                if self.mask.get_pixel(x, y).0[0] != 0 {
                    lower += 1;
                }
            }
        }
        lower as f64 / self.network_area()
    }

    // ── skeleton traits ───────────────────────────────────────────────────

    /// Number of skeleton pixels. Unit: pixels.
    pub fn network_length(&self) -> f64 {
        geom::count_foreground(&self.skeleton) as f64
    }

    // Tubular-radius traits await a per-pixel width estimation model; they
    // report zero until one exists.

    /// Mean estimated root diameter along the skeleton. Unit: pixels.
    pub fn average_root_width(&self) -> f64 {
        0.0
    }

    /// Network length per unit volume. Unit: 1/pixels^2.
    pub fn specific_root_length(&self) -> f64 {
        0.0
    }

    /// Tubular surface area summed along the skeleton. Unit: pixels.
    pub fn network_surface_area(&self) -> f64 {
        0.0
    }

    /// Tubular volume summed along the skeleton. Unit: pixels.
    pub fn network_volume(&self) -> f64 {
        0.0
    }

    /// Snapshot of every trait for reporting or serialization.
    pub fn report(&self) -> TraitReport {
        TraitReport {
            network_area: self.network_area(),
            perimeter: self.perimeter(),
            convex_area: self.convex_area(),
            network_depth: self.network_depth(),
            network_width: self.network_width(),
            major_axis: self.major_axis(),
            minor_axis: self.minor_axis(),
            aspect_ratio: self.aspect_ratio(),
            network_solidity: self.network_solidity(),
            network_width_to_depth_ratio: self.network_width_to_depth_ratio(),
            median_number_of_roots: self.median_number_of_roots(),
            maximum_number_of_roots: self.maximum_number_of_roots(),
            bushiness: self.bushiness(),
            network_length_distribution: self.network_length_distribution(),
            network_length: self.network_length(),
            average_root_width: self.average_root_width(),
            specific_root_length: self.specific_root_length(),
            network_surface_area: self.network_surface_area(),
            network_volume: self.network_volume(),
        }
    }
}

/// All scalar traits of one analyzed image.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TraitReport {
    pub network_area: f64,
    pub perimeter: f64,
    pub convex_area: f64,
    pub network_depth: f64,
    pub network_width: f64,
    pub major_axis: f64,
    pub minor_axis: f64,
    pub aspect_ratio: f64,
    pub network_solidity: f64,
    pub network_width_to_depth_ratio: f64,
    pub median_number_of_roots: f64,
    pub maximum_number_of_roots: f64,
    pub bushiness: f64,
    pub network_length_distribution: f64,
    pub network_length: f64,
    pub average_root_width: f64,
    pub specific_root_length: f64,
    pub network_surface_area: f64,
    pub network_volume: f64,
}

impl TraitReport {
    /// Human-readable label, value and unit for every trait, in report
    /// order. The unit string is empty for dimensionless ratios.
    pub fn entries(&self) -> Vec<(&'static str, f64, &'static str)> {
        vec![
            ("Network area", self.network_area, "pixels"),
            ("Perimeter", self.perimeter, "pixels"),
            ("Convex area", self.convex_area, "pixels"),
            ("Network depth", self.network_depth, "pixels"),
            ("Network width", self.network_width, "pixels"),
            ("Major axis", self.major_axis, "pixels"),
            ("Minor axis", self.minor_axis, "pixels"),
            ("Aspect ratio", self.aspect_ratio, ""),
            ("Network solidity", self.network_solidity, ""),
            (
                "Network width to depth ratio",
                self.network_width_to_depth_ratio,
                "",
            ),
            ("Median number of roots", self.median_number_of_roots, ""),
            ("Maximum number of roots", self.maximum_number_of_roots, ""),
            ("Bushiness", self.bushiness, ""),
            (
                "Network length distribution",
                self.network_length_distribution,
                "",
            ),
            ("Network length", self.network_length, "pixels"),
            ("Average root width", self.average_root_width, "pixels"),
            ("Specific root length", self.specific_root_length, ""),
            ("Network surface area", self.network_surface_area, "pixels"),
            ("Network volume", self.network_volume, "pixels"),
        ]
    }
}

// ── derived-geometry helpers ──────────────────────────────────────────────

fn bounding_box(contour: &[Point<i32>]) -> Option<BoundingBox> {
    let first = contour.first()?;
    let mut b = BoundingBox {
        min_x: first.x,
        max_x: first.x,
        min_y: first.y,
        max_y: first.y,
    };
    for p in contour {
        b.min_x = b.min_x.min(p.x);
        b.max_x = b.max_x.max(p.x);
        b.min_y = b.min_y.min(p.y);
        b.max_y = b.max_y.max(p.y);
    }
    Some(b)
}

/// Pixel area of the boundary's convex hull.
///
/// The hull is rasterized and counted on a canvas of the mask's dimensions
/// instead of evaluated with the shoelace formula: a filled w x h region has
/// w*h pixels but its pixel-center outline only encloses (w-1)*(h-1), and
/// mixing the two conventions would let solidity exceed one. A hull too thin
/// to enclose a polygon degenerates to the network pixels themselves.
fn convex_hull_area(mask: &GrayImage, contour: &[Point<i32>], network_area: u64) -> f64 {
    if contour.is_empty() {
        return 0.0;
    }
    let hull = convex_hull(contour);
    if hull.len() < 3 {
        return network_area as f64;
    }
    let mut canvas = GrayImage::new(mask.width(), mask.height());
    draw_polygon_mut(&mut canvas, open_polygon(&hull), image::Luma([FOREGROUND]));
    geom::count_foreground(&canvas) as f64
}

fn open_polygon(points: &[Point<i32>]) -> &[Point<i32>] {
    match points {
        [first, .., last] if first == last => &points[..points.len() - 1],
        _ => points,
    }
}

/// Per-row root-crossing counts with zero rows stripped.
///
/// A crossing is a foreground pixel whose left neighbor is background (the
/// leftmost column counts as following background). Scanning stops at the
/// first row without crossings, assuming the network is contiguous from the
/// top of the image; images whose network starts further down will
/// under-report.
fn row_crossing_counts(mask: &GrayImage) -> Vec<u32> {
    let mut counts = Vec::new();
    for y in 0..mask.height() {
        let mut crossings = 0u32;
        let mut previous_fg = false;
        for x in 0..mask.width() {
            let fg = mask.get_pixel(x, y).0[0] != 0;
            if fg && !previous_fg {
                crossings += 1;
            }
            previous_fg = fg;
        }
        if crossings == 0 {
            break;
        }
        counts.push(crossings);
    }
    counts
}

/// Median of a count list; the empty list has median zero.
fn median(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    }
}
