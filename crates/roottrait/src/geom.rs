//! Raster geometry primitives shared by the isolation and skeleton stages.
//!
//! Masks are `GrayImage`s where any nonzero pixel is foreground. Helpers here
//! are deliberately coordinate-signed (`i32`) so that neighbor and ray walks
//! can step off the raster without wrapping.

use image::{GenericImage, GrayImage};
use imageproc::point::Point;

/// Pixel value written for foreground in every mask produced by this crate.
pub const FOREGROUND: u8 = 255;

/// One of the eight compass directions.
///
/// The discriminant indexes [`OFFSETS`]; keep the two tables in the same
/// order when extending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

/// Unit (dx, dy) offset per direction, indexed by discriminant.
/// Image y grows downward, so north is negative dy.
const OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// All eight directions in clockwise order starting north.
pub const DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::NorthEast,
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
];

/// The four cardinal directions used by the medial-axis heuristic.
pub const CARDINALS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

impl Direction {
    /// Unit pixel offset for this direction.
    pub const fn offset(self) -> (i32, i32) {
        OFFSETS[self as usize]
    }
}

/// Whether (x, y) lies inside the raster.
pub fn in_bounds(mask: &GrayImage, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < mask.width() && (y as u32) < mask.height()
}

/// Whether (x, y) is an in-bounds foreground pixel.
/// Coordinates off the raster count as background.
pub fn is_foreground(mask: &GrayImage, x: i32, y: i32) -> bool {
    in_bounds(mask, x, y) && mask.get_pixel(x as u32, y as u32).0[0] != 0
}

/// In-bounds 8-neighbors of (x, y), in [`DIRECTIONS`] order.
pub fn neighbors8(mask: &GrayImage, x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
    DIRECTIONS.iter().filter_map(move |d| {
        let (dx, dy) = d.offset();
        let (nx, ny) = (x + dx, y + dy);
        in_bounds(mask, nx, ny).then_some((nx, ny))
    })
}

/// Number of steps from (x, y) along `dir` to the first background pixel.
///
/// Walking off the raster terminates the ray at that step count, so a
/// foreground pixel on the image edge has distance 1 toward the edge.
pub fn ray_distance(mask: &GrayImage, x: i32, y: i32, dir: Direction) -> u32 {
    let (dx, dy) = dir.offset();
    let mut steps = 1u32;
    loop {
        let (nx, ny) = (x + dx * steps as i32, y + dy * steps as i32);
        if !is_foreground(mask, nx, ny) {
            return steps;
        }
        steps += 1;
    }
}

/// Surround `mask` with a constant background border of `border` pixels.
///
/// The boundary tracer does not reliably close polygons for components
/// touching the raster edge; padding guarantees full enclosure.
pub fn pad(mask: &GrayImage, border: u32) -> GrayImage {
    let mut padded = GrayImage::new(mask.width() + 2 * border, mask.height() + 2 * border);
    padded
        .copy_from(mask, border, border)
        .expect("padded canvas encloses the source raster");
    padded
}

/// Strip a `border`-pixel frame previously added by [`pad`].
pub fn unpad(mask: &GrayImage, border: u32) -> GrayImage {
    debug_assert!(mask.width() >= 2 * border && mask.height() >= 2 * border);
    image::imageops::crop_imm(
        mask,
        border,
        border,
        mask.width() - 2 * border,
        mask.height() - 2 * border,
    )
    .to_image()
}

/// Signed shoelace area of a closed polygon, returned as an absolute value.
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (twice_area.abs() as f64) / 2.0
}

/// Count of foreground pixels in a mask.
pub fn count_foreground(mask: &GrayImage) -> u64 {
    mask.as_raw().iter().filter(|&&v| v != 0).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&[u8]]) -> GrayImage {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        let data: Vec<u8> = rows
            .iter()
            .flat_map(|r| r.iter().map(|&v| if v != 0 { FOREGROUND } else { 0 }))
            .collect();
        GrayImage::from_raw(w, h, data).expect("row data matches dimensions")
    }

    #[test]
    fn direction_table_is_exhaustive_and_unit() {
        assert_eq!(DIRECTIONS.len(), 8);
        for d in DIRECTIONS {
            let (dx, dy) = d.offset();
            assert!(dx.abs() <= 1 && dy.abs() <= 1);
            assert!((dx, dy) != (0, 0));
        }
        // Opposite directions cancel.
        let (nx, ny) = Direction::North.offset();
        let (sx, sy) = Direction::South.offset();
        assert_eq!((nx + sx, ny + sy), (0, 0));
    }

    #[test]
    fn neighbors8_clips_at_corners() {
        let m = mask_from(&[&[1, 1], &[1, 1]]);
        assert_eq!(neighbors8(&m, 0, 0).count(), 3);
        assert_eq!(neighbors8(&m, 1, 1).count(), 3);
    }

    #[test]
    fn ray_distance_stops_at_background_and_border() {
        let m = mask_from(&[
            &[0, 0, 0, 0, 0],
            &[0, 1, 1, 1, 0],
            &[0, 1, 1, 1, 0],
            &[0, 0, 0, 0, 0],
        ]);
        // (2, 1): one step north reaches background.
        assert_eq!(ray_distance(&m, 2, 1, Direction::North), 1);
        // (1, 1): two steps east before (3,1) is still fg, third is bg at x=4.
        assert_eq!(ray_distance(&m, 1, 1, Direction::East), 3);

        // Foreground touching the edge: the ray terminates where it exits.
        let edge = mask_from(&[&[1, 1, 1]]);
        assert_eq!(ray_distance(&edge, 0, 0, Direction::North), 1);
        assert_eq!(ray_distance(&edge, 0, 0, Direction::West), 1);
        assert_eq!(ray_distance(&edge, 0, 0, Direction::East), 3);
    }

    #[test]
    fn pad_unpad_round_trip() {
        let m = mask_from(&[&[1, 0], &[0, 1]]);
        let padded = pad(&m, 1);
        assert_eq!(padded.dimensions(), (4, 4));
        // Border is background.
        assert_eq!(padded.get_pixel(0, 0).0[0], 0);
        assert_eq!(padded.get_pixel(1, 1).0[0], FOREGROUND);
        assert_eq!(unpad(&padded, 1), m);
    }

    #[test]
    fn shoelace_of_unit_square_and_degenerate() {
        let square = [
            Point::new(0, 0),
            Point::new(4, 0),
            Point::new(4, 3),
            Point::new(0, 3),
        ];
        assert_eq!(polygon_area(&square), 12.0);
        assert_eq!(polygon_area(&square[..2]), 0.0);
    }

    #[test]
    fn count_foreground_counts_nonzero() {
        let m = mask_from(&[&[1, 0, 1], &[0, 1, 0]]);
        assert_eq!(count_foreground(&m), 3);
    }
}
