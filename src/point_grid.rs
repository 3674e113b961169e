//! # Point Grid (`point_grid.rs`)
//!
//! Generates the dense, regular grid of colored points the viewer displays.
//!
//! Points are enumerated with X as the outermost loop and Z as the innermost, so the
//! point at linear index `i` of a `w x h x d` grid sits at
//!
//! ```text
//! x = i / (h * d)
//! y = (i / d) % h
//! z = i % d
//! ```
//!
//! Its position is shifted by half the grid size so the grid is centered on the origin,
//! and its color encodes the normalized grid coordinate: red grows along X, green along
//! Y and blue along Z.
//!
//! The default 256^3 grid holds about 16.7 million points, roughly 470 MB of vertex
//! data, which exceeds the maximum buffer size of many devices. [`PointGrid::chunks`]
//! splits the index space into ranges that each fit into one buffer, and
//! [`PointGrid::vertices`] generates a single range lazily so the whole grid is never
//! resident in host memory at once.

use std::ops::Range;

use crate::vertex::Vertex;
use crate::ViewerError;

/// Dimensions of the generated grid.
///
/// Every dimension is non-zero and the total point count fits into a `u32`, the widest
/// vertex count a single draw call can address. [`PointGrid::new`] enforces both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointGrid {
    width: u32,
    height: u32,
    depth: u32,
}

impl PointGrid {
    /// Creates a `width x height x depth` grid.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidConfig`] if a dimension is zero or the grid holds more
    /// than `u32::MAX` points.
    ///
    /// # Example
    ///
    /// ```
    /// use point_grid_viewer::PointGrid;
    ///
    /// let grid = PointGrid::new(4, 3, 2)?;
    /// assert_eq!(grid.point_count(), 24);
    /// assert!(PointGrid::new(0, 3, 2).is_err());
    /// # Ok::<(), point_grid_viewer::ViewerError>(())
    /// ```
    pub fn new(width: u32, height: u32, depth: u32) -> Result<Self, ViewerError> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(ViewerError::InvalidConfig(format!(
                "grid dimensions {width}x{height}x{depth} must be non-zero"
            )));
        }

        let point_count = u64::from(width) * u64::from(height) * u64::from(depth);
        if point_count > u64::from(u32::MAX) {
            return Err(ViewerError::InvalidConfig(format!(
                "grid of {point_count} points exceeds the {} points one draw can address",
                u32::MAX
            )));
        }

        Ok(Self {
            width,
            height,
            depth,
        })
    }

    /// Points along X.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Points along Y.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Points along Z.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Total number of points, `width * height * depth`.
    pub fn point_count(&self) -> u32 {
        // Cannot overflow, checked in `new`.
        self.width * self.height * self.depth
    }

    /// The vertex at linear index `index`, which should be below [`point_count`](Self::point_count).
    pub fn vertex(&self, index: u32) -> Vertex {
        let plane = self.height * self.depth;
        let x = index / plane;
        let y = (index / self.depth) % self.height;
        let z = index % self.depth;

        let (w, h, d) = (self.width as f32, self.height as f32, self.depth as f32);
        Vertex {
            position: [x as f32 - w / 2.0, y as f32 - h / 2.0, z as f32 - d / 2.0],
            color: [x as f32 / w, y as f32 / h, z as f32 / d, 1.0],
        }
    }

    /// Vertices for the points in `range`, in index order.
    pub fn vertices(&self, range: Range<u32>) -> impl ExactSizeIterator<Item = Vertex> + '_ {
        range.map(move |index| self.vertex(index))
    }

    /// Splits `0..point_count()` into consecutive ranges of at most `max_points` points.
    ///
    /// A `max_points` of zero is treated as one.
    pub fn chunks(&self, max_points: u32) -> impl Iterator<Item = Range<u32>> {
        let total = self.point_count();
        let step = max_points.max(1);
        (0..total.div_ceil(step)).map(move |chunk| {
            let start = chunk * step;
            start..start.saturating_add(step).min(total)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_count_multiplies_dimensions() {
        assert_eq!(PointGrid::new(4, 3, 2).unwrap().point_count(), 24);
        assert_eq!(
            PointGrid::new(256, 256, 256).unwrap().point_count(),
            16_777_216
        );
    }

    #[test]
    fn rejects_empty_and_oversized_grids() {
        assert!(matches!(
            PointGrid::new(4, 0, 4),
            Err(ViewerError::InvalidConfig(_))
        ));
        assert!(PointGrid::new(2048, 2048, 2048).is_err());
        assert!(PointGrid::new(u32::MAX, 2, 1).is_err());

        // 65536 * 65535 * 1 still fits into a u32.
        let grid = PointGrid::new(65_536, 65_535, 1).unwrap();
        assert_eq!(grid.point_count(), 65_536 * 65_535);
        let last = grid.vertex(grid.point_count() - 1);
        assert_eq!(last.position, [32_767.0, 32_766.5, -0.5]);
    }

    #[test]
    fn z_is_innermost_and_x_outermost() {
        let grid = PointGrid::new(4, 4, 4).unwrap();
        let first = grid.vertex(0);
        let second = grid.vertex(1);
        let next_row = grid.vertex(4);
        let next_plane = grid.vertex(16);

        assert_eq!(first.position, [-2.0, -2.0, -2.0]);
        assert_eq!(second.position, [-2.0, -2.0, -1.0]);
        assert_eq!(next_row.position, [-2.0, -1.0, -2.0]);
        assert_eq!(next_plane.position, [-1.0, -2.0, -2.0]);
    }

    #[test]
    fn colors_encode_normalized_coordinates() {
        let grid = PointGrid::new(4, 2, 8).unwrap();
        let last = grid.vertex(grid.point_count() - 1);
        assert_eq!(last.position, [1.0, 0.0, 3.0]);
        assert_eq!(last.color, [0.75, 0.5, 0.875, 1.0]);

        let origin = grid.vertex(0);
        assert_eq!(origin.color, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn grid_is_centered_on_origin() {
        let grid = PointGrid::new(6, 6, 6).unwrap();
        let mut sum = [0.0_f32; 3];
        for vertex in grid.vertices(0..grid.point_count()) {
            for (axis, value) in vertex.position.iter().enumerate() {
                sum[axis] += value;
            }
        }
        // Integer offsets from -w/2 to w/2 - 1 leave a bias of -0.5 per point.
        let count = grid.point_count() as f32;
        for axis_sum in sum {
            assert!((axis_sum / count + 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn chunks_cover_every_point_once() {
        let grid = PointGrid::new(5, 5, 5).unwrap();
        let chunks: Vec<_> = grid.chunks(40).collect();
        assert_eq!(chunks, vec![0..40, 40..80, 80..120, 120..125]);

        let exact: Vec<_> = grid.chunks(125).collect();
        assert_eq!(exact, vec![0..125]);

        let oversized: Vec<_> = grid.chunks(u32::MAX).collect();
        assert_eq!(oversized, vec![0..125]);
    }

    #[test]
    fn zero_chunk_size_still_progresses() {
        let grid = PointGrid::new(1, 1, 3).unwrap();
        assert_eq!(grid.chunks(0).count(), 3);
    }

    #[test]
    fn chunked_vertices_match_direct_lookup() {
        let grid = PointGrid::new(3, 4, 5).unwrap();
        let chunk = 17..34;
        let vertices: Vec<_> = grid.vertices(chunk.clone()).collect();
        assert_eq!(vertices.len(), 17);
        for (offset, vertex) in vertices.iter().enumerate() {
            assert_eq!(*vertex, grid.vertex(chunk.start + offset as u32));
        }
    }
}
