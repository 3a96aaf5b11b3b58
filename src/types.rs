//! Core data types shared between the sensor pipeline and the estimator
//!
//! [`Frame`] is the ephemeral sensor output: a fixed-size intensity grid,
//! created fresh each timestep, written by the frame generator and read-only
//! to the detector. [`TrackEstimate`] is the filter's user-facing output:
//! the position/velocity sub-vectors of the state mean, exposed read-only to
//! an external renderer.

use nalgebra::{DMatrix, Vector2, Vector4};
use serde::Serialize;

/// A single sensor frame: intensities in `[0, 1]` on a fixed-size 2-D grid.
///
/// Storage is row-major in `y` the way the sensor scans: `(x, y)` addresses
/// column `x` of row `y`. Frames are ephemeral, one per timestep.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    data: DMatrix<f64>,
}

impl Frame {
    /// Create an all-zero frame with the given dimensions.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            data: DMatrix::zeros(height, width),
        }
    }

    /// Grid width (extent of the `x` axis).
    #[inline]
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Grid height (extent of the `y` axis).
    #[inline]
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Intensity at cell `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[(y, x)]
    }

    /// Set intensity at cell `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        self.data[(y, x)] = value;
    }

    /// Whether the cell coordinates fall inside the grid.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
    }

    /// Largest intensity in the frame.
    pub fn max_intensity(&self) -> f64 {
        self.data.max()
    }

    /// Borrow the raw grid (rows are `y`, columns are `x`).
    ///
    /// Intended for renderers that want to blit the whole frame.
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }
}

/// Filter output exposed to the renderer: estimated position and velocity.
///
/// Extracted from the state mean `[x, vx, y, vy]`; never mutated outside
/// the estimator.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrackEstimate {
    /// Estimated position (x, y)
    pub position: Vector2<f64>,
    /// Estimated velocity (vx, vy)
    pub velocity: Vector2<f64>,
}

impl TrackEstimate {
    /// Split a state mean `[x, vx, y, vy]` into position and velocity parts.
    pub fn from_mean(mean: &Vector4<f64>) -> Self {
        Self {
            position: Vector2::new(mean[0], mean[2]),
            velocity: Vector2::new(mean[1], mean[3]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_indexing() {
        let mut frame = Frame::zeros(10, 5);
        assert_eq!(frame.width(), 10);
        assert_eq!(frame.height(), 5);

        frame.set(9, 4, 0.5);
        assert_eq!(frame.get(9, 4), 0.5);
        assert_eq!(frame.max_intensity(), 0.5);
    }

    #[test]
    fn test_frame_contains() {
        let frame = Frame::zeros(10, 5);
        assert!(frame.contains(0, 0));
        assert!(frame.contains(9, 4));
        assert!(!frame.contains(10, 4));
        assert!(!frame.contains(9, 5));
        assert!(!frame.contains(-1, 0));
    }

    #[test]
    fn test_estimate_from_mean() {
        let mean = Vector4::new(1.0, 2.0, 3.0, 4.0);
        let estimate = TrackEstimate::from_mean(&mean);
        assert_eq!(estimate.position, Vector2::new(1.0, 3.0));
        assert_eq!(estimate.velocity, Vector2::new(2.0, 4.0));
    }
}
