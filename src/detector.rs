//! Blob detection over noisy frames
//!
//! Maps a frame to at most one candidate target position. The contract is
//! intentionally lossy: the detector may miss the target for arbitrarily
//! many consecutive frames and may occasionally report a noise cluster
//! instead. The estimator downstream must tolerate both, so any peak-finder
//! honoring [`Detector`] is substitutable here.

use nalgebra::Vector2;
use smallvec::SmallVec;

use crate::config::DetectorConfig;
use crate::types::Frame;

/// Sensor front end: extract zero-or-one candidate position from a frame.
pub trait Detector {
    /// Detect the target in `frame`, or report a miss with `None`.
    fn detect(&self, frame: &Frame) -> Option<Vector2<f64>>;
}

/// Connected-component candidate region.
#[derive(Debug, Clone, Copy)]
struct Blob {
    area: usize,
    sum_x: f64,
    sum_y: f64,
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
}

impl Blob {
    fn centroid(&self) -> Vector2<f64> {
        Vector2::new(self.sum_x / self.area as f64, self.sum_y / self.area as f64)
    }

    /// Fill ratio of the bounding box, a crude circularity proxy.
    ///
    /// A disc fills about π/4 ≈ 0.79 of its box; thin noise streaks and
    /// single-cell speckle score much lower.
    fn extent(&self) -> f64 {
        let box_area = (self.max_x - self.min_x + 1) * (self.max_y - self.min_y + 1);
        self.area as f64 / box_area as f64
    }
}

/// Threshold-and-label blob detector.
///
/// Thresholds the frame, labels 4-connected components with an explicit
/// flood-fill stack, filters candidates by area window and extent, and
/// returns the centroid of the largest surviving blob (scan-order wins
/// ties). Work is proportional to the number of grid cells.
#[derive(Debug, Clone)]
pub struct BlobDetector {
    config: DetectorConfig,
}

impl BlobDetector {
    /// Build a detector from its tuning parameters.
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    fn label_blob(
        &self,
        frame: &Frame,
        visited: &mut [bool],
        stack: &mut Vec<(usize, usize)>,
        seed: (usize, usize),
    ) -> Blob {
        let width = frame.width();
        let mut blob = Blob {
            area: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            min_x: seed.0,
            max_x: seed.0,
            min_y: seed.1,
            max_y: seed.1,
        };

        stack.clear();
        stack.push(seed);
        visited[seed.1 * width + seed.0] = true;

        while let Some((x, y)) = stack.pop() {
            blob.area += 1;
            blob.sum_x += x as f64;
            blob.sum_y += y as f64;
            blob.min_x = blob.min_x.min(x);
            blob.max_x = blob.max_x.max(x);
            blob.min_y = blob.min_y.min(y);
            blob.max_y = blob.max_y.max(y);

            let mut visit = |nx: i64, ny: i64| {
                if frame.contains(nx, ny) {
                    let (nx, ny) = (nx as usize, ny as usize);
                    let idx = ny * width + nx;
                    if !visited[idx] && frame.get(nx, ny) > self.config.threshold {
                        visited[idx] = true;
                        stack.push((nx, ny));
                    }
                }
            };
            visit(x as i64 - 1, y as i64);
            visit(x as i64 + 1, y as i64);
            visit(x as i64, y as i64 - 1);
            visit(x as i64, y as i64 + 1);
        }

        blob
    }
}

impl Detector for BlobDetector {
    fn detect(&self, frame: &Frame) -> Option<Vector2<f64>> {
        let (width, height) = (frame.width(), frame.height());
        let mut visited = vec![false; width * height];
        let mut stack = Vec::new();

        // Typical frames hold zero to a handful of candidate regions
        let mut candidates: SmallVec<[Blob; 4]> = SmallVec::new();

        for y in 0..height {
            for x in 0..width {
                if visited[y * width + x] || frame.get(x, y) <= self.config.threshold {
                    continue;
                }
                let blob = self.label_blob(frame, &mut visited, &mut stack, (x, y));
                if blob.area >= self.config.min_area
                    && blob.area <= self.config.max_area
                    && blob.extent() >= self.config.min_extent
                {
                    candidates.push(blob);
                }
            }
        }

        // Largest area wins; strict comparison keeps the first candidate in
        // scan order on ties
        let best = candidates
            .iter()
            .fold(None::<&Blob>, |best, blob| match best {
                Some(b) if b.area >= blob.area => Some(b),
                _ => Some(blob),
            })?;

        log::trace!(
            "blob detected: area={} extent={:.2} centroid=({:.1}, {:.1})",
            best.area,
            best.extent(),
            best.centroid().x,
            best.centroid().y
        );
        Some(best.centroid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::sensor::FrameGenerator;

    fn detector() -> BlobDetector {
        BlobDetector::new(DetectorConfig::default())
    }

    fn stamp_square(frame: &mut Frame, x0: usize, y0: usize, side: usize, value: f64) {
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                frame.set(x, y, value);
            }
        }
    }

    #[test]
    fn test_detects_rendered_blob_centroid() {
        let generator = FrameGenerator::new(&SimulationConfig::default());
        let frame = generator.render(&Vector2::new(60.0, 90.0));

        let detection = detector().detect(&frame).expect("clean blob must be found");
        assert!((detection.x - 60.0).abs() < 1.0);
        assert!((detection.y - 90.0).abs() < 1.0);
    }

    #[test]
    fn test_empty_frame_is_a_miss() {
        let frame = Frame::zeros(150, 150);
        assert!(detector().detect(&frame).is_none());
    }

    #[test]
    fn test_single_cell_speckle_rejected_by_area() {
        let mut frame = Frame::zeros(50, 50);
        frame.set(10, 10, 0.9);
        // min_area = 2 rejects isolated cells
        assert!(detector().detect(&frame).is_none());
    }

    #[test]
    fn test_oversized_region_rejected() {
        let mut frame = Frame::zeros(50, 50);
        stamp_square(&mut frame, 5, 5, 20, 0.9); // 400 cells > max_area
        assert!(detector().detect(&frame).is_none());
    }

    #[test]
    fn test_largest_area_wins() {
        let mut frame = Frame::zeros(60, 60);
        stamp_square(&mut frame, 5, 5, 3, 0.9); // 9 cells
        stamp_square(&mut frame, 40, 40, 5, 0.9); // 25 cells
        let detection = detector().detect(&frame).unwrap();
        assert!((detection.x - 42.0).abs() < 1e-9);
        assert!((detection.y - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_tie_break_prefers_scan_order() {
        let mut frame = Frame::zeros(60, 60);
        // Equal areas; the one at lower y is reached first in scan order
        stamp_square(&mut frame, 30, 2, 4, 0.9);
        stamp_square(&mut frame, 10, 40, 4, 0.9);
        let detection = detector().detect(&frame).unwrap();
        assert!((detection.y - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_thin_streak_rejected_by_extent() {
        let mut frame = Frame::zeros(60, 60);
        // L-shaped streak: 12 cells in a 7x6 bounding box, extent 0.29
        for i in 0..7 {
            frame.set(20 + i, 20, 0.9);
        }
        for i in 1..6 {
            frame.set(20, 20 + i, 0.9);
        }
        let blob_extent = 12.0 / (7.0 * 6.0);
        assert!(blob_extent < DetectorConfig::default().min_extent);
        assert!(detector().detect(&frame).is_none());
    }
}
