//! Simulated sensor: renders the target into noisy intensity frames
//!
//! Each timestep the generator rasterizes a Gaussian-spread blob at the
//! target's true position and then corrupts the whole grid with i.i.d.
//! Gaussian noise, clamped back to `[0, 1]`. A target outside the grid
//! simply produces an empty frame; the downstream detector then reports a
//! miss and the estimator coasts.

use nalgebra::Vector2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::SimulationConfig;
use crate::types::Frame;

/// Renders ground-truth positions into noisy sensor frames.
#[derive(Debug, Clone)]
pub struct FrameGenerator {
    width: usize,
    height: usize,
    spread_radius: f64,
    peak_scale: f64,
    noise: Normal<f64>,
}

impl FrameGenerator {
    /// Build a generator from a validated configuration.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            width: config.grid_width,
            height: config.grid_height,
            spread_radius: config.spread_radius,
            peak_scale: config.peak_scale,
            // Sigma is validated strictly positive at construction
            noise: Normal::new(0.0, config.frame_noise_sigma)
                .expect("frame noise sigma must be positive and finite"),
        }
    }

    /// Rasterize the target blob at `position` into a fresh frame.
    ///
    /// Every cell within the square spread window around the rounded
    /// position gets `exp(-0.5·(d/spread)²)·peak` where `d` is the
    /// Euclidean cell distance. If the rounded position falls outside the
    /// grid the frame stays all-zero for this timestep.
    pub fn render(&self, position: &Vector2<f64>) -> Frame {
        let mut frame = Frame::zeros(self.width, self.height);

        let x_idx = position.x.round() as i64;
        let y_idx = position.y.round() as i64;
        if !frame.contains(x_idx, y_idx) {
            return frame;
        }

        let window = self.spread_radius.ceil() as i64;
        for dy in -window..=window {
            for dx in -window..=window {
                let (nx, ny) = (x_idx + dx, y_idx + dy);
                if !frame.contains(nx, ny) {
                    continue;
                }
                let distance = ((dx * dx + dy * dy) as f64).sqrt();
                let intensity =
                    (-0.5 * (distance / self.spread_radius).powi(2)).exp() * self.peak_scale;
                frame.set(nx as usize, ny as usize, intensity);
            }
        }

        frame
    }

    /// Add i.i.d. Gaussian noise to every cell, clamping to `[0, 1]`.
    ///
    /// Reproducible under a seeded `rng`.
    pub fn add_noise<R: Rng>(&self, frame: &mut Frame, rng: &mut R) {
        for y in 0..self.height {
            for x in 0..self.width {
                let noisy = frame.get(x, y) + self.noise.sample(rng);
                frame.set(x, y, noisy.clamp(0.0, 1.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator() -> FrameGenerator {
        FrameGenerator::new(&SimulationConfig::default())
    }

    #[test]
    fn test_render_peak_at_target() {
        let frame = generator().render(&Vector2::new(75.0, 40.0));

        // Peak cell carries the full peak scale
        assert!((frame.get(75, 40) - 0.8).abs() < 1e-12);
        // Intensity decays away from the center
        assert!(frame.get(78, 40) < frame.get(76, 40));
        assert!(frame.get(76, 40) < frame.get(75, 40));
        // Far cells untouched
        assert_eq!(frame.get(0, 0), 0.0);
    }

    #[test]
    fn test_render_off_grid_is_all_zero() {
        let gen = generator();
        for position in [
            Vector2::new(-5.0, 40.0),
            Vector2::new(40.0, -5.0),
            Vector2::new(500.0, 40.0),
            Vector2::new(40.0, 150.2),
        ] {
            let frame = gen.render(&position);
            assert_eq!(frame.max_intensity(), 0.0, "position {:?}", position);
        }
    }

    #[test]
    fn test_render_clips_blob_at_edges() {
        // Center on the grid, window partially outside: must not panic
        let frame = generator().render(&Vector2::new(0.0, 0.0));
        assert!((frame.get(0, 0) - 0.8).abs() < 1e-12);
        assert!(frame.get(3, 0) > 0.0);
    }

    #[test]
    fn test_noise_is_seeded_and_clamped() {
        let gen = generator();

        let mut frame_a = gen.render(&Vector2::new(75.0, 75.0));
        let mut frame_b = frame_a.clone();

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        gen.add_noise(&mut frame_a, &mut rng_a);
        gen.add_noise(&mut frame_b, &mut rng_b);

        let mut saw_noise = false;
        for y in 0..frame_a.height() {
            for x in 0..frame_a.width() {
                let value = frame_a.get(x, y);
                assert_eq!(value, frame_b.get(x, y), "same seed, same frame");
                assert!((0.0..=1.0).contains(&value));
                if x < 30 && y < 30 && value > 0.0 {
                    saw_noise = true;
                }
            }
        }
        assert!(saw_noise, "noise should touch background cells");
    }
}
