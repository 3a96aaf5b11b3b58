//! Observability for simulation stepping
//!
//! This module provides the [`StepReporter`] trait, the seam where an
//! external renderer plugs in. Reporters receive per-timestep callbacks
//! (noisy frame, optional detection, track estimate) and have no feedback
//! path into the estimator; rendering cadence is fully decoupled from
//! simulation stepping.
//!
//! The default [`NoOpReporter`] compiles to nothing. [`LogReporter`] emits
//! the same events through the `log` facade for headless runs.

use nalgebra::Vector2;

use crate::types::{Frame, TrackEstimate};

/// Per-timestep callbacks for renderers and instrumentation.
///
/// All methods have default empty implementations; override the events you
/// care about.
///
/// # Example
///
/// ```
/// use singletrack::reporter::StepReporter;
/// use singletrack::types::TrackEstimate;
///
/// #[derive(Default)]
/// struct MissCounter {
///     misses: usize,
/// }
///
/// impl StepReporter for MissCounter {
///     fn on_detection(&mut self, _timestep: usize, detection: Option<&nalgebra::Vector2<f64>>) {
///         if detection.is_none() {
///             self.misses += 1;
///         }
///     }
/// }
/// ```
pub trait StepReporter {
    /// Called with the noisy frame produced this timestep.
    fn on_frame(&mut self, _timestep: usize, _frame: &Frame) {}

    /// Called with this timestep's detection, or `None` on a miss.
    fn on_detection(&mut self, _timestep: usize, _detection: Option<&Vector2<f64>>) {}

    /// Called with the filtered estimate after predict/update ran.
    fn on_estimate(&mut self, _timestep: usize, _estimate: &TrackEstimate) {}
}

/// Reporter that does nothing; the default for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl StepReporter for NoOpReporter {}

/// Reporter that forwards events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl StepReporter for LogReporter {
    fn on_frame(&mut self, timestep: usize, frame: &Frame) {
        log::trace!(
            "t={}: frame rendered, max intensity {:.3}",
            timestep,
            frame.max_intensity()
        );
    }

    fn on_detection(&mut self, timestep: usize, detection: Option<&Vector2<f64>>) {
        match detection {
            Some(z) => log::debug!("t={}: detection at ({:.2}, {:.2})", timestep, z.x, z.y),
            None => log::debug!("t={}: no detection", timestep),
        }
    }

    fn on_estimate(&mut self, timestep: usize, estimate: &TrackEstimate) {
        log::debug!(
            "t={}: estimate position ({:.2}, {:.2}) velocity ({:.2}, {:.2})",
            timestep,
            estimate.position.x,
            estimate.position.y,
            estimate.velocity.x,
            estimate.velocity.y
        );
    }
}
