//! Simulation driver
//!
//! Sequences the per-timestep loop: advance ground truth, render a noisy
//! frame, detect, feed the estimator, emit a snapshot. The driver is an
//! explicit `Idle -> Running -> Done` state machine with a pure [`step`]
//! operation, so rendering cadence is decoupled from stepping: an external
//! renderer consumes [`StepSnapshot`]s (directly or through a
//! [`StepReporter`]) and has no feedback path into the estimator.
//!
//! Execution is single-threaded and strictly sequential; each timestep
//! depends on the previous one through the kinematic and filter state.
//! Nothing mid-run is fatal: sensor gaps, off-grid targets and degenerate
//! updates all recover locally, and the run either completes its configured
//! horizon or refuses to start on an invalid configuration.
//!
//! [`step`]: Simulation::step

use nalgebra::{Matrix4, Vector2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::SimulationConfig;
use crate::detector::{BlobDetector, Detector};
use crate::errors::ConfigError;
use crate::kalman::{KalmanFilter, UpdateOutcome};
use crate::kinematics::KinematicState;
use crate::reporter::StepReporter;
use crate::sensor::FrameGenerator;
use crate::types::{Frame, TrackEstimate};

/// Driver lifecycle state.
///
/// One transition per timestep while `Running`; `Done` is terminal and
/// further [`Simulation::step`] calls are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Constructed, no step taken yet
    Idle,
    /// Stepping through the configured horizon
    Running,
    /// Horizon exhausted; no further transitions accepted
    Done,
}

/// Everything one timestep produced, exposed read-only to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct StepSnapshot {
    /// Timestep index (0-based)
    pub timestep: usize,
    /// Ground-truth state after this step's kinematic update
    pub truth: KinematicState,
    /// The noisy sensor frame
    pub frame: Frame,
    /// Detected position, or `None` on a miss
    pub detection: Option<Vector2<f64>>,
    /// What the estimator did with the detection (`None` when there was none)
    pub outcome: Option<UpdateOutcome>,
    /// Filtered track estimate after predict/update
    pub estimate: TrackEstimate,
    /// State covariance after predict/update
    pub covariance: Matrix4<f64>,
}

/// Single-target tracking simulation.
///
/// Owns the ground-truth state, the frame generator, a detector and the
/// Kalman filter; external code only ever sees snapshots. The detector is
/// a type parameter so alternative peak-finders can slot in without
/// touching the estimator.
pub struct Simulation<D: Detector = BlobDetector> {
    config: SimulationConfig,
    truth: KinematicState,
    generator: FrameGenerator,
    detector: D,
    filter: KalmanFilter,
    rng: StdRng,
    phase: Phase,
    completed_steps: usize,
    /// Per-step squared position errors, for end-of-run accuracy summaries
    squared_errors: Vec<f64>,
}

impl Simulation<BlobDetector> {
    /// Build a simulation with the default blob detector.
    ///
    /// Fails fast on invalid configuration; this is the only fatal error
    /// path in the crate.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let detector = BlobDetector::new(config.detector.clone());
        Self::with_detector(config, detector)
    }
}

impl<D: Detector> Simulation<D> {
    /// Build a simulation with a custom detector implementation.
    pub fn with_detector(config: SimulationConfig, detector: D) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("system clock before unix epoch")
                .as_secs()
        });

        let truth = KinematicState::new(config.initial_position, config.initial_velocity);
        let generator = FrameGenerator::new(&config);
        let filter = KalmanFilter::new(&config);

        Ok(Self {
            truth,
            generator,
            detector,
            filter,
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Idle,
            completed_steps: 0,
            squared_errors: Vec::with_capacity(config.timesteps),
            config,
        })
    }

    /// Current lifecycle phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of completed timesteps.
    #[inline]
    pub fn completed_steps(&self) -> usize {
        self.completed_steps
    }

    /// The configuration this simulation runs under.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only view of the estimator's current output.
    pub fn estimate(&self) -> TrackEstimate {
        self.filter.estimate()
    }

    /// Execute one timestep and return its snapshot.
    ///
    /// Returns `None` once the configured horizon is exhausted; calling
    /// again is harmless and leaves all state untouched.
    pub fn step(&mut self) -> Option<StepSnapshot> {
        match self.phase {
            Phase::Done => return None,
            Phase::Idle => self.phase = Phase::Running,
            Phase::Running => {}
        }

        let timestep = self.completed_steps;

        // Ground truth moves first, then the sensor observes it
        self.truth.advance(&self.config.gravity, self.config.dt);

        let mut frame = self.generator.render(&self.truth.position);
        self.generator.add_noise(&mut frame, &mut self.rng);

        let detection = self.detector.detect(&frame);

        // Predict runs unconditionally; update only on a detection
        self.filter.predict();
        let outcome = match detection {
            Some(z) => Some(self.filter.update(&z)),
            None => {
                log::debug!("t={}: no detection, predict-only step", timestep);
                None
            }
        };

        let estimate = self.filter.estimate();
        let error = (estimate.position - self.truth.position).norm();
        self.squared_errors.push(error * error);

        self.completed_steps += 1;
        if self.completed_steps == self.config.timesteps {
            log::debug!("simulation done after {} steps", self.completed_steps);
            self.phase = Phase::Done;
        }

        Some(StepSnapshot {
            timestep,
            truth: self.truth,
            frame,
            detection,
            outcome,
            estimate,
            covariance: *self.filter.covariance(),
        })
    }

    /// Run every remaining timestep, collecting the snapshots.
    pub fn run(&mut self) -> Vec<StepSnapshot> {
        let mut snapshots = Vec::with_capacity(self.config.timesteps - self.completed_steps);
        while let Some(snapshot) = self.step() {
            snapshots.push(snapshot);
        }
        snapshots
    }

    /// Run every remaining timestep, forwarding each to a reporter.
    pub fn run_with_reporter<R: StepReporter>(&mut self, reporter: &mut R) -> Vec<StepSnapshot> {
        let mut snapshots = Vec::with_capacity(self.config.timesteps - self.completed_steps);
        while let Some(snapshot) = self.step() {
            reporter.on_frame(snapshot.timestep, &snapshot.frame);
            reporter.on_detection(snapshot.timestep, snapshot.detection.as_ref());
            reporter.on_estimate(snapshot.timestep, &snapshot.estimate);
            snapshots.push(snapshot);
        }
        snapshots
    }

    /// Root-mean-square position error over the completed steps.
    ///
    /// Returns 0.0 before the first step.
    pub fn position_rmse(&self) -> f64 {
        if self.squared_errors.is_empty() {
            return 0.0;
        }
        (self.squared_errors.iter().sum::<f64>() / self.squared_errors.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimulationConfig {
        SimulationConfig::builder()
            .timesteps(10)
            .grid(60, 60)
            .initial_state(Vector2::new(10.0, 10.0), Vector2::new(20.0, 20.0))
            .initial_guess(Vector2::new(10.0, 10.0), Vector2::new(20.0, 20.0))
            .seed(42)
            .build()
            .unwrap()
    }

    #[test]
    fn test_phase_transitions() {
        let mut sim = Simulation::new(small_config()).unwrap();
        assert_eq!(sim.phase(), Phase::Idle);

        sim.step();
        assert_eq!(sim.phase(), Phase::Running);

        while sim.step().is_some() {}
        assert_eq!(sim.phase(), Phase::Done);
        assert_eq!(sim.completed_steps(), 10);
    }

    #[test]
    fn test_step_after_done_is_ignored() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let snapshots = sim.run();
        assert_eq!(snapshots.len(), 10);

        let estimate_before = sim.estimate();
        assert!(sim.step().is_none());
        assert!(sim.step().is_none());
        // State untouched by the rejected calls
        assert_eq!(sim.completed_steps(), 10);
        assert_eq!(sim.estimate().position, estimate_before.position);
    }

    #[test]
    fn test_snapshots_are_sequential() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let snapshots = sim.run();
        for (i, snapshot) in snapshots.iter().enumerate() {
            assert_eq!(snapshot.timestep, i);
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let run_a = Simulation::new(small_config()).unwrap().run();
        let run_b = Simulation::new(small_config()).unwrap().run();

        for (a, b) in run_a.iter().zip(&run_b) {
            assert_eq!(a.detection, b.detection);
            assert_eq!(a.estimate.position, b.estimate.position);
        }
    }

    #[test]
    fn test_reporter_sees_every_step() {
        use crate::reporter::StepReporter;

        #[derive(Default)]
        struct Counter {
            steps: usize,
        }
        impl StepReporter for Counter {
            fn on_estimate(&mut self, _t: usize, _e: &TrackEstimate) {
                self.steps += 1;
            }
        }

        let mut sim = Simulation::new(small_config()).unwrap();
        let mut counter = Counter::default();
        sim.run_with_reporter(&mut counter);
        assert_eq!(counter.steps, 10);
    }
}
