//! Linear Kalman filter over position and velocity
//!
//! State mean is `[x, vx, y, vy]` with a constant-velocity transition per
//! axis; the observation extracts the two position components. The model
//! matrices are fixed at construction. Covariance is kept symmetric by
//! re-symmetrizing after every predict and update, and the update uses the
//! Joseph form.
//!
//! Two conditions are recovered locally instead of surfacing as errors:
//! a singular innovation covariance skips the update and keeps the prior,
//! and a measurement outside the observation bounds is rejected as if no
//! detection had occurred. Both are reported through [`UpdateOutcome`].

use nalgebra::{Cholesky, Matrix2, Matrix2x4, Matrix4, Matrix4x2, Vector2, Vector4};
use serde::Serialize;

use crate::common::linalg::symmetrize;
use crate::config::SimulationConfig;
use crate::types::TrackEstimate;

/// Disposition of a single measurement handed to [`KalmanFilter::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOutcome {
    /// Measurement incorporated into the state
    Applied,
    /// Measurement fell outside the observation bounds and was rejected
    OutOfBounds,
    /// Innovation covariance was numerically singular; update skipped
    SingularInnovation,
}

/// Discrete-time linear-Gaussian state estimator for a single target.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    mean: Vector4<f64>,
    covariance: Matrix4<f64>,
    transition: Matrix4<f64>,
    observation: Matrix2x4<f64>,
    process_noise: Matrix4<f64>,
    measurement_noise: Matrix2<f64>,
    /// Upper corner of the plausible measurement region (lower corner is 0)
    observation_bounds: Vector2<f64>,
}

impl KalmanFilter {
    /// Build the filter from a validated configuration.
    ///
    /// The state is seeded from the configured initial guess, which need
    /// not match the ground truth; the large initial covariance scale
    /// encodes that low confidence.
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_model(
            config.dt,
            config.initial_position_guess,
            config.initial_velocity_guess,
            config.process_noise_std,
            config.measurement_noise_std,
            config.initial_covariance_scale,
            Vector2::new(config.grid_width as f64, config.grid_height as f64),
        )
    }

    /// Build the filter from explicit model parameters.
    ///
    /// # Arguments
    /// * `dt` - Sampling period coupling position and velocity in F
    /// * `position_guess`, `velocity_guess` - Initial state mean
    /// * `process_noise_std` - Q = std²·I₄
    /// * `measurement_noise_std` - R = std²·I₂
    /// * `initial_covariance_scale` - P₀ = scale·I₄
    /// * `observation_bounds` - Measurements outside `[0, bounds]` per axis
    ///   are rejected as implausible
    pub fn with_model(
        dt: f64,
        position_guess: Vector2<f64>,
        velocity_guess: Vector2<f64>,
        process_noise_std: f64,
        measurement_noise_std: f64,
        initial_covariance_scale: f64,
        observation_bounds: Vector2<f64>,
    ) -> Self {
        #[rustfmt::skip]
        let transition = Matrix4::new(
            1.0, dt,  0.0, 0.0,   // x'  = x + dt*vx
            0.0, 1.0, 0.0, 0.0,   // vx' = vx
            0.0, 0.0, 1.0, dt,    // y'  = y + dt*vy
            0.0, 0.0, 0.0, 1.0,   // vy' = vy
        );

        #[rustfmt::skip]
        let observation = Matrix2x4::new(
            1.0, 0.0, 0.0, 0.0,   // z[0] = x
            0.0, 0.0, 1.0, 0.0,   // z[1] = y
        );

        let mean = Vector4::new(
            position_guess.x,
            velocity_guess.x,
            position_guess.y,
            velocity_guess.y,
        );

        Self {
            mean,
            covariance: Matrix4::identity() * initial_covariance_scale,
            transition,
            observation,
            process_noise: Matrix4::identity() * process_noise_std * process_noise_std,
            measurement_noise: Matrix2::identity() * measurement_noise_std * measurement_noise_std,
            observation_bounds,
        }
    }

    /// Propagate the state one timestep: `μ ← F·μ`, `Σ ← F·Σ·Fᵀ + Q`.
    ///
    /// Always safe to call; runs every timestep whether or not a detection
    /// arrived. Along directions no measurement constrains, the covariance
    /// diagonal never decreases under repeated predicts.
    pub fn predict(&mut self) {
        self.mean = self.transition * self.mean;
        self.covariance = symmetrize(
            &(self.transition * self.covariance * self.transition.transpose()
                + self.process_noise),
        );
    }

    /// Incorporate a position measurement.
    ///
    /// Computes the innovation and gain, then applies the Joseph-form
    /// covariance update. The prior is retained untouched when the
    /// measurement is implausible or the innovation covariance is
    /// singular; see [`UpdateOutcome`].
    pub fn update(&mut self, z: &Vector2<f64>) -> UpdateOutcome {
        if !self.is_plausible(z) {
            log::warn!(
                "rejecting implausible measurement ({:.1}, {:.1}) outside [0, {}]x[0, {}]",
                z.x,
                z.y,
                self.observation_bounds.x,
                self.observation_bounds.y
            );
            return UpdateOutcome::OutOfBounds;
        }

        // Innovation y = z - H·μ and its covariance S = H·Σ·Hᵀ + R
        let innovation = z - self.observation * self.mean;
        let s = self.observation * self.covariance * self.observation.transpose()
            + self.measurement_noise;

        let s_inv = match Cholesky::new(s) {
            Some(chol) => chol.inverse(),
            None => {
                log::warn!("singular innovation covariance, keeping prior estimate");
                return UpdateOutcome::SingularInnovation;
            }
        };

        // Gain K = Σ·Hᵀ·S⁻¹
        let gain: Matrix4x2<f64> = self.covariance * self.observation.transpose() * s_inv;

        self.mean += gain * innovation;

        // Joseph form: Σ ← (I - K·H)·Σ·(I - K·H)ᵀ + K·R·Kᵀ
        let i_minus_kh = Matrix4::identity() - gain * self.observation;
        self.covariance = symmetrize(
            &(i_minus_kh * self.covariance * i_minus_kh.transpose()
                + gain * self.measurement_noise * gain.transpose()),
        );

        UpdateOutcome::Applied
    }

    fn is_plausible(&self, z: &Vector2<f64>) -> bool {
        z.x.is_finite()
            && z.y.is_finite()
            && (0.0..=self.observation_bounds.x).contains(&z.x)
            && (0.0..=self.observation_bounds.y).contains(&z.y)
    }

    /// Current state mean `[x, vx, y, vy]`.
    #[inline]
    pub fn mean(&self) -> &Vector4<f64> {
        &self.mean
    }

    /// Current state covariance.
    #[inline]
    pub fn covariance(&self) -> &Matrix4<f64> {
        &self.covariance
    }

    /// Renderer-facing estimate: position and velocity sub-vectors.
    pub fn estimate(&self) -> TrackEstimate {
        TrackEstimate::from_mean(&self.mean)
    }
}
