//! Simulation configuration
//!
//! All tunable scalars live here and are fixed at construction time; there
//! is no runtime reconfiguration mid-run. [`SimulationConfig::validate`]
//! enforces the admissible bounds once, so the rest of the crate can assume
//! well-formed parameters.
//!
//! Defaults reproduce the detector-driven reference scenario: a ballistic
//! target launched from the grid origin at (15, 45) grid units per second
//! under gravity, watched by a 150x150 sensor. The filter is deliberately
//! seeded with a wrong velocity guess to exercise initialization error.

use nalgebra::Vector2;
use serde::Serialize;

use crate::errors::ConfigError;

// Default scenario constants. None of these are load-bearing; they are
// illustrative magnitudes carried over from the reference scenario.
const DEFAULT_TIMESTEPS: usize = 50;
const DEFAULT_DT: f64 = 0.07;
const DEFAULT_GRAVITY: (f64, f64) = (0.0, -9.81);
const DEFAULT_GRID_WIDTH: usize = 150;
const DEFAULT_GRID_HEIGHT: usize = 150;
const DEFAULT_SPREAD_RADIUS: f64 = 4.0;
const DEFAULT_PEAK_SCALE: f64 = 0.8;
const DEFAULT_FRAME_NOISE_SIGMA: f64 = 0.1;
const DEFAULT_MEASUREMENT_NOISE_STD: f64 = 4.5;
const DEFAULT_PROCESS_NOISE_STD: f64 = 0.45;
const DEFAULT_INITIAL_COVARIANCE_SCALE: f64 = 100.0;

/// Blob detector tuning.
///
/// The area window and extent filter model an imperfect real-world sensor
/// front end; tightening them increases the miss rate, which the estimator
/// must tolerate anyway.
#[derive(Debug, Clone, Serialize)]
pub struct DetectorConfig {
    /// Intensity threshold separating candidate cells from background
    pub threshold: f64,
    /// Minimum blob area (cells) to accept
    pub min_area: usize,
    /// Maximum blob area (cells) to accept
    pub max_area: usize,
    /// Minimum fill ratio of the blob's bounding box (crude circularity proxy)
    pub min_extent: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            min_area: 2,
            max_area: 200,
            min_extent: 0.35,
        }
    }
}

/// Complete simulation configuration.
///
/// Construct via [`SimulationConfig::builder`] or start from `Default` and
/// adjust fields; either way, [`validate`](Self::validate) runs before a
/// simulation will accept the config.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationConfig {
    /// Number of timesteps to simulate
    pub timesteps: usize,
    /// Sampling period in seconds
    pub dt: f64,
    /// Gravity vector (x, y)
    pub gravity: Vector2<f64>,
    /// Sensor grid width (x extent, cells)
    pub grid_width: usize,
    /// Sensor grid height (y extent, cells)
    pub grid_height: usize,
    /// Gaussian spread radius of the rendered target blob (cells)
    pub spread_radius: f64,
    /// Peak intensity of the rendered blob, in (0, 1]
    pub peak_scale: f64,
    /// Standard deviation of the per-cell Gaussian frame noise
    pub frame_noise_sigma: f64,
    /// Measurement noise standard deviation (drives R = std²·I₂)
    pub measurement_noise_std: f64,
    /// Process noise standard deviation (drives Q = std²·I₄)
    pub process_noise_std: f64,
    /// Scale of the initial state covariance (P₀ = scale·I₄)
    pub initial_covariance_scale: f64,
    /// True initial position of the target
    pub initial_position: Vector2<f64>,
    /// True initial velocity of the target
    pub initial_velocity: Vector2<f64>,
    /// Filter's initial position guess (need not match the truth)
    pub initial_position_guess: Vector2<f64>,
    /// Filter's initial velocity guess (need not match the truth)
    pub initial_velocity_guess: Vector2<f64>,
    /// Detector tuning
    pub detector: DetectorConfig,
    /// RNG seed; `None` derives one from the system clock
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timesteps: DEFAULT_TIMESTEPS,
            dt: DEFAULT_DT,
            gravity: Vector2::new(DEFAULT_GRAVITY.0, DEFAULT_GRAVITY.1),
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            spread_radius: DEFAULT_SPREAD_RADIUS,
            peak_scale: DEFAULT_PEAK_SCALE,
            frame_noise_sigma: DEFAULT_FRAME_NOISE_SIGMA,
            measurement_noise_std: DEFAULT_MEASUREMENT_NOISE_STD,
            process_noise_std: DEFAULT_PROCESS_NOISE_STD,
            initial_covariance_scale: DEFAULT_INITIAL_COVARIANCE_SCALE,
            initial_position: Vector2::new(0.0, 0.0),
            initial_velocity: Vector2::new(15.0, 45.0),
            initial_position_guess: Vector2::new(0.0, 0.0),
            initial_velocity_guess: Vector2::new(20.0, 55.0),
            detector: DetectorConfig::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Create with builder pattern.
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Validate all parameter bounds.
    ///
    /// Called once at simulation construction; a failing config refuses to
    /// start rather than produce undefined numeric behavior downstream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timesteps == 0 {
            return Err(ConfigError::ZeroTimesteps);
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }

        for (parameter, value) in [
            ("dt", self.dt),
            ("spread_radius", self.spread_radius),
            ("frame_noise_sigma", self.frame_noise_sigma),
            ("measurement_noise_std", self.measurement_noise_std),
            ("process_noise_std", self.process_noise_std),
            ("initial_covariance_scale", self.initial_covariance_scale),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ConfigError::NonPositive { parameter, value });
            }
        }

        if !(self.peak_scale > 0.0 && self.peak_scale <= 1.0) {
            return Err(ConfigError::OutOfRange {
                parameter: "peak_scale",
                value: self.peak_scale,
                min: 0.0,
                max: 1.0,
            });
        }
        if !(self.detector.threshold > 0.0 && self.detector.threshold < 1.0) {
            return Err(ConfigError::OutOfRange {
                parameter: "detector.threshold",
                value: self.detector.threshold,
                min: 0.0,
                max: 1.0,
            });
        }
        if !(self.detector.min_extent > 0.0 && self.detector.min_extent <= 1.0) {
            return Err(ConfigError::OutOfRange {
                parameter: "detector.min_extent",
                value: self.detector.min_extent,
                min: 0.0,
                max: 1.0,
            });
        }
        if self.detector.min_area == 0 {
            return Err(ConfigError::NonPositive {
                parameter: "detector.min_area",
                value: 0.0,
            });
        }
        if self.detector.min_area > self.detector.max_area {
            return Err(ConfigError::InvalidAreaWindow {
                min_area: self.detector.min_area,
                max_area: self.detector.max_area,
            });
        }

        Ok(())
    }
}

/// Builder for [`SimulationConfig`].
///
/// Unset fields fall back to the reference-scenario defaults; `build()`
/// validates the assembled config.
#[derive(Debug, Default)]
pub struct SimulationConfigBuilder {
    config: Option<SimulationConfig>,
}

impl SimulationConfigBuilder {
    fn config(&mut self) -> &mut SimulationConfig {
        self.config.get_or_insert_with(SimulationConfig::default)
    }

    /// Set the number of timesteps.
    pub fn timesteps(mut self, timesteps: usize) -> Self {
        self.config().timesteps = timesteps;
        self
    }

    /// Set the sampling period.
    pub fn dt(mut self, dt: f64) -> Self {
        self.config().dt = dt;
        self
    }

    /// Set the gravity vector.
    pub fn gravity(mut self, gravity: Vector2<f64>) -> Self {
        self.config().gravity = gravity;
        self
    }

    /// Set the sensor grid dimensions.
    pub fn grid(mut self, width: usize, height: usize) -> Self {
        self.config().grid_width = width;
        self.config().grid_height = height;
        self
    }

    /// Set the blob spread radius.
    pub fn spread_radius(mut self, radius: f64) -> Self {
        self.config().spread_radius = radius;
        self
    }

    /// Set the blob peak intensity.
    pub fn peak_scale(mut self, scale: f64) -> Self {
        self.config().peak_scale = scale;
        self
    }

    /// Set the per-cell frame noise standard deviation.
    pub fn frame_noise_sigma(mut self, sigma: f64) -> Self {
        self.config().frame_noise_sigma = sigma;
        self
    }

    /// Set the measurement noise standard deviation.
    pub fn measurement_noise_std(mut self, std: f64) -> Self {
        self.config().measurement_noise_std = std;
        self
    }

    /// Set the process noise standard deviation.
    pub fn process_noise_std(mut self, std: f64) -> Self {
        self.config().process_noise_std = std;
        self
    }

    /// Set the initial covariance scale.
    pub fn initial_covariance_scale(mut self, scale: f64) -> Self {
        self.config().initial_covariance_scale = scale;
        self
    }

    /// Set the true initial state of the target.
    pub fn initial_state(mut self, position: Vector2<f64>, velocity: Vector2<f64>) -> Self {
        self.config().initial_position = position;
        self.config().initial_velocity = velocity;
        self
    }

    /// Set the filter's initial guess.
    pub fn initial_guess(mut self, position: Vector2<f64>, velocity: Vector2<f64>) -> Self {
        self.config().initial_position_guess = position;
        self.config().initial_velocity_guess = velocity;
        self
    }

    /// Set the detector tuning.
    pub fn detector(mut self, detector: DetectorConfig) -> Self {
        self.config().detector = detector;
        self
    }

    /// Set the RNG seed for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config().seed = Some(seed);
        self
    }

    /// Validate and build the configuration.
    pub fn build(mut self) -> Result<SimulationConfig, ConfigError> {
        let config = self.config().clone();
        config.validate()?;
        Ok(config)
    }
}
