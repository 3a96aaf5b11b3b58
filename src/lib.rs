/*!
# Singletrack - single-target tracking over simulated sensor frames

Discrete-time tracking of one ballistic target: a frame generator renders
the true target into noisy 2-D intensity frames, a lossy blob detector
extracts at most one candidate position per frame, and a linear Kalman
filter fuses the detections (and coasts through the misses) into a filtered
track estimate.

## Features

- Ballistic ground-truth simulation with Gaussian-blob frame rendering
- Swappable detector front end with a documented lossy contract
- 4-state (position + velocity) Kalman filter with Joseph-form updates
- Explicit `Idle -> Running -> Done` driver emitting per-step snapshots

## Modules

- [`simulation`] - The per-timestep driver and its snapshots
- [`kalman`] - The state estimator
- [`sensor`] / [`detector`] - Frame generation and blob detection
- [`kinematics`] - Ground-truth motion
- [`config`] - Validated simulation configuration
- [`reporter`] - Renderer/instrumentation callbacks
- [`common`] - Low-level utilities

## Example

```rust
use singletrack::{Simulation, SimulationConfig};

let config = SimulationConfig::builder()
    .timesteps(50)
    .seed(42)
    .build()
    .expect("valid config");

let mut simulation = Simulation::new(config).expect("valid config");
while let Some(snapshot) = simulation.step() {
    // hand the frame, detection and estimate to a renderer
    let _ = (&snapshot.frame, &snapshot.detection, &snapshot.estimate);
}
assert_eq!(simulation.phase(), singletrack::Phase::Done);
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Validated simulation configuration and builder
pub mod config;

/// Blob detection over noisy frames
pub mod detector;

/// Construction-time error types
pub mod errors;

/// Linear Kalman filter over position and velocity
pub mod kalman;

/// Ground-truth kinematics
pub mod kinematics;

/// Renderer/instrumentation callbacks
pub mod reporter;

/// Simulated sensor frame generation
pub mod sensor;

/// The per-timestep simulation driver
pub mod simulation;

/// Core data types (frames, track estimates)
pub mod types;

/// Low-level utilities (linear algebra)
pub mod common;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::{DetectorConfig, SimulationConfig, SimulationConfigBuilder};
pub use detector::{BlobDetector, Detector};
pub use errors::ConfigError;
pub use kalman::{KalmanFilter, UpdateOutcome};
pub use kinematics::KinematicState;
pub use reporter::{LogReporter, NoOpReporter, StepReporter};
pub use sensor::FrameGenerator;
pub use simulation::{Phase, Simulation, StepSnapshot};
pub use types::{Frame, TrackEstimate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
