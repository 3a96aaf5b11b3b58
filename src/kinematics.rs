//! Ground-truth kinematics for the simulated target
//!
//! The target follows a constant-acceleration (gravity) model. The state is
//! owned by the frame generator side of the simulation and mutated once per
//! timestep; the estimator never sees it.

use nalgebra::Vector2;
use serde::Serialize;

/// True kinematic state of the target: position and velocity in the plane.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KinematicState {
    /// Position (x, y) in grid units
    pub position: Vector2<f64>,
    /// Velocity (vx, vy) in grid units per second
    pub velocity: Vector2<f64>,
}

impl KinematicState {
    /// Create a new kinematic state.
    pub fn new(position: Vector2<f64>, velocity: Vector2<f64>) -> Self {
        Self { position, velocity }
    }

    /// Advance one timestep under constant acceleration.
    ///
    /// `p += v·dt + ½·g·dt²` followed by `v += g·dt`. Deterministic given
    /// state, gravity and `dt`; no failure modes.
    pub fn advance(&mut self, gravity: &Vector2<f64>, dt: f64) {
        self.position += self.velocity * dt + 0.5 * gravity * dt * dt;
        self.velocity += gravity * dt;
    }

    /// Closed-form ballistic position after time `t` from this state.
    ///
    /// `p(t) = p₀ + v₀·t + ½·g·t²`. Stepping [`advance`](Self::advance)
    /// with a fixed `dt` lands on this curve exactly, which makes it the
    /// reference for accuracy checks.
    pub fn ballistic_position(&self, gravity: &Vector2<f64>, t: f64) -> Vector2<f64> {
        self.position + self.velocity * t + 0.5 * gravity * t * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_matches_closed_form() {
        let gravity = Vector2::new(0.0, -9.81);
        let dt = 0.07;
        let initial = KinematicState::new(Vector2::new(0.0, 0.0), Vector2::new(15.0, 45.0));

        let mut state = initial;
        for _ in 0..50 {
            state.advance(&gravity, dt);
        }

        let expected = initial.ballistic_position(&gravity, 50.0 * dt);
        assert_relative_eq!(state.position.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(state.position.y, expected.y, epsilon = 1e-9);
    }

    #[test]
    fn test_advance_without_gravity_is_linear() {
        let mut state = KinematicState::new(Vector2::new(1.0, 2.0), Vector2::new(3.0, -1.0));
        state.advance(&Vector2::zeros(), 0.5);

        assert_relative_eq!(state.position.x, 2.5);
        assert_relative_eq!(state.position.y, 1.5);
        // Velocity unchanged
        assert_relative_eq!(state.velocity.x, 3.0);
        assert_relative_eq!(state.velocity.y, -1.0);
    }
}
