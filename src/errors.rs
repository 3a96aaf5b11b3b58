//! Construction-time error types
//!
//! Fatal validation errors raised when a [`crate::config::SimulationConfig`] is
//! rejected at construction. These are the only fatal path in the crate: a
//! failing config refuses to start rather than produce undefined numeric
//! behavior downstream.

use std::fmt;

/// Errors produced while validating a simulation configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The configured number of timesteps was zero.
    ZeroTimesteps,

    /// The frame grid had a zero dimension.
    EmptyGrid {
        /// Configured grid width.
        width: usize,
        /// Configured grid height.
        height: usize,
    },

    /// A parameter that must be strictly positive and finite was not.
    NonPositive {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A parameter fell outside its permitted range.
    OutOfRange {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
        /// Inclusive/exclusive lower bound documented for the parameter.
        min: f64,
        /// Inclusive/exclusive upper bound documented for the parameter.
        max: f64,
    },

    /// The detector area window was empty (`min_area > max_area`).
    InvalidAreaWindow {
        /// Configured minimum area.
        min_area: usize,
        /// Configured maximum area.
        max_area: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroTimesteps => {
                write!(f, "timesteps must be greater than zero")
            }
            ConfigError::EmptyGrid { width, height } => {
                write!(f, "grid must be non-empty, got {}x{}", width, height)
            }
            ConfigError::NonPositive { parameter, value } => {
                write!(
                    f,
                    "parameter `{}` must be positive and finite, got {}",
                    parameter, value
                )
            }
            ConfigError::OutOfRange {
                parameter,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "parameter `{}` = {} is out of range ({}, {})",
                    parameter, value, min, max
                )
            }
            ConfigError::InvalidAreaWindow { min_area, max_area } => {
                write!(
                    f,
                    "detector area window is empty: min_area {} exceeds max_area {}",
                    min_area, max_area
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
