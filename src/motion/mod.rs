//! Autonomous motion control.
//!
//! This module turns distance and angle requests into wheel commands:
//!
//! - **Profile**: the trapezoidal velocity profile, as pure functions.
//! - **Moves**: tick-level state machines for each kind of motion
//!   (profiled forward and turn, spin turn, pivot, heading correction,
//!   mechanism rotation).
//! - **Executor**: drives a move to completion on a fixed tick, with a tick
//!   budget so a stalled wheel is reported instead of hanging the program.
//!
//! # Architecture
//!
//! Every move implements [`Motion`]. A motion only suspends between ticks:
//! [`Motion::begin`] issues the start commands, [`Motion::tick`] runs one
//! control iteration, and [`Motion::finish`] issues the terminal stop. The
//! executor owns the sleeping.
//!
//! # Example
//!
//! ```ignore
//! use aviator::{config::DriveConfig, motion::executor::DriveExecutor};
//!
//! let mut executor = DriveExecutor::new(&mut robot.drivetrain, &mut clock, DriveConfig::default());
//! executor.forward(23.0, 95.0).await?;   // 23 inches at up to 95 percent
//! executor.turn(-33.0, 70.0).await?;     // 33 wheel degrees to the left
//! ```

use snafu::Snafu;

use crate::devices::DeviceError;

/// Drive executor and the async motion runner.
pub mod executor;

/// Tick-level motion state machines.
pub mod moves;

/// Trapezoidal velocity profile.
pub mod profile;

/// Progress of a motion after a control step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The motion needs more ticks.
    Running,
    /// The motion has reached its goal.
    Complete,
}

/// Reasons a motion did not complete.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum MotionError {
    /// The velocity cap is NaN, infinite, zero or negative.
    #[snafu(display("velocity cap {value} must be finite and positive"))]
    InvalidVelocity {
        /// Rejected cap.
        value: f64,
    },

    /// The requested distance or angle is NaN or infinite.
    #[snafu(display("displacement {value} is not finite"))]
    InvalidDisplacement {
        /// Rejected displacement.
        value: f64,
    },

    /// The tick budget ran out before every watched actuator arrived.
    #[snafu(display("motion incomplete after {ticks} ticks, remaining {remaining:?} rev"))]
    Incomplete {
        /// Ticks spent.
        ticks:     u32,
        /// Revolutions left per actuator, in the motion's own order.
        remaining: Vec<f64>,
    },

    /// An actuator failed while the motion was running.
    #[snafu(display("actuator fault: {source}"), context(false))]
    Device {
        /// Underlying device error.
        source: DeviceError,
    },
}

/// A motion that can be stepped one control tick at a time.
///
/// `P` is the hardware the motion owns while it runs: a whole
/// [`Drivetrain`](crate::drivetrain::Drivetrain) for drive moves, or a
/// single [`Actuator`](crate::devices::Actuator) for mechanisms.
pub trait Motion<P: ?Sized> {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Issues the start commands.
    ///
    /// Returning [`Phase::Complete`] means there was nothing to do and no
    /// commands were issued.
    fn begin(&mut self, plant: &mut P) -> Result<Phase, MotionError>;

    /// Runs one control iteration against fresh sensor readings.
    fn tick(&mut self, plant: &mut P) -> Result<Phase, MotionError>;

    /// Issues the terminal stop. Called exactly once after the last tick,
    /// also when the motion is abandoned.
    fn finish(&mut self, plant: &mut P) -> Result<(), MotionError>;

    /// Revolutions still to go per actuator, for diagnostics.
    fn remaining(&self, _plant: &P) -> Vec<f64> { Vec::new() }
}

/// Rejects velocity caps the profile cannot use.
pub fn validate_velocity(value: f64) -> Result<f64, MotionError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MotionError::InvalidVelocity { value })
    }
}

/// Rejects displacements that are not finite.
pub fn validate_displacement(value: f64) -> Result<f64, MotionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MotionError::InvalidDisplacement { value })
    }
}
