//! Hardware boundary for the drive and mechanism code.
//!
//! Everything above this module talks to motors through the [`Actuator`]
//! trait and to time through the [`Clock`] trait. The robot binary plugs in
//! vexide smart motors (see `v5`), while tests and dry runs use the
//! simulated devices in [`sim`].
//!
//! # Example
//!
//! ```ignore
//! use aviator::devices::{Actuator, BrakeMode, RotationUnit, VelocityUnit};
//!
//! fn nudge<A: Actuator>(motor: &mut A) -> Result<f64, aviator::devices::DeviceError> {
//!     motor.set_velocity(20.0, VelocityUnit::Percent)?;
//!     let revs = motor.position(RotationUnit::Revolutions)?;
//!     motor.stop(BrakeMode::Brake)?;
//!     Ok(revs)
//! }
//! ```

use std::time::Duration;

use snafu::Snafu;

/// Simulated actuators and clock for running motion code off the robot.
pub mod sim;

/// vexide-backed actuators and clock for the V5 brain.
#[cfg(feature = "v5")]
pub mod v5;

/// Post-stop behaviour of an actuator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrakeMode {
    /// The motor spins freely.
    Coast,
    /// The motor resists rotation.
    Brake,
    /// The motor actively holds its position.
    Hold,
}

/// Unit of a velocity command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VelocityUnit {
    /// Percent of the motor's maximum free speed, in `[-100, 100]`.
    Percent,
    /// Revolutions per minute at the output shaft.
    Rpm,
}

/// Unit of an encoder reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationUnit {
    /// Whole output shaft revolutions.
    Revolutions,
    /// Output shaft degrees.
    Degrees,
}

impl RotationUnit {
    /// Converts a value measured in revolutions into this unit.
    pub fn from_revolutions(self, revolutions: f64) -> f64 {
        match self {
            RotationUnit::Revolutions => revolutions,
            RotationUnit::Degrees => revolutions * 360.0,
        }
    }
}

/// Errors reported by an actuator.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum DeviceError {
    /// Nothing answered on the port.
    #[snafu(display("no device connected on port {port}"))]
    Disconnected {
        /// Smart port number.
        port: u8,
    },

    /// The device answered but reported a fault.
    #[snafu(display("device on port {port} reported a fault: {reason}"))]
    Fault {
        /// Smart port number.
        port: u8,
        /// Description of the fault.
        reason: String,
    },
}

/// A controllable wheel or mechanism motor with an integrated encoder.
///
/// Implementations must treat every call as a single command to the
/// hardware: repeating `stop` with the same mode is harmless, and `position`
/// never changes the motor state.
pub trait Actuator {
    /// Smart port the actuator is plugged into, used for diagnostics.
    fn port(&self) -> u8;

    /// Spins the motor at a signed velocity.
    fn set_velocity(&mut self, value: f64, unit: VelocityUnit) -> Result<(), DeviceError>;

    /// Reads the cumulative encoder position.
    fn position(&self, unit: RotationUnit) -> Result<f64, DeviceError>;

    /// Stops the motor using the given brake mode.
    fn stop(&mut self, mode: BrakeMode) -> Result<(), DeviceError>;

    /// Zeroes the encoder at the current shaft position.
    fn reset_position(&mut self) -> Result<(), DeviceError>;
}

/// Monotonic time source with an awaitable sleep.
///
/// Control loops only yield through [`Clock::sleep`], between ticks, so
/// other tasks on the brain keep running while a motion waits.
pub trait Clock {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;

    /// Suspends the calling task for `duration`.
    fn sleep(&mut self, duration: Duration) -> impl Future<Output = ()>;

    /// Convenience wrapper around [`Clock::sleep`] taking milliseconds.
    fn sleep_millis(&mut self, millis: u64) -> impl Future<Output = ()> {
        self.sleep(Duration::from_millis(millis))
    }
}

/// A [`Clock`] backed by the platform timer.
///
/// On the V5 brain sleeping hands control back to the vexide executor.
/// Host builds block the thread instead.
pub struct SystemClock {
    start: std::time::Instant,
}

impl SystemClock {
    /// Creates a clock whose epoch is now.
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self { Self::new() }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration { self.start.elapsed() }

    async fn sleep(&mut self, duration: Duration) {
        #[cfg(feature = "v5")]
        vexide::time::sleep(duration).await;
        #[cfg(not(feature = "v5"))]
        std::thread::sleep(duration);
    }
}
