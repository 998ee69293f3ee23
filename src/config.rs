//! Tuning constants and robot wiring.
//!
//! All configuration is compile-time. The structs here are plain data with
//! public fields so routines can tweak a copy for a single motion:
//!
//! ```ignore
//! use aviator::config::{DriveConfig, ProfileConfig};
//!
//! let mut config = DriveConfig::default();
//! config.forward = ProfileConfig::FORWARD_DRIVER;
//! config.max_ticks = None; // wait forever, like the old programs did
//! ```

use std::{f64::consts::PI, time::Duration};

use crate::{devices::BrakeMode, drivetrain::Wheel};

/// Shape of the trapezoidal velocity profile.
///
/// Velocities are in the unit the profile is commanded in (percent for
/// every profiled move in this crate); `accel` and `decel` are velocity
/// units gained per wheel revolution travelled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileConfig {
    /// Velocity at the very start and very end of a move.
    pub min_velocity: f64,
    /// Slope of the ramp away from the start position.
    pub accel:        f64,
    /// Slope of the ramp into the end position.
    pub decel:        f64,
}

impl ProfileConfig {
    /// Straight-line tuning of the far-tile autonomous.
    pub const FORWARD_FAR: ProfileConfig = ProfileConfig {
        min_velocity: 50.0,
        accel:        30.0,
        decel:        30.0,
    };

    /// Straight-line tuning of the driver-skills program.
    pub const FORWARD_DRIVER: ProfileConfig = ProfileConfig {
        min_velocity: 40.0,
        accel:        30.0,
        decel:        30.0,
    };

    /// Point-turn tuning: gentle start, fast ramp up, softer ramp down.
    pub const TURN: ProfileConfig = ProfileConfig {
        min_velocity: 20.0,
        accel:        100.0,
        decel:        50.0,
    };
}

impl Default for ProfileConfig {
    fn default() -> Self { Self::FORWARD_FAR }
}

/// How a profiled turn decides it is finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnCompletion {
    /// Every wheel must reach its own target.
    AllWheels,
    /// Only the given wheel is watched; the others are stopped with it.
    ///
    /// Tolerates side-to-side drift at the cost of straightness.
    ReferenceWheel(Wheel),
}

/// Everything the drive executor needs besides the hardware.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveConfig {
    /// Profile for straight moves.
    pub forward:                ProfileConfig,
    /// Profile for point turns.
    pub turn:                   ProfileConfig,
    /// Distance travelled per wheel revolution, in inches.
    pub wheel_circumference:    f64,
    /// Wheel degrees per wheel revolution used to convert turn requests.
    pub degrees_per_revolution: f64,
    /// Period of the control loop.
    pub tick:                   Duration,
    /// Tick budget for one motion, or `None` to wait indefinitely.
    pub max_ticks:              Option<u32>,
    /// Completion rule for profiled turns.
    pub turn_completion:        TurnCompletion,
    /// Stop applied to every wheel once a profiled move ends.
    pub terminal_brake:         BrakeMode,
    /// Speed of the heading correction nudge, in rpm.
    pub correction_rpm:         f64,
    /// Speed of single-side pivots, in percent.
    pub pivot_velocity:         f64,
}

impl DriveConfig {
    /// Four inch omni wheels.
    pub const WHEEL_CIRCUMFERENCE: f64 = PI * 4.0;

    /// Converts a linear distance in inches into wheel revolutions.
    pub fn inches_to_revolutions(&self, inches: f64) -> f64 { inches / self.wheel_circumference }

    /// Converts wheel degrees into wheel revolutions.
    pub fn degrees_to_revolutions(&self, degrees: f64) -> f64 {
        degrees / self.degrees_per_revolution
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            forward:                ProfileConfig::FORWARD_FAR,
            turn:                   ProfileConfig::TURN,
            wheel_circumference:    Self::WHEEL_CIRCUMFERENCE,
            degrees_per_revolution: 360.0,
            tick:                   Duration::from_millis(10),
            max_ticks:              Some(500),
            turn_completion:        TurnCompletion::AllWheels,
            terminal_brake:         BrakeMode::Hold,
            correction_rpm:         15.0,
            pivot_velocity:         50.0,
        }
    }
}

/// Smart port assignments of the competition robot.
pub mod ports {
    /// Left front drive motor.
    pub const LEFT_FRONT: u8 = 3;
    /// Left back drive motor.
    pub const LEFT_BACK: u8 = 11;
    /// Right front drive motor (reversed).
    pub const RIGHT_FRONT: u8 = 9;
    /// Right back drive motor (reversed).
    pub const RIGHT_BACK: u8 = 20;
    /// First flywheel motor, 6:1 cartridge.
    pub const FLYWHEEL_A: u8 = 1;
    /// Second flywheel motor, 6:1 cartridge (reversed).
    pub const FLYWHEEL_B: u8 = 2;
    /// Intake roller, 6:1 cartridge.
    pub const INTAKE: u8 = 10;
    /// Descorer / cap flipper arm, 36:1 cartridge.
    pub const ARM: u8 = 19;
}
