//! # Aviator
//!
//! Drive control and match-day software for a four-motor VEX V5 robot built
//! on [vexide](https://vexide.dev). It covers:
//!
//! - **Motion**: a trapezoidal velocity profile over wheel encoder position,
//!   tick-level move state machines and a drive executor with a bounded tick
//!   budget that reports timeouts and device faults instead of hanging.
//! - **Teleop**: tank and arcade mapping, a reverse-drive latch, mechanism
//!   buttons and one-touch alignment presets.
//! - **Autonomous**: tuned routines written as command lists, mirrored for the
//!   blue alliance and picked from a touch-screen selector.
//! - **Logging**: console and SD card output behind the `log` facade.
//!
//! Everything except [`devices::v5`](devices) and [`display::driver`](display)
//! runs on the host against simulated motors, which is how the tests drive
//! it.
//!
//! ## Quick Start
//!
//! ```ignore
//! use aviator::{config::DriveConfig, devices::sim, motion::executor::DriveExecutor};
//!
//! let (mut robot, mut clock) = sim::robot();
//! let mut drive = DriveExecutor::new(&mut robot.drivetrain, &mut clock, DriveConfig::default());
//! drive.forward(23.0, 95.0).await?;
//! drive.turn(-33.0, 70.0).await?;
//! ```

/// Tuning constants, geometry and port map.
pub mod config;

/// Actuator and clock traits with simulated and vexide implementations.
pub mod devices;

/// Four-wheel drivetrain and the robot hardware context.
pub mod drivetrain;

/// Velocity profile, motion state machines and the drive executor.
pub mod motion;

/// Controller input and the teleop mapper.
pub mod opcontrol;

/// Brain screen selector UI.
pub mod display;

/// Autonomous command runner and tuned routines.
pub mod auton;

/// Filesystem utilities, including logging.
pub mod fs;
