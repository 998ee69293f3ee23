//! Operator control for the driver-controlled period.
//!
//! Controller polls become [`ControllerInput`](controller::ControllerInput)
//! snapshots, and [`TeleopMapper`](teleop::TeleopMapper) turns them into
//! drive, mechanism and alignment commands once per tick.
//!
//! # Example
//!
//! ```ignore
//! use aviator::opcontrol::{controller, teleop::{TeleopConfig, TeleopMapper}};
//!
//! let mut mapper = TeleopMapper::new(TeleopConfig::DRIVER);
//! loop {
//!     let primary = controller::read(&primary_controller);
//!     let partner = controller::read(&partner_controller);
//!     mapper.tick(&primary, &partner, &mut robot, &mut clock, &drive_config).await;
//!     clock.sleep(mapper.config().tick).await;
//! }
//! ```

/// Controller snapshots with button edge detection.
pub mod controller;

/// Stick and button mapping to robot commands.
pub mod teleop;
