//! Autonomous period.
//!
//! [`script`] holds the command set and the runner; [`routines`] holds the
//! tuned sequences and picks one from the selector's flags.

pub mod routines;
pub mod script;
