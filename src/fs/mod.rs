//! Filesystem utilities.
//!
//! # Example
//!
//! ```ignore
//! use aviator::fs::logger;
//! use log::{LevelFilter, info};
//!
//! logger::init(LevelFilter::Info).expect("logger already installed");
//! info!("robot up");
//! ```

/// Console and `log.txt` logger.
pub mod logger;
