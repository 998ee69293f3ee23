//! Simulated actuators and clock.
//!
//! A [`SimMotor`] is a cheap shared handle: clones refer to the same
//! simulated motor, so a test can keep one handle for inspection while the
//! drivetrain owns another. Encoders only move when a [`SimClock`] the
//! motor is attached to sleeps or is advanced, which keeps encoder reads
//! free of side effects. [`SimClock::sleep`] never actually waits.
//!
//! ```ignore
//! use aviator::devices::sim;
//!
//! let (mut robot, mut clock) = sim::robot();
//! let mut executor = DriveExecutor::new(&mut robot.drivetrain, &mut clock, DriveConfig::default());
//! executor.forward(12.0, 80.0).await?;
//! ```

use std::{cell::RefCell, rc::Rc, time::Duration};

use crate::{
    config::ports,
    devices::{Actuator, BrakeMode, Clock, DeviceError, RotationUnit, VelocityUnit},
    drivetrain::{Drivetrain, Robot},
};

/// A single command received by a simulated motor.
#[derive(Clone, Debug, PartialEq)]
pub enum SimCommand {
    /// `set_velocity` was called.
    Velocity {
        /// Signed commanded value.
        value: f64,
        /// Unit of `value`.
        unit:  VelocityUnit,
    },
    /// `stop` was called.
    Stop(BrakeMode),
    /// `reset_position` was called.
    ResetPosition,
}

#[derive(Debug)]
struct SimState {
    port:         u8,
    max_rpm:      f64,
    position:     f64,
    velocity_rpm: f64,
    fixed_step:   Option<f64>,
    stalled:      bool,
    disconnected: bool,
    commands:     Vec<SimCommand>,
}

/// A simulated smart motor.
#[derive(Clone, Debug)]
pub struct SimMotor {
    state: Rc<RefCell<SimState>>,
}

impl SimMotor {
    /// Creates a motor on `port` with a 200 rpm (green) cartridge.
    pub fn new(port: u8) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                port,
                max_rpm: 200.0,
                position: 0.0,
                velocity_rpm: 0.0,
                fixed_step: None,
                stalled: false,
                disconnected: false,
                commands: Vec::new(),
            })),
        }
    }

    /// Sets the free speed that 100 percent maps to.
    pub fn with_max_rpm(self, max_rpm: f64) -> Self {
        self.state.borrow_mut().max_rpm = max_rpm;
        self
    }

    /// Makes the encoder advance by a fixed number of revolutions per clock
    /// sleep, in the commanded direction, regardless of speed.
    pub fn with_fixed_step(self, revolutions: f64) -> Self {
        self.state.borrow_mut().fixed_step = Some(revolutions);
        self
    }

    /// Moves the encoder to an absolute position in revolutions.
    pub fn set_position(&self, revolutions: f64) { self.state.borrow_mut().position = revolutions; }

    /// A stalled motor accepts commands but its encoder never moves.
    pub fn set_stalled(&self, stalled: bool) { self.state.borrow_mut().stalled = stalled; }

    /// Makes every subsequent call fail with [`DeviceError::Disconnected`].
    pub fn disconnect(&self) { self.state.borrow_mut().disconnected = true; }

    /// Every command received so far, oldest first.
    pub fn commands(&self) -> Vec<SimCommand> { self.state.borrow().commands.clone() }

    /// Current shaft speed in rpm.
    pub fn velocity_rpm(&self) -> f64 { self.state.borrow().velocity_rpm }

    /// Current encoder reading in revolutions, bypassing fault injection.
    pub fn revolutions(&self) -> f64 { self.state.borrow().position }

    /// Integrates the shaft speed over `dt`.
    pub fn advance(&self, dt: Duration) {
        let mut state = self.state.borrow_mut();
        if state.stalled || state.disconnected || state.velocity_rpm == 0.0 {
            return;
        }
        let delta = match state.fixed_step {
            Some(step) => step * state.velocity_rpm.signum(),
            None => state.velocity_rpm * dt.as_secs_f64() / 60.0,
        };
        state.position += delta;
    }

    fn check(&self) -> Result<(), DeviceError> {
        let state = self.state.borrow();
        if state.disconnected {
            return Err(DeviceError::Disconnected { port: state.port });
        }
        Ok(())
    }
}

impl Actuator for SimMotor {
    fn port(&self) -> u8 { self.state.borrow().port }

    fn set_velocity(&mut self, value: f64, unit: VelocityUnit) -> Result<(), DeviceError> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        state.velocity_rpm = match unit {
            VelocityUnit::Percent => value.clamp(-100.0, 100.0) / 100.0 * state.max_rpm,
            VelocityUnit::Rpm => value.clamp(-state.max_rpm, state.max_rpm),
        };
        state.commands.push(SimCommand::Velocity { value, unit });
        Ok(())
    }

    fn position(&self, unit: RotationUnit) -> Result<f64, DeviceError> {
        self.check()?;
        Ok(unit.from_revolutions(self.state.borrow().position))
    }

    fn stop(&mut self, mode: BrakeMode) -> Result<(), DeviceError> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        state.velocity_rpm = 0.0;
        state.commands.push(SimCommand::Stop(mode));
        Ok(())
    }

    fn reset_position(&mut self) -> Result<(), DeviceError> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        state.position = 0.0;
        state.commands.push(SimCommand::ResetPosition);
        Ok(())
    }
}

/// A manually advanced clock that drives attached [`SimMotor`]s.
#[derive(Debug, Default)]
pub struct SimClock {
    now:    Duration,
    motors: Vec<SimMotor>,
}

impl SimClock {
    /// Creates a clock at time zero with no motors attached.
    pub fn new() -> Self { Self::default() }

    /// Makes `motor` advance whenever this clock sleeps.
    pub fn attach(&mut self, motor: &SimMotor) { self.motors.push(motor.clone()); }

    /// Moves time forward by `duration`, integrating every attached motor.
    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
        for motor in &self.motors {
            motor.advance(duration);
        }
    }
}

impl Clock for SimClock {
    fn now(&self) -> Duration { self.now }

    async fn sleep(&mut self, duration: Duration) { self.advance(duration); }
}

/// Builds a simulated drivetrain with every wheel attached to `clock`.
pub fn drivetrain(clock: &mut SimClock) -> Drivetrain<SimMotor> {
    let wheels = [
        SimMotor::new(ports::LEFT_FRONT),
        SimMotor::new(ports::LEFT_BACK),
        SimMotor::new(ports::RIGHT_FRONT),
        SimMotor::new(ports::RIGHT_BACK),
    ];
    for wheel in &wheels {
        clock.attach(wheel);
    }
    Drivetrain::new(wheels)
}

/// Builds the full simulated robot, with cartridge speeds matching the
/// competition robot, and the clock that drives it.
pub fn robot() -> (Robot<SimMotor>, SimClock) {
    let mut clock = SimClock::new();
    let drivetrain = drivetrain(&mut clock);
    let arm = SimMotor::new(ports::ARM).with_max_rpm(100.0);
    let intake = SimMotor::new(ports::INTAKE).with_max_rpm(600.0);
    let flywheel = [
        SimMotor::new(ports::FLYWHEEL_A).with_max_rpm(600.0),
        SimMotor::new(ports::FLYWHEEL_B).with_max_rpm(600.0),
    ];
    clock.attach(&arm);
    clock.attach(&intake);
    for motor in &flywheel {
        clock.attach(motor);
    }
    (Robot::new(drivetrain, arm, intake, flywheel), clock)
}
