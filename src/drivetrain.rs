//! Four-wheel drivetrain and the robot hardware context.
//!
//! The drivetrain owns exactly four wheel actuators, one per corner. A
//! motion command borrows it mutably for its whole duration, so nothing
//! else can command the wheels while a move is running.
//!
//! # Example
//!
//! ```ignore
//! use aviator::drivetrain::{Drivetrain, Side};
//! use aviator::devices::{BrakeMode, VelocityUnit};
//!
//! let mut drivetrain = Drivetrain::new([left_front, left_back, right_front, right_back]);
//! drivetrain.drive_sides(60.0, -60.0, VelocityUnit::Percent)?;
//! drivetrain.stop(BrakeMode::Brake)?;
//! ```

use crate::devices::{Actuator, BrakeMode, DeviceError, RotationUnit, VelocityUnit};

/// Side of the robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Left wheels.
    Left,
    /// Right wheels.
    Right,
}

impl Side {
    /// The opposite side.
    pub const fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A drive wheel position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wheel {
    /// Left front.
    LeftFront,
    /// Left back.
    LeftBack,
    /// Right front.
    RightFront,
    /// Right back.
    RightBack,
}

impl Wheel {
    /// Every wheel, in storage order.
    pub const ALL: [Wheel; 4] = [
        Wheel::LeftFront,
        Wheel::LeftBack,
        Wheel::RightFront,
        Wheel::RightBack,
    ];

    /// Index of the wheel in [`Wheel::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Wheel::LeftFront => 0,
            Wheel::LeftBack => 1,
            Wheel::RightFront => 2,
            Wheel::RightBack => 3,
        }
    }

    /// Side the wheel is mounted on.
    pub const fn side(self) -> Side {
        match self {
            Wheel::LeftFront | Wheel::LeftBack => Side::Left,
            Wheel::RightFront | Wheel::RightBack => Side::Right,
        }
    }
}

/// Four independently driven wheels.
pub struct Drivetrain<A> {
    wheels: [A; 4],
}

impl<A: Actuator> Drivetrain<A> {
    /// Creates a drivetrain from wheels in `[left front, left back, right
    /// front, right back]` order.
    ///
    /// Right side motors are expected to already be reversed so that a
    /// positive command drives every wheel forward.
    pub fn new(wheels: [A; 4]) -> Self { Self { wheels } }

    /// Shared access to one wheel.
    pub fn wheel(&self, wheel: Wheel) -> &A { &self.wheels[wheel.index()] }

    /// Exclusive access to one wheel.
    pub fn wheel_mut(&mut self, wheel: Wheel) -> &mut A { &mut self.wheels[wheel.index()] }

    /// Reads every wheel encoder, in [`Wheel::ALL`] order.
    pub fn positions(&self, unit: RotationUnit) -> Result<[f64; 4], DeviceError> {
        let mut positions = [0.0; 4];
        for (slot, wheel) in positions.iter_mut().zip(&self.wheels) {
            *slot = wheel.position(unit)?;
        }
        Ok(positions)
    }

    /// Commands the same velocity on every wheel.
    pub fn set_velocity(&mut self, value: f64, unit: VelocityUnit) -> Result<(), DeviceError> {
        for wheel in &mut self.wheels {
            wheel.set_velocity(value, unit)?;
        }
        Ok(())
    }

    /// Commands one velocity per side.
    pub fn drive_sides(&mut self, left: f64, right: f64, unit: VelocityUnit) -> Result<(), DeviceError> {
        for wheel in Wheel::ALL {
            let value = match wheel.side() {
                Side::Left => left,
                Side::Right => right,
            };
            self.wheel_mut(wheel).set_velocity(value, unit)?;
        }
        Ok(())
    }

    /// Stops every wheel with the given brake mode.
    ///
    /// All four wheels are attempted even if one fails; the first error is
    /// returned.
    pub fn stop(&mut self, mode: BrakeMode) -> Result<(), DeviceError> {
        let mut result = Ok(());
        for wheel in &mut self.wheels {
            if let Err(e) = wheel.stop(mode) {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }
}

/// Everything the robot can move, passed explicitly instead of living in
/// globals.
pub struct Robot<A> {
    /// The four drive wheels.
    pub drivetrain: Drivetrain<A>,
    /// Descorer / cap flipper arm.
    pub arm:        A,
    /// Ball intake roller.
    pub intake:     A,
    /// The two flywheel motors, always commanded together.
    pub flywheel:   [A; 2],
}

impl<A: Actuator> Robot<A> {
    /// Bundles the robot's actuators.
    pub fn new(drivetrain: Drivetrain<A>, arm: A, intake: A, flywheel: [A; 2]) -> Self {
        Self {
            drivetrain,
            arm,
            intake,
            flywheel,
        }
    }

    /// Spins both flywheel motors at `rpm`.
    pub fn set_flywheel(&mut self, rpm: f64) -> Result<(), DeviceError> {
        for motor in &mut self.flywheel {
            motor.set_velocity(rpm, VelocityUnit::Rpm)?;
        }
        Ok(())
    }

    /// Lets the flywheel spin down.
    pub fn stop_flywheel(&mut self) -> Result<(), DeviceError> {
        for motor in &mut self.flywheel {
            motor.stop(BrakeMode::Coast)?;
        }
        Ok(())
    }
}
