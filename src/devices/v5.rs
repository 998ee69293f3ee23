//! [`Actuator`] over vexide smart motors.

use std::f64::consts::TAU;

use vexide::smart::{
    PortError,
    motor::{self, Motor},
};

use super::{Actuator, BrakeMode, DeviceError, RotationUnit, VelocityUnit};

/// A smart motor plus the free speed of its cartridge, used to turn percent
/// commands into rpm.
pub struct VexMotor {
    motor:   Motor,
    port:    u8,
    max_rpm: f64,
}

impl VexMotor {
    /// Red cartridge.
    pub const RPM_100: f64 = 100.0;
    /// Green cartridge.
    pub const RPM_200: f64 = 200.0;
    /// Blue cartridge.
    pub const RPM_600: f64 = 600.0;

    /// Wraps `motor`; `max_rpm` is the cartridge speed that 100 percent
    /// maps to.
    pub fn new(motor: Motor, max_rpm: f64) -> Self {
        let port = motor.port_number();
        Self { motor, port, max_rpm }
    }

    fn fault(&self, error: PortError) -> DeviceError {
        match error {
            PortError::Disconnected { .. } => DeviceError::Disconnected { port: self.port },
            other => DeviceError::Fault {
                port:   self.port,
                reason: other.to_string(),
            },
        }
    }
}

impl From<BrakeMode> for motor::BrakeMode {
    fn from(mode: BrakeMode) -> Self {
        match mode {
            BrakeMode::Coast => motor::BrakeMode::Coast,
            BrakeMode::Brake => motor::BrakeMode::Brake,
            BrakeMode::Hold => motor::BrakeMode::Hold,
        }
    }
}

impl Actuator for VexMotor {
    fn port(&self) -> u8 { self.port }

    fn set_velocity(&mut self, value: f64, unit: VelocityUnit) -> Result<(), DeviceError> {
        let rpm = match unit {
            VelocityUnit::Percent => value.clamp(-100.0, 100.0) / 100.0 * self.max_rpm,
            VelocityUnit::Rpm => value.clamp(-self.max_rpm, self.max_rpm),
        };
        self.motor.set_velocity(rpm.round() as i32).map_err(|e| self.fault(e))
    }

    fn position(&self, unit: RotationUnit) -> Result<f64, DeviceError> {
        let angle = self.motor.position().map_err(|e| self.fault(e))?;
        Ok(unit.from_revolutions(angle.as_radians() / TAU))
    }

    fn stop(&mut self, mode: BrakeMode) -> Result<(), DeviceError> {
        self.motor.brake(mode.into()).map_err(|e| self.fault(e))
    }

    fn reset_position(&mut self) -> Result<(), DeviceError> { self.motor.reset_position().map_err(|e| self.fault(e)) }
}
