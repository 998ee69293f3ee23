//! Motion state machines.
//!
//! Each type here implements [`Motion`] and performs one control iteration
//! per [`Motion::tick`]. None of them sleep; that is the executor's job.
//!
//! | Move | Completion | Terminal stop |
//! |---|---|---|
//! | [`ProfiledMove`] | every wheel, or one reference wheel | configurable (hold) |
//! | [`SpinTurn`] | reference wheel degrees | coast |
//! | [`Pivot`] | both wheels of one side | brake |
//! | [`HeadingCorrection`] | front encoders agree | brake |
//! | [`RotateFor`] | single actuator | configurable |

use log::{debug, trace, warn};

use crate::{
    config::{DriveConfig, ProfileConfig, TurnCompletion},
    devices::{Actuator, BrakeMode, RotationUnit, VelocityUnit},
    drivetrain::{Drivetrain, Side, Wheel},
    motion::{Motion, MotionError, Phase, profile::WheelTarget, validate_displacement, validate_velocity},
};

/// Which completion rule a [`ProfiledMove`] uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Completion {
    All,
    Reference(Wheel),
}

/// A trapezoidal-profile move of all four wheels.
///
/// Every wheel is profiled against its own encoder. Wheels that arrive early
/// are braked (repeatedly, which is harmless) while the rest catch up.
#[derive(Clone, Debug)]
pub struct ProfiledMove {
    name:           &'static str,
    displacements:  [f64; 4],
    max_velocity:   f64,
    profile:        ProfileConfig,
    completion:     Completion,
    terminal_brake: BrakeMode,
    targets:        Option<[WheelTarget; 4]>,
}

impl ProfiledMove {
    /// Drives straight for `inches` (negative drives backwards).
    pub fn forward(inches: f64, max_velocity: f64, config: &DriveConfig) -> Result<Self, MotionError> {
        let inches = validate_displacement(inches)?;
        let revolutions = config.inches_to_revolutions(inches);
        Ok(Self {
            name:           "forward",
            displacements:  [revolutions; 4],
            max_velocity:   validate_velocity(max_velocity)?,
            profile:        config.forward,
            completion:     Completion::All,
            terminal_brake: config.terminal_brake,
            targets:        None,
        })
    }

    /// Turns in place by `degrees` of wheel rotation; positive turns right
    /// (left wheels forward, right wheels backward).
    pub fn turn(degrees: f64, max_velocity: f64, config: &DriveConfig) -> Result<Self, MotionError> {
        let degrees = validate_displacement(degrees)?;
        let left = config.degrees_to_revolutions(degrees);
        let completion = match config.turn_completion {
            TurnCompletion::AllWheels => Completion::All,
            TurnCompletion::ReferenceWheel(wheel) => Completion::Reference(wheel),
        };
        Ok(Self {
            name: "turn",
            displacements: Wheel::ALL.map(|wheel| match wheel.side() {
                Side::Left => left,
                Side::Right => -left,
            }),
            max_velocity: validate_velocity(max_velocity)?,
            profile: config.turn,
            completion,
            terminal_brake: config.terminal_brake,
            targets: None,
        })
    }

    /// Per-wheel start and end positions, once the move has begun.
    pub fn targets(&self) -> Option<&[WheelTarget; 4]> { self.targets.as_ref() }

    fn is_done(&self, targets: &[WheelTarget; 4], positions: &[f64; 4]) -> bool {
        match self.completion {
            Completion::All => targets
                .iter()
                .zip(positions)
                .all(|(target, &current)| target.is_complete(current)),
            Completion::Reference(wheel) => {
                targets[wheel.index()].is_complete(positions[wheel.index()])
            }
        }
    }
}

impl<A: Actuator> Motion<Drivetrain<A>> for ProfiledMove {
    fn name(&self) -> &'static str { self.name }

    fn begin(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<Phase, MotionError> {
        if self.displacements.iter().all(|&d| d == 0.0) {
            return Ok(Phase::Complete);
        }

        // Breakaway: get every wheel rolling before feedback takes over.
        for wheel in Wheel::ALL {
            let direction = self.displacements[wheel.index()].signum();
            drivetrain
                .wheel_mut(wheel)
                .set_velocity(direction * self.profile.min_velocity, VelocityUnit::Percent)?;
        }

        let starts = drivetrain.positions(RotationUnit::Revolutions)?;
        let targets = Wheel::ALL.map(|wheel| {
            WheelTarget::new(starts[wheel.index()], self.displacements[wheel.index()])
        });
        debug!(
            "{} begins: {:.3} rev at up to {}%",
            self.name, self.displacements[0], self.max_velocity
        );
        self.targets = Some(targets);
        Ok(Phase::Running)
    }

    fn tick(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<Phase, MotionError> {
        let Some(targets) = self.targets else {
            return Ok(Phase::Complete);
        };
        let positions = drivetrain.positions(RotationUnit::Revolutions)?;
        if self.is_done(&targets, &positions) {
            return Ok(Phase::Complete);
        }

        for wheel in Wheel::ALL {
            let target = &targets[wheel.index()];
            let current = positions[wheel.index()];
            if target.is_complete(current) {
                drivetrain.wheel_mut(wheel).stop(BrakeMode::Brake)?;
            } else {
                let velocity = self.profile.velocity(target, current, self.max_velocity);
                trace!("{:?} at {:.3} rev -> {:.1}%", wheel, current, velocity);
                drivetrain
                    .wheel_mut(wheel)
                    .set_velocity(velocity, VelocityUnit::Percent)?;
            }
        }
        Ok(Phase::Running)
    }

    fn finish(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<(), MotionError> {
        // Also reached when `begin` failed halfway through the breakaway.
        if self.displacements.iter().any(|&d| d != 0.0) {
            drivetrain.stop(self.terminal_brake)?;
        }
        Ok(())
    }

    fn remaining(&self, drivetrain: &Drivetrain<A>) -> Vec<f64> {
        match (self.targets, drivetrain.positions(RotationUnit::Revolutions)) {
            (Some(targets), Ok(positions)) => targets
                .iter()
                .zip(positions)
                .map(|(target, current)| target.remaining(current))
                .collect(),
            _ => self.displacements.map(f64::abs).to_vec(),
        }
    }
}

/// A constant-speed turn that watches a single wheel.
///
/// The reference wheel's encoder is zeroed first; the left side spins at
/// `rpm` and the right side at `-rpm` (mirrored for negative angles) until
/// the reference wheel has turned `degrees`. The motors then coast.
#[derive(Clone, Debug)]
pub struct SpinTurn {
    degrees:   f64,
    rpm:       f64,
    reference: Wheel,
}

impl SpinTurn {
    /// Positive `degrees` turns right.
    pub fn new(degrees: f64, rpm: f64, reference: Wheel) -> Result<Self, MotionError> {
        Ok(Self {
            degrees: validate_displacement(degrees)?,
            rpm: validate_velocity(rpm)?,
            reference,
        })
    }
}

impl<A: Actuator> Motion<Drivetrain<A>> for SpinTurn {
    fn name(&self) -> &'static str { "spin turn" }

    fn begin(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<Phase, MotionError> {
        if self.degrees == 0.0 {
            return Ok(Phase::Complete);
        }
        drivetrain.wheel_mut(self.reference).reset_position()?;
        Ok(Phase::Running)
    }

    fn tick(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<Phase, MotionError> {
        let turned = drivetrain
            .wheel(self.reference)
            .position(RotationUnit::Degrees)?
            .abs();
        if turned >= self.degrees.abs() {
            return Ok(Phase::Complete);
        }
        let speed = self.degrees.signum() * self.rpm;
        drivetrain.drive_sides(speed, -speed, VelocityUnit::Rpm)?;
        Ok(Phase::Running)
    }

    fn finish(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<(), MotionError> {
        if self.degrees != 0.0 {
            drivetrain.stop(BrakeMode::Coast)?;
        }
        Ok(())
    }

    fn remaining(&self, drivetrain: &Drivetrain<A>) -> Vec<f64> {
        let turned = drivetrain
            .wheel(self.reference)
            .position(RotationUnit::Degrees)
            .map(f64::abs)
            .unwrap_or(0.0);
        vec![((self.degrees.abs() - turned) / 360.0).max(0.0)]
    }
}

/// Rotates the two wheels of one side by a fixed angle, leaving the other
/// side alone.
#[derive(Clone, Debug)]
pub struct Pivot {
    side:     Side,
    degrees:  f64,
    velocity: f64,
    targets:  Option<[(Wheel, WheelTarget); 2]>,
}

impl Pivot {
    /// Rotates `side` by `degrees` of wheel rotation at `velocity` percent.
    pub fn new(side: Side, degrees: f64, velocity: f64) -> Result<Self, MotionError> {
        Ok(Self {
            side,
            degrees: validate_displacement(degrees)?,
            velocity: validate_velocity(velocity)?,
            targets: None,
        })
    }

    fn wheels(&self) -> [Wheel; 2] {
        match self.side {
            Side::Left => [Wheel::LeftFront, Wheel::LeftBack],
            Side::Right => [Wheel::RightFront, Wheel::RightBack],
        }
    }
}

impl<A: Actuator> Motion<Drivetrain<A>> for Pivot {
    fn name(&self) -> &'static str { "pivot" }

    fn begin(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<Phase, MotionError> {
        if self.degrees == 0.0 {
            return Ok(Phase::Complete);
        }
        let revolutions = self.degrees / 360.0;
        let mut targets = [(Wheel::LeftFront, WheelTarget::new(0.0, 0.0)); 2];
        for (slot, wheel) in targets.iter_mut().zip(self.wheels()) {
            let start = drivetrain.wheel(wheel).position(RotationUnit::Revolutions)?;
            *slot = (wheel, WheelTarget::new(start, revolutions));
        }
        self.targets = Some(targets);
        for wheel in self.wheels() {
            drivetrain
                .wheel_mut(wheel)
                .set_velocity(self.degrees.signum() * self.velocity, VelocityUnit::Percent)?;
        }
        Ok(Phase::Running)
    }

    fn tick(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<Phase, MotionError> {
        let Some(targets) = self.targets else {
            return Ok(Phase::Complete);
        };
        let mut done = true;
        for (wheel, target) in targets {
            let current = drivetrain.wheel(wheel).position(RotationUnit::Revolutions)?;
            if target.is_complete(current) {
                drivetrain.wheel_mut(wheel).stop(BrakeMode::Brake)?;
            } else {
                done = false;
            }
        }
        Ok(if done { Phase::Complete } else { Phase::Running })
    }

    fn finish(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<(), MotionError> {
        if self.degrees == 0.0 {
            return Ok(());
        }
        // Both wheels are attempted; `begin` may have failed between them.
        let mut result = Ok(());
        for wheel in self.wheels() {
            if let Err(e) = drivetrain.wheel_mut(wheel).stop(BrakeMode::Brake) {
                warn!("pivot could not stop {:?} on port {}", wheel, drivetrain.wheel(wheel).port());
                if result.is_ok() {
                    result = Err(e.into());
                }
            }
        }
        result
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CorrectionStage {
    LeftAhead,
    RightAhead,
    Done,
}

/// Reactive trim that brings the front encoders back into agreement.
///
/// While the left front encoder reads ahead of the right front one, the left
/// side backs up and the right side drives forward at a low speed; then the
/// opposite case is handled the same way. There is no hysteresis band, so
/// noisy encoders can make it hunt.
#[derive(Clone, Debug)]
pub struct HeadingCorrection {
    rpm:        f64,
    stage:      CorrectionStage,
    commanding: bool,
    commanded:  bool,
}

impl HeadingCorrection {
    /// Nudges at `rpm` (taken as a magnitude).
    pub fn new(rpm: f64) -> Result<Self, MotionError> {
        Ok(Self {
            rpm:        validate_velocity(rpm.abs())?,
            stage:      CorrectionStage::LeftAhead,
            commanding: false,
            commanded:  false,
        })
    }

    fn skew<A: Actuator>(drivetrain: &Drivetrain<A>) -> Result<f64, MotionError> {
        let left = drivetrain.wheel(Wheel::LeftFront).position(RotationUnit::Degrees)?;
        let right = drivetrain.wheel(Wheel::RightFront).position(RotationUnit::Degrees)?;
        Ok(left - right)
    }

    fn settle<A: Actuator>(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<(), MotionError> {
        if self.commanding {
            drivetrain.stop(BrakeMode::Brake)?;
            self.commanding = false;
        }
        Ok(())
    }
}

impl<A: Actuator> Motion<Drivetrain<A>> for HeadingCorrection {
    fn name(&self) -> &'static str { "heading correction" }

    fn begin(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<Phase, MotionError> {
        if Self::skew(drivetrain)? == 0.0 {
            self.stage = CorrectionStage::Done;
            return Ok(Phase::Complete);
        }
        Ok(Phase::Running)
    }

    fn tick(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<Phase, MotionError> {
        loop {
            let skew = Self::skew(drivetrain)?;
            match self.stage {
                CorrectionStage::LeftAhead if skew > 0.0 => {
                    // Marked first so a fault partway through still gets braked.
                    self.commanding = true;
                    self.commanded = true;
                    drivetrain.drive_sides(-self.rpm, self.rpm, VelocityUnit::Rpm)?;
                    return Ok(Phase::Running);
                }
                CorrectionStage::LeftAhead => {
                    self.settle(drivetrain)?;
                    self.stage = CorrectionStage::RightAhead;
                }
                CorrectionStage::RightAhead if skew < 0.0 => {
                    self.commanding = true;
                    self.commanded = true;
                    drivetrain.drive_sides(self.rpm, -self.rpm, VelocityUnit::Rpm)?;
                    return Ok(Phase::Running);
                }
                CorrectionStage::RightAhead => {
                    self.settle(drivetrain)?;
                    self.stage = CorrectionStage::Done;
                }
                CorrectionStage::Done => return Ok(Phase::Complete),
            }
        }
    }

    fn finish(&mut self, drivetrain: &mut Drivetrain<A>) -> Result<(), MotionError> {
        if self.commanded {
            drivetrain.stop(BrakeMode::Brake)?;
        }
        Ok(())
    }
}

/// Turns a single actuator by a fixed number of revolutions, then stops it.
///
/// Used for mechanisms such as the arm.
#[derive(Clone, Debug)]
pub struct RotateFor {
    revolutions: f64,
    rpm:         f64,
    then:        BrakeMode,
    target:      Option<WheelTarget>,
}

impl RotateFor {
    /// Rotates by `revolutions` (signed) at `rpm`, stopping with `then`.
    pub fn new(revolutions: f64, rpm: f64, then: BrakeMode) -> Result<Self, MotionError> {
        Ok(Self {
            revolutions: validate_displacement(revolutions)?,
            rpm: validate_velocity(rpm.abs())?,
            then,
            target: None,
        })
    }
}

impl<A: Actuator> Motion<A> for RotateFor {
    fn name(&self) -> &'static str { "rotate for" }

    fn begin(&mut self, actuator: &mut A) -> Result<Phase, MotionError> {
        if self.revolutions == 0.0 {
            return Ok(Phase::Complete);
        }
        let start = actuator.position(RotationUnit::Revolutions)?;
        let target = WheelTarget::new(start, self.revolutions);
        actuator.set_velocity(target.direction * self.rpm, VelocityUnit::Rpm)?;
        self.target = Some(target);
        Ok(Phase::Running)
    }

    fn tick(&mut self, actuator: &mut A) -> Result<Phase, MotionError> {
        let Some(target) = self.target else {
            return Ok(Phase::Complete);
        };
        let current = actuator.position(RotationUnit::Revolutions)?;
        Ok(if target.is_complete(current) {
            Phase::Complete
        } else {
            Phase::Running
        })
    }

    fn finish(&mut self, actuator: &mut A) -> Result<(), MotionError> {
        if self.target.is_some() {
            actuator.stop(self.then)?;
        }
        Ok(())
    }

    fn remaining(&self, actuator: &A) -> Vec<f64> {
        match (self.target, actuator.position(RotationUnit::Revolutions)) {
            (Some(target), Ok(current)) => vec![target.remaining(current)],
            _ => vec![self.revolutions.abs()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{
        DeviceError,
        sim::{SimCommand, SimMotor},
    };

    fn drivetrain() -> ([SimMotor; 4], Drivetrain<SimMotor>) {
        let motors = [SimMotor::new(1), SimMotor::new(2), SimMotor::new(3), SimMotor::new(4)];
        (motors.clone(), Drivetrain::new(motors))
    }

    #[test]
    fn forward_breakaway_then_targets() {
        let (motors, mut dt) = drivetrain();
        motors[2].set_position(3.0);
        let config = DriveConfig::default();
        let mut motion = ProfiledMove::forward(config.wheel_circumference * 2.0, 80.0, &config).unwrap();
        assert_eq!(motion.begin(&mut dt).unwrap(), Phase::Running);

        for motor in &motors {
            assert_eq!(motor.commands(), vec![SimCommand::Velocity {
                value: 50.0,
                unit:  VelocityUnit::Percent,
            }]);
        }
        let targets = motion.targets().unwrap();
        assert_eq!(targets[2].start, 3.0);
        assert!((targets[2].end - 5.0).abs() < 1e-12);
    }

    #[test]
    fn early_wheel_is_braked_while_others_run() {
        let (motors, mut dt) = drivetrain();
        let config = DriveConfig::default();
        let mut motion = ProfiledMove::forward(config.wheel_circumference, 80.0, &config).unwrap();
        motion.begin(&mut dt).unwrap();
        motors[0].set_position(1.2);
        motors[1].set_position(0.5);

        assert_eq!(motion.tick(&mut dt).unwrap(), Phase::Running);
        assert_eq!(motors[0].commands().last(), Some(&SimCommand::Stop(BrakeMode::Brake)));
        assert!(matches!(
            motors[1].commands().last(),
            Some(SimCommand::Velocity { value, .. }) if *value > 0.0
        ));

        for motor in &motors {
            motor.set_position(1.0);
        }
        assert_eq!(motion.tick(&mut dt).unwrap(), Phase::Complete);
    }

    #[test]
    fn zero_forward_issues_nothing() {
        let (motors, mut dt) = drivetrain();
        let config = DriveConfig::default();
        let mut motion = ProfiledMove::forward(0.0, 55.0, &config).unwrap();
        assert_eq!(motion.begin(&mut dt).unwrap(), Phase::Complete);
        motion.finish(&mut dt).unwrap();
        assert!(motors.iter().all(|m| m.commands().is_empty()));
    }

    #[test]
    fn turn_splits_sides() {
        let (motors, mut dt) = drivetrain();
        let config = DriveConfig::default();
        let mut motion = ProfiledMove::turn(90.0, 70.0, &config).unwrap();
        motion.begin(&mut dt).unwrap();
        let targets = motion.targets().unwrap();
        assert_eq!(targets[Wheel::LeftBack.index()].end, 0.25);
        assert_eq!(targets[Wheel::RightFront.index()].end, -0.25);
        assert_eq!(motors[3].commands(), vec![SimCommand::Velocity {
            value: -20.0,
            unit:  VelocityUnit::Percent,
        }]);
    }

    #[test]
    fn reference_wheel_turn_ignores_lagging_wheels() {
        let (motors, mut dt) = drivetrain();
        let config = DriveConfig {
            turn_completion: TurnCompletion::ReferenceWheel(Wheel::LeftBack),
            ..DriveConfig::default()
        };
        let mut motion = ProfiledMove::turn(-180.0, 70.0, &config).unwrap();
        motion.begin(&mut dt).unwrap();
        motors[1].set_position(-0.5);
        assert_eq!(motion.tick(&mut dt).unwrap(), Phase::Complete);
    }

    #[test]
    fn spin_turn_watches_reference_wheel() {
        let (motors, mut dt) = drivetrain();
        motors[1].set_position(12.0);
        let mut motion = SpinTurn::new(-173.0, 70.0, Wheel::LeftBack).unwrap();
        motion.begin(&mut dt).unwrap();
        assert_eq!(motors[1].revolutions(), 0.0);

        assert_eq!(motion.tick(&mut dt).unwrap(), Phase::Running);
        assert_eq!(motors[0].velocity_rpm(), -70.0);
        assert_eq!(motors[2].velocity_rpm(), 70.0);

        motors[1].set_position(-0.5);
        assert_eq!(motion.tick(&mut dt).unwrap(), Phase::Complete);
        motion.finish(&mut dt).unwrap();
        assert_eq!(motors[2].commands().last(), Some(&SimCommand::Stop(BrakeMode::Coast)));
    }

    #[test]
    fn pivot_moves_one_side_only() {
        let (motors, mut dt) = drivetrain();
        let mut motion = Pivot::new(Side::Right, -210.0, 50.0).unwrap();
        motion.begin(&mut dt).unwrap();
        assert!(motors[0].commands().is_empty());
        assert_eq!(motors[2].velocity_rpm(), -100.0);

        motors[2].set_position(-0.6);
        assert_eq!(motion.tick(&mut dt).unwrap(), Phase::Running);
        motors[3].set_position(-0.6);
        assert_eq!(motion.tick(&mut dt).unwrap(), Phase::Complete);
    }

    #[test]
    fn pivot_brakes_its_side_when_a_wheel_drops_out() {
        let (motors, mut dt) = drivetrain();
        motors[3].disconnect();
        let mut motion = Pivot::new(Side::Right, -210.0, 50.0).unwrap();
        assert!(matches!(
            motion.begin(&mut dt),
            Err(MotionError::Device { source: DeviceError::Disconnected { port: 4 } })
        ));
        assert!(motion.finish(&mut dt).is_err());
        assert_eq!(motors[2].commands().last(), Some(&SimCommand::Stop(BrakeMode::Brake)));
        assert_eq!(motors[2].velocity_rpm(), 0.0);
        assert!(motors[0].commands().is_empty());
    }

    #[test]
    fn pivot_fault_after_first_command_still_stops() {
        let (motors, mut dt) = drivetrain();
        let mut motion = Pivot::new(Side::Left, 90.0, 50.0).unwrap();
        motion.begin(&mut dt).unwrap();
        assert_eq!(motors[0].velocity_rpm(), 100.0);
        motors[1].disconnect();
        assert!(motion.tick(&mut dt).is_err());
        assert!(motion.finish(&mut dt).is_err());
        assert_eq!(motors[0].commands().last(), Some(&SimCommand::Stop(BrakeMode::Brake)));
        assert_eq!(motors[0].velocity_rpm(), 0.0);
    }

    #[test]
    fn heading_correction_handles_both_stages() {
        let (motors, mut dt) = drivetrain();
        motors[0].set_position(0.1);
        let mut motion = HeadingCorrection::new(15.0).unwrap();
        assert_eq!(motion.begin(&mut dt).unwrap(), Phase::Running);

        assert_eq!(motion.tick(&mut dt).unwrap(), Phase::Running);
        assert_eq!(motors[0].velocity_rpm(), -15.0);
        assert_eq!(motors[2].velocity_rpm(), 15.0);

        // Overshoot: the right side is now ahead.
        motors[0].set_position(-0.05);
        assert_eq!(motion.tick(&mut dt).unwrap(), Phase::Running);
        assert_eq!(motors[0].velocity_rpm(), 15.0);

        motors[0].set_position(0.0);
        assert_eq!(motion.tick(&mut dt).unwrap(), Phase::Complete);
    }

    #[test]
    fn correction_fault_brakes_wheels_already_moving() {
        let (motors, mut dt) = drivetrain();
        motors[0].set_position(0.1);
        motors[3].disconnect();
        let mut motion = HeadingCorrection::new(15.0).unwrap();
        assert_eq!(motion.begin(&mut dt).unwrap(), Phase::Running);
        assert!(motion.tick(&mut dt).is_err());
        assert_eq!(motors[2].velocity_rpm(), 15.0);

        assert!(motion.finish(&mut dt).is_err());
        for motor in &motors[..3] {
            assert_eq!(motor.commands().last(), Some(&SimCommand::Stop(BrakeMode::Brake)));
            assert_eq!(motor.velocity_rpm(), 0.0);
        }
    }

    #[test]
    fn aligned_encoders_need_no_correction() {
        let (motors, mut dt) = drivetrain();
        let mut motion = HeadingCorrection::new(15.0).unwrap();
        assert_eq!(motion.begin(&mut dt).unwrap(), Phase::Complete);
        motion.finish(&mut dt).unwrap();
        assert!(motors.iter().all(|m| m.commands().is_empty()));
    }

    #[test]
    fn rotate_for_holds_at_target() {
        let mut arm = SimMotor::new(19);
        let mut motion = RotateFor::new(-0.22, 25.0, BrakeMode::Hold).unwrap();
        motion.begin(&mut arm).unwrap();
        assert_eq!(arm.velocity_rpm(), -25.0);
        assert_eq!(motion.tick(&mut arm).unwrap(), Phase::Running);
        arm.set_position(-0.22);
        assert_eq!(motion.tick(&mut arm).unwrap(), Phase::Complete);
        motion.finish(&mut arm).unwrap();
        assert_eq!(arm.commands().last(), Some(&SimCommand::Stop(BrakeMode::Hold)));
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let config = DriveConfig::default();
        assert!(matches!(
            ProfiledMove::forward(10.0, f64::NAN, &config),
            Err(MotionError::InvalidVelocity { .. })
        ));
        assert!(matches!(
            ProfiledMove::turn(f64::INFINITY, 50.0, &config),
            Err(MotionError::InvalidDisplacement { .. })
        ));
        assert!(SpinTurn::new(90.0, 0.0, Wheel::LeftBack).is_err());
    }
}
