//! Teleoperation mapping.
//!
//! [`TeleopMapper::map`] turns one poll of the primary and partner
//! controllers into a [`TeleopFrame`]: per-side drive percentages, intake
//! and arm speeds, the flywheel speed, and any alignment presets whose
//! buttons fired this tick. [`TeleopMapper::apply`] sends a frame to the
//! robot. Keeping the two apart lets the mapping be tested without hardware.
//!
//! Two layouts exist, matching the two driver programs the robot ran:
//!
//! | Layout | Left side | Right side |
//! |---|---|---|
//! | Arcade | `axis3 + axis1` | `axis3 - axis1` |
//! | Tank | `axis3` | `axis2` |
//! | Tank, reversed | `-axis2` | `-axis3` |
//!
//! The reverse latch is set while Up is held and cleared while Down is held.

use std::time::Duration;

use heapless::Vec;
use log::{info, warn};

use crate::{
    config::DriveConfig,
    devices::{Actuator, BrakeMode, Clock, DeviceError, VelocityUnit},
    drivetrain::{Robot, Side},
    motion::{MotionError, executor::DriveExecutor},
    opcontrol::controller::{ControllerButton, ControllerInput},
};

/// How the sticks map to the drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveLayout {
    /// Left stick throttle, right stick steering.
    Arcade,
    /// One stick per side.
    Tank,
}

/// Teleop tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TeleopConfig {
    /// Stick layout.
    pub layout:              DriveLayout,
    /// Honour the Up/Down reverse latch (tank only).
    pub reverse_latch:       bool,
    /// Drive intake, arm and flywheel from the buttons.
    pub mechanisms:          bool,
    /// Fire alignment presets on their button edges.
    pub presets:             bool,
    /// Intake speed while R1 or R2 is held.
    pub intake_rpm:          f64,
    /// Arm speed while L1 or L2 is held.
    pub arm_rpm:             f64,
    /// Flywheel speed when no partner speed button is held.
    pub flywheel_rpm:        f64,
    /// Flywheel speed while partner X is held.
    pub flywheel_slow_rpm:   f64,
    /// Flywheel speed while partner A is held.
    pub flywheel_medium_rpm: f64,
    /// Period of the teleop loop.
    pub tick:                Duration,
}

impl TeleopConfig {
    /// The competition driver program: arcade drive, mechanisms and
    /// alignment presets.
    pub const DRIVER: TeleopConfig = TeleopConfig {
        layout:              DriveLayout::Arcade,
        reverse_latch:       false,
        mechanisms:          true,
        presets:             true,
        intake_rpm:          600.0,
        arm_rpm:             100.0,
        flywheel_rpm:        500.0,
        flywheel_slow_rpm:   57.0,
        flywheel_medium_rpm: 100.0,
        tick:                Duration::from_millis(20),
    };

    /// The selector program: tank drive with the reverse latch, nothing else.
    pub const TANK: TeleopConfig = TeleopConfig {
        layout: DriveLayout::Tank,
        reverse_latch: true,
        mechanisms: false,
        presets: false,
        ..TeleopConfig::DRIVER
    };
}

impl Default for TeleopConfig {
    fn default() -> Self { Self::DRIVER }
}

/// Flywheel speed plus a one-sided pivot, used to line up a shot from a
/// known spot on the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignPreset {
    /// Left side back 210°, flywheel 450 rpm. Primary Up released.
    RedP1,
    /// Left side back 210°, flywheel 370 rpm. Primary Down.
    RedP2,
    /// Left side back 110°, flywheel 450 rpm. Partner L1.
    RedP3,
    /// Left side back 110°, flywheel 360 rpm. Partner L2.
    RedP4,
    /// Right side back 210°, flywheel 450 rpm. Partner R1.
    BlueP1,
    /// Right side back 210°, flywheel 370 rpm. Partner R2.
    BlueP2,
    /// Right side back 110°, flywheel 450 rpm. Primary X.
    BlueP3,
    /// Right side back 110°, flywheel 360 rpm. Primary B.
    BlueP4,
}

impl AlignPreset {
    /// Flywheel speed for the shot, in rpm.
    pub const fn flywheel_rpm(self) -> f64 {
        match self {
            AlignPreset::RedP1 | AlignPreset::RedP3 | AlignPreset::BlueP1 | AlignPreset::BlueP3 => 450.0,
            AlignPreset::RedP2 | AlignPreset::BlueP2 => 370.0,
            AlignPreset::RedP4 | AlignPreset::BlueP4 => 360.0,
        }
    }

    /// Side whose wheels pivot.
    pub const fn side(self) -> Side {
        match self {
            AlignPreset::RedP1 | AlignPreset::RedP2 | AlignPreset::RedP3 | AlignPreset::RedP4 => Side::Left,
            _ => Side::Right,
        }
    }

    /// Wheel degrees of the pivot. The pivoting side always backs up.
    pub const fn degrees(self) -> f64 {
        match self {
            AlignPreset::RedP1 | AlignPreset::RedP2 | AlignPreset::BlueP1 | AlignPreset::BlueP2 => -210.0,
            _ => -110.0,
        }
    }
}

/// Everything one teleop tick asks of the robot.
#[derive(Clone, Debug, PartialEq)]
pub struct TeleopFrame {
    /// Left drive, percent.
    pub left:         f64,
    /// Right drive, percent.
    pub right:        f64,
    /// Intake rpm, `None` to stop.
    pub intake:       Option<f64>,
    /// Arm rpm, `None` to stop.
    pub arm:          Option<f64>,
    /// Flywheel rpm, `None` to leave it alone.
    pub flywheel_rpm: Option<f64>,
    /// Presets triggered this tick, in button order.
    pub presets:      Vec<AlignPreset, 8>,
}

/// Maps controller polls to robot commands. The only state is the reverse
/// latch.
#[derive(Clone, Debug)]
pub struct TeleopMapper {
    config:   TeleopConfig,
    reversed: bool,
}

impl TeleopMapper {
    /// Creates a mapper driving forwards.
    pub fn new(config: TeleopConfig) -> Self { Self { config, reversed: false } }

    /// Active tuning.
    pub fn config(&self) -> &TeleopConfig { &self.config }

    /// Whether the front and back of the robot are currently swapped.
    pub fn is_reversed(&self) -> bool { self.reversed }

    /// Maps one poll of both controllers.
    pub fn map(&mut self, primary: &ControllerInput, partner: &ControllerInput) -> TeleopFrame {
        if self.config.reverse_latch {
            self.update_latch(primary);
        }

        let (left, right) = match (self.config.layout, self.reversed) {
            (DriveLayout::Arcade, _) => (primary.axis3 + primary.axis1, primary.axis3 - primary.axis1),
            (DriveLayout::Tank, false) => (primary.axis3, primary.axis2),
            (DriveLayout::Tank, true) => (-primary.axis2, -primary.axis3),
        };

        let mut frame = TeleopFrame {
            left:         left.clamp(-100.0, 100.0),
            right:        right.clamp(-100.0, 100.0),
            intake:       None,
            arm:          None,
            flywheel_rpm: None,
            presets:      Vec::new(),
        };

        if self.config.mechanisms {
            // R1 feeds balls out, R2 pulls them in.
            frame.intake = dual_button(
                primary,
                ControllerButton::ButtonR1,
                ControllerButton::ButtonR2,
                -self.config.intake_rpm,
            );
            frame.arm = dual_button(
                primary,
                ControllerButton::ButtonL1,
                ControllerButton::ButtonL2,
                self.config.arm_rpm,
            );
            frame.flywheel_rpm = Some(if partner.button(ControllerButton::ButtonX).is_pressed() {
                self.config.flywheel_slow_rpm
            } else if partner.button(ControllerButton::ButtonA).is_pressed() {
                self.config.flywheel_medium_rpm
            } else {
                self.config.flywheel_rpm
            });
        }

        if self.config.presets {
            frame.presets = triggered_presets(primary, partner);
        }
        frame
    }

    fn update_latch(&mut self, primary: &ControllerInput) {
        let mut reversed = self.reversed;
        if primary.button(ControllerButton::ButtonUp).is_pressed() {
            reversed = true;
        }
        if primary.button(ControllerButton::ButtonDown).is_pressed() {
            reversed = false;
        }
        if reversed != self.reversed {
            info!("drive {}", if reversed { "reversed" } else { "forward" });
            self.reversed = reversed;
        }
    }

    /// Sends the continuous part of a frame to the robot. Device errors are
    /// logged and the remaining commands still go out.
    pub fn apply<A: Actuator>(&self, frame: &TeleopFrame, robot: &mut Robot<A>) {
        robot
            .drivetrain
            .drive_sides(frame.left, frame.right, VelocityUnit::Percent)
            .unwrap_or_else(|e| warn!("Drive Error: {}", e));

        if !self.config.mechanisms {
            return;
        }
        spin_or_stop(&mut robot.intake, frame.intake).unwrap_or_else(|e| warn!("Intake Error: {}", e));
        spin_or_stop(&mut robot.arm, frame.arm).unwrap_or_else(|e| warn!("Arm Error: {}", e));
        if let Some(rpm) = frame.flywheel_rpm {
            robot
                .set_flywheel(rpm)
                .unwrap_or_else(|e| warn!("Flywheel Error: {}", e));
        }
    }

    /// Maps, applies, then runs any presets that fired. The loop waits for
    /// a preset's pivot to finish before the next poll.
    pub async fn tick<A: Actuator, C: Clock + ?Sized>(
        &mut self,
        primary: &ControllerInput,
        partner: &ControllerInput,
        robot: &mut Robot<A>,
        clock: &mut C,
        drive: &DriveConfig,
    ) -> TeleopFrame {
        let frame = self.map(primary, partner);
        self.apply(&frame, robot);
        for preset in &frame.presets {
            run_preset(*preset, robot, clock, drive)
                .await
                .unwrap_or_else(|e| warn!("Preset {:?} Error: {}", preset, e));
        }
        frame
    }
}

/// Spins up the flywheel for the preset's shot and pivots into line.
pub async fn run_preset<A: Actuator, C: Clock + ?Sized>(
    preset: AlignPreset,
    robot: &mut Robot<A>,
    clock: &mut C,
    drive: &DriveConfig,
) -> Result<(), MotionError> {
    info!("align preset {:?}", preset);
    robot.set_flywheel(preset.flywheel_rpm())?;
    DriveExecutor::new(&mut robot.drivetrain, clock, *drive)
        .pivot(preset.side(), preset.degrees())
        .await?;
    Ok(())
}

/// `rpm` while `first` is held, `-rpm` while only `second` is held.
fn dual_button(input: &ControllerInput, first: ControllerButton, second: ControllerButton, rpm: f64) -> Option<f64> {
    if input.button(first).is_pressed() {
        Some(rpm)
    } else if input.button(second).is_pressed() {
        Some(-rpm)
    } else {
        None
    }
}

fn triggered_presets(primary: &ControllerInput, partner: &ControllerInput) -> Vec<AlignPreset, 8> {
    let bindings = [
        (partner.button(ControllerButton::ButtonL1).is_now_pressed(), AlignPreset::RedP3),
        (partner.button(ControllerButton::ButtonL2).is_now_pressed(), AlignPreset::RedP4),
        (partner.button(ControllerButton::ButtonR1).is_now_pressed(), AlignPreset::BlueP1),
        (partner.button(ControllerButton::ButtonR2).is_now_pressed(), AlignPreset::BlueP2),
        (primary.button(ControllerButton::ButtonUp).is_now_released(), AlignPreset::RedP1),
        (primary.button(ControllerButton::ButtonDown).is_now_pressed(), AlignPreset::RedP2),
        (primary.button(ControllerButton::ButtonX).is_now_pressed(), AlignPreset::BlueP3),
        (primary.button(ControllerButton::ButtonB).is_now_pressed(), AlignPreset::BlueP4),
    ];
    bindings
        .into_iter()
        .filter_map(|(fired, preset)| fired.then_some(preset))
        .collect()
}

fn spin_or_stop<A: Actuator>(actuator: &mut A, rpm: Option<f64>) -> Result<(), DeviceError> {
    match rpm {
        Some(rpm) => actuator.set_velocity(rpm, VelocityUnit::Rpm),
        None => actuator.stop(BrakeMode::Coast),
    }
}
