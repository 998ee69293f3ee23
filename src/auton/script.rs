//! Autonomous script runner.
//!
//! A routine is a flat list of [`Command`]s with tuned literal parameters.
//! [`ScriptRunner`] executes them in order against a [`Robot`], awaiting each
//! step before starting the next.

use std::time::Duration;

use log::{info, warn};
use snafu::{ResultExt, Snafu};

use crate::{
    config::{DriveConfig, ProfileConfig},
    devices::{Actuator, BrakeMode, Clock, VelocityUnit},
    drivetrain::{Robot, Side, Wheel},
    motion::{
        MotionError,
        executor::{DriveExecutor, rotate_for},
    },
};

/// Extra settle time a spin turn waits after its own delay, before moving.
const SPIN_TURN_SETTLE: Duration = Duration::from_millis(150);

/// One step of an autonomous routine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Profiled straight drive, `inches` signed, cap in percent.
    Forward { inches: f64, max: f64 },
    /// Profiled straight drive at full speed.
    ForwardFull { inches: f64 },
    /// Profiled point turn by wheel degrees, positive to the right.
    Turn { degrees: f64, max: f64 },
    /// Constant-rpm turn watched by the reference wheel, positive to the
    /// right. Waits `wait` plus a short settle before moving.
    SpinTurn { degrees: f64, rpm: f64, wait: Duration },
    /// Rotates one side's wheels by wheel degrees.
    Pivot { side: Side, degrees: f64 },
    /// Trims the front encoders back into agreement.
    Correct,
    /// Stops every drive wheel.
    Stop(BrakeMode),
    /// Does nothing for a while.
    Pause(Duration),
    /// Backs into the wall at `rpm` to square up.
    WallReset { total: Duration, rpm: f64 },
    /// Moves the arm by `revs` at `rpm`, then stops it with `then`.
    Arm { revs: f64, rpm: f64, then: BrakeMode },
    /// Spins the intake at a signed rpm.
    Intake(f64),
    /// Lets the intake coast.
    IntakeStop,
    /// Spins both flywheel motors up to (or changes them to) `rpm`.
    Flywheel(f64),
    /// Lets the flywheel spin down.
    FlywheelStop,
}

impl Command {
    /// Arm up by the standard lift.
    pub const fn arm_up(revs: f64, rpm: f64) -> Command {
        Command::Arm {
            revs,
            rpm,
            then: BrakeMode::Hold,
        }
    }

    /// Arm down by the standard lift.
    pub const fn arm_down(revs: f64, rpm: f64) -> Command {
        Command::Arm {
            revs: -revs,
            rpm,
            then: BrakeMode::Hold,
        }
    }

    pub const fn pause_ms(ms: u64) -> Command { Command::Pause(Duration::from_millis(ms)) }

    /// The same step run from the other side of the field: turns go the
    /// other way and pivots use the other side.
    pub fn mirrored(self) -> Command {
        match self {
            Command::Turn { degrees, max } => Command::Turn { degrees: -degrees, max },
            Command::SpinTurn { degrees, rpm, wait } => Command::SpinTurn {
                degrees: -degrees,
                rpm,
                wait,
            },
            Command::Pivot { side, degrees } => Command::Pivot {
                side: side.opposite(),
                degrees,
            },
            other => other,
        }
    }

    /// Variant name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Forward { .. } => "forward",
            Command::ForwardFull { .. } => "forward_full",
            Command::Turn { .. } => "turn",
            Command::SpinTurn { .. } => "spin_turn",
            Command::Pivot { .. } => "pivot",
            Command::Correct => "correct",
            Command::Stop(_) => "stop",
            Command::Pause(_) => "pause",
            Command::WallReset { .. } => "wall_reset",
            Command::Arm { .. } => "arm",
            Command::Intake(_) => "intake",
            Command::IntakeStop => "intake_stop",
            Command::Flywheel(_) => "flywheel",
            Command::FlywheelStop => "flywheel_stop",
        }
    }
}

/// A named, tuned sequence of commands and the forward profile it was tuned
/// with.
#[derive(Clone, Debug, PartialEq)]
pub struct Routine {
    pub name:    &'static str,
    pub forward: ProfileConfig,
    pub steps:   Vec<Command>,
}

impl Routine {
    /// The routine for the opposite alliance.
    pub fn mirrored(&self, name: &'static str) -> Routine {
        Routine {
            name,
            forward: self.forward,
            steps: self.steps.iter().map(|step| step.mirrored()).collect(),
        }
    }
}

/// A routine step that failed.
#[derive(Debug, Snafu)]
pub enum ScriptError {
    #[snafu(display("step {step} ({name}) failed: {source}"))]
    Step {
        /// Zero-based index of the failing step.
        step:   usize,
        /// Command name.
        name:   &'static str,
        /// What the motion reported.
        source: MotionError,
    },
}

/// Summary of a routine run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// Steps executed, including ones that timed out.
    pub steps:      usize,
    /// Steps that ran out of their tick budget.
    pub incomplete: usize,
    /// Clock time from the first step to the last.
    pub elapsed:    Duration,
}

/// Runs routines against the robot.
///
/// A step that times out is logged and skipped by default, since a routine
/// pushing against a field element should still finish. Device faults always
/// abort the routine.
pub struct ScriptRunner<'a, A, C: ?Sized> {
    robot:               &'a mut Robot<A>,
    clock:               &'a mut C,
    config:              DriveConfig,
    spin_reference:      Wheel,
    abort_on_incomplete: bool,
}

impl<'a, A: Actuator, C: Clock + ?Sized> ScriptRunner<'a, A, C> {
    /// Borrows the robot and clock. Spin turns watch the left back wheel
    /// unless told otherwise.
    pub fn new(robot: &'a mut Robot<A>, clock: &'a mut C, config: DriveConfig) -> Self {
        Self {
            robot,
            clock,
            config,
            spin_reference: Wheel::LeftBack,
            abort_on_incomplete: false,
        }
    }

    /// Wheel whose encoder ends spin turns.
    pub fn with_spin_reference(mut self, wheel: Wheel) -> Self {
        self.spin_reference = wheel;
        self
    }

    /// Stops the routine at the first step that runs out of ticks.
    pub fn abort_on_incomplete(mut self, abort: bool) -> Self {
        self.abort_on_incomplete = abort;
        self
    }

    /// Runs every step of `routine` with its forward profile.
    pub async fn run(&mut self, routine: &Routine) -> Result<ScriptReport, ScriptError> {
        info!("running {} ({} steps)", routine.name, routine.steps.len());
        let saved = self.config;
        self.config.forward = routine.forward;
        let result = self.run_steps(&routine.steps).await;
        self.config = saved;
        result
    }

    /// Runs `steps` in order with the runner's configuration.
    pub async fn run_steps(&mut self, steps: &[Command]) -> Result<ScriptReport, ScriptError> {
        let started = self.clock.now();
        let mut report = ScriptReport::default();
        for (step, command) in steps.iter().enumerate() {
            info!("step {step}: {command:?}");
            match self.step(command).await {
                Ok(()) => {}
                Err(e @ MotionError::Incomplete { .. }) if !self.abort_on_incomplete => {
                    warn!("step {step} ({}) timed out, continuing: {e}", command.name());
                    report.incomplete += 1;
                }
                Err(source) => {
                    return Err(source).context(StepSnafu {
                        step,
                        name: command.name(),
                    });
                }
            }
            report.steps += 1;
        }
        report.elapsed = self.clock.now().saturating_sub(started);
        info!(
            "routine done: {} steps, {} timed out, {}",
            report.steps,
            report.incomplete,
            humantime::format_duration(report.elapsed)
        );
        Ok(report)
    }

    /// Executes a single command.
    pub async fn step(&mut self, command: &Command) -> Result<(), MotionError> {
        match *command {
            Command::Forward { inches, max } => {
                self.drive().forward(inches, max).await?;
            }
            Command::ForwardFull { inches } => {
                self.drive().forward_full(inches).await?;
            }
            Command::Turn { degrees, max } => {
                self.drive().turn(degrees, max).await?;
            }
            Command::SpinTurn { degrees, rpm, wait } => {
                let reference = self.spin_reference;
                let mut drive = self.drive();
                drive.pause(wait + SPIN_TURN_SETTLE).await;
                drive.spin_turn(degrees, rpm, reference).await?;
            }
            Command::Pivot { side, degrees } => {
                self.drive().pivot(side, degrees).await?;
            }
            Command::Correct => {
                self.drive().correct().await?;
            }
            Command::Stop(mode) => self.drive().stop(mode)?,
            Command::Pause(duration) => self.clock.sleep(duration).await,
            Command::WallReset { total, rpm } => self.drive().wall_reset(total, rpm).await?,
            Command::Arm { revs, rpm, then } => {
                rotate_for(&mut self.robot.arm, &mut *self.clock, revs, rpm, then, &self.config).await?;
            }
            Command::Intake(rpm) => self.robot.intake.set_velocity(rpm, VelocityUnit::Rpm)?,
            Command::IntakeStop => self.robot.intake.stop(BrakeMode::Coast)?,
            Command::Flywheel(rpm) => self.robot.set_flywheel(rpm)?,
            Command::FlywheelStop => self.robot.stop_flywheel()?,
        }
        Ok(())
    }

    fn drive(&mut self) -> DriveExecutor<'_, A, C> {
        DriveExecutor::new(&mut self.robot.drivetrain, &mut *self.clock, self.config)
    }
}
