//! Drive executor.
//!
//! [`run_motion`] steps a [`Motion`] on a fixed tick until it completes, the
//! tick budget runs out, or an actuator fails. In every case the motion's
//! terminal stop is issued before returning, so the hardware is never left
//! spinning.
//!
//! [`DriveExecutor`] wraps the runner with the robot's drive configuration
//! and exposes one method per drive operation.
//!
//! # Example
//!
//! ```ignore
//! use aviator::{config::DriveConfig, drivetrain::{Side, Wheel}, motion::executor::DriveExecutor};
//!
//! let mut drive = DriveExecutor::new(&mut robot.drivetrain, &mut clock, DriveConfig::default());
//! drive.forward(23.0, 95.0).await?;
//! drive.spin_turn(-173.0, 70.0, Wheel::LeftBack).await?;
//! drive.pivot(Side::Left, 210.0).await?;
//! drive.correct().await?;
//! ```

use std::time::Duration;

use log::{debug, info, warn};

use crate::{
    config::DriveConfig,
    devices::{Actuator, BrakeMode, Clock, VelocityUnit},
    drivetrain::{Drivetrain, Side, Wheel},
    motion::{
        Motion, MotionError, Phase,
        moves::{HeadingCorrection, Pivot, ProfiledMove, RotateFor, SpinTurn},
        validate_velocity,
    },
};

/// Share of a wall reset spent driving into the wall.
const WALL_RESET_DRIVE_FRACTION: f64 = 0.65;

/// Outcome of a completed motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionReport {
    /// Control iterations run, not counting `begin`.
    pub ticks:   u32,
    /// Clock time between `begin` and the terminal stop.
    pub elapsed: Duration,
}

/// Runs `motion` against `plant` until it completes.
///
/// `max_ticks` bounds the number of control iterations; `None` waits
/// forever. When the budget runs out the terminal stop is issued and
/// [`MotionError::Incomplete`] is returned with the distance left per
/// actuator, even if that stop fails. Device faults also issue a
/// best-effort terminal stop before they propagate.
///
/// The clock is awaited between ticks; dropping the future between ticks
/// leaves the last command applied.
pub async fn run_motion<P, M, C>(
    plant: &mut P,
    clock: &mut C,
    motion: &mut M,
    tick: Duration,
    max_ticks: Option<u32>,
) -> Result<MotionReport, MotionError>
where
    P: ?Sized,
    M: Motion<P> + ?Sized,
    C: Clock + ?Sized,
{
    let started = clock.now();
    let mut ticks = 0;

    let mut phase = match motion.begin(plant) {
        Ok(phase) => phase,
        Err(e) => return Err(abort(plant, motion, e)),
    };

    while phase == Phase::Running {
        if max_ticks.is_some_and(|max| ticks >= max) {
            let remaining = motion.remaining(plant);
            warn!(
                "{} gave up after {} ticks with {:?} rev remaining",
                motion.name(),
                ticks,
                remaining
            );
            if let Err(e) = motion.finish(plant) {
                warn!("{} could not stop cleanly: {}", motion.name(), e);
            }
            return Err(MotionError::Incomplete { ticks, remaining });
        }

        phase = match motion.tick(plant) {
            Ok(phase) => phase,
            Err(e) => return Err(abort(plant, motion, e)),
        };
        ticks += 1;

        if phase == Phase::Running {
            clock.sleep(tick).await;
        }
    }

    motion.finish(plant)?;
    let elapsed = clock.now().saturating_sub(started);
    debug!("{} complete after {} ticks ({:?})", motion.name(), ticks, elapsed);
    Ok(MotionReport { ticks, elapsed })
}

fn abort<P, M>(plant: &mut P, motion: &mut M, error: MotionError) -> MotionError
where
    P: ?Sized,
    M: Motion<P> + ?Sized,
{
    warn!("{} aborted: {}", motion.name(), error);
    if let Err(e) = motion.finish(plant) {
        warn!("{} could not stop cleanly: {}", motion.name(), e);
    }
    error
}

/// Rotates a single mechanism actuator by `revolutions` at `rpm`, then stops
/// it with `then`.
pub async fn rotate_for<A, C>(
    actuator: &mut A,
    clock: &mut C,
    revolutions: f64,
    rpm: f64,
    then: BrakeMode,
    config: &DriveConfig,
) -> Result<MotionReport, MotionError>
where
    A: Actuator,
    C: Clock + ?Sized,
{
    let mut motion = RotateFor::new(revolutions, rpm, then)?;
    run_motion(actuator, clock, &mut motion, config.tick, config.max_ticks).await
}

/// Exclusive owner of the drivetrain for a sequence of drive operations.
pub struct DriveExecutor<'a, A, C: ?Sized> {
    drivetrain: &'a mut Drivetrain<A>,
    clock:      &'a mut C,
    config:     DriveConfig,
}

impl<'a, A: Actuator, C: Clock + ?Sized> DriveExecutor<'a, A, C> {
    /// Borrows the drivetrain and clock for as long as the executor lives.
    pub fn new(drivetrain: &'a mut Drivetrain<A>, clock: &'a mut C, config: DriveConfig) -> Self {
        Self {
            drivetrain,
            clock,
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &DriveConfig { &self.config }

    /// Runs any drive motion with this executor's tick and budget.
    pub async fn run<M: Motion<Drivetrain<A>> + ?Sized>(&mut self, motion: &mut M) -> Result<MotionReport, MotionError> {
        run_motion(
            &mut *self.drivetrain,
            &mut *self.clock,
            motion,
            self.config.tick,
            self.config.max_ticks,
        )
        .await
    }

    /// Drives `inches` in a straight line with a profiled velocity capped at
    /// `max_velocity` percent. Ends with the configured terminal brake.
    pub async fn forward(&mut self, inches: f64, max_velocity: f64) -> Result<MotionReport, MotionError> {
        let mut motion = ProfiledMove::forward(inches, max_velocity, &self.config)?;
        self.run(&mut motion).await
    }

    /// [`DriveExecutor::forward`] at full speed.
    pub async fn forward_full(&mut self, inches: f64) -> Result<MotionReport, MotionError> {
        self.forward(inches, 100.0).await
    }

    /// Profiled point turn by `degrees` of wheel rotation, positive to the
    /// right. Completion follows [`DriveConfig::turn_completion`].
    pub async fn turn(&mut self, degrees: f64, max_velocity: f64) -> Result<MotionReport, MotionError> {
        let mut motion = ProfiledMove::turn(degrees, max_velocity, &self.config)?;
        self.run(&mut motion).await
    }

    /// Constant-speed turn watched by one reference wheel, ending in coast.
    pub async fn spin_turn(&mut self, degrees: f64, rpm: f64, reference: Wheel) -> Result<MotionReport, MotionError> {
        let mut motion = SpinTurn::new(degrees, rpm, reference)?;
        self.run(&mut motion).await
    }

    /// Rotates only `side`'s wheels by `degrees`, then brakes them.
    pub async fn pivot(&mut self, side: Side, degrees: f64) -> Result<MotionReport, MotionError> {
        let mut motion = Pivot::new(side, degrees, self.config.pivot_velocity)?;
        self.run(&mut motion).await
    }

    /// Trims the front encoders back into agreement.
    pub async fn correct(&mut self) -> Result<MotionReport, MotionError> {
        let mut motion = HeadingCorrection::new(self.config.correction_rpm)?;
        self.run(&mut motion).await
    }

    /// Stops every wheel.
    pub fn stop(&mut self, mode: BrakeMode) -> Result<(), MotionError> {
        self.drivetrain.stop(mode)?;
        Ok(())
    }

    /// Backs into the field wall to square up.
    ///
    /// Every wheel runs at `-rpm` for most of `total`, then coasts for the
    /// rest of it so the robot settles against the wall.
    pub async fn wall_reset(&mut self, total: Duration, rpm: f64) -> Result<(), MotionError> {
        let rpm = validate_velocity(rpm)?;
        let driving = total.mul_f64(WALL_RESET_DRIVE_FRACTION);
        info!("wall reset at {rpm} rpm for {driving:?}");

        if let Err(e) = self.drivetrain.set_velocity(-rpm, VelocityUnit::Rpm) {
            let _ = self.drivetrain.stop(BrakeMode::Coast);
            return Err(e.into());
        }
        self.clock.sleep(driving).await;
        self.drivetrain.stop(BrakeMode::Coast)?;
        self.clock.sleep(total.saturating_sub(driving)).await;
        Ok(())
    }

    /// Sleeps on the executor's clock.
    pub async fn pause(&mut self, duration: Duration) { self.clock.sleep(duration).await; }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::{
        config::TurnCompletion,
        devices::{
            DeviceError, RotationUnit,
            sim::{self, SimClock, SimCommand, SimMotor},
        },
    };

    fn setup() -> (SimClock, Drivetrain<SimMotor>, [SimMotor; 4]) {
        let mut clock = SimClock::new();
        let drivetrain = sim::drivetrain(&mut clock);
        let handles = Wheel::ALL.map(|wheel| drivetrain.wheel(wheel).clone());
        (clock, drivetrain, handles)
    }

    fn velocities(motor: &SimMotor) -> Vec<f64> {
        motor
            .commands()
            .into_iter()
            .filter_map(|command| match command {
                SimCommand::Velocity { value, .. } => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Runs forever and cannot be stopped.
    struct Jammed;

    impl Motion<SimMotor> for Jammed {
        fn name(&self) -> &'static str { "jammed" }

        fn begin(&mut self, _motor: &mut SimMotor) -> Result<Phase, MotionError> { Ok(Phase::Running) }

        fn tick(&mut self, _motor: &mut SimMotor) -> Result<Phase, MotionError> { Ok(Phase::Running) }

        fn finish(&mut self, motor: &mut SimMotor) -> Result<(), MotionError> {
            Err(DeviceError::Fault {
                port:   motor.port(),
                reason: "brake stuck".into(),
            }
            .into())
        }
    }

    #[test]
    fn forward_commands_follow_displacement_sign() {
        for inches in [5.0, -5.0, 0.5, -6.2] {
            let (mut clock, mut dt, handles) = setup();
            let mut drive = DriveExecutor::new(&mut dt, &mut clock, DriveConfig::default());
            let report = block_on(drive.forward(inches, 80.0)).unwrap();
            assert!(report.ticks > 0);

            for motor in &handles {
                let commanded = velocities(motor);
                assert!(!commanded.is_empty());
                assert!(commanded.iter().all(|v| v.signum() == f64::signum(inches)));
                assert_eq!(motor.commands().last(), Some(&SimCommand::Stop(BrakeMode::Hold)));
            }
        }
    }

    #[test]
    fn forward_reaches_target() {
        let (mut clock, mut dt, handles) = setup();
        let config = DriveConfig::default();
        let target = config.inches_to_revolutions(23.0);
        block_on(DriveExecutor::new(&mut dt, &mut clock, config).forward(23.0, 95.0)).unwrap();
        for motor in &handles {
            let position = motor.revolutions();
            assert!(position >= target);
            // Overshoot is bounded by one tick at the highest commanded speed.
            assert!(position - target < 0.05, "{position}");
        }
    }

    #[test]
    fn forward_full_uses_the_whole_range() {
        let config = DriveConfig::default();
        // Long enough for both ramps to pass the cap.
        let inches = 60.0;
        let run = |full: bool| {
            let (mut clock, mut dt, handles) = setup();
            let mut drive = DriveExecutor::new(&mut dt, &mut clock, config);
            let report = if full {
                block_on(drive.forward_full(inches))
            } else {
                block_on(drive.forward(inches, 100.0))
            }
            .unwrap();
            (report, velocities(&handles[0]))
        };

        let (full, full_commands) = run(true);
        let (capped, capped_commands) = run(false);
        assert_eq!(full, capped);
        assert_eq!(full_commands, capped_commands);
        let peak = full_commands.iter().copied().fold(0.0, f64::max);
        assert_eq!(peak, 100.0);
    }

    #[test]
    fn zero_forward_is_a_no_op() {
        let (mut clock, mut dt, handles) = setup();
        let report = block_on(DriveExecutor::new(&mut dt, &mut clock, DriveConfig::default()).forward(0.0, 42.0))
            .unwrap();
        assert_eq!(report.ticks, 0);
        assert_eq!(clock.now(), Duration::ZERO);
        assert!(handles.iter().all(|m| m.commands().is_empty()));
    }

    #[test]
    fn non_finite_cap_is_rejected_before_any_command() {
        let (mut clock, mut dt, handles) = setup();
        let result = block_on(DriveExecutor::new(&mut dt, &mut clock, DriveConfig::default()).forward(10.0, f64::NAN));
        assert!(matches!(result, Err(MotionError::InvalidVelocity { .. })));
        assert!(handles.iter().all(|m| m.commands().is_empty()));
    }

    #[test]
    fn symmetric_turn_finishes_every_wheel_together() {
        let mut clock = SimClock::new();
        let wheels = [1, 2, 3, 4].map(|port| SimMotor::new(port).with_fixed_step(0.05));
        for wheel in &wheels {
            clock.attach(wheel);
        }
        let mut dt = Drivetrain::new(wheels.clone());
        let report = block_on(DriveExecutor::new(&mut dt, &mut clock, DriveConfig::default()).turn(90.0, 70.0)).unwrap();

        let counts: Vec<usize> = wheels.iter().map(|m| velocities(m).len()).collect();
        assert!(counts.iter().all(|&c| c == counts[0]), "{counts:?}");
        for motor in &wheels {
            assert!(!motor.commands().contains(&SimCommand::Stop(BrakeMode::Brake)));
        }
        assert_eq!(wheels[0].revolutions(), -wheels[2].revolutions());
        assert!(report.ticks >= 5);
    }

    #[test]
    fn stalled_wheel_reports_incomplete() {
        let (mut clock, mut dt, handles) = setup();
        handles[0].set_stalled(true);
        let config = DriveConfig {
            max_ticks: Some(200),
            ..DriveConfig::default()
        };
        let expected = config.inches_to_revolutions(10.0);
        let result = block_on(DriveExecutor::new(&mut dt, &mut clock, config).forward(10.0, 80.0));

        match result {
            Err(MotionError::Incomplete { ticks, remaining }) => {
                assert_eq!(ticks, 200);
                assert!((remaining[0] - expected).abs() < 1e-9);
                assert!(remaining[1..].iter().all(|&r| r == 0.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        for motor in &handles {
            assert_eq!(motor.commands().last(), Some(&SimCommand::Stop(BrakeMode::Hold)));
        }
    }

    #[test]
    fn timeout_survives_a_failed_stop() {
        let mut clock = SimClock::new();
        let mut motor = SimMotor::new(8);
        let result = block_on(run_motion(
            &mut motor,
            &mut clock,
            &mut Jammed,
            Duration::from_millis(10),
            Some(3),
        ));
        assert_eq!(result, Err(MotionError::Incomplete {
            ticks:     3,
            remaining: Vec::new(),
        }));
        assert_eq!(clock.now(), Duration::from_millis(30));
    }

    #[test]
    fn disconnect_propagates_and_stops_the_rest() {
        let (mut clock, mut dt, handles) = setup();
        handles[2].disconnect();
        let result = block_on(DriveExecutor::new(&mut dt, &mut clock, DriveConfig::default()).forward(12.0, 60.0));
        assert!(matches!(result, Err(MotionError::Device { .. })));
        for motor in [&handles[0], &handles[1], &handles[3]] {
            assert_eq!(motor.commands().last(), Some(&SimCommand::Stop(BrakeMode::Hold)));
        }
    }

    #[test]
    fn pivot_fault_leaves_no_wheel_running() {
        let (mut clock, mut dt, handles) = setup();
        handles[Wheel::RightBack.index()].disconnect();
        let result = block_on(DriveExecutor::new(&mut dt, &mut clock, DriveConfig::default()).pivot(Side::Right, -210.0));
        assert_eq!(result, Err(MotionError::Device {
            source: DeviceError::Disconnected {
                port: crate::config::ports::RIGHT_BACK,
            },
        }));
        for motor in &handles[..3] {
            assert_eq!(motor.velocity_rpm(), 0.0);
        }
        assert_eq!(
            handles[Wheel::RightFront.index()].commands().last(),
            Some(&SimCommand::Stop(BrakeMode::Brake))
        );
    }

    #[test]
    fn correction_fault_leaves_no_wheel_running() {
        let (mut clock, mut dt, handles) = setup();
        handles[0].set_position(0.1);
        handles[Wheel::RightBack.index()].disconnect();
        let result = block_on(DriveExecutor::new(&mut dt, &mut clock, DriveConfig::default()).correct());
        assert!(matches!(result, Err(MotionError::Device { .. })));
        for motor in &handles[..3] {
            assert_eq!(motor.velocity_rpm(), 0.0);
            assert_eq!(motor.commands().last(), Some(&SimCommand::Stop(BrakeMode::Brake)));
        }
    }

    #[test]
    fn reference_wheel_mode_tolerates_a_stuck_side() {
        let (mut clock, mut dt, handles) = setup();
        handles[Wheel::RightFront.index()].set_stalled(true);
        let config = DriveConfig {
            turn_completion: TurnCompletion::ReferenceWheel(Wheel::LeftBack),
            ..DriveConfig::default()
        };
        block_on(DriveExecutor::new(&mut dt, &mut clock, config).turn(180.0, 70.0)).unwrap();
        assert!(handles[Wheel::LeftBack.index()].revolutions() >= 0.5);
    }

    #[test]
    fn unbounded_budget_waits_for_completion() {
        let (mut clock, mut dt, handles) = setup();
        let config = DriveConfig {
            max_ticks: None,
            ..DriveConfig::default()
        };
        let report = block_on(DriveExecutor::new(&mut dt, &mut clock, config).forward(120.0, 30.0)).unwrap();
        assert!(report.ticks > 500);
        assert!(handles[3].revolutions() >= config.inches_to_revolutions(120.0));
    }

    #[test]
    fn spin_turn_coasts_at_angle() {
        let (mut clock, mut dt, handles) = setup();
        block_on(DriveExecutor::new(&mut dt, &mut clock, DriveConfig::default()).spin_turn(173.0, 70.0, Wheel::LeftBack))
            .unwrap();
        let turned = dt.wheel(Wheel::LeftBack).position(RotationUnit::Degrees).unwrap();
        assert!(turned >= 173.0);
        assert_eq!(handles[3].commands().last(), Some(&SimCommand::Stop(BrakeMode::Coast)));
        assert!(handles[3].revolutions() < 0.0);
    }

    #[test]
    fn pivot_and_correct_leave_robot_square() {
        let (mut clock, mut dt, handles) = setup();
        let mut drive = DriveExecutor::new(&mut dt, &mut clock, DriveConfig::default());
        block_on(drive.pivot(Side::Left, 110.0)).unwrap();
        assert!(handles[0].revolutions() >= 110.0 / 360.0);
        assert_eq!(handles[2].revolutions(), 0.0);

        block_on(drive.correct()).unwrap();
        let skew = handles[0].revolutions() - handles[2].revolutions();
        // The second stage stops within one correction tick past agreement.
        assert!((0.0..0.01).contains(&skew), "{skew}");
    }

    #[test]
    fn wall_reset_drives_backwards_then_coasts() {
        let (mut clock, mut dt, handles) = setup();
        block_on(
            DriveExecutor::new(&mut dt, &mut clock, DriveConfig::default()).wall_reset(Duration::from_millis(1000), 60.0),
        )
        .unwrap();
        assert_eq!(clock.now(), Duration::from_millis(1000));
        // 60 rpm for 650 ms.
        assert!((handles[1].revolutions() + 0.65).abs() < 1e-9);
        assert_eq!(handles[1].commands().last(), Some(&SimCommand::Stop(BrakeMode::Coast)));
    }

    #[test]
    fn mechanism_rotation_holds() {
        let (mut robot, mut clock) = sim::robot();
        let arm = robot.arm.clone();
        let report = block_on(rotate_for(
            &mut robot.arm,
            &mut clock,
            0.22,
            25.0,
            BrakeMode::Hold,
            &DriveConfig::default(),
        ))
        .unwrap();
        assert!(arm.revolutions() >= 0.22);
        assert!(report.elapsed >= Duration::from_millis(500));
        assert_eq!(arm.commands().last(), Some(&SimCommand::Stop(BrakeMode::Hold)));
    }
}
