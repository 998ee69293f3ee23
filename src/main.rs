//! Competition program for the Worlds robot.

use std::time::Duration;

use aviator::{
    auton::{routines, script::ScriptRunner},
    config::{DriveConfig, ports},
    devices::{SystemClock, v5::VexMotor},
    display::{driver::BrainDisplay, selector::Selector},
    drivetrain::{Drivetrain, Robot},
    fs::logger,
    opcontrol::{
        controller,
        teleop::{TeleopConfig, TeleopMapper},
    },
};
use log::{LevelFilter, info, warn};
use vexide::prelude::*;

const UI_TICK: Duration = Duration::from_millis(10);

struct Worlds {
    robot:    Robot<VexMotor>,
    primary:  Controller,
    partner:  Controller,
    screen:   BrainDisplay,
    selector: Selector,
    teleop:   TeleopMapper,
    clock:    SystemClock,
    drive:    DriveConfig,
}

impl Compete for Worlds {
    async fn disabled(&mut self) {
        loop {
            if let Some(event) = self.screen.poll_touch() {
                self.selector.push(event);
            }
            let _ = self.selector.process(&mut self.screen);
            sleep(UI_TICK).await;
        }
    }

    async fn autonomous(&mut self) {
        let routine = routines::choose(&self.selector.selection());
        match ScriptRunner::new(&mut self.robot, &mut self.clock, self.drive)
            .run(&routine)
            .await
        {
            Ok(report) => info!("{} finished: {:?}", routine.name, report),
            Err(e) => warn!("{} aborted: {}", routine.name, e),
        }
    }

    async fn driver(&mut self) {
        let tick = self.teleop.config().tick;
        loop {
            let primary = controller::read(&self.primary);
            let partner = controller::read(&self.partner);
            self.teleop
                .tick(&primary, &partner, &mut self.robot, &mut self.clock, &self.drive)
                .await;
            sleep(tick).await;
        }
    }
}

#[vexide::main]
async fn main(peripherals: Peripherals) {
    logger::init(LevelFilter::Info).unwrap_or_else(|e| println!("Logger Error: {}", e));

    let drive = |port, direction| VexMotor::new(Motor::new(port, Gearset::Green, direction), VexMotor::RPM_200);
    let drivetrain = Drivetrain::new([
        drive(peripherals.port_3, Direction::Forward),
        drive(peripherals.port_11, Direction::Forward),
        drive(peripherals.port_9, Direction::Reverse),
        drive(peripherals.port_20, Direction::Reverse),
    ]);
    let robot = Robot::new(
        drivetrain,
        VexMotor::new(Motor::new(peripherals.port_19, Gearset::Red, Direction::Forward), VexMotor::RPM_100),
        VexMotor::new(Motor::new(peripherals.port_10, Gearset::Blue, Direction::Forward), VexMotor::RPM_600),
        [
            VexMotor::new(Motor::new(peripherals.port_1, Gearset::Blue, Direction::Forward), VexMotor::RPM_600),
            VexMotor::new(Motor::new(peripherals.port_2, Gearset::Blue, Direction::Reverse), VexMotor::RPM_600),
        ],
    );
    info!(
        "drive on ports {}/{}/{}/{}",
        ports::LEFT_FRONT,
        ports::LEFT_BACK,
        ports::RIGHT_FRONT,
        ports::RIGHT_BACK
    );

    let mut screen = BrainDisplay::new(peripherals.display);
    let selector = Selector::new();
    let _ = selector.draw_background(&mut screen);
    let _ = selector.draw_buttons(&mut screen, None);

    Worlds {
        robot,
        primary: peripherals.primary_controller,
        partner: peripherals.partner_controller,
        screen,
        selector,
        teleop: TeleopMapper::new(TeleopConfig::DRIVER),
        clock: SystemClock::new(),
        drive: DriveConfig::default(),
    }
    .compete()
    .await;
}
