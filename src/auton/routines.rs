//! Tuned match routines.
//!
//! The red routines were tuned on the field; the blue ones are their mirror
//! images. Distances are in inches, turns in wheel degrees, pauses in
//! milliseconds.

use std::time::Duration;

use log::{info, warn};

use super::script::{Command, Routine};
use crate::{
    config::ProfileConfig,
    devices::BrakeMode,
    display::selector::{Alliance, AutonSelection, StartTile},
};

use Command::*;

const HOLD: Command = Stop(BrakeMode::Hold);

const fn fwd(inches: f64, max: f64) -> Command { Forward { inches, max } }

const fn turn(degrees: f64, max: f64) -> Command { Turn { degrees, max } }

const fn spin(degrees: f64, rpm: f64, wait_ms: u64) -> Command {
    SpinTurn {
        degrees,
        rpm,
        wait: Duration::from_millis(wait_ms),
    }
}

const fn wait(ms: u64) -> Command { Command::pause_ms(ms) }

/// Far tile, no park: two flags from the far tile, then the cap.
pub fn red_far() -> Routine {
    let arm_up = Command::arm_up(0.22, 25.0);
    let arm_down = Command::arm_down(0.22, 25.0);
    Routine {
        name:    "red far",
        forward: ProfileConfig::FORWARD_FAR,
        steps:   vec![
            Flywheel(440.0),
            arm_up,
            wait(5),
            fwd(23.0, 95.0),
            HOLD,
            spin(-173.0, 70.0, 20),
            fwd(4.0, 80.0),
            HOLD,
            Arm {
                revs: -0.2,
                rpm:  37.0,
                then: BrakeMode::Coast,
            },
            wait(150),
            Intake(600.0),
            fwd(-1.5, 80.0),
            HOLD,
            IntakeStop,
            wait(200),
            turn(-33.0, 70.0),
            wait(200),
            // first shot
            Intake(600.0),
            wait(350),
            IntakeStop,
            FlywheelStop,
            Flywheel(390.0),
            wait(2500),
            // second shot
            Intake(600.0),
            wait(425),
            fwd(-3.0, 70.0),
            HOLD,
            wait(200),
            turn(228.0, 70.0),
            wait(200),
            arm_up,
            Flywheel(570.0),
            fwd(19.0, 70.0),
            HOLD,
            wait(325),
            IntakeStop,
            fwd(-6.0, 70.0),
            HOLD,
            wait(200),
            turn(-173.0, 70.0),
            wait(200),
            Intake(600.0),
            wait(700),
            turn(340.0, 70.0),
            wait(200),
            arm_down,
            fwd(8.8, 70.0),
            HOLD,
            arm_up,
        ],
    }
}

/// Front tile: cap flip, low flag and back out toward the platform.
pub fn red_front() -> Routine {
    Routine {
        name:    "red front",
        forward: ProfileConfig::FORWARD_DRIVER,
        steps:   vec![
            Flywheel(200.0),
            Command::arm_up(0.23, 200.0),
            wait(10),
            fwd(38.0, 80.0),
            HOLD,
            Intake(-100.0),
            wait(300),
            IntakeStop,
            fwd(-32.1, 80.0),
            HOLD,
            spin(-250.0, 70.0, 25),
            Intake(200.0),
            wait(100),
            Intake(-200.0),
            wait(400),
            IntakeStop,
            fwd(24.5, 80.0),
            HOLD,
            Intake(-200.0),
            wait(300),
            fwd(4.5, 50.0),
            HOLD,
            fwd(-50.0, 80.0),
            HOLD,
            spin(260.0, 70.0, 25),
            fwd(-3.5, 80.0),
            HOLD,
            fwd(52.5, 80.0),
            HOLD,
        ],
    }
}

/// [`red_far`] from the blue side.
pub fn blue_far() -> Routine { red_far().mirrored("blue far") }

pub fn blue_front() -> Routine { red_front().mirrored("blue front") }

/// Picks the routine for what the drive team selected.
pub fn choose(selection: &AutonSelection) -> Routine {
    let routine = match (selection.alliance, selection.tile) {
        (Alliance::Red, StartTile::Front) => red_front(),
        (Alliance::Red, StartTile::Back) => red_far(),
        (Alliance::Blue, StartTile::Front) => blue_front(),
        (Alliance::Blue, StartTile::Back) => blue_far(),
    };
    if selection.park {
        warn!("no parking variant of {}, running it without the park", routine.name);
    }
    info!("selected {}", routine.name);
    routine
}
