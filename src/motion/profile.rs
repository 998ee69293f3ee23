//! Kinematic profile engine.
//!
//! Turns a wheel's position error into a velocity command shaped like a
//! trapezoid: a ramp away from the start, a cruise at the cap, and a ramp
//! into the end.
//!
//! ```text
//! up(start, x)   = accel * |x - start| + min
//! down(end, x)   = decel * |end - x|   + min
//! command(x)     = direction * min(cap, up, down)
//! ```
//!
//! Each wheel is profiled on its own encoder. Nothing here touches
//! hardware, so the same functions serve the executor and the tests.

use crate::config::ProfileConfig;

/// Start and end of one wheel's move, in revolutions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelTarget {
    /// Encoder reading when the move began.
    pub start:     f64,
    /// Encoder reading the wheel is driving to.
    pub end:       f64,
    /// `+1.0` when the encoder must increase, `-1.0` when it must decrease.
    pub direction: f64,
}

impl WheelTarget {
    /// Targets `displacement` revolutions away from `start`.
    ///
    /// A zero displacement is treated as forward and is complete
    /// immediately.
    pub fn new(start: f64, displacement: f64) -> Self {
        let direction = if displacement < 0.0 { -1.0 } else { 1.0 };
        Self {
            start,
            end: start + displacement,
            direction,
        }
    }

    /// Signed revolutions between start and end.
    pub fn displacement(&self) -> f64 { self.end - self.start }

    /// Distance travelled in the commanded direction.
    ///
    /// Never decreases while the hardware behaves.
    pub fn progress(&self, current: f64) -> f64 { self.direction * (current - self.start) }

    /// Whether the wheel has reached (or passed) its end position.
    pub fn is_complete(&self, current: f64) -> bool {
        self.progress(current) >= self.direction * self.displacement()
    }

    /// Revolutions still to travel, zero once complete.
    pub fn remaining(&self, current: f64) -> f64 {
        (self.direction * self.displacement() - self.progress(current)).max(0.0)
    }
}

impl ProfileConfig {
    /// Velocity allowed by the acceleration ramp.
    pub fn ramp_up(&self, start: f64, current: f64) -> f64 {
        self.accel * (current - start).abs() + self.min_velocity
    }

    /// Velocity allowed by the deceleration ramp.
    pub fn ramp_down(&self, end: f64, current: f64) -> f64 {
        self.decel * (end - current).abs() + self.min_velocity
    }

    /// Signed velocity command for a wheel at `current`.
    pub fn velocity(&self, target: &WheelTarget, current: f64, max_velocity: f64) -> f64 {
        let ramp = self
            .ramp_up(target.start, current)
            .min(self.ramp_down(target.end, current));
        target.direction * max_velocity.min(ramp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: ProfileConfig = ProfileConfig {
        min_velocity: 30.0,
        accel:        30.0,
        decel:        30.0,
    };

    #[test]
    fn trapezoid_scenario() {
        let target = WheelTarget::new(0.0, 10.0);
        assert_eq!(SCENARIO.velocity(&target, 0.0, 80.0), 30.0);
        assert_eq!(SCENARIO.velocity(&target, 5.0, 80.0), 80.0);
        let near_end = SCENARIO.velocity(&target, 9.9, 80.0);
        assert!((near_end - 33.0).abs() < 1e-9, "{near_end}");
    }

    #[test]
    fn reverse_moves_command_negative_velocity() {
        let target = WheelTarget::new(2.0, -3.0);
        assert_eq!(target.direction, -1.0);
        assert_eq!(target.end, -1.0);
        for step in 0..30 {
            let current = 2.0 - step as f64 * 0.1;
            let v = SCENARIO.velocity(&target, current, 100.0);
            assert!(v < 0.0);
            assert!(v.abs() >= SCENARIO.min_velocity);
        }
    }

    #[test]
    fn cap_is_enforced_far_from_both_ends() {
        let target = WheelTarget::new(0.0, 100.0);
        for cap in [20.0, 45.0, 80.0, 100.0] {
            let v = SCENARIO.velocity(&target, 50.0, cap);
            assert!(v.abs() <= cap);
            assert_eq!(v, cap);
        }
    }

    #[test]
    fn completion_check_is_pure() {
        let target = WheelTarget::new(1.0, 0.5);
        assert!(!target.is_complete(1.2));
        assert!(!target.is_complete(1.2));
        assert!(target.is_complete(1.5));
        assert!(target.is_complete(1.7));
        assert!((target.remaining(1.2) - 0.3).abs() < 1e-9);
        assert_eq!(target.remaining(2.0), 0.0);
    }

    #[test]
    fn stepping_encoder_converges_on_target() {
        let target = WheelTarget::new(0.0, 2.0);
        let mut current = 0.0;
        let mut last = f64::MAX;
        let mut ticks = 0;
        while !target.is_complete(current) {
            let v = SCENARIO.velocity(&target, current, 80.0);
            assert!((SCENARIO.min_velocity..=80.0).contains(&v));
            if current > 1.1 {
                // Past the midpoint the deceleration ramp governs.
                assert!(v <= last);
            }
            last = v;
            current += 0.05;
            ticks += 1;
        }
        assert!((40..=41).contains(&ticks), "{ticks}");
        assert!(target.progress(current) >= 2.0);
    }

    #[test]
    fn zero_displacement_is_already_complete() {
        let target = WheelTarget::new(4.0, 0.0);
        assert!(target.is_complete(4.0));
        assert_eq!(target.remaining(4.0), 0.0);
    }
}
