//! Controller snapshots.
//!
//! A [`ControllerInput`] is one poll of a V5 controller: the four analog
//! axes scaled to percent and the twelve buttons with their previous state,
//! so both "is pressing" and "was just pressed/released" can be answered.
//! On the brain it is built from a vexide `ControllerState`; in tests it is
//! built by hand.
//!
//! # Example
//!
//! ```ignore
//! use aviator::opcontrol::controller::{ControllerButton, ControllerInput};
//!
//! let input = ControllerInput::default()
//!     .with_axes(0.0, 0.0, 75.0, 0.0)
//!     .press(ControllerButton::ButtonR1);
//! assert!(input.button(ControllerButton::ButtonR1).is_now_pressed());
//! ```

#[cfg(feature = "v5")]
use log::warn;
#[cfg(feature = "v5")]
use vexide::controller::{Controller, ControllerState};

/// A list of Controller Buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerButton {
    ButtonA,
    ButtonB,
    ButtonX,
    ButtonY,
    ButtonUp,
    ButtonDown,
    ButtonLeft,
    ButtonRight,
    ButtonL1,
    ButtonL2,
    ButtonR1,
    ButtonR2,
}

impl ControllerButton {
    /// Every button, in snapshot storage order.
    pub const ALL: [ControllerButton; 12] = [
        ControllerButton::ButtonA,
        ControllerButton::ButtonB,
        ControllerButton::ButtonX,
        ControllerButton::ButtonY,
        ControllerButton::ButtonUp,
        ControllerButton::ButtonDown,
        ControllerButton::ButtonLeft,
        ControllerButton::ButtonRight,
        ControllerButton::ButtonL1,
        ControllerButton::ButtonL2,
        ControllerButton::ButtonR1,
        ControllerButton::ButtonR2,
    ];

    const fn index(self) -> usize { self as usize }
}

/// Current and previous state of one button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Held during this poll.
    pub pressed:     bool,
    /// Held during the previous poll.
    pub was_pressed: bool,
}

impl ButtonState {
    /// Whether the button is held right now.
    pub const fn is_pressed(&self) -> bool { self.pressed }

    /// Whether the button went down since the previous poll.
    pub const fn is_now_pressed(&self) -> bool { self.pressed && !self.was_pressed }

    /// Whether the button came up since the previous poll.
    pub const fn is_now_released(&self) -> bool { !self.pressed && self.was_pressed }
}

/// One poll of a controller. Axes use the VEX numbering and are in percent,
/// `[-100, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerInput {
    /// Right stick, horizontal.
    pub axis1:   f64,
    /// Right stick, vertical.
    pub axis2:   f64,
    /// Left stick, vertical.
    pub axis3:   f64,
    /// Left stick, horizontal.
    pub axis4:   f64,
    buttons:     [ButtonState; 12],
}

impl ControllerInput {
    /// State of a single button.
    pub fn button(&self, button: ControllerButton) -> ButtonState { self.buttons[button.index()] }

    /// Replaces all four axes.
    pub fn with_axes(mut self, axis1: f64, axis2: f64, axis3: f64, axis4: f64) -> Self {
        self.axis1 = axis1;
        self.axis2 = axis2;
        self.axis3 = axis3;
        self.axis4 = axis4;
        self
    }

    /// Replaces the state of one button.
    pub fn with_button(mut self, button: ControllerButton, state: ButtonState) -> Self {
        self.buttons[button.index()] = state;
        self
    }

    /// The button went down during this poll.
    pub fn press(self, button: ControllerButton) -> Self {
        self.with_button(button, ButtonState {
            pressed:     true,
            was_pressed: false,
        })
    }

    /// The button is being held.
    pub fn hold(self, button: ControllerButton) -> Self {
        self.with_button(button, ButtonState {
            pressed:     true,
            was_pressed: true,
        })
    }

    /// The button came up during this poll.
    pub fn release(self, button: ControllerButton) -> Self {
        self.with_button(button, ButtonState {
            pressed:     false,
            was_pressed: true,
        })
    }

    /// The snapshot that follows this one if nothing changes.
    pub fn settled(mut self) -> Self {
        for state in &mut self.buttons {
            state.was_pressed = state.pressed;
        }
        self
    }
}

#[cfg(feature = "v5")]
fn convert_button(state: vexide::controller::ButtonState) -> ButtonState {
    ButtonState {
        pressed:     state.is_pressed(),
        was_pressed: state.is_now_released() || (state.is_pressed() && !state.is_now_pressed()),
    }
}

#[cfg(feature = "v5")]
impl From<ControllerState> for ControllerInput {
    fn from(state: ControllerState) -> Self {
        let mut input = ControllerInput {
            axis1: state.right_stick.x() * 100.0,
            axis2: state.right_stick.y() * 100.0,
            axis3: state.left_stick.y() * 100.0,
            axis4: state.left_stick.x() * 100.0,
            ..ControllerInput::default()
        };
        for button in ControllerButton::ALL {
            let raw = match button {
                ControllerButton::ButtonA => state.button_a,
                ControllerButton::ButtonB => state.button_b,
                ControllerButton::ButtonX => state.button_x,
                ControllerButton::ButtonY => state.button_y,
                ControllerButton::ButtonUp => state.button_up,
                ControllerButton::ButtonDown => state.button_down,
                ControllerButton::ButtonLeft => state.button_left,
                ControllerButton::ButtonRight => state.button_right,
                ControllerButton::ButtonL1 => state.button_l1,
                ControllerButton::ButtonL2 => state.button_l2,
                ControllerButton::ButtonR1 => state.button_r1,
                ControllerButton::ButtonR2 => state.button_r2,
            };
            input.buttons[button.index()] = convert_button(raw);
        }
        input
    }
}

/// Polls a controller. A disconnected controller reads as all sticks
/// centred and no buttons held.
#[cfg(feature = "v5")]
pub fn read(controller: &Controller) -> ControllerInput {
    controller
        .state()
        .map(ControllerInput::from)
        .unwrap_or_else(|e| {
            warn!("Controller State Error: {}", e);
            ControllerInput::default()
        })
}
