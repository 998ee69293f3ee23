//! Touch-screen autonomous selector.
//!
//! Six toggle buttons on the brain screen pick the alliance, the starting
//! tile and whether to park. Touches are queued as [`TouchEvent`]s and
//! drained once per UI tick by [`Selector::process`], which hit-tests each
//! event and repaints every button after any change.
//!
//! ```text
//!  (30,30) Red     (150,30) Front    (270,30) Park
//!  (30,150) Blue   (150,150) Back    (270,150) NP
//! ```
//!
//! A press inside a button draws it highlighted; a release inside a button
//! toggles it and records it as the last selection.

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyleBuilder, Rectangle, StrokeAlignment},
    text::{Baseline, Text},
};
use heapless::Deque;
use log::{debug, warn};

const PEN: Rgb888 = rgb(0xE0E0E0);
const TOP_BACKGROUND: Rgb888 = rgb(0x404040);
const BOTTOM_BACKGROUND: Rgb888 = rgb(0x808080);
const TITLE_COLOR: Rgb888 = rgb(0xC11F27);
const TITLE: &str = "50505X Aviators";

/// Width of the brain screen in pixels.
pub const SCREEN_WIDTH: u32 = 480;
/// Height of the brain screen in pixels.
pub const SCREEN_HEIGHT: u32 = 240;

const fn rgb(hex: u32) -> Rgb888 {
    Rgb888::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// A rectangular toggle button.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ButtonRegion {
    /// Screen rectangle; both edges count as inside.
    pub area:      Rectangle,
    /// Toggled by a release inside the button.
    pub selected:  bool,
    /// Fill while not selected.
    pub off_color: Rgb888,
    /// Fill while selected.
    pub on_color:  Rgb888,
    /// Text drawn on the button.
    pub label:     &'static str,
}

impl ButtonRegion {
    const fn new(x: i32, y: i32, off_color: u32, label: &'static str) -> Self {
        Self {
            area: Rectangle::new(Point::new(x, y), Size::new(60, 60)),
            selected: false,
            off_color: rgb(off_color),
            on_color: rgb(0xA9A9A9),
            label,
        }
    }

    /// Inclusive containment: the right and bottom edges count as inside.
    pub fn contains(&self, point: Point) -> bool {
        let Point { x, y } = self.area.top_left;
        let (w, h) = (self.area.size.width as i32, self.area.size.height as i32);
        point.x >= x && point.x <= x + w && point.y >= y && point.y <= y + h
    }

    /// Fill colour for the current state.
    pub fn color(&self) -> Rgb888 { if self.selected { self.on_color } else { self.off_color } }
}

/// Whether a finger went down or came up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchKind {
    Pressed,
    Released,
}

/// A single touch transition at a screen position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchEvent {
    /// Press or release.
    pub kind:  TouchKind,
    /// Where the finger was.
    pub point: Point,
}

/// Turns polled "is the screen touched" samples into press and release
/// events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TouchTracker {
    touching: bool,
}

impl TouchTracker {
    /// Feeds one touch sample; returns an event when the touch state
    /// changed since the previous sample.
    pub fn update(&mut self, touching: bool, point: Point) -> Option<TouchEvent> {
        let kind = match (self.touching, touching) {
            (false, true) => TouchKind::Pressed,
            (true, false) => TouchKind::Released,
            _ => return None,
        };
        self.touching = touching;
        Some(TouchEvent { kind, point })
    }
}

/// Alliance colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alliance {
    Red,
    Blue,
}

/// Starting tile relative to the flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartTile {
    /// The tile next to the flags.
    Front,
    /// The far tile, next to the platform.
    Back,
}

/// What the drive team picked on the selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutonSelection {
    /// Alliance colour.
    pub alliance: Alliance,
    /// Starting tile.
    pub tile:     StartTile,
    /// Whether to finish on the platform.
    pub park:     bool,
}

impl Default for AutonSelection {
    fn default() -> Self {
        Self {
            alliance: Alliance::Red,
            tile:     StartTile::Front,
            park:     false,
        }
    }
}

const RED: usize = 0;
const FRONT: usize = 1;
const PARK: usize = 2;
const BLUE: usize = 3;
const BACK: usize = 4;
const NO_PARK: usize = 5;

/// The selector state machine.
#[derive(Debug)]
pub struct Selector {
    buttons:        [ButtonRegion; 6],
    events:         Deque<TouchEvent, 8>,
    last_selection: Option<usize>,
}

impl Default for Selector {
    fn default() -> Self { Self::new() }
}

impl Selector {
    /// The six buttons at their fixed positions, all off, with an empty
    /// event queue.
    pub fn new() -> Self {
        Self {
            buttons:        [
                ButtonRegion::new(30, 30, 0xE00000, "Red"),
                ButtonRegion::new(150, 30, 0x303030, "Front"),
                ButtonRegion::new(270, 30, 0x303030, "Park"),
                ButtonRegion::new(30, 150, 0x404040, "Blue"),
                ButtonRegion::new(150, 150, 0x404040, "Back"),
                ButtonRegion::new(270, 150, 0x404040, "NP"),
            ],
            events:         Deque::new(),
            last_selection: None,
        }
    }

    /// Buttons in Red, Front, Park, Blue, Back, NP order.
    pub fn buttons(&self) -> &[ButtonRegion; 6] { &self.buttons }

    /// Index of the button released most recently, if any.
    pub fn last_selection(&self) -> Option<usize> { self.last_selection }

    /// Queues a touch for the next [`Selector::process`]. Events arriving
    /// while the queue is full are dropped.
    pub fn push(&mut self, event: TouchEvent) {
        if self.events.push_back(event).is_err() {
            warn!("touch queue full, dropping {:?}", event);
        }
    }

    /// First button containing `point`.
    pub fn find_button(&self, point: Point) -> Option<usize> {
        self.buttons.iter().position(|button| button.contains(point))
    }

    /// Drains the event queue, repainting after every event that hits a
    /// button. Returns whether anything was drawn.
    pub fn process<D>(&mut self, target: &mut D) -> Result<bool, D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let mut drawn = false;
        while let Some(event) = self.events.pop_front() {
            let Some(index) = self.find_button(event.point) else {
                continue;
            };
            match event.kind {
                TouchKind::Pressed => self.draw_buttons(target, Some(index))?,
                TouchKind::Released => {
                    let button = &mut self.buttons[index];
                    button.selected = !button.selected;
                    debug!("{} {}", button.label, if button.selected { "on" } else { "off" });
                    self.last_selection = Some(index);
                    self.draw_buttons(target, None)?;
                }
            }
            drawn = true;
        }
        Ok(drawn)
    }

    /// Paints the two-tone background and the title.
    pub fn draw_background<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let half = Size::new(SCREEN_WIDTH, SCREEN_HEIGHT / 2);
        target.fill_solid(&Rectangle::new(Point::zero(), half), TOP_BACKGROUND)?;
        target.fill_solid(
            &Rectangle::new(Point::new(0, SCREEN_HEIGHT as i32 / 2), half),
            BOTTOM_BACKGROUND,
        )?;
        Text::with_baseline(
            TITLE,
            Point::new(0, 135),
            MonoTextStyle::new(&FONT_10X20, TITLE_COLOR),
            Baseline::Alphabetic,
        )
        .draw(target)?;
        Ok(())
    }

    /// Full repaint of every button. `pressed` is drawn highlighted.
    pub fn draw_buttons<D>(&self, target: &mut D, pressed: Option<usize>) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let label_style = MonoTextStyle::new(&FONT_6X10, PEN);
        for (i, button) in self.buttons.iter().enumerate() {
            let fill = if pressed == Some(i) { PEN } else { button.color() };
            let style = PrimitiveStyleBuilder::new()
                .fill_color(fill)
                .stroke_color(PEN)
                .stroke_width(1)
                .stroke_alignment(StrokeAlignment::Inside)
                .build();
            button.area.into_styled(style).draw(target)?;

            let Point { x, y } = button.area.top_left;
            let label_at = Point::new(x + 8, y + button.area.size.height as i32 - 8);
            Text::with_baseline(button.label, label_at, label_style, Baseline::Alphabetic).draw(target)?;
        }
        Ok(())
    }

    /// Reads the toggles as an autonomous choice. A side only wins when its
    /// button is on and the opposing one is off.
    pub fn selection(&self) -> AutonSelection {
        let on = |i: usize| self.buttons[i].selected;
        AutonSelection {
            alliance: if on(BLUE) && !on(RED) { Alliance::Blue } else { Alliance::Red },
            tile:     if on(BACK) && !on(FRONT) { StartTile::Back } else { StartTile::Front },
            park:     on(PARK) && !on(NO_PARK),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use super::*;

    struct FrameBuffer {
        pixels: Vec<Rgb888>,
    }

    impl FrameBuffer {
        fn new() -> Self {
            Self {
                pixels: vec![Rgb888::BLACK; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize],
            }
        }

        fn at(&self, x: i32, y: i32) -> Rgb888 { self.pixels[(y as u32 * SCREEN_WIDTH + x as u32) as usize] }
    }

    impl OriginDimensions for FrameBuffer {
        fn size(&self) -> Size { Size::new(SCREEN_WIDTH, SCREEN_HEIGHT) }
    }

    impl DrawTarget for FrameBuffer {
        type Color = Rgb888;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if (0..SCREEN_WIDTH as i32).contains(&point.x) && (0..SCREEN_HEIGHT as i32).contains(&point.y) {
                    self.pixels[(point.y as u32 * SCREEN_WIDTH + point.x as u32) as usize] = color;
                }
            }
            Ok(())
        }
    }

    fn touch(kind: TouchKind, x: i32, y: i32) -> TouchEvent {
        TouchEvent {
            kind,
            point: Point::new(x, y),
        }
    }

    #[test]
    fn hit_test_is_inclusive() {
        let selector = Selector::new();
        assert_eq!(selector.find_button(Point::new(30, 30)), Some(0));
        assert_eq!(selector.find_button(Point::new(90, 90)), Some(0));
        assert_eq!(selector.find_button(Point::new(91, 90)), None);
        assert_eq!(selector.find_button(Point::new(300, 200)), Some(5));
        assert_eq!(selector.find_button(Point::new(120, 120)), None);
    }

    #[test]
    fn release_toggles_and_records_selection() {
        let mut selector = Selector::new();
        let mut fb = FrameBuffer::new();

        selector.push(touch(TouchKind::Released, 160, 160));
        assert!(selector.process(&mut fb).unwrap());
        assert!(selector.buttons()[4].selected);
        assert_eq!(selector.last_selection(), Some(4));
        assert_eq!(fb.at(180, 165), rgb(0xA9A9A9));

        selector.push(touch(TouchKind::Released, 160, 160));
        selector.process(&mut fb).unwrap();
        assert!(!selector.buttons()[4].selected);
        assert_eq!(fb.at(180, 165), rgb(0x404040));
    }

    #[test]
    fn press_highlights_without_toggling() {
        let mut selector = Selector::new();
        let mut fb = FrameBuffer::new();
        selector.push(touch(TouchKind::Pressed, 40, 40));
        selector.process(&mut fb).unwrap();
        assert!(!selector.buttons()[0].selected);
        assert_eq!(selector.last_selection(), None);
        assert_eq!(fb.at(60, 45), PEN);
        // Every other button is repainted too.
        assert_eq!(fb.at(180, 45), rgb(0x303030));
        assert_eq!(fb.at(150, 150), PEN);
    }

    #[test]
    fn misses_draw_nothing() {
        let mut selector = Selector::new();
        let mut fb = FrameBuffer::new();
        selector.push(touch(TouchKind::Released, 5, 5));
        assert!(!selector.process(&mut fb).unwrap());
        assert!(fb.pixels.iter().all(|&p| p == Rgb888::BLACK));
    }

    #[test]
    fn background_halves() {
        let selector = Selector::new();
        let mut fb = FrameBuffer::new();
        selector.draw_background(&mut fb).unwrap();
        assert_eq!(fb.at(470, 10), TOP_BACKGROUND);
        assert_eq!(fb.at(470, 230), BOTTOM_BACKGROUND);
    }

    #[test]
    fn full_queue_drops_events() {
        let mut selector = Selector::new();
        for _ in 0..10 {
            selector.push(touch(TouchKind::Released, 40, 40));
        }
        selector.process(&mut FrameBuffer::new()).unwrap();
        // Eight toggles leave the button where it started.
        assert!(!selector.buttons()[0].selected);
    }

    #[test]
    fn selection_needs_the_opposing_button_off() {
        let mut selector = Selector::new();
        let mut fb = FrameBuffer::new();
        assert_eq!(selector.selection(), AutonSelection::default());

        for (x, y) in [(40, 160), (160, 160), (280, 40)] {
            selector.push(touch(TouchKind::Released, x, y));
        }
        selector.process(&mut fb).unwrap();
        assert_eq!(selector.selection(), AutonSelection {
            alliance: Alliance::Blue,
            tile:     StartTile::Back,
            park:     true,
        });

        selector.push(touch(TouchKind::Released, 40, 40));
        selector.process(&mut fb).unwrap();
        assert_eq!(selector.selection().alliance, Alliance::Red);
    }

    #[test]
    fn tracker_reports_transitions_only() {
        let mut tracker = TouchTracker::default();
        let at = Point::new(10, 20);
        assert_eq!(tracker.update(false, at), None);
        assert_eq!(tracker.update(true, at), Some(touch(TouchKind::Pressed, 10, 20)));
        assert_eq!(tracker.update(true, at), None);
        assert_eq!(tracker.update(false, at), Some(touch(TouchKind::Released, 10, 20)));
    }
}
