//! Brain screen draw target and touch polling.

use core::convert::Infallible;

use embedded_graphics::{pixelcolor::Rgb888, prelude::*, primitives::{ContainsPoint, Rectangle}};
use vexide::{
    color::Rgb,
    display::{Display, Rect, TouchState},
};

use super::selector::{TouchEvent, TouchTracker};

/// An embedded-graphics [`DrawTarget`] over the V5 brain screen.
pub struct BrainDisplay {
    display: Display,
    touch:   TouchTracker,
}

impl BrainDisplay {
    /// Takes ownership of the screen; nothing else may draw to it.
    pub fn new(display: Display) -> Self {
        Self {
            display,
            touch: TouchTracker::default(),
        }
    }

    /// Samples the touch sensor and reports a press or release if the finger
    /// state changed since the last poll.
    pub fn poll_touch(&mut self) -> Option<TouchEvent> {
        let status = self.display.touch_status();
        let touching = !matches!(status.state, TouchState::Released);
        let point = Point::new(i32::from(status.point.x), i32::from(status.point.y));
        self.touch.update(touching, point)
    }
}

fn convert(color: Rgb888) -> Rgb<u8> { Rgb::new(color.r(), color.g(), color.b()) }

fn corners(area: &Rectangle) -> Option<Rect> {
    let end = area.bottom_right()?;
    let start = area.top_left;
    Some(Rect::new(
        [start.x as i16, start.y as i16],
        [end.x as i16, end.y as i16],
    ))
}

impl OriginDimensions for BrainDisplay {
    fn size(&self) -> Size {
        Size::new(
            Display::HORIZONTAL_RESOLUTION as u32,
            Display::VERTICAL_RESOLUTION as u32,
        )
    }
}

impl DrawTarget for BrainDisplay {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if bounds.contains(point) {
                let pixel = Rect::new([point.x as i16, point.y as i16], [point.x as i16, point.y as i16]);
                self.display.fill(&pixel, convert(color));
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        if let Some(rect) = corners(&area.intersection(&self.bounding_box())) {
            self.display.fill(&rect, convert(color));
        }
        Ok(())
    }
}
