//! Brain screen user interface.
//!
//! The pre-match autonomous selector lives in [`selector`]. It draws through
//! any embedded-graphics [`DrawTarget`](embedded_graphics::draw_target::DrawTarget),
//! so the same code renders to the brain via [`driver::BrainDisplay`] and to
//! an in-memory frame buffer in tests.

#[cfg(feature = "v5")]
pub mod driver;
pub mod selector;
