//! Mouse button click tracking for the widget layer.
//!
//! A [`ClickTracker`] subscribes to a [`ButtonEventSource`] and keeps one
//! [`ButtonState`] per tracked [`MouseButton`], answering "is this button held"
//! and "was this a double-click" for widgets that poll it between events.
//! [`ButtonEventDispatcher`] is a ready-made single-threaded source.

pub use button::*;
pub use config::*;
pub use phase::*;
pub use source::*;
pub use tracker::*;

mod button;
mod config;
mod phase;
mod source;
mod tracker;
