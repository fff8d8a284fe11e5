//! Window + event pump.
//!
//! Owns the `winit` event loop and native windows. OS messages are drained
//! non-blockingly once per frame and surfaced as a list of [`Event`]s that
//! the caller dispatches through [`WindowCallbacks`].

mod class;
mod event;
mod lifecycle;
mod platform;

pub use class::WindowClass;
pub use event::{dispatch_events, Event, WindowCallbacks};
pub use lifecycle::{WindowLifecycle, WindowState};
pub use platform::{Platform, Window, WindowConfig};
