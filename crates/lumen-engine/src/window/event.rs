/// Window events the engine reacts to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Event {
    /// The user (or the OS) asked the window to close.
    Close,
    /// The client area changed size, in physical pixels.
    Resize { width: u32, height: u32 },
}

/// Receivers for window events.
///
/// Both callbacks run synchronously on the polling thread.
pub trait WindowCallbacks {
    /// Returns `true` to stop the main loop. Must not destroy resources itself.
    fn on_close(&mut self) -> bool;

    /// Returns `true` if handling the resize hit a fatal error.
    fn on_resize(&mut self, width: u32, height: u32) -> bool;
}

/// Dispatches `events` in arrival order and clears `running` when a callback asks to stop.
///
/// Every event is delivered, including those queued after a close; the caller
/// decides when to leave the loop by checking `running` once per iteration.
pub fn dispatch_events<C>(events: impl IntoIterator<Item = Event>, callbacks: &mut C, running: &mut bool)
where
    C: WindowCallbacks + ?Sized,
{
    for event in events {
        let stop = match event {
            Event::Close => callbacks.on_close(),
            Event::Resize { width, height } => callbacks.on_resize(width, height),
        };

        if stop {
            *running = false;
        }
    }
}
