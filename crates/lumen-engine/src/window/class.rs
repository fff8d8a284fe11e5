/// Reference-counted registration of the process-wide window class.
///
/// The first window registers the class, the last destroyed window
/// unregisters it. Counting is explicit so several windows can come and go.
#[derive(Debug, Default)]
pub struct WindowClass {
    windows: u32,
}

impl WindowClass {
    pub const NAME: &'static str = "LUMEN_WINDOW_CLASS";

    /// Records a new window. Returns `true` if this registered the class.
    pub fn acquire(&mut self) -> bool {
        self.windows += 1;
        let registered = self.windows == 1;
        if registered {
            log::debug!("window class `{}` registered", Self::NAME);
        }
        registered
    }

    /// Records a destroyed window. Returns `true` if this unregistered the class.
    pub fn release(&mut self) -> bool {
        if self.windows == 0 {
            log::debug!("window class released with no live windows");
            return false;
        }
        self.windows -= 1;
        let unregistered = self.windows == 0;
        if unregistered {
            log::debug!("window class `{}` unregistered", Self::NAME);
        }
        unregistered
    }

    pub fn window_count(&self) -> u32 {
        self.windows
    }
}
