/// Window state machine.
///
/// `Uninitialized → Created → (Running ⇄ Resizing) → Closed`
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum WindowState {
    #[default]
    Uninitialized,
    Created,
    Running,
    Resizing,
    Closed,
}

/// Tracks a window's [`WindowState`], rejecting transitions the machine does not allow.
#[derive(Debug, Default)]
pub struct WindowLifecycle {
    state: WindowState,
}

impl WindowLifecycle {
    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn created(&mut self) -> bool {
        self.transition(WindowState::Created, &[WindowState::Uninitialized])
    }

    pub fn running(&mut self) -> bool {
        self.transition(
            WindowState::Running,
            &[WindowState::Created, WindowState::Resizing],
        )
    }

    pub fn resizing(&mut self) -> bool {
        self.transition(WindowState::Resizing, &[WindowState::Running])
    }

    /// Any live state may close.
    pub fn closed(&mut self) -> bool {
        self.transition(
            WindowState::Closed,
            &[
                WindowState::Created,
                WindowState::Running,
                WindowState::Resizing,
            ],
        )
    }

    fn transition(&mut self, to: WindowState, from: &[WindowState]) -> bool {
        if from.contains(&self.state) {
            self.state = to;
            true
        } else {
            log::debug!("ignored window transition {:?} -> {:?}", self.state, to);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle() {
        let mut lc = WindowLifecycle::default();
        assert!(lc.created());
        assert!(lc.running());
        assert!(lc.resizing());
        assert!(lc.running());
        assert!(lc.closed());
        assert_eq!(lc.state(), WindowState::Closed);
    }

    #[test]
    fn cannot_run_before_creation() {
        let mut lc = WindowLifecycle::default();
        assert!(!lc.running());
        assert_eq!(lc.state(), WindowState::Uninitialized);
    }

    #[test]
    fn closed_is_terminal() {
        let mut lc = WindowLifecycle::default();
        lc.created();
        lc.closed();
        assert!(!lc.running());
        assert!(!lc.resizing());
        assert!(!lc.closed());
    }

    #[test]
    fn resizing_only_from_running() {
        let mut lc = WindowLifecycle::default();
        lc.created();
        assert!(!lc.resizing());
    }
}
