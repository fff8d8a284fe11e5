//! GPU-free stand-ins for the graphics device, used by the table and resize tests.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::EngineError;

use super::resize::SwapchainResize;
use super::table::TargetId;
use super::target::{TargetExtent, TargetFactory};

pub(crate) struct FakeTarget {
    width: u32,
    height: u32,
    live: Rc<Cell<usize>>,
}

impl TargetExtent for FakeTarget {
    fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for FakeTarget {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

/// Counts target creations and can be told to fail a specific one.
#[derive(Default)]
pub(crate) struct FakeDevice {
    attempts: Cell<usize>,
    created: Cell<usize>,
    live: Rc<Cell<usize>>,
    /// Zero-based creation attempt that fails.
    fail_on: Cell<Option<usize>>,
    swapchain: Option<(u32, u32)>,
    fail_swapchain: bool,
}

impl FakeDevice {
    pub(crate) fn failing_at(attempt: usize) -> Self {
        let device = Self::default();
        device.fail_at(attempt);
        device
    }

    pub(crate) fn fail_at(&self, attempt: usize) {
        self.fail_on.set(Some(attempt));
    }

    pub(crate) fn fail_swapchain(&mut self, fail: bool) {
        self.fail_swapchain = fail;
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.get()
    }

    pub(crate) fn created(&self) -> usize {
        self.created.get()
    }

    /// Targets created and not yet dropped.
    pub(crate) fn live(&self) -> usize {
        self.live.get()
    }

    pub(crate) fn swapchain_size(&self) -> Option<(u32, u32)> {
        self.swapchain
    }
}

impl TargetFactory for FakeDevice {
    type Target = FakeTarget;

    fn create_target(&self, id: TargetId, width: u32, height: u32) -> Result<FakeTarget, EngineError> {
        let attempt = self.attempts.get();
        self.attempts.set(attempt + 1);

        if self.fail_on.get() == Some(attempt) {
            return Err(EngineError::resource(id.label(), "injected failure"));
        }

        self.created.set(self.created.get() + 1);
        self.live.set(self.live.get() + 1);
        Ok(FakeTarget {
            width,
            height,
            live: Rc::clone(&self.live),
        })
    }
}

impl SwapchainResize for FakeDevice {
    fn resize_swapchain(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        if self.fail_swapchain {
            return Err(EngineError::Resize {
                width,
                height,
                reason: "injected swapchain failure".into(),
            });
        }
        if width > 0 && height > 0 {
            self.swapchain = Some((width, height));
        }
        Ok(())
    }
}
