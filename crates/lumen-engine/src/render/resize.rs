use crate::device::GraphicsDevice;
use crate::error::EngineError;

use super::table::{RenderTargetTable, TargetId};
use super::target::{TargetExtent, TargetFactory};
use super::viewport::{ViewportTable, ViewportTier};

/// Rebuilds the swapchain at a new size. Implemented by the graphics device.
pub trait SwapchainResize {
    fn resize_swapchain(&mut self, width: u32, height: u32) -> Result<(), EngineError>;
}

impl SwapchainResize for GraphicsDevice {
    fn resize_swapchain(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        self.resize(width, height)
    }
}

/// Outcome of a successful [`apply_resize`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResizeOutcome {
    /// Swapchain, viewports and targets now match the new size.
    Applied,
    /// Zero-area window; size recorded, GPU resources kept until the next real size.
    Deferred,
}

/// Everything whose dimensions follow the window: stored size, viewports, targets.
pub struct TargetSet<T> {
    window: (u32, u32),
    viewports: ViewportTable,
    targets: RenderTargetTable<T>,
}

impl<T: TargetExtent> TargetSet<T> {
    pub fn create<F>(factory: &F, width: u32, height: u32) -> Result<Self, EngineError>
    where
        F: TargetFactory<Target = T>,
    {
        Ok(Self {
            window: (width, height),
            viewports: ViewportTable::new(width, height),
            targets: RenderTargetTable::create(factory, width, height)?,
        })
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window
    }

    pub fn viewports(&self) -> &ViewportTable {
        &self.viewports
    }

    pub fn targets(&self) -> &RenderTargetTable<T> {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut RenderTargetTable<T> {
        &mut self.targets
    }

    /// `true` when the window has area and every viewport and target matches it.
    pub fn is_consistent(&self) -> bool {
        let (width, height) = self.window;
        if width == 0 || height == 0 {
            return false;
        }

        let tiers_ok = ViewportTier::ALL.iter().all(|&tier| {
            let expected = super::viewport::scale_extent(width, height, tier.divisor());
            self.viewports.extent(tier) == expected
        });

        let targets_ok = TargetId::ALL
            .iter()
            .all(|&id| self.targets.extent(id) == Some(id.extent_for(width, height)));

        tiers_ok && targets_ok
    }
}

/// Resize protocol, run synchronously from the window's resize callback.
///
/// 1. record the new window size
/// 2. rebuild the swapchain
/// 3. recompute every viewport in place
/// 4. release and recreate every render target at its divisor-scaled size
///
/// A failure in step 2 or 4 is fatal for the render loop.
pub fn apply_resize<D>(
    device: &mut D,
    set: &mut TargetSet<D::Target>,
    width: u32,
    height: u32,
) -> Result<ResizeOutcome, EngineError>
where
    D: SwapchainResize + TargetFactory,
{
    set.window = (width, height);

    device.resize_swapchain(width, height)?;

    if width == 0 || height == 0 {
        return Ok(ResizeOutcome::Deferred);
    }

    set.viewports.recompute(width, height);
    set.targets.resize_all(&*device, width, height)?;

    log::debug!("frame targets rebuilt for {width}x{height}");
    Ok(ResizeOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::FakeDevice;

    #[test]
    fn resize_keeps_everything_in_step() {
        let mut device = FakeDevice::default();
        let mut set = TargetSet::create(&device, 1280, 720).unwrap();
        assert!(set.is_consistent());

        let outcome = apply_resize(&mut device, &mut set, 640, 480).unwrap();

        assert_eq!(outcome, ResizeOutcome::Applied);
        assert!(set.is_consistent());
        assert_eq!(set.targets().extent(TargetId::LargeBloomIntermediate), Some((320, 240)));
        assert_eq!(set.viewports().extent(ViewportTier::Quarter), (160, 120));
        assert_eq!(device.swapchain_size(), Some((640, 480)));
    }

    #[test]
    fn repeated_resizes_leave_no_stale_dimension() {
        let mut device = FakeDevice::default();
        let mut set = TargetSet::create(&device, 1280, 720).unwrap();

        for (w, h) in [(1920, 1080), (800, 600), (333, 777), (1280, 720)] {
            apply_resize(&mut device, &mut set, w, h).unwrap();
            assert!(set.is_consistent(), "after {w}x{h}");
            assert_eq!(set.window_size(), (w, h));
        }
        assert_eq!(device.live(), TargetId::COUNT);
    }

    #[test]
    fn swapchain_failure_is_fatal_and_skips_targets() {
        let mut device = FakeDevice::default();
        let mut set = TargetSet::create(&device, 1280, 720).unwrap();
        let attempts = device.attempts();
        device.fail_swapchain(true);

        let err = apply_resize(&mut device, &mut set, 640, 480).unwrap_err();

        assert!(matches!(err, EngineError::Resize { .. }));
        assert_eq!(device.attempts(), attempts);
        assert!(!set.is_consistent());
    }

    #[test]
    fn target_failure_is_fatal() {
        let mut device = FakeDevice::default();
        let mut set = TargetSet::create(&device, 1280, 720).unwrap();
        device.fail_at(device.attempts() + 4);

        assert!(apply_resize(&mut device, &mut set, 640, 480).is_err());
        assert!(!set.targets().is_complete());
        assert!(!set.is_consistent());
    }

    #[test]
    fn zero_area_resize_is_deferred() {
        let mut device = FakeDevice::default();
        let mut set = TargetSet::create(&device, 1280, 720).unwrap();
        let attempts = device.attempts();

        let outcome = apply_resize(&mut device, &mut set, 0, 0).unwrap();

        assert_eq!(outcome, ResizeOutcome::Deferred);
        assert_eq!(device.attempts(), attempts);
        assert_eq!(set.targets().extent(TargetId::Hdr), Some((1280, 720)));

        apply_resize(&mut device, &mut set, 1024, 768).unwrap();
        assert!(set.is_consistent());
    }
}
