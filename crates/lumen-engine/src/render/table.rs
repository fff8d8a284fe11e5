use crate::error::EngineError;

use super::target::{TargetExtent, TargetFactory};
use super::viewport::{scale_extent, ViewportTier};

/// The fixed set of off-screen targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TargetId {
    /// Scene color, full resolution.
    Hdr,
    /// High-luminance extract of `Hdr`, full resolution.
    BrightPass,
    /// Horizontal blur of `Hdr`, half resolution.
    LargeBloomIntermediate,
    /// Vertical blur of the large intermediate, half resolution.
    LargeBloom,
    /// Horizontal blur of `BrightPass`, quarter resolution.
    MediumBloomIntermediate,
    /// Vertical blur of the medium intermediate, quarter resolution.
    MediumBloom,
}

impl TargetId {
    pub const COUNT: usize = 6;

    pub const ALL: [TargetId; Self::COUNT] = [
        TargetId::Hdr,
        TargetId::BrightPass,
        TargetId::LargeBloomIntermediate,
        TargetId::LargeBloom,
        TargetId::MediumBloomIntermediate,
        TargetId::MediumBloom,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Resolution tier this target lives at.
    pub const fn tier(self) -> ViewportTier {
        match self {
            TargetId::Hdr | TargetId::BrightPass => ViewportTier::Full,
            TargetId::LargeBloomIntermediate | TargetId::LargeBloom => ViewportTier::Half,
            TargetId::MediumBloomIntermediate | TargetId::MediumBloom => ViewportTier::Quarter,
        }
    }

    /// Window-size divisor: 1, 2 or 4.
    pub const fn divisor(self) -> u32 {
        self.tier().divisor()
    }

    pub const fn label(self) -> &'static str {
        match self {
            TargetId::Hdr => "lumen hdr target",
            TargetId::BrightPass => "lumen bright-pass target",
            TargetId::LargeBloomIntermediate => "lumen large bloom intermediate",
            TargetId::LargeBloom => "lumen large bloom target",
            TargetId::MediumBloomIntermediate => "lumen medium bloom intermediate",
            TargetId::MediumBloom => "lumen medium bloom target",
        }
    }

    /// Extent of this target for a given window size.
    pub fn extent_for(self, width: u32, height: u32) -> (u32, u32) {
        scale_extent(width, height, self.divisor())
    }
}

/// Table of render targets indexed by [`TargetId`].
///
/// Slots are empty before creation, after [`RenderTargetTable::destroy_all`]
/// and after a failed rebuild. Each slot is either a complete target or nothing.
pub struct RenderTargetTable<T> {
    slots: [Option<T>; TargetId::COUNT],
}

impl<T: TargetExtent> RenderTargetTable<T> {
    pub fn empty() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Creates every target for a `width` x `height` window.
    ///
    /// On failure the targets created so far are released before returning.
    pub fn create<F>(factory: &F, width: u32, height: u32) -> Result<Self, EngineError>
    where
        F: TargetFactory<Target = T>,
    {
        let mut table = Self::empty();
        for id in TargetId::ALL {
            let (w, h) = id.extent_for(width, height);
            table.slots[id.index()] = Some(factory.create_target(id, w, h)?);
        }
        Ok(table)
    }

    /// Releases and recreates every target at its divisor-scaled size.
    ///
    /// Stops at the first failure: that slot is left empty and the error is
    /// returned so the caller can stop rendering rather than run with a
    /// mixed-resolution table.
    pub fn resize_all<F>(&mut self, factory: &F, width: u32, height: u32) -> Result<(), EngineError>
    where
        F: TargetFactory<Target = T>,
    {
        for id in TargetId::ALL {
            let (w, h) = id.extent_for(width, height);
            self.slots[id.index()] = None;

            match factory.create_target(id, w, h) {
                Ok(target) => self.slots[id.index()] = Some(target),
                Err(e) => {
                    log::error!("failed to rebuild {} at {w}x{h}: {e}", id.label());
                    return Err(EngineError::Resize {
                        width,
                        height,
                        reason: format!("{}: {e}", id.label()),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, id: TargetId) -> Option<&T> {
        self.slots[id.index()].as_ref()
    }

    /// Like [`get`](Self::get) but reports a missing target as an error.
    pub fn require(&self, id: TargetId) -> Result<&T, EngineError> {
        self.get(id)
            .ok_or_else(|| EngineError::resource(id.label(), "target is not allocated"))
    }

    pub fn extent(&self, id: TargetId) -> Option<(u32, u32)> {
        self.get(id).map(TargetExtent::extent)
    }

    pub fn release(&mut self, id: TargetId) {
        self.slots[id.index()] = None;
    }

    /// Releases every slot; tolerant of slots that are already empty.
    pub fn destroy_all(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}
