//! Off-screen targets, viewports and the fixed HDR + bloom frame.
//!
//! Frame structure:
//! - scene into the HDR target
//! - bright-pass extract
//! - separable bloom at half and quarter resolution
//! - additive composite into the back buffer
//!
//! Target and viewport dimensions always derive from the window size through
//! the same divisor table; [`apply_resize`] keeps them in step.

mod params;
mod passes;
mod pipeline;
mod resize;
mod table;
mod target;
mod viewport;

#[cfg(test)]
pub(crate) mod testing;

pub use params::{
    BloomDirection, BloomParams, IntensityParams, BLOOM_WEIGHTS, BLOOM_WEIGHT_CENTER, BLOOM_WEIGHT_FAR,
    BLOOM_WEIGHT_NEAR,
};
pub use passes::{BloomPass, Destination, PassDesc, Program, FRAME_PASSES, FULLSCREEN_VERTEX_COUNT};
pub use pipeline::{FrameOutcome, RenderPipeline};
pub use resize::{apply_resize, ResizeOutcome, SwapchainResize, TargetSet};
pub use table::{RenderTargetTable, TargetId};
pub use target::{RenderTarget, TargetExtent, TargetFactory, TARGET_FORMAT};
pub use viewport::{scale_extent, Viewport, ViewportTable, ViewportTier};
