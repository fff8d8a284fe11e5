/// A rasterizer viewport in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Applies this viewport to a render pass.
    pub fn apply(self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(
            self.x,
            self.y,
            self.width,
            self.height,
            self.min_depth,
            self.max_depth,
        );
    }
}

/// Scales a window extent by a resolution divisor, never below 1x1.
#[inline]
pub fn scale_extent(width: u32, height: u32, divisor: u32) -> (u32, u32) {
    ((width / divisor).max(1), (height / divisor).max(1))
}

/// Resolution tiers used by the pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ViewportTier {
    Full,
    Half,
    Quarter,
}

impl ViewportTier {
    pub const ALL: [ViewportTier; 3] = [ViewportTier::Full, ViewportTier::Half, ViewportTier::Quarter];

    pub const fn divisor(self) -> u32 {
        match self {
            ViewportTier::Full => 1,
            ViewportTier::Half => 2,
            ViewportTier::Quarter => 4,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Full/half/quarter viewports, kept in step with the window size.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportTable {
    viewports: [Viewport; 3],
}

impl ViewportTable {
    pub fn new(width: u32, height: u32) -> Self {
        let mut table = Self {
            viewports: [Viewport::new(0.0, 0.0); 3],
        };
        table.recompute(width, height);
        table
    }

    /// Rewrites every tier in place for a new window size.
    pub fn recompute(&mut self, width: u32, height: u32) {
        for tier in ViewportTier::ALL {
            let (w, h) = scale_extent(width, height, tier.divisor());
            let vp = &mut self.viewports[tier.index()];
            vp.width = w as f32;
            vp.height = h as f32;
        }
    }

    pub fn get(&self, tier: ViewportTier) -> Viewport {
        self.viewports[tier.index()]
    }

    pub fn extent(&self, tier: ViewportTier) -> (u32, u32) {
        let vp = self.get(tier);
        (vp.width as u32, vp.height as u32)
    }
}
