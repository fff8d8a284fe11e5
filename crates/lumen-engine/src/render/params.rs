//! Constant-buffer layouts shared with the WGSL shaders.
//!
//! These must match the shader structs byte for byte.

use bytemuck::{Pod, Zeroable};

/// Center tap of the 5-tap Gaussian.
pub const BLOOM_WEIGHT_CENTER: f32 = 0.40262;
/// Taps at offset ±1.
pub const BLOOM_WEIGHT_NEAR: f32 = 0.24420;
/// Taps at offset ±2.
pub const BLOOM_WEIGHT_FAR: f32 = 0.05449;

/// Side taps in shader order: offsets -2, -1, +1, +2.
pub const BLOOM_WEIGHTS: [f32; 4] = [
    BLOOM_WEIGHT_FAR,
    BLOOM_WEIGHT_NEAR,
    BLOOM_WEIGHT_NEAR,
    BLOOM_WEIGHT_FAR,
];

/// Per-draw scene parameters (`IntensityParams` in `basic_ps.wgsl`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct IntensityParams {
    pub intensity: f32,
    pub _pad: [f32; 3], // 16-byte alignment
}

impl IntensityParams {
    pub const fn new(intensity: f32) -> Self {
        Self {
            intensity,
            _pad: [0.0; 3],
        }
    }
}

/// Blur axis of a bloom pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BloomDirection {
    Horizontal,
    Vertical,
}

/// Per-pass blur parameters (`BloomParams` in `bloom_ps.wgsl`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct BloomParams {
    pub weights: [f32; 4],
    pub texel_size: [f32; 2],
    pub weight_center: f32,
    /// Non-zero for a horizontal pass.
    pub horizontal: i32,
}

impl BloomParams {
    /// Parameters for a pass writing a `width` x `height` destination.
    pub fn new(direction: BloomDirection, width: u32, height: u32) -> Self {
        Self {
            weights: BLOOM_WEIGHTS,
            texel_size: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            weight_center: BLOOM_WEIGHT_CENTER,
            horizontal: match direction {
                BloomDirection::Horizontal => 1,
                BloomDirection::Vertical => 0,
            },
        }
    }
}

const _: () = assert!(std::mem::size_of::<IntensityParams>() == 16);
const _: () = assert!(std::mem::size_of::<BloomParams>() == 32);

/// Minimum binding size for a uniform of type `T`.
pub(crate) fn uniform_binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized() {
        let sum = BLOOM_WEIGHT_CENTER + BLOOM_WEIGHTS.iter().sum::<f32>();
        assert!((sum - 1.0).abs() < 1e-4, "kernel sums to {sum}");
    }

    #[test]
    fn kernel_is_symmetric() {
        assert_eq!(BLOOM_WEIGHTS[0], BLOOM_WEIGHTS[3]);
        assert_eq!(BLOOM_WEIGHTS[1], BLOOM_WEIGHTS[2]);
        assert!(BLOOM_WEIGHT_CENTER > BLOOM_WEIGHT_NEAR && BLOOM_WEIGHT_NEAR > BLOOM_WEIGHT_FAR);
    }

    #[test]
    fn texel_size_uses_destination_extent() {
        let p = BloomParams::new(BloomDirection::Horizontal, 640, 360);
        assert_eq!(p.texel_size, [1.0 / 640.0, 1.0 / 360.0]);
        assert_eq!(p.horizontal, 1);

        let v = BloomParams::new(BloomDirection::Vertical, 320, 180);
        assert_eq!(v.horizontal, 0);
        assert_eq!(v.texel_size, [1.0 / 320.0, 1.0 / 180.0]);
    }

    #[test]
    fn field_offsets_match_shader_layout() {
        let p = BloomParams::new(BloomDirection::Horizontal, 4, 2);
        let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&p));
        assert_eq!(f32::from_bits(words[0]), BLOOM_WEIGHT_FAR);
        assert_eq!(f32::from_bits(words[4]), 0.25);
        assert_eq!(f32::from_bits(words[5]), 0.5);
        assert_eq!(f32::from_bits(words[6]), BLOOM_WEIGHT_CENTER);
        assert_eq!(words[7], 1);
    }

    #[test]
    fn intensity_is_first_word() {
        let params = IntensityParams::new(3.5);
        let words: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&params));
        assert_eq!(words, &[3.5, 0.0, 0.0, 0.0]);
    }
}
