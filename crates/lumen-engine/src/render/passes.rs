//! The fixed per-frame pass graph.
//!
//! Order, destinations, inputs and viewport tiers are build-time constants.
//! The pipeline walks [`FRAME_PASSES`] front to back every frame.

use super::params::BloomDirection;
use super::table::TargetId;
use super::viewport::ViewportTier;

/// Where a pass writes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Destination {
    Target(TargetId),
    BackBuffer,
}

/// One of the four blur invocations. Each owns a parameter buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BloomPass {
    LargeHorizontal,
    LargeVertical,
    MediumHorizontal,
    MediumVertical,
}

impl BloomPass {
    pub const COUNT: usize = 4;

    pub const ALL: [BloomPass; Self::COUNT] = [
        BloomPass::LargeHorizontal,
        BloomPass::LargeVertical,
        BloomPass::MediumHorizontal,
        BloomPass::MediumVertical,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn direction(self) -> BloomDirection {
        match self {
            BloomPass::LargeHorizontal | BloomPass::MediumHorizontal => BloomDirection::Horizontal,
            BloomPass::LargeVertical | BloomPass::MediumVertical => BloomDirection::Vertical,
        }
    }

    /// Target written by this pass; texel size is derived from it.
    pub const fn destination(self) -> TargetId {
        match self {
            BloomPass::LargeHorizontal => TargetId::LargeBloomIntermediate,
            BloomPass::LargeVertical => TargetId::LargeBloom,
            BloomPass::MediumHorizontal => TargetId::MediumBloomIntermediate,
            BloomPass::MediumVertical => TargetId::MediumBloom,
        }
    }

    pub const fn source(self) -> TargetId {
        match self {
            BloomPass::LargeHorizontal => TargetId::Hdr,
            BloomPass::LargeVertical => TargetId::LargeBloomIntermediate,
            BloomPass::MediumHorizontal => TargetId::BrightPass,
            BloomPass::MediumVertical => TargetId::MediumBloomIntermediate,
        }
    }
}

/// Shader pairing + fixed-function setup of a pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Program {
    /// basic VS/PS over the test mesh, intensity constant buffer.
    Scene,
    /// copy VS + bright-pass PS, full-screen triangle.
    BrightPass,
    /// copy VS + bloom PS, full-screen triangle, per-pass bloom constants.
    Bloom(BloomPass),
    /// copy VS + copy PS, full-screen triangle, three inputs.
    Composite,
}

/// Declarative description of one draw pass.
#[derive(Debug, Copy, Clone)]
pub struct PassDesc {
    pub label: &'static str,
    pub destination: Destination,
    /// Set before anything is drawn; must match the destination's resolution.
    pub viewport: ViewportTier,
    pub program: Program,
    /// Shader-resource inputs in texture-slot order.
    pub inputs: &'static [TargetId],
}

impl PassDesc {
    const fn bloom(label: &'static str, pass: BloomPass) -> Self {
        Self {
            label,
            destination: Destination::Target(pass.destination()),
            viewport: pass.destination().tier(),
            program: Program::Bloom(pass),
            inputs: match pass {
                BloomPass::LargeHorizontal => &[TargetId::Hdr],
                BloomPass::LargeVertical => &[TargetId::LargeBloomIntermediate],
                BloomPass::MediumHorizontal => &[TargetId::BrightPass],
                BloomPass::MediumVertical => &[TargetId::MediumBloomIntermediate],
            },
        }
    }
}

/// Vertices drawn by a full-screen pass; positions are synthesized by the copy vertex shader.
pub const FULLSCREEN_VERTEX_COUNT: u32 = 3;

pub const FRAME_PASSES: [PassDesc; 7] = [
    PassDesc {
        label: "lumen scene pass",
        destination: Destination::Target(TargetId::Hdr),
        viewport: ViewportTier::Full,
        program: Program::Scene,
        inputs: &[],
    },
    PassDesc {
        label: "lumen bright pass",
        destination: Destination::Target(TargetId::BrightPass),
        viewport: ViewportTier::Full,
        program: Program::BrightPass,
        inputs: &[TargetId::Hdr],
    },
    PassDesc::bloom("lumen bloom large horizontal", BloomPass::LargeHorizontal),
    PassDesc::bloom("lumen bloom large vertical", BloomPass::LargeVertical),
    PassDesc::bloom("lumen bloom medium horizontal", BloomPass::MediumHorizontal),
    PassDesc::bloom("lumen bloom medium vertical", BloomPass::MediumVertical),
    PassDesc {
        label: "lumen composite pass",
        destination: Destination::BackBuffer,
        viewport: ViewportTier::Full,
        program: Program::Composite,
        inputs: &[TargetId::Hdr, TargetId::LargeBloom, TargetId::MediumBloom],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_matches_destination_tier() {
        for pass in &FRAME_PASSES {
            let expected = match pass.destination {
                Destination::Target(id) => id.tier(),
                Destination::BackBuffer => ViewportTier::Full,
            };
            assert_eq!(pass.viewport, expected, "{}", pass.label);
        }
    }

    #[test]
    fn inputs_are_written_earlier_in_the_frame() {
        let mut written: Vec<TargetId> = Vec::new();
        for pass in &FRAME_PASSES {
            for input in pass.inputs {
                assert!(written.contains(input), "{} reads {:?} before it is written", pass.label, input);
            }
            if let Destination::Target(id) = pass.destination {
                assert!(!pass.inputs.contains(&id), "{} reads its own destination", pass.label);
                written.push(id);
            }
        }
        assert_eq!(written.len(), TargetId::COUNT);
    }

    #[test]
    fn every_target_written_exactly_once() {
        for id in TargetId::ALL {
            let writers = FRAME_PASSES
                .iter()
                .filter(|p| p.destination == Destination::Target(id))
                .count();
            assert_eq!(writers, 1, "{id:?}");
        }
    }

    #[test]
    fn bloom_tiers_follow_their_sources() {
        assert_eq!(BloomPass::LargeHorizontal.source(), TargetId::Hdr);
        assert_eq!(BloomPass::MediumHorizontal.source(), TargetId::BrightPass);
        for pass in &FRAME_PASSES {
            if let Program::Bloom(bloom) = pass.program {
                assert_eq!(pass.inputs, &[bloom.source()]);
                assert_eq!(pass.destination, Destination::Target(bloom.destination()));
            }
        }
    }

    #[test]
    fn each_bloom_axis_runs_horizontal_then_vertical() {
        let order: Vec<BloomPass> = FRAME_PASSES
            .iter()
            .filter_map(|p| match p.program {
                Program::Bloom(b) => Some(b),
                _ => None,
            })
            .collect();
        assert_eq!(order, BloomPass::ALL.to_vec());
        assert_eq!(BloomPass::LargeHorizontal.direction(), BloomDirection::Horizontal);
        assert_eq!(BloomPass::LargeVertical.direction(), BloomDirection::Vertical);
    }

    #[test]
    fn composite_reads_scene_and_both_bloom_tiers_last() {
        let last = FRAME_PASSES.last().unwrap();
        assert_eq!(last.destination, Destination::BackBuffer);
        assert_eq!(last.program, Program::Composite);
        assert_eq!(
            last.inputs,
            &[TargetId::Hdr, TargetId::LargeBloom, TargetId::MediumBloom]
        );
    }

    #[test]
    fn scene_pass_comes_first() {
        assert_eq!(FRAME_PASSES[0].program, Program::Scene);
        assert!(FRAME_PASSES[0].inputs.is_empty());
    }
}
