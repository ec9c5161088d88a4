// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Render pipeline descriptors and fixed-function render state.

use super::vertex::VertexElementDescriptor;
use std::borrow::Cow;

/// A comparison function used by the depth test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// Never passes.
    Never,
    /// Passes if the new value is less than the stored one.
    Less,
    /// Passes if the values are equal.
    Equal,
    /// Passes if the new value is less than or equal to the stored one.
    LessEqual,
    /// Passes if the new value is greater than the stored one.
    Greater,
    /// Passes if the values differ.
    NotEqual,
    /// Passes if the new value is greater than or equal to the stored one.
    GreaterEqual,
    /// Always passes.
    Always,
}

/// A multiplier applied to a blend input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0.0`
    Zero,
    /// `1.0`
    One,
    /// Source color.
    SrcColor,
    /// `1.0 - source color`
    OneMinusSrcColor,
    /// Source alpha.
    SrcAlpha,
    /// `1.0 - source alpha`
    OneMinusSrcAlpha,
    /// Destination alpha.
    DstAlpha,
    /// `1.0 - destination alpha`
    OneMinusDstAlpha,
}

/// How the weighted source and destination are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOperation {
    /// `src + dst`
    Add,
    /// `src - dst`
    Subtract,
    /// `dst - src`
    ReverseSubtract,
}

/// Which faces are discarded by rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// Keep every face.
    #[default]
    None,
    /// Discard front faces.
    Front,
    /// Discard back faces.
    Back,
}

/// The winding order of front-facing triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    /// Counter-clockwise.
    #[default]
    Ccw,
    /// Clockwise.
    Cw,
}

/// Depth testing and writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthState {
    /// Whether fragments are tested against the depth buffer.
    pub test_enabled: bool,
    /// Whether passing fragments write their depth.
    pub write_enabled: bool,
    /// The test applied when `test_enabled` is set.
    pub compare: CompareFunction,
}

impl DepthState {
    /// Depth test and write disabled, `Less` comparison.
    pub const DISABLED: Self = Self {
        test_enabled: false,
        write_enabled: true,
        compare: CompareFunction::Less,
    };

    /// Standard opaque geometry: test with `Less` and write.
    pub const LESS: Self = Self {
        test_enabled: true,
        write_enabled: true,
        compare: CompareFunction::Less,
    };
}

impl Default for DepthState {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Color blending, applied to all channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    /// Multiplier of the incoming fragment.
    pub src_factor: BlendFactor,
    /// Multiplier of the stored color.
    pub dst_factor: BlendFactor,
    /// How the two are combined.
    pub operation: BlendOperation,
}

impl BlendState {
    /// Classic alpha blending.
    pub const ALPHA: Self = Self {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
        operation: BlendOperation::Add,
    };

    /// Additive blending.
    pub const ADDITIVE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    };
}

/// The fixed-function state a pipeline applies when it becomes active.
///
/// The default value is the baseline a device returns to on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderState {
    /// Depth testing and writing.
    pub depth: DepthState,
    /// Blending, or `None` to overwrite.
    pub blend: Option<BlendState>,
    /// Face culling.
    pub cull_mode: CullMode,
    /// Winding of front faces.
    pub front_face: FrontFace,
}

/// A descriptor used to create a [`RenderPipeline`](crate::renderer::RenderPipeline).
#[derive(Debug, Clone, Default)]
pub struct PipelineDescriptor<'a> {
    /// An optional debug label for the pipeline.
    pub label: Option<Cow<'a, str>>,
    /// The abstract vertex layout, in declaration order.
    pub layout: Cow<'a, [VertexElementDescriptor]>,
    /// Fixed-function state.
    pub render_state: RenderState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_render_state_is_baseline() {
        let state = RenderState::default();
        assert!(!state.depth.test_enabled);
        assert!(state.depth.write_enabled);
        assert_eq!(state.depth.compare, CompareFunction::Less);
        assert_eq!(state.blend, None);
        assert_eq!(state.cull_mode, CullMode::None);
        assert_eq!(state.front_face, FrontFace::Ccw);
    }

    #[test]
    fn test_default_descriptor_is_empty() {
        let desc = PipelineDescriptor::default();
        assert!(desc.layout.is_empty());
        assert!(desc.label.is_none());
    }
}
