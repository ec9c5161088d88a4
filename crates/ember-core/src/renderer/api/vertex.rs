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

//! Abstract vertex layouts: semantic usages, element formats and stages.
//!
//! A vertex layout is a flat list of [`VertexElementDescriptor`]s. Each element
//! names the vertex *stage* (the vertex-buffer slot) it is read from, the
//! semantic [`VertexUsage`] that ties it to a shader attribute, and its
//! [`VertexFormat`]. Elements sharing a stage are interleaved in declaration
//! order.

use crate::utils::NameHash;

/// The number of vertex-buffer slots a pipeline can read from.
pub const MAX_VERTEX_STAGES: usize = 4;

/// The semantic meaning of a vertex attribute.
///
/// Layout elements and shader attributes are matched by usage, never by
/// attribute location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexUsage {
    /// Object-space position.
    Position,
    /// Surface normal.
    Normal,
    /// Tangent vector.
    Tangent,
    /// Bitangent (binormal) vector.
    Bitangent,
    /// Primary vertex color.
    Color0,
    /// Secondary vertex color.
    Color1,
    /// First texture coordinate set.
    TexCoord0,
    /// Second texture coordinate set.
    TexCoord1,
    /// Third texture coordinate set.
    TexCoord2,
    /// Fourth texture coordinate set.
    TexCoord3,
    /// Skinning weights.
    BlendWeights,
    /// Skinning joint indices.
    BlendIndices,
}

impl VertexUsage {
    /// Every usage, in declaration order.
    pub const ALL: [VertexUsage; 12] = [
        VertexUsage::Position,
        VertexUsage::Normal,
        VertexUsage::Tangent,
        VertexUsage::Bitangent,
        VertexUsage::Color0,
        VertexUsage::Color1,
        VertexUsage::TexCoord0,
        VertexUsage::TexCoord1,
        VertexUsage::TexCoord2,
        VertexUsage::TexCoord3,
        VertexUsage::BlendWeights,
        VertexUsage::BlendIndices,
    ];

    /// The canonical attribute name of this usage.
    pub const fn semantic_name(self) -> &'static str {
        match self {
            VertexUsage::Position => "position",
            VertexUsage::Normal => "normal",
            VertexUsage::Tangent => "tangent",
            VertexUsage::Bitangent => "bitangent",
            VertexUsage::Color0 => "color0",
            VertexUsage::Color1 => "color1",
            VertexUsage::TexCoord0 => "texcoord0",
            VertexUsage::TexCoord1 => "texcoord1",
            VertexUsage::TexCoord2 => "texcoord2",
            VertexUsage::TexCoord3 => "texcoord3",
            VertexUsage::BlendWeights => "blendweights",
            VertexUsage::BlendIndices => "blendindices",
        }
    }

    /// The hash reflection tables are keyed by.
    pub const fn name_hash(self) -> NameHash {
        NameHash::of(self.semantic_name())
    }

    /// Resolves a shader attribute name to a usage.
    ///
    /// Matching is case-insensitive, ignores the conventional `a_`, `in_`,
    /// `attr_` and `v_` prefixes, and accepts common aliases such as `uv`,
    /// `pos`, `color` or `joints`. Returns `None` for names with no known
    /// meaning.
    pub fn from_attribute_name(name: &str) -> Option<Self> {
        let lowered = name.to_ascii_lowercase();
        let stripped = ["a_", "in_", "attr_", "v_"]
            .iter()
            .find_map(|prefix| lowered.strip_prefix(prefix))
            .unwrap_or(lowered.as_str());

        let usage = match stripped {
            "position" | "pos" | "vertex" => VertexUsage::Position,
            "normal" | "norm" => VertexUsage::Normal,
            "tangent" => VertexUsage::Tangent,
            "bitangent" | "binormal" => VertexUsage::Bitangent,
            "color" | "colour" | "color0" => VertexUsage::Color0,
            "color1" | "colour1" => VertexUsage::Color1,
            "texcoord" | "texcoord0" | "uv" | "uv0" => VertexUsage::TexCoord0,
            "texcoord1" | "uv1" => VertexUsage::TexCoord1,
            "texcoord2" | "uv2" => VertexUsage::TexCoord2,
            "texcoord3" | "uv3" => VertexUsage::TexCoord3,
            "blendweights" | "blendweight" | "weights" => VertexUsage::BlendWeights,
            "blendindices" | "blendindex" | "joints" => VertexUsage::BlendIndices,
            _ => return None,
        };
        Some(usage)
    }
}

/// The memory format of a single vertex element.
///
/// The discriminant doubles as an index into backend format tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VertexFormat {
    /// Two 8-bit unsigned integer components.
    Uint8x2,
    /// Four 8-bit unsigned integer components.
    Uint8x4,
    /// Two 8-bit signed integer components.
    Sint8x2,
    /// Four 8-bit signed integer components.
    Sint8x4,
    /// Two 8-bit unsigned components normalized to `[0.0, 1.0]`.
    Unorm8x2,
    /// Four 8-bit unsigned components normalized to `[0.0, 1.0]`.
    Unorm8x4,
    /// Two 8-bit signed components normalized to `[-1.0, 1.0]`.
    Snorm8x2,
    /// Four 8-bit signed components normalized to `[-1.0, 1.0]`.
    Snorm8x4,
    /// Two 16-bit unsigned integer components.
    Uint16x2,
    /// Four 16-bit unsigned integer components.
    Uint16x4,
    /// Two 16-bit signed integer components.
    Sint16x2,
    /// Four 16-bit signed integer components.
    Sint16x4,
    /// Two 16-bit unsigned components normalized to `[0.0, 1.0]`.
    Unorm16x2,
    /// Four 16-bit unsigned components normalized to `[0.0, 1.0]`.
    Unorm16x4,
    /// Two 16-bit signed components normalized to `[-1.0, 1.0]`.
    Snorm16x2,
    /// Four 16-bit signed components normalized to `[-1.0, 1.0]`.
    Snorm16x4,
    /// One 32-bit float component.
    Float32,
    /// Two 32-bit float components.
    Float32x2,
    /// Three 32-bit float components.
    Float32x3,
    /// Four 32-bit float components.
    Float32x4,
}

impl VertexFormat {
    /// Number of formats, the size of any table indexed by [`VertexFormat::index`].
    pub const COUNT: usize = 20;

    /// Position of this format in lookup tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One element of an abstract vertex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexElementDescriptor {
    /// The vertex-buffer slot this element is read from, below [`MAX_VERTEX_STAGES`].
    pub stage: usize,
    /// The semantic the element feeds.
    pub usage: VertexUsage,
    /// The element's memory format.
    pub format: VertexFormat,
}

impl VertexElementDescriptor {
    /// Shorthand constructor.
    pub const fn new(stage: usize, usage: VertexUsage, format: VertexFormat) -> Self {
        Self {
            stage,
            usage,
            format,
        }
    }
}
