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

//! Conversions from ember's backend-agnostic types to OpenGL ES enums.

use ember_core::renderer::api::{
    BlendFactor, BlendOperation, CompareFunction, FrontFace, PrimitiveTopology, ShaderStage,
    VertexFormat,
};

/// A local extension trait converting ember types into GL enum values.
pub trait IntoGl {
    /// Consumes self and returns the matching GL enum.
    fn into_gl(self) -> u32;
}

impl IntoGl for PrimitiveTopology {
    fn into_gl(self) -> u32 {
        match self {
            PrimitiveTopology::PointList => glow::POINTS,
            PrimitiveTopology::LineList => glow::LINES,
            PrimitiveTopology::LineStrip => glow::LINE_STRIP,
            PrimitiveTopology::TriangleList => glow::TRIANGLES,
            PrimitiveTopology::TriangleStrip => glow::TRIANGLE_STRIP,
            PrimitiveTopology::TriangleFan => glow::TRIANGLE_FAN,
        }
    }
}

impl IntoGl for CompareFunction {
    fn into_gl(self) -> u32 {
        match self {
            CompareFunction::Never => glow::NEVER,
            CompareFunction::Less => glow::LESS,
            CompareFunction::Equal => glow::EQUAL,
            CompareFunction::LessEqual => glow::LEQUAL,
            CompareFunction::Greater => glow::GREATER,
            CompareFunction::NotEqual => glow::NOTEQUAL,
            CompareFunction::GreaterEqual => glow::GEQUAL,
            CompareFunction::Always => glow::ALWAYS,
        }
    }
}

impl IntoGl for BlendFactor {
    fn into_gl(self) -> u32 {
        match self {
            BlendFactor::Zero => glow::ZERO,
            BlendFactor::One => glow::ONE,
            BlendFactor::SrcColor => glow::SRC_COLOR,
            BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
            BlendFactor::SrcAlpha => glow::SRC_ALPHA,
            BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
            BlendFactor::DstAlpha => glow::DST_ALPHA,
            BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
        }
    }
}

impl IntoGl for BlendOperation {
    fn into_gl(self) -> u32 {
        match self {
            BlendOperation::Add => glow::FUNC_ADD,
            BlendOperation::Subtract => glow::FUNC_SUBTRACT,
            BlendOperation::ReverseSubtract => glow::FUNC_REVERSE_SUBTRACT,
        }
    }
}

impl IntoGl for FrontFace {
    fn into_gl(self) -> u32 {
        match self {
            FrontFace::Ccw => glow::CCW,
            FrontFace::Cw => glow::CW,
        }
    }
}

impl IntoGl for ShaderStage {
    fn into_gl(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

/// How the driver reads one vertex element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeFormat {
    /// Components per element, 1 to 4.
    pub components: i32,
    /// GL component type.
    pub data_type: u32,
    /// Byte size of the whole element.
    pub size: u32,
    /// Whether integer components are normalized to `[0, 1]` / `[-1, 1]`.
    pub normalized: bool,
}

const fn native(components: i32, data_type: u32, size: u32, normalized: bool) -> NativeFormat {
    NativeFormat {
        components,
        data_type,
        size,
        normalized,
    }
}

/// Lookup table indexed by [`VertexFormat::index`].
const FORMAT_TABLE: [NativeFormat; VertexFormat::COUNT] = [
    native(2, glow::UNSIGNED_BYTE, 2, false),  // Uint8x2
    native(4, glow::UNSIGNED_BYTE, 4, false),  // Uint8x4
    native(2, glow::BYTE, 2, false),           // Sint8x2
    native(4, glow::BYTE, 4, false),           // Sint8x4
    native(2, glow::UNSIGNED_BYTE, 2, true),   // Unorm8x2
    native(4, glow::UNSIGNED_BYTE, 4, true),   // Unorm8x4
    native(2, glow::BYTE, 2, true),            // Snorm8x2
    native(4, glow::BYTE, 4, true),            // Snorm8x4
    native(2, glow::UNSIGNED_SHORT, 4, false), // Uint16x2
    native(4, glow::UNSIGNED_SHORT, 8, false), // Uint16x4
    native(2, glow::SHORT, 4, false),          // Sint16x2
    native(4, glow::SHORT, 8, false),          // Sint16x4
    native(2, glow::UNSIGNED_SHORT, 4, true),  // Unorm16x2
    native(4, glow::UNSIGNED_SHORT, 8, true),  // Unorm16x4
    native(2, glow::SHORT, 4, true),           // Snorm16x2
    native(4, glow::SHORT, 8, true),           // Snorm16x4
    native(1, glow::FLOAT, 4, false),          // Float32
    native(2, glow::FLOAT, 8, false),          // Float32x2
    native(3, glow::FLOAT, 12, false),         // Float32x3
    native(4, glow::FLOAT, 16, false),         // Float32x4
];

/// The native description of a vertex format.
pub fn native_format(format: VertexFormat) -> NativeFormat {
    FORMAT_TABLE[format.index()]
}

/// The GL index type for an index buffer stride, or `None` if unsupported.
pub fn index_type(stride: u32) -> Option<u32> {
    match stride {
        1 => Some(glow::UNSIGNED_BYTE),
        2 => Some(glow::UNSIGNED_SHORT),
        4 => Some(glow::UNSIGNED_INT),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table_matches_variants() {
        let float3 = native_format(VertexFormat::Float32x3);
        assert_eq!(float3.components, 3);
        assert_eq!(float3.data_type, glow::FLOAT);
        assert_eq!(float3.size, 12);
        assert!(!float3.normalized);

        let color = native_format(VertexFormat::Unorm8x4);
        assert_eq!(color.components, 4);
        assert_eq!(color.data_type, glow::UNSIGNED_BYTE);
        assert_eq!(color.size, 4);
        assert!(color.normalized);

        let snorm = native_format(VertexFormat::Snorm16x2);
        assert_eq!(snorm.data_type, glow::SHORT);
        assert!(snorm.normalized);
    }

    #[test]
    fn test_sizes_are_consistent_with_components() {
        for format in [
            VertexFormat::Uint8x2,
            VertexFormat::Sint16x4,
            VertexFormat::Float32,
            VertexFormat::Float32x4,
        ] {
            let native = native_format(format);
            let component_size = match native.data_type {
                glow::BYTE | glow::UNSIGNED_BYTE => 1,
                glow::SHORT | glow::UNSIGNED_SHORT => 2,
                _ => 4,
            };
            assert_eq!(native.size, native.components as u32 * component_size);
        }
    }

    #[test]
    fn test_index_types() {
        assert_eq!(index_type(2), Some(glow::UNSIGNED_SHORT));
        assert_eq!(index_type(4), Some(glow::UNSIGNED_INT));
        assert_eq!(index_type(3), None);
    }

    #[test]
    fn test_enum_conversions() {
        assert_eq!(PrimitiveTopology::TriangleList.into_gl(), glow::TRIANGLES);
        assert_eq!(CompareFunction::LessEqual.into_gl(), glow::LEQUAL);
        assert_eq!(BlendFactor::OneMinusSrcAlpha.into_gl(), glow::ONE_MINUS_SRC_ALPHA);
        assert_eq!(ShaderStage::Fragment.into_gl(), glow::FRAGMENT_SHADER);
    }
}
