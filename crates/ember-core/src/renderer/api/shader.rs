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

//! Shader stages and the reflection data of a linked shader.

use super::vertex::VertexUsage;
use crate::utils::NameHash;

/// A programmable stage of the graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Processes each vertex.
    Vertex,
    /// Processes each fragment.
    Fragment,
}

impl ShaderStage {
    /// Both stages a shader needs before it can link.
    pub const ALL: [ShaderStage; 2] = [ShaderStage::Vertex, ShaderStage::Fragment];

    /// Position of this stage in per-stage arrays.
    pub const fn index(self) -> usize {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Fragment => 1,
        }
    }
}

/// The auto-binding class of a uniform, derived from its name.
///
/// Higher layers use it to feed engine-provided values (camera matrices, time)
/// without per-shader bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UniformSemantic {
    /// A user-defined value with no automatic binding.
    #[default]
    None,
    /// Object-to-world matrix.
    World,
    /// World-to-view matrix.
    View,
    /// View-to-clip matrix.
    Projection,
    /// World * view.
    WorldView,
    /// View * projection.
    ViewProjection,
    /// World * view * projection.
    WorldViewProjection,
    /// Elapsed time in seconds.
    Time,
    /// Viewport size in pixels.
    ViewportSize,
}

impl UniformSemantic {
    /// Classifies a uniform by name. Case-insensitive; a `u_` prefix is ignored.
    pub fn from_uniform_name(name: &str) -> Self {
        let lowered = name.to_ascii_lowercase();
        let stripped = lowered.strip_prefix("u_").unwrap_or(lowered.as_str());
        match stripped {
            "world" | "model" => UniformSemantic::World,
            "view" => UniformSemantic::View,
            "projection" | "proj" => UniformSemantic::Projection,
            "worldview" | "modelview" => UniformSemantic::WorldView,
            "viewprojection" | "viewproj" => UniformSemantic::ViewProjection,
            "worldviewprojection" | "modelviewprojection" | "mvp" | "wvp" => {
                UniformSemantic::WorldViewProjection
            }
            "time" => UniformSemantic::Time,
            "viewportsize" | "resolution" => UniformSemantic::ViewportSize,
            _ => UniformSemantic::None,
        }
    }
}

/// One active uniform of a linked shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInfo {
    /// The uniform's name, without any `[0]` array suffix.
    pub name: String,
    /// Hash of `name`.
    pub hash: NameHash,
    /// The driver's uniform location.
    pub location: u32,
    /// Array length, 1 for non-array uniforms.
    pub size: i32,
    /// Auto-binding class.
    pub semantic: UniformSemantic,
}

impl UniformInfo {
    /// Builds the table entry for a reflected uniform.
    pub fn new(name: &str, location: u32, size: i32) -> Self {
        let name = name.strip_suffix("[0]").unwrap_or(name).to_owned();
        Self {
            hash: NameHash::of(&name),
            semantic: UniformSemantic::from_uniform_name(&name),
            name,
            location,
            size,
        }
    }
}

/// One active vertex attribute of a linked shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    /// The attribute's name in the shader source.
    pub name: String,
    /// Hash of the resolved usage's canonical name, or of `name` when the usage
    /// is unknown.
    pub hash: NameHash,
    /// The driver's attribute slot.
    pub slot: u32,
    /// The resolved semantic usage.
    pub usage: Option<VertexUsage>,
}

impl AttributeInfo {
    /// Builds the table entry for a reflected attribute.
    pub fn new(name: &str, slot: u32) -> Self {
        let usage = VertexUsage::from_attribute_name(name);
        Self {
            name: name.to_owned(),
            hash: usage.map_or_else(|| NameHash::of(name), VertexUsage::name_hash),
            slot,
            usage,
        }
    }
}

/// A value uploaded to a uniform with
/// [`RenderDevice::set_uniform`](crate::renderer::RenderDevice::set_uniform).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// A single float.
    Float(f32),
    /// Two floats.
    Vec2([f32; 2]),
    /// Three floats.
    Vec3([f32; 3]),
    /// Four floats.
    Vec4([f32; 4]),
    /// A signed integer, also used for sampler units.
    Int(i32),
    /// A column-major 4x4 matrix.
    Mat4([f32; 16]),
}
