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

//! The device's cached mirror of driver-visible state.
//!
//! [`SessionState`] records what the driver currently has bound so the commit
//! step can skip calls that would not change anything. Every mutator issues the
//! native call and updates the cache together, and returns whether a call was
//! issued. Mutators are visible only inside the backend; everything else reads
//! through the accessors.
//!
//! The copy-write binding point is not cached: uploads on ES 3 bind it
//! explicitly every time and nothing else reads it.
//!
//! The cache holds strong references to the objects it records as bound, so a
//! bound buffer or program is never released (and its name never reused)
//! while the driver still points at it.

use super::buffer::GlesBuffer;
use super::conversions::IntoGl;
use super::driver::GlDriver;
use super::shader::GlesShader;
use ember_core::renderer::api::{
    BlendFactor, BlendOperation, BlendState, CullMode, DepthState, FrontFace, RenderState,
};
use ember_core::renderer::{Buffer, BufferType, Shader};
use ember_core::resource::same_resource;
use ember_core::Resource;

/// Width of the enabled-attribute mask.
pub const ATTRIBUTE_MASK_BITS: u32 = u32::BITS;

/// Blend factors and equation the driver holds after a reset.
const RESET_BLEND: BlendState = BlendState {
    src_factor: BlendFactor::One,
    dst_factor: BlendFactor::Zero,
    operation: BlendOperation::Add,
};

/// The buffer binding points the device uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex data, read by attribute pointers.
    Array,
    /// Index data, read by indexed draws.
    Element,
    /// Uniform blocks (ES 3).
    Uniform,
}

impl BufferTarget {
    const COUNT: usize = 3;

    /// The binding point a buffer type is drawn from.
    pub fn for_type(buffer_type: BufferType) -> Self {
        match buffer_type {
            BufferType::Vertex => BufferTarget::Array,
            BufferType::Index => BufferTarget::Element,
            BufferType::Uniform => BufferTarget::Uniform,
        }
    }

    /// The GL enum of this binding point.
    pub fn gl(self) -> u32 {
        match self {
            BufferTarget::Array => glow::ARRAY_BUFFER,
            BufferTarget::Element => glow::ELEMENT_ARRAY_BUFFER,
            BufferTarget::Uniform => glow::UNIFORM_BUFFER,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// The last pointer description issued for one attribute slot.
#[derive(Debug, Clone)]
pub struct AttributeBinding {
    /// The array buffer the pointer reads from.
    pub buffer: Buffer,
    /// Byte offset of the element within a vertex.
    pub offset: u32,
    /// Byte stride between vertices.
    pub stride: u32,
    /// Components per element.
    pub components: i32,
    /// GL component type.
    pub data_type: u32,
    /// Whether integer components are normalized.
    pub normalized: bool,
}

impl AttributeBinding {
    pub(super) fn matches(&self, other: &AttributeBinding) -> bool {
        Resource::ptr_eq(&self.buffer, &other.buffer)
            && self.offset == other.offset
            && self.stride == other.stride
            && self.components == other.components
            && self.data_type == other.data_type
            && self.normalized == other.normalized
    }
}

/// What the driver currently has bound.
#[derive(Debug)]
pub struct SessionState {
    program: Option<Shader>,
    buffers: [Option<Buffer>; BufferTarget::COUNT],
    enabled_attributes: u32,
    attributes: [Option<AttributeBinding>; ATTRIBUTE_MASK_BITS as usize],
    render_state: RenderState,
    // Factors survive while blending is disabled, so they are tracked apart
    // from the enable bit.
    blend_equation: BlendState,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            program: None,
            buffers: Default::default(),
            enabled_attributes: 0,
            attributes: std::array::from_fn(|_| None),
            render_state: RenderState::default(),
            blend_equation: RESET_BLEND,
        }
    }
}

impl SessionState {
    /// The program currently in use.
    pub fn program(&self) -> Option<&Shader> {
        self.program.as_ref()
    }

    /// The buffer currently bound to `target`.
    pub fn buffer(&self, target: BufferTarget) -> Option<&Buffer> {
        self.buffers[target.index()].as_ref()
    }

    /// Bit `n` is set when attribute slot `n` is enabled.
    pub fn enabled_attributes(&self) -> u32 {
        self.enabled_attributes
    }

    /// The last pointer description issued for `slot`.
    pub fn attribute(&self, slot: u32) -> Option<&AttributeBinding> {
        self.attributes.get(slot as usize)?.as_ref()
    }

    /// The fixed-function state currently applied.
    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    pub(super) fn use_program(&mut self, driver: &dyn GlDriver, shader: Option<&Shader>) -> bool {
        if same_resource(self.program.as_ref(), shader) {
            return false;
        }
        driver.use_program(shader.and_then(GlesShader::downcast).map(GlesShader::raw));
        self.program = shader.cloned();
        true
    }

    pub(super) fn bind_buffer(
        &mut self,
        driver: &dyn GlDriver,
        target: BufferTarget,
        buffer: Option<&Buffer>,
    ) -> bool {
        let slot = &mut self.buffers[target.index()];
        if same_resource(slot.as_ref(), buffer) {
            return false;
        }
        driver.bind_buffer(
            target.gl(),
            buffer.and_then(GlesBuffer::downcast).map(GlesBuffer::raw),
        );
        *slot = buffer.cloned();
        true
    }

    pub(super) fn enable_attribute(&mut self, driver: &dyn GlDriver, slot: u32) -> bool {
        let bit = 1u32 << slot;
        if self.enabled_attributes & bit != 0 {
            return false;
        }
        driver.enable_vertex_attrib(slot);
        self.enabled_attributes |= bit;
        true
    }

    pub(super) fn disable_attribute(&mut self, driver: &dyn GlDriver, slot: u32) -> bool {
        let bit = 1u32 << slot;
        if self.enabled_attributes & bit == 0 {
            return false;
        }
        driver.disable_vertex_attrib(slot);
        self.enabled_attributes &= !bit;
        true
    }

    /// Issues the pointer description for `slot` unless the cached one is identical.
    /// The binding's buffer must already be bound to [`BufferTarget::Array`].
    pub(super) fn set_attribute(
        &mut self,
        driver: &dyn GlDriver,
        slot: u32,
        binding: AttributeBinding,
    ) -> bool {
        let cached = &mut self.attributes[slot as usize];
        if cached.as_ref().is_some_and(|c| c.matches(&binding)) {
            return false;
        }
        driver.vertex_attrib_pointer(
            slot,
            binding.components,
            binding.data_type,
            binding.normalized,
            binding.stride as i32,
            binding.offset as i32,
        );
        *cached = Some(binding);
        true
    }

    /// Applies the differences between `state` and the cached render state.
    /// Returns the number of native calls issued.
    pub(super) fn apply_render_state(&mut self, driver: &dyn GlDriver, state: &RenderState) -> usize {
        let current = self.render_state;
        let mut calls = 0;

        if state.depth.test_enabled != current.depth.test_enabled {
            driver.set_capability(glow::DEPTH_TEST, state.depth.test_enabled);
            calls += 1;
        }
        if state.depth.write_enabled != current.depth.write_enabled {
            driver.depth_mask(state.depth.write_enabled);
            calls += 1;
        }
        if state.depth.compare != current.depth.compare {
            driver.depth_func(state.depth.compare.into_gl());
            calls += 1;
        }

        match (current.blend, state.blend) {
            (None, None) => {}
            (Some(_), None) => {
                driver.set_capability(glow::BLEND, false);
                calls += 1;
            }
            (previous, Some(blend)) => {
                if previous.is_none() {
                    driver.set_capability(glow::BLEND, true);
                    calls += 1;
                }
                if (self.blend_equation.src_factor, self.blend_equation.dst_factor)
                    != (blend.src_factor, blend.dst_factor)
                {
                    driver.blend_func(blend.src_factor.into_gl(), blend.dst_factor.into_gl());
                    calls += 1;
                }
                if self.blend_equation.operation != blend.operation {
                    driver.blend_equation(blend.operation.into_gl());
                    calls += 1;
                }
                self.blend_equation = blend;
            }
        }

        if state.cull_mode != current.cull_mode {
            match state.cull_mode {
                CullMode::None => driver.set_capability(glow::CULL_FACE, false),
                mode => {
                    if current.cull_mode == CullMode::None {
                        driver.set_capability(glow::CULL_FACE, true);
                        calls += 1;
                    }
                    driver.cull_face(cull_face_gl(mode));
                }
            }
            calls += 1;
        }
        if state.front_face != current.front_face {
            driver.front_face(state.front_face.into_gl());
            calls += 1;
        }

        self.render_state = *state;
        calls
    }

    /// Keeps depth writes on so a depth clear takes effect.
    pub(super) fn ensure_depth_writes(&mut self, driver: &dyn GlDriver) -> bool {
        if self.render_state.depth.write_enabled {
            return false;
        }
        driver.depth_mask(true);
        self.render_state.depth.write_enabled = true;
        true
    }

    /// Forgets everything and re-issues every default to the driver,
    /// regardless of what the cache held.
    pub(super) fn reset(&mut self, driver: &dyn GlDriver, max_attributes: u32, has_es3: bool) {
        *self = SessionState::default();

        driver.use_program(None);
        driver.bind_buffer(BufferTarget::Array.gl(), None);
        driver.bind_buffer(BufferTarget::Element.gl(), None);
        if has_es3 {
            driver.bind_buffer(BufferTarget::Uniform.gl(), None);
            driver.bind_buffer(glow::COPY_WRITE_BUFFER, None);
        }
        for slot in 0..max_attributes.min(ATTRIBUTE_MASK_BITS) {
            driver.disable_vertex_attrib(slot);
        }

        let defaults = RenderState::default();
        let DepthState {
            test_enabled,
            write_enabled,
            compare,
        } = defaults.depth;
        driver.set_capability(glow::DEPTH_TEST, test_enabled);
        driver.depth_mask(write_enabled);
        driver.depth_func(compare.into_gl());
        driver.set_capability(glow::BLEND, defaults.blend.is_some());
        driver.blend_func(RESET_BLEND.src_factor.into_gl(), RESET_BLEND.dst_factor.into_gl());
        driver.blend_equation(RESET_BLEND.operation.into_gl());
        driver.set_capability(glow::CULL_FACE, defaults.cull_mode != CullMode::None);
        driver.cull_face(glow::BACK);
        driver.front_face(FrontFace::default().into_gl());
    }
}

fn cull_face_gl(mode: CullMode) -> u32 {
    match mode {
        CullMode::Front => glow::FRONT,
        CullMode::Back | CullMode::None => glow::BACK,
    }
}
