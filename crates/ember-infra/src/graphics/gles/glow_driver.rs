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

//! [`GlDriver`] implemented over a `glow` context.

use super::driver::{ActiveVariable, GlDriver};
use ember_core::renderer::UniformValue;
use glow::HasContext;
use std::fmt;
use std::num::NonZeroU32;
use std::ptr::NonNull;

/// Presents the window surface a context renders into.
pub trait Presenter {
    /// Swaps the front and back buffers.
    fn swap_buffers(&self) -> Result<(), String>;
}

/// The production driver: a `glow` context plus the native context that owns it.
///
/// Field order matters: `gl` is dropped before `presenter`, so the native
/// context outlives every use of the function pointers.
pub struct GlowDriver {
    gl: glow::Context,
    presenter: Box<dyn Presenter>,
}

impl GlowDriver {
    /// Wraps a loaded `glow` context and the presenter of its window surface.
    pub fn new(gl: glow::Context, presenter: Box<dyn Presenter>) -> Self {
        Self { gl, presenter }
    }
}

impl fmt::Debug for GlowDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowDriver")
            .field("version", self.gl.version())
            .finish_non_exhaustive()
    }
}

fn buffer(raw: u32) -> Option<glow::NativeBuffer> {
    NonZeroU32::new(raw).map(glow::NativeBuffer)
}

fn shader(raw: u32) -> Option<glow::NativeShader> {
    NonZeroU32::new(raw).map(glow::NativeShader)
}

fn program(raw: u32) -> Option<glow::NativeProgram> {
    NonZeroU32::new(raw).map(glow::NativeProgram)
}

impl GlDriver for GlowDriver {
    fn api_version(&self) -> (u32, u32) {
        let version = self.gl.version();
        (version.major, version.minor)
    }

    fn get_integer(&self, pname: u32) -> i32 {
        unsafe { self.gl.get_parameter_i32(pname) }
    }

    fn get_string(&self, pname: u32) -> String {
        unsafe { self.gl.get_parameter_string(pname) }
    }

    fn has_extension(&self, extension: &str) -> bool {
        self.gl.supported_extensions().contains(extension)
    }

    fn create_buffer(&self) -> Result<u32, String> {
        unsafe { self.gl.create_buffer() }.map(|b| b.0.get())
    }

    fn delete_buffer(&self, raw: u32) {
        if let Some(b) = buffer(raw) {
            unsafe { self.gl.delete_buffer(b) }
        }
    }

    fn bind_buffer(&self, target: u32, raw: Option<u32>) {
        unsafe { self.gl.bind_buffer(target, raw.and_then(buffer)) }
    }

    fn buffer_storage(&self, target: u32, size: usize, usage: u32) {
        unsafe { self.gl.buffer_data_size(target, size as i32, usage) }
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { self.gl.buffer_data_u8_slice(target, data, usage) }
    }

    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]) {
        unsafe { self.gl.buffer_sub_data_u8_slice(target, offset as i32, data) }
    }

    fn map_buffer_range(
        &self,
        target: u32,
        offset: usize,
        length: usize,
        access: u32,
    ) -> Option<NonNull<u8>> {
        let ptr = unsafe {
            self.gl
                .map_buffer_range(target, offset as i32, length as i32, access)
        };
        NonNull::new(ptr)
    }

    fn unmap_buffer(&self, target: u32) {
        unsafe { self.gl.unmap_buffer(target) }
    }

    fn create_shader(&self, shader_type: u32) -> Result<u32, String> {
        unsafe { self.gl.create_shader(shader_type) }.map(|s| s.0.get())
    }

    fn compile_shader(&self, raw: u32, source: &str) -> Result<(), String> {
        let Some(s) = shader(raw) else {
            return Err("invalid shader name 0".to_string());
        };
        unsafe {
            self.gl.shader_source(s, source);
            self.gl.compile_shader(s);
            if self.gl.get_shader_compile_status(s) {
                Ok(())
            } else {
                Err(self.gl.get_shader_info_log(s))
            }
        }
    }

    fn delete_shader(&self, raw: u32) {
        if let Some(s) = shader(raw) {
            unsafe { self.gl.delete_shader(s) }
        }
    }

    fn create_program(&self) -> Result<u32, String> {
        unsafe { self.gl.create_program() }.map(|p| p.0.get())
    }

    fn delete_program(&self, raw: u32) {
        if let Some(p) = program(raw) {
            unsafe { self.gl.delete_program(p) }
        }
    }

    fn attach_shader(&self, raw_program: u32, raw_shader: u32) {
        if let (Some(p), Some(s)) = (program(raw_program), shader(raw_shader)) {
            unsafe { self.gl.attach_shader(p, s) }
        }
    }

    fn detach_shader(&self, raw_program: u32, raw_shader: u32) {
        if let (Some(p), Some(s)) = (program(raw_program), shader(raw_shader)) {
            unsafe { self.gl.detach_shader(p, s) }
        }
    }

    fn link_program(&self, raw: u32) -> Result<(), String> {
        let Some(p) = program(raw) else {
            return Err("invalid program name 0".to_string());
        };
        unsafe {
            self.gl.link_program(p);
            if self.gl.get_program_link_status(p) {
                Ok(())
            } else {
                Err(self.gl.get_program_info_log(p))
            }
        }
    }

    fn active_attributes(&self, raw: u32) -> Vec<ActiveVariable> {
        let Some(p) = program(raw) else {
            return Vec::new();
        };
        unsafe {
            (0..self.gl.get_active_attributes(p))
                .filter_map(|index| self.gl.get_active_attribute(p, index))
                .filter_map(|attribute| {
                    let location = self.gl.get_attrib_location(p, &attribute.name)?;
                    Some(ActiveVariable {
                        name: attribute.name,
                        location,
                        size: attribute.size,
                    })
                })
                .collect()
        }
    }

    fn active_uniforms(&self, raw: u32) -> Vec<ActiveVariable> {
        let Some(p) = program(raw) else {
            return Vec::new();
        };
        unsafe {
            (0..self.gl.get_active_uniforms(p))
                .filter_map(|index| self.gl.get_active_uniform(p, index))
                .filter_map(|uniform| {
                    let location = self.gl.get_uniform_location(p, &uniform.name)?;
                    Some(ActiveVariable {
                        name: uniform.name,
                        location: location.0,
                        size: uniform.size,
                    })
                })
                .collect()
        }
    }

    fn use_program(&self, raw: Option<u32>) {
        unsafe { self.gl.use_program(raw.and_then(program)) }
    }

    fn set_uniform(&self, location: u32, value: &UniformValue) {
        let location = glow::NativeUniformLocation(location);
        let at = Some(&location);
        unsafe {
            match *value {
                UniformValue::Float(x) => self.gl.uniform_1_f32(at, x),
                UniformValue::Vec2([x, y]) => self.gl.uniform_2_f32(at, x, y),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(at, x, y, z),
                UniformValue::Vec4([x, y, z, w]) => self.gl.uniform_4_f32(at, x, y, z, w),
                UniformValue::Int(x) => self.gl.uniform_1_i32(at, x),
                UniformValue::Mat4(ref m) => self.gl.uniform_matrix_4_f32_slice(at, false, m),
            }
        }
    }

    fn enable_vertex_attrib(&self, slot: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(slot) }
    }

    fn disable_vertex_attrib(&self, slot: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(slot) }
    }

    fn vertex_attrib_pointer(
        &self,
        slot: u32,
        components: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(slot, components, data_type, normalized, stride, offset)
        }
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode, first, count) }
    }

    fn draw_elements(&self, mode: u32, count: i32, index_type: u32, offset: i32) {
        unsafe { self.gl.draw_elements(mode, count, index_type, offset) }
    }

    fn set_capability(&self, capability: u32, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(capability)
            } else {
                self.gl.disable(capability)
            }
        }
    }

    fn depth_mask(&self, write: bool) {
        unsafe { self.gl.depth_mask(write) }
    }

    fn depth_func(&self, func: u32) {
        unsafe { self.gl.depth_func(func) }
    }

    fn blend_func(&self, src: u32, dst: u32) {
        unsafe { self.gl.blend_func(src, dst) }
    }

    fn blend_equation(&self, mode: u32) {
        unsafe { self.gl.blend_equation(mode) }
    }

    fn cull_face(&self, face: u32) {
        unsafe { self.gl.cull_face(face) }
    }

    fn front_face(&self, winding: u32) {
        unsafe { self.gl.front_face(winding) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear(&self, mask: u32, color: [f32; 4], depth: f32, stencil: i32) {
        unsafe {
            if mask & glow::COLOR_BUFFER_BIT != 0 {
                self.gl.clear_color(color[0], color[1], color[2], color[3]);
            }
            if mask & glow::DEPTH_BUFFER_BIT != 0 {
                self.gl.clear_depth_f32(depth);
            }
            if mask & glow::STENCIL_BUFFER_BIT != 0 {
                self.gl.clear_stencil(stencil);
            }
            self.gl.clear(mask);
        }
    }

    fn flush(&self) {
        unsafe { self.gl.flush() }
    }

    fn swap_buffers(&self) -> Result<(), String> {
        self.presenter.swap_buffers()
    }
}
