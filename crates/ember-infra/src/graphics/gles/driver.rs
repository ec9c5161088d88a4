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

//! The native call surface the OpenGL ES device is written against.
//!
//! [`GlDriver`] lists exactly the driver entry points the device uses, with
//! plain integer handles and GL enum values. The production implementation
//! forwards to `glow` ([`super::glow_driver::GlowDriver`]); tests substitute a
//! recording driver that counts calls.
//!
//! Every method assumes the driver's context is current on the calling thread.

use ember_core::renderer::UniformValue;
use std::fmt::Debug;
use std::ptr::NonNull;

/// One active attribute or uniform reported by program introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveVariable {
    /// The variable's name as reported by the driver.
    pub name: String,
    /// The attribute slot or uniform location.
    pub location: u32,
    /// Array length, 1 for non-arrays.
    pub size: i32,
}

/// The driver entry points used by the OpenGL ES device.
pub trait GlDriver: Debug {
    // --- Queries ---

    /// The context's `(major, minor)` API version.
    fn api_version(&self) -> (u32, u32);
    /// `glGetIntegerv` for a single value.
    fn get_integer(&self, pname: u32) -> i32;
    /// `glGetString`.
    fn get_string(&self, pname: u32) -> String;
    /// Whether the context advertises `extension`.
    fn has_extension(&self, extension: &str) -> bool;

    // --- Buffers ---

    /// Allocates a buffer name.
    fn create_buffer(&self) -> Result<u32, String>;
    /// Releases a buffer name.
    fn delete_buffer(&self, buffer: u32);
    /// Binds `buffer` (or nothing) to `target`.
    fn bind_buffer(&self, target: u32, buffer: Option<u32>);
    /// Allocates uninitialized storage for the buffer bound to `target`.
    fn buffer_storage(&self, target: u32, size: usize, usage: u32);
    /// Allocates storage initialized from `data`.
    fn buffer_data(&self, target: u32, data: &[u8], usage: u32);
    /// Overwrites a range of the buffer bound to `target`.
    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]);
    /// Maps a range of the buffer bound to `target`. `None` on failure.
    fn map_buffer_range(
        &self,
        target: u32,
        offset: usize,
        length: usize,
        access: u32,
    ) -> Option<NonNull<u8>>;
    /// Unmaps the buffer bound to `target`.
    fn unmap_buffer(&self, target: u32);

    // --- Shaders and programs ---

    /// Allocates a shader object of `shader_type`.
    fn create_shader(&self, shader_type: u32) -> Result<u32, String>;
    /// Sets the source and compiles. On failure returns the info log.
    fn compile_shader(&self, shader: u32, source: &str) -> Result<(), String>;
    /// Releases a shader object.
    fn delete_shader(&self, shader: u32);
    /// Allocates a program object.
    fn create_program(&self) -> Result<u32, String>;
    /// Releases a program object.
    fn delete_program(&self, program: u32);
    /// Attaches a compiled shader.
    fn attach_shader(&self, program: u32, shader: u32);
    /// Detaches a shader.
    fn detach_shader(&self, program: u32, shader: u32);
    /// Links the program. On failure returns the info log.
    fn link_program(&self, program: u32) -> Result<(), String>;
    /// Active vertex attributes of a linked program, with their slots.
    fn active_attributes(&self, program: u32) -> Vec<ActiveVariable>;
    /// Active uniforms of a linked program, with their locations.
    fn active_uniforms(&self, program: u32) -> Vec<ActiveVariable>;
    /// Makes `program` (or nothing) current.
    fn use_program(&self, program: Option<u32>);
    /// Uploads a value to a uniform of the current program.
    fn set_uniform(&self, location: u32, value: &UniformValue);

    // --- Vertex input and draws ---

    /// Enables an attribute slot.
    fn enable_vertex_attrib(&self, slot: u32);
    /// Disables an attribute slot.
    fn disable_vertex_attrib(&self, slot: u32);
    /// Describes where slot `slot` reads from in the bound array buffer.
    fn vertex_attrib_pointer(
        &self,
        slot: u32,
        components: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    /// Non-indexed draw.
    fn draw_arrays(&self, mode: u32, first: i32, count: i32);
    /// Indexed draw from the bound element buffer.
    fn draw_elements(&self, mode: u32, count: i32, index_type: u32, offset: i32);

    // --- Fixed function ---

    /// `glEnable` / `glDisable`.
    fn set_capability(&self, capability: u32, enabled: bool);
    /// `glDepthMask`.
    fn depth_mask(&self, write: bool);
    /// `glDepthFunc`.
    fn depth_func(&self, func: u32);
    /// `glBlendFunc`.
    fn blend_func(&self, src: u32, dst: u32);
    /// `glBlendEquation`.
    fn blend_equation(&self, mode: u32);
    /// `glCullFace`.
    fn cull_face(&self, face: u32);
    /// `glFrontFace`.
    fn front_face(&self, winding: u32);
    /// `glViewport`.
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// Sets the clear values and clears the attachments in `mask`.
    fn clear(&self, mask: u32, color: [f32; 4], depth: f32, stencil: i32);
    /// `glFlush`.
    fn flush(&self);

    // --- Presentation ---

    /// Presents the back buffer of the window surface.
    fn swap_buffers(&self) -> Result<(), String>;
}
