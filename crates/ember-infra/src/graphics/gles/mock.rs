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

//! A recording [`GlDriver`] for tests.
//!
//! Every call is appended to a log that tests inspect or count. Buffers keep
//! real byte storage so upload and mapping paths can be verified. Shader
//! sources are scanned for `attribute`/`in` and `uniform` declarations to
//! emulate program introspection; a declared variable that appears only once
//! in its source counts as optimized out.
//!
//! Sources containing `#error` fail to compile; a vertex source containing
//! `#pragma fail_link` fails to link.

use super::driver::{ActiveVariable, GlDriver};
use ember_core::renderer::UniformValue;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ptr::NonNull;

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateBuffer(u32),
    DeleteBuffer(u32),
    BindBuffer { target: u32, buffer: Option<u32> },
    BufferStorage { target: u32, size: usize },
    BufferData { target: u32, len: usize },
    BufferSubData { target: u32, offset: usize, len: usize },
    MapBuffer { target: u32, length: usize },
    UnmapBuffer { target: u32 },
    CreateShader(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    DeleteProgram(u32),
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    UseProgram(Option<u32>),
    SetUniform { location: u32, value: UniformValue },
    EnableAttrib(u32),
    DisableAttrib(u32),
    AttribPointer {
        slot: u32,
        components: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    },
    DrawArrays { mode: u32, first: i32, count: i32 },
    DrawElements { mode: u32, count: i32, index_type: u32, offset: i32 },
    Capability { capability: u32, enabled: bool },
    DepthMask(bool),
    DepthFunc(u32),
    BlendFunc(u32, u32),
    BlendEquation(u32),
    CullFace(u32),
    FrontFace(u32),
    Viewport(i32, i32, i32, i32),
    Clear(u32),
    Flush,
    SwapBuffers,
}

#[derive(Debug)]
struct Mapping {
    buffer: u32,
    offset: usize,
    staging: Box<[u8]>,
}

/// A [`GlDriver`] that records calls instead of rendering.
#[derive(Debug)]
pub struct RecordingDriver {
    version: (u32, u32),
    max_attributes: i32,
    extensions: Vec<String>,
    calls: RefCell<Vec<Call>>,
    next_name: Cell<u32>,
    buffers: RefCell<HashMap<u32, Vec<u8>>>,
    bound: RefCell<HashMap<u32, u32>>,
    mapping: RefCell<Option<Mapping>>,
    shaders: RefCell<HashMap<u32, (u32, String)>>,
    attached: RefCell<HashMap<u32, Vec<u32>>>,
}

impl RecordingDriver {
    /// An OpenGL ES 3.0 driver with 16 attribute slots.
    pub fn es3() -> Self {
        Self::new((3, 0), 16)
    }

    /// An OpenGL ES 2.0 driver with 8 attribute slots and no buffer mapping.
    pub fn es2() -> Self {
        Self::new((2, 0), 8)
    }

    /// A driver reporting `version` and `max_attributes` slots.
    pub fn new(version: (u32, u32), max_attributes: i32) -> Self {
        Self {
            version,
            max_attributes,
            extensions: Vec::new(),
            calls: RefCell::new(Vec::new()),
            next_name: Cell::new(1),
            buffers: RefCell::new(HashMap::new()),
            bound: RefCell::new(HashMap::new()),
            mapping: RefCell::new(None),
            shaders: RefCell::new(HashMap::new()),
            attached: RefCell::new(HashMap::new()),
        }
    }

    /// Drains the call log.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Counts logged calls matching `predicate` without draining.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| predicate(c)).count()
    }

    /// The current contents of a live buffer.
    pub fn buffer_contents(&self, buffer: u32) -> Option<Vec<u8>> {
        self.buffers.borrow().get(&buffer).cloned()
    }

    /// Whether a buffer name is allocated.
    pub fn is_live_buffer(&self, buffer: u32) -> bool {
        self.buffers.borrow().contains_key(&buffer)
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate_name(&self) -> u32 {
        let name = self.next_name.get();
        self.next_name.set(name + 1);
        name
    }

    fn bound_buffer(&self, target: u32) -> Option<u32> {
        self.bound.borrow().get(&target).copied()
    }

    fn attached_sources(&self, program: u32) -> Vec<(u32, String)> {
        let shaders = self.shaders.borrow();
        self.attached
            .borrow()
            .get(&program)
            .map(|list| {
                list.iter()
                    .filter_map(|s| shaders.get(s).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Extracts `(name, array_len)` of declarations starting with one of `keywords`
/// that are referenced at least once beyond their declaration.
fn scan_declarations(source: &str, keywords: &[&str]) -> Vec<(String, i32)> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| keywords.iter().any(|k| line.starts_with(k)))
        .filter_map(|line| line.trim_end_matches(';').split_whitespace().last())
        .filter_map(|declared| {
            let (name, size) = match declared.split_once('[') {
                Some((name, rest)) => (name, rest.trim_end_matches(']').parse().ok()?),
                None => (declared, 1),
            };
            (source.matches(name).count() >= 2).then(|| (name.to_string(), size))
        })
        .collect()
}

impl GlDriver for RecordingDriver {
    fn api_version(&self) -> (u32, u32) {
        self.version
    }

    fn get_integer(&self, pname: u32) -> i32 {
        match pname {
            glow::MAX_VERTEX_ATTRIBS => self.max_attributes,
            glow::MAX_TEXTURE_SIZE => 4096,
            glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS => 16,
            glow::MAX_DRAW_BUFFERS => 4,
            _ => 0,
        }
    }

    fn get_string(&self, pname: u32) -> String {
        match pname {
            glow::RENDERER => "Recording Renderer".to_string(),
            glow::VENDOR => "ember".to_string(),
            glow::VERSION => format!("OpenGL ES {}.{} Recording", self.version.0, self.version.1),
            glow::SHADING_LANGUAGE_VERSION => {
                format!("OpenGL ES GLSL ES {}.{}0", self.version.0, self.version.1)
            }
            _ => String::new(),
        }
    }

    fn has_extension(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let name = self.allocate_name();
        self.buffers.borrow_mut().insert(name, Vec::new());
        self.record(Call::CreateBuffer(name));
        Ok(name)
    }

    fn delete_buffer(&self, buffer: u32) {
        self.buffers.borrow_mut().remove(&buffer);
        self.bound.borrow_mut().retain(|_, b| *b != buffer);
        self.record(Call::DeleteBuffer(buffer));
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        match buffer {
            Some(b) => self.bound.borrow_mut().insert(target, b),
            None => self.bound.borrow_mut().remove(&target),
        };
        self.record(Call::BindBuffer { target, buffer });
    }

    fn buffer_storage(&self, target: u32, size: usize, _usage: u32) {
        if let Some(b) = self.bound_buffer(target) {
            self.buffers.borrow_mut().insert(b, vec![0; size]);
        }
        self.record(Call::BufferStorage { target, size });
    }

    fn buffer_data(&self, target: u32, data: &[u8], _usage: u32) {
        if let Some(b) = self.bound_buffer(target) {
            self.buffers.borrow_mut().insert(b, data.to_vec());
        }
        self.record(Call::BufferData {
            target,
            len: data.len(),
        });
    }

    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]) {
        if let Some(b) = self.bound_buffer(target) {
            if let Some(contents) = self.buffers.borrow_mut().get_mut(&b) {
                contents[offset..offset + data.len()].copy_from_slice(data);
            }
        }
        self.record(Call::BufferSubData {
            target,
            offset,
            len: data.len(),
        });
    }

    fn map_buffer_range(
        &self,
        target: u32,
        offset: usize,
        length: usize,
        _access: u32,
    ) -> Option<NonNull<u8>> {
        self.record(Call::MapBuffer { target, length });
        let buffer = self.bound_buffer(target)?;
        let staging = self.buffers.borrow().get(&buffer)?[offset..offset + length]
            .to_vec()
            .into_boxed_slice();
        let mut mapping = self.mapping.borrow_mut();
        let mapped = mapping.insert(Mapping {
            buffer,
            offset,
            staging,
        });
        NonNull::new(mapped.staging.as_mut_ptr())
    }

    fn unmap_buffer(&self, target: u32) {
        if let Some(mapping) = self.mapping.borrow_mut().take() {
            if let Some(contents) = self.buffers.borrow_mut().get_mut(&mapping.buffer) {
                let end = mapping.offset + mapping.staging.len();
                contents[mapping.offset..end].copy_from_slice(&mapping.staging);
            }
        }
        self.record(Call::UnmapBuffer { target });
    }

    fn create_shader(&self, shader_type: u32) -> Result<u32, String> {
        let name = self.allocate_name();
        self.shaders
            .borrow_mut()
            .insert(name, (shader_type, String::new()));
        self.record(Call::CreateShader(name));
        Ok(name)
    }

    fn compile_shader(&self, shader: u32, source: &str) -> Result<(), String> {
        self.record(Call::CompileShader(shader));
        if let Some(entry) = self.shaders.borrow_mut().get_mut(&shader) {
            entry.1 = source.to_string();
        }
        if source.contains("#error") {
            Err("0:1: error: #error directive".to_string())
        } else {
            Ok(())
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.shaders.borrow_mut().remove(&shader);
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let name = self.allocate_name();
        self.attached.borrow_mut().insert(name, Vec::new());
        self.record(Call::CreateProgram(name));
        Ok(name)
    }

    fn delete_program(&self, program: u32) {
        self.attached.borrow_mut().remove(&program);
        self.record(Call::DeleteProgram(program));
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(list) = self.attached.borrow_mut().get_mut(&program) {
            list.push(shader);
        }
        self.record(Call::AttachShader { program, shader });
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(list) = self.attached.borrow_mut().get_mut(&program) {
            list.retain(|s| *s != shader);
        }
        self.record(Call::DetachShader { program, shader });
    }

    fn link_program(&self, program: u32) -> Result<(), String> {
        self.record(Call::LinkProgram(program));
        let fails = self
            .attached_sources(program)
            .iter()
            .any(|(ty, src)| *ty == glow::VERTEX_SHADER && src.contains("#pragma fail_link"));
        if fails {
            Err("error: unresolved reference in vertex stage".to_string())
        } else {
            Ok(())
        }
    }

    fn active_attributes(&self, program: u32) -> Vec<ActiveVariable> {
        self.attached_sources(program)
            .iter()
            .filter(|(ty, _)| *ty == glow::VERTEX_SHADER)
            .flat_map(|(_, src)| scan_declarations(src, &["attribute ", "in "]))
            .enumerate()
            .map(|(slot, (name, size))| ActiveVariable {
                name,
                location: slot as u32,
                size,
            })
            .collect()
    }

    fn active_uniforms(&self, program: u32) -> Vec<ActiveVariable> {
        let mut seen: Vec<(String, i32)> = Vec::new();
        for (_, src) in self.attached_sources(program) {
            for (name, size) in scan_declarations(&src, &["uniform "]) {
                if !seen.iter().any(|(n, _)| *n == name) {
                    seen.push((name, size));
                }
            }
        }
        seen.into_iter()
            .enumerate()
            .map(|(location, (name, size))| ActiveVariable {
                name: if size > 1 { format!("{name}[0]") } else { name },
                location: location as u32,
                size,
            })
            .collect()
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram(program));
    }

    fn set_uniform(&self, location: u32, value: &UniformValue) {
        self.record(Call::SetUniform {
            location,
            value: *value,
        });
    }

    fn enable_vertex_attrib(&self, slot: u32) {
        self.record(Call::EnableAttrib(slot));
    }

    fn disable_vertex_attrib(&self, slot: u32) {
        self.record(Call::DisableAttrib(slot));
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
        self.record(Call::AttribPointer {
            slot,
            components,
            data_type,
            normalized,
            stride,
            offset,
        });
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record(Call::DrawArrays { mode, first, count });
    }

    fn draw_elements(&self, mode: u32, count: i32, index_type: u32, offset: i32) {
        self.record(Call::DrawElements {
            mode,
            count,
            index_type,
            offset,
        });
    }

    fn set_capability(&self, capability: u32, enabled: bool) {
        self.record(Call::Capability {
            capability,
            enabled,
        });
    }

    fn depth_mask(&self, write: bool) {
        self.record(Call::DepthMask(write));
    }

    fn depth_func(&self, func: u32) {
        self.record(Call::DepthFunc(func));
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.record(Call::BlendFunc(src, dst));
    }

    fn blend_equation(&self, mode: u32) {
        self.record(Call::BlendEquation(mode));
    }

    fn cull_face(&self, face: u32) {
        self.record(Call::CullFace(face));
    }

    fn front_face(&self, winding: u32) {
        self.record(Call::FrontFace(winding));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn clear(&self, mask: u32, _color: [f32; 4], _depth: f32, _stencil: i32) {
        self.record(Call::Clear(mask));
    }

    fn flush(&self) {
        self.record(Call::Flush);
    }

    fn swap_buffers(&self) -> Result<(), String> {
        self.record(Call::SwapBuffers);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_skips_unused_declarations() {
        let source = "attribute vec3 a_position;\nattribute vec2 a_unused;\n\
                      void main() { gl_Position = vec4(a_position, 1.0); }";
        let found = scan_declarations(source, &["attribute "]);
        assert_eq!(found, vec![("a_position".to_string(), 1)]);
    }

    #[test]
    fn test_scan_reads_array_length() {
        let source = "uniform vec4 u_lights[4];\nvoid main() { gl_FragColor = u_lights[0]; }";
        let found = scan_declarations(source, &["uniform "]);
        assert_eq!(found, vec![("u_lights".to_string(), 4)]);
    }

    #[test]
    fn test_buffer_storage_follows_binding() {
        let driver = RecordingDriver::es3();
        let b = driver.create_buffer().unwrap();
        driver.bind_buffer(glow::ARRAY_BUFFER, Some(b));
        driver.buffer_data(glow::ARRAY_BUFFER, &[1, 2, 3, 4], glow::STATIC_DRAW);
        driver.buffer_sub_data(glow::ARRAY_BUFFER, 2, &[9]);
        assert_eq!(driver.buffer_contents(b), Some(vec![1, 2, 9, 4]));
    }
}
