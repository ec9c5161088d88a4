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

use crate::renderer::api::*;
use crate::renderer::error::{BindingError, RenderError, ResourceError};
use crate::renderer::traits::{Buffer, RenderPipeline, Shader};
use std::fmt::Debug;

/// The main interface for creating resources and issuing draws.
///
/// A device owns one native rendering context. It is driven from the thread
/// that created it and is intentionally not `Send`: graphics contexts are bound
/// to a thread, and the resources it hands out are tied to the device.
///
/// Bindings are split in two layers. The `set_*` methods only record what the
/// caller wants bound (the pending state) and never touch the driver. [`draw`]
/// reconciles the pending state with what the driver currently has bound and
/// issues only the calls that change something.
///
/// [`draw`]: RenderDevice::draw
pub trait RenderDevice: Debug {
    /// Returns information about the device resolved during negotiation.
    fn info(&self) -> &DeviceInfo;

    /// Creates a buffer of `count * stride` bytes.
    /// ## Arguments
    /// * `descriptor` - Type, element count and stride of the buffer.
    /// * `data` - Initial contents. When present the buffer is static and must
    ///   be exactly `count * stride` bytes; when absent it is dynamic.
    /// ## Errors
    /// * `ResourceError::Buffer` - If the size is zero, the data length does not
    ///   match, or the device does not support the buffer type.
    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        data: Option<&[u8]>,
    ) -> Result<Buffer, ResourceError>;

    /// Maps a dynamic buffer for writing.
    ///
    /// The returned region covers the whole buffer. It borrows the device, so it
    /// must be dropped before [`unmap_buffer`](RenderDevice::unmap_buffer) is called.
    /// ## Errors
    /// * `ResourceError::Buffer` - If the buffer is static or already mapped.
    fn map_buffer<'a>(
        &'a mut self,
        buffer: &'a Buffer,
    ) -> Result<BufferMapping<'a>, ResourceError>;

    /// Commits the mapped region into the buffer.
    /// ## Errors
    /// * `ResourceError::Buffer` - If the buffer is not mapped.
    fn unmap_buffer(&mut self, buffer: &Buffer) -> Result<(), ResourceError>;

    /// Replaces the full contents of a dynamic buffer.
    /// ## Errors
    /// * `ResourceError::Buffer` - If the buffer is static or mapped, or `data`
    ///   is not exactly the buffer's size.
    fn update_buffer(&mut self, buffer: &Buffer, data: &[u8]) -> Result<(), ResourceError>;

    /// Creates an empty shader with no stage attached.
    fn create_shader(&mut self, label: Option<&str>) -> Result<Shader, ResourceError>;

    /// Compiles `source` for `stage` and attaches it, replacing any previous
    /// module for that stage. The shader is unlinked afterwards.
    /// ## Errors
    /// * `ResourceError::Shader` - With the driver's log if compilation fails.
    ///   The stage is left detached.
    fn bind_module(
        &mut self,
        shader: &Shader,
        stage: ShaderStage,
        source: &str,
    ) -> Result<(), ResourceError>;

    /// Links the shader and rebuilds its reflection tables. Succeeds immediately
    /// if it is already linked.
    /// ## Errors
    /// * `ResourceError::Shader` - If a stage is missing or the driver rejects the link.
    fn link(&mut self, shader: &Shader) -> Result<(), ResourceError>;

    /// Uploads a value to a uniform of a linked shader.
    /// ## Errors
    /// * `ResourceError::Shader` - If the shader cannot link or has no active
    ///   uniform with this name.
    fn set_uniform(
        &mut self,
        shader: &Shader,
        name: &str,
        value: UniformValue,
    ) -> Result<(), ResourceError>;

    /// Creates a render pipeline from a vertex layout and a shader, linking the
    /// shader if needed. The pipeline keeps the shader alive.
    /// ## Errors
    /// * `ResourceError::Pipeline` - If a layout element names an out-of-range stage.
    /// * `ResourceError::Shader` - If the shader fails to link.
    fn create_pipeline(
        &mut self,
        descriptor: &PipelineDescriptor,
        shader: &Shader,
    ) -> Result<RenderPipeline, ResourceError>;

    /// Sets the pending index buffer, or clears it with `None`.
    /// ## Errors
    /// * `BindingError::TypeMismatch` - If the buffer is not an index buffer.
    fn set_index(&mut self, buffer: Option<&Buffer>) -> Result<(), BindingError>;

    /// Sets the pending vertex buffer of `stage`, or clears it with `None`.
    /// ## Errors
    /// * `BindingError` - If the stage is out of range or the buffer is not a vertex buffer.
    fn set_vertex(&mut self, stage: usize, buffer: Option<&Buffer>) -> Result<(), BindingError>;

    /// Sets the pending render pipeline, or clears it with `None`.
    fn set_pipeline(&mut self, pipeline: Option<&RenderPipeline>);

    /// Applies the pending bindings and draws.
    ///
    /// A zero `count` is inferred from the bound index buffer (or the first
    /// bound vertex buffer) for list topologies only.
    /// ## Errors
    /// * `RenderError::Draw` - If no pipeline is pending, its shader lacks a
    ///   stage, or the count cannot be inferred. No native call is issued.
    /// * `RenderError::ResourceError` - If the shader fails to link.
    fn draw(&mut self, topology: PrimitiveTopology, count: u32) -> Result<(), RenderError>;

    /// Forces the cached driver state back to defaults and re-issues every
    /// default to the driver. Used after context loss.
    fn reset(&mut self);

    /// Updates the viewport after the window was resized.
    fn resize(&mut self, width: u32, height: u32);

    /// Clears the selected attachments. `color` defaults to the configured clear color.
    fn clear(&mut self, flags: ClearFlags, color: Option<[f32; 4]>, stencil: i32, depth: f32);

    /// Opens a frame, optionally clearing every attachment.
    /// ## Errors
    /// * `RenderError::Frame` - If a frame is already open.
    fn begin(&mut self, clear: bool) -> Result<(), RenderError>;

    /// Closes the frame and presents it.
    /// ## Errors
    /// * `RenderError::Frame` - If no frame is open or presentation fails.
    fn end(&mut self) -> Result<(), RenderError>;

    /// Submits queued driver work without waiting for it.
    fn flush(&mut self);
}
