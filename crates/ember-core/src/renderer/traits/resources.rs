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

//! Backend resource objects and the shared handles that own them.

use crate::renderer::api::{
    AttributeInfo, BufferDescriptor, BufferType, BufferUsage, RenderState, ShaderStage,
    UniformInfo, VertexElementDescriptor,
};
use crate::resource::Resource;
use std::any::Any;
use std::fmt::Debug;

/// A backend buffer object.
///
/// Implementations release their native handle in `Drop`.
pub trait BufferObject: Debug {
    /// The descriptor the buffer was created from.
    fn descriptor(&self) -> &BufferDescriptor<'static>;

    /// Whether the contents may change after creation.
    fn usage(&self) -> BufferUsage;

    /// Whether the buffer is currently mapped.
    fn is_mapped(&self) -> bool;

    /// Allows the owning backend to recover its concrete type.
    fn as_any(&self) -> &dyn Any;

    /// The binding point the buffer was created for.
    fn buffer_type(&self) -> BufferType {
        self.descriptor().buffer_type
    }

    /// The byte size, `count * stride`.
    fn size(&self) -> usize {
        self.descriptor().count as usize * self.descriptor().stride as usize
    }
}

/// A backend shader program: two stage modules plus reflection tables.
pub trait ShaderObject: Debug {
    /// The debug label given at creation.
    fn label(&self) -> Option<&str>;

    /// Whether a compiled module is attached for `stage`.
    fn has_stage(&self, stage: ShaderStage) -> bool;

    /// Whether the attached modules are linked. Cleared by every module (re)attach.
    fn is_linked(&self) -> bool;

    /// The active attributes of the last successful link. Empty when unlinked.
    fn attributes(&self) -> Vec<AttributeInfo>;

    /// The active uniforms of the last successful link. Empty when unlinked.
    fn uniforms(&self) -> Vec<UniformInfo>;

    /// Allows the owning backend to recover its concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// A backend render pipeline: a shader plus a resolved vertex layout.
///
/// Immutable after creation.
pub trait PipelineObject: Debug {
    /// The debug label given at creation.
    fn label(&self) -> Option<&str>;

    /// The shader this pipeline keeps alive.
    fn shader(&self) -> &Shader;

    /// The abstract layout the pipeline was built from.
    fn layout(&self) -> &[VertexElementDescriptor];

    /// The byte stride of vertex stage `stage`, 0 when the stage is unused.
    fn stride(&self, stage: usize) -> u32;

    /// The fixed-function state applied when the pipeline becomes active.
    fn render_state(&self) -> &RenderState;

    /// Allows the owning backend to recover its concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// A shared handle to a backend buffer.
pub type Buffer = Resource<dyn BufferObject>;

/// A shared handle to a backend shader.
pub type Shader = Resource<dyn ShaderObject>;

/// A shared handle to a backend render pipeline.
pub type RenderPipeline = Resource<dyn PipelineObject>;
