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

//! Bindings requested by the caller but not yet applied.

use ember_core::renderer::{
    BindingError, Buffer, BufferType, RenderPipeline, MAX_VERTEX_STAGES,
};
use ember_core::resource::same_resource;

/// The index buffer, vertex stages and pipeline the next draw will use.
///
/// Setters validate and store; nothing reaches the driver until commit.
#[derive(Debug, Default)]
pub struct PendingState {
    index: Option<Buffer>,
    vertex: [Option<Buffer>; MAX_VERTEX_STAGES],
    pipeline: Option<RenderPipeline>,
}

impl PendingState {
    /// The pending index buffer.
    pub fn index(&self) -> Option<&Buffer> {
        self.index.as_ref()
    }

    /// The pending vertex buffer for `stage`, `None` when out of range.
    pub fn vertex(&self, stage: usize) -> Option<&Buffer> {
        self.vertex.get(stage)?.as_ref()
    }

    /// The pending pipeline.
    pub fn pipeline(&self) -> Option<&RenderPipeline> {
        self.pipeline.as_ref()
    }

    /// The first non-empty vertex stage.
    pub fn first_vertex(&self) -> Option<&Buffer> {
        self.vertex.iter().flatten().next()
    }

    /// Sets or clears the index buffer.
    pub fn set_index(&mut self, buffer: Option<&Buffer>) -> Result<(), BindingError> {
        check_type(buffer, BufferType::Index)?;
        if !same_resource(self.index.as_ref(), buffer) {
            self.index = buffer.cloned();
        }
        Ok(())
    }

    /// Sets or clears the vertex buffer of `stage`.
    pub fn set_vertex(&mut self, stage: usize, buffer: Option<&Buffer>) -> Result<(), BindingError> {
        let slot = self
            .vertex
            .get_mut(stage)
            .ok_or(BindingError::StageOutOfRange {
                stage,
                max: MAX_VERTEX_STAGES,
            })?;
        check_type(buffer, BufferType::Vertex)?;
        if !same_resource(slot.as_ref(), buffer) {
            *slot = buffer.cloned();
        }
        Ok(())
    }

    /// Sets or clears the pipeline.
    pub fn set_pipeline(&mut self, pipeline: Option<&RenderPipeline>) {
        if !same_resource(self.pipeline.as_ref(), pipeline) {
            self.pipeline = pipeline.cloned();
        }
    }
}

fn check_type(buffer: Option<&Buffer>, expected: BufferType) -> Result<(), BindingError> {
    match buffer {
        Some(b) if b.buffer_type() != expected => Err(BindingError::TypeMismatch {
            expected,
            actual: b.buffer_type(),
        }),
        _ => Ok(()),
    }
}
