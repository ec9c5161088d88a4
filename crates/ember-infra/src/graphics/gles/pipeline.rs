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

//! OpenGL ES render pipelines.

use super::conversions::{native_format, NativeFormat};
use super::shader::GlesShader;
use ember_core::renderer::{
    PipelineDescriptor, PipelineError, PipelineObject, RenderPipeline, RenderState,
    ResourceError, Shader, VertexElementDescriptor, VertexUsage, MAX_VERTEX_STAGES,
};
use ember_core::Resource;
use std::any::Any;
use std::rc::Rc;

/// One layout element resolved to its native description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlesVertexElement {
    /// The semantic matched against the shader's attributes.
    pub usage: VertexUsage,
    /// How the driver reads the element.
    pub format: NativeFormat,
    /// Byte offset of the element within its stage's stride.
    pub offset: u32,
}

/// A shader plus its vertex layout packed per stage.
#[derive(Debug)]
pub struct GlesPipeline {
    label: Option<String>,
    shader: Shader,
    layout: Vec<VertexElementDescriptor>,
    stages: [Vec<GlesVertexElement>; MAX_VERTEX_STAGES],
    strides: [u32; MAX_VERTEX_STAGES],
    render_state: RenderState,
}

impl GlesPipeline {
    /// Packs `descriptor.layout` and links `shader`.
    ///
    /// Elements sharing a stage are interleaved in declaration order.
    pub(super) fn create(
        descriptor: &PipelineDescriptor<'_>,
        shader: &Shader,
    ) -> Result<RenderPipeline, ResourceError> {
        let label = descriptor.label.as_deref().map(str::to_owned);
        let mut stages: [Vec<GlesVertexElement>; MAX_VERTEX_STAGES] = Default::default();
        let mut strides = [0u32; MAX_VERTEX_STAGES];

        for element in descriptor.layout.iter() {
            let stage = element.stage;
            if stage >= MAX_VERTEX_STAGES {
                return Err(PipelineError::StageOutOfRange {
                    label,
                    stage,
                    max: MAX_VERTEX_STAGES,
                }
                .into());
            }
            let format = native_format(element.format);
            stages[stage].push(GlesVertexElement {
                usage: element.usage,
                format,
                offset: strides[stage],
            });
            strides[stage] += format.size;
        }

        GlesShader::downcast(shader)
            .ok_or(ResourceError::ForeignResource)?
            .link()?;

        log::debug!(
            "Created pipeline '{}' with strides {:?}",
            label.as_deref().unwrap_or("unnamed"),
            strides
        );
        Ok(Resource::from_rc(Rc::new(GlesPipeline {
            label,
            shader: shader.clone(),
            layout: descriptor.layout.to_vec(),
            stages,
            strides,
            render_state: descriptor.render_state,
        })))
    }

    /// Recovers the concrete pipeline behind a handle.
    pub(super) fn downcast(pipeline: &RenderPipeline) -> Option<&GlesPipeline> {
        pipeline.as_any().downcast_ref()
    }

    /// The packed elements of vertex stage `stage`.
    pub(super) fn stage_elements(&self, stage: usize) -> &[GlesVertexElement] {
        self.stages.get(stage).map_or(&[][..], Vec::as_slice)
    }
}

impl PipelineObject for GlesPipeline {
    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn shader(&self) -> &Shader {
        &self.shader
    }

    fn layout(&self) -> &[VertexElementDescriptor] {
        &self.layout
    }

    fn stride(&self, stage: usize) -> u32 {
        self.strides.get(stage).copied().unwrap_or(0)
    }

    fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
