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

//! Resolves a pipeline's vertex layout against its shader's attribute slots.
//!
//! Every native call goes through [`SessionState`], so slots that already
//! point at the same buffer region cost nothing. The array buffer binding is
//! only changed right before a pointer that has to be re-issued.

use super::driver::GlDriver;
use super::pending::PendingState;
use super::pipeline::GlesPipeline;
use super::shader::GlesShader;
use super::state::{AttributeBinding, BufferTarget, SessionState, ATTRIBUTE_MASK_BITS};
use ember_core::renderer::{PipelineObject, ShaderObject, MAX_VERTEX_STAGES};

/// Binds every pipeline stage that has a pending vertex buffer and points the
/// matching attribute slots at it.
///
/// Returns the mask of slots driven by the layout. Elements whose usage the
/// shader does not consume are skipped.
pub(super) fn bind_vertex_layout(
    driver: &dyn GlDriver,
    session: &mut SessionState,
    pending: &PendingState,
    pipeline: &GlesPipeline,
    shader: &GlesShader,
    max_attributes: u32,
) -> u32 {
    let limit = max_attributes.min(ATTRIBUTE_MASK_BITS);
    let mut touched = 0u32;

    for stage in 0..MAX_VERTEX_STAGES {
        let elements = pipeline.stage_elements(stage);
        if elements.is_empty() {
            continue;
        }
        let Some(buffer) = pending.vertex(stage) else {
            continue;
        };

        let stride = pipeline.stride(stage);

        for element in elements {
            let Some(slot) = shader.attribute_slot(element.usage) else {
                log::warn!(
                    "Shader '{}' has no attribute for {:?}; skipping stage {} element",
                    shader.label().unwrap_or("unnamed"),
                    element.usage,
                    stage
                );
                continue;
            };
            if slot >= limit {
                log::warn!("Attribute slot {slot} exceeds the device limit of {limit}");
                continue;
            }

            session.enable_attribute(driver, slot);
            let binding = AttributeBinding {
                buffer: buffer.clone(),
                offset: element.offset,
                stride,
                components: element.format.components,
                data_type: element.format.data_type,
                normalized: element.format.normalized,
            };
            // The array binding only matters to the pointer call that latches it.
            if !session.attribute(slot).is_some_and(|cached| cached.matches(&binding)) {
                session.bind_buffer(driver, BufferTarget::Array, Some(buffer));
                session.set_attribute(driver, slot, binding);
            }
            touched |= 1 << slot;
        }
    }
    touched
}

/// Disables enabled slots outside `touched`, scanning the first
/// `min(max_attributes, 32)` slots. Returns the number disabled.
pub(super) fn disable_stale_attributes(
    driver: &dyn GlDriver,
    session: &mut SessionState,
    touched: u32,
    max_attributes: u32,
) -> usize {
    let stale = session.enabled_attributes() & !touched;
    (0..max_attributes.min(ATTRIBUTE_MASK_BITS))
        .filter(|slot| stale & (1 << slot) != 0)
        .filter(|slot| session.disable_attribute(driver, *slot))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gles::buffer::GlesBuffer;
    use crate::graphics::gles::device::Capabilities;
    use crate::graphics::gles::mock::{Call, RecordingDriver};
    use ember_core::Resource;
    use ember_core::renderer::{
        Buffer, BufferDescriptor, BufferType, PipelineDescriptor, RenderPipeline, Shader,
        ShaderStage, VertexElementDescriptor, VertexFormat, VertexUsage,
    };
    use std::rc::Rc;

    const VERTEX: &str = "\
attribute vec3 a_position;
attribute vec3 a_normal;
attribute vec2 a_uv;
void main() { gl_Position = vec4(a_position + a_normal, a_uv.x); }
";
    const FRAGMENT: &str = "void main() { gl_FragColor = vec4(1.0); }\n";

    struct Fixture {
        recording: Rc<RecordingDriver>,
        driver: Rc<dyn GlDriver>,
        session: SessionState,
        shader: Shader,
    }

    impl Fixture {
        fn new(driver: RecordingDriver) -> Self {
            let recording = Rc::new(driver);
            let driver: Rc<dyn GlDriver> = recording.clone();
            let shader = GlesShader::create(&driver, Some("lit")).unwrap();
            let gles = GlesShader::downcast(&shader).unwrap();
            gles.bind_module(ShaderStage::Vertex, VERTEX).unwrap();
            gles.bind_module(ShaderStage::Fragment, FRAGMENT).unwrap();
            Self {
                recording,
                driver,
                session: SessionState::default(),
                shader,
            }
        }

        fn pipeline(&self, usages: &[(usize, VertexUsage)]) -> RenderPipeline {
            let layout: Vec<VertexElementDescriptor> = usages
                .iter()
                .map(|&(stage, usage)| {
                    VertexElementDescriptor::new(stage, usage, VertexFormat::Float32x3)
                })
                .collect();
            let descriptor = PipelineDescriptor {
                layout: layout.into(),
                ..Default::default()
            };
            GlesPipeline::create(&descriptor, &self.shader).unwrap()
        }

        fn vertex_buffer(&mut self) -> Buffer {
            let caps = Capabilities::query(&*self.driver);
            let desc = BufferDescriptor::new(BufferType::Vertex, 3, 36);
            GlesBuffer::create(&self.driver, &mut self.session, &caps, &desc, None).unwrap()
        }

        fn bind(&mut self, pending: &PendingState, pipeline: &RenderPipeline) -> usize {
            let gles = GlesPipeline::downcast(pipeline).unwrap();
            let shader = GlesShader::downcast(pipeline.shader()).unwrap();
            let touched = bind_vertex_layout(
                &*self.driver,
                &mut self.session,
                pending,
                gles,
                shader,
                16,
            );
            disable_stale_attributes(&*self.driver, &mut self.session, touched, 16)
        }
    }

    #[test]
    fn test_enables_only_the_symmetric_difference() {
        let mut fixture = Fixture::new(RecordingDriver::es3());
        let buffer = fixture.vertex_buffer();
        let mut pending = PendingState::default();
        pending.set_vertex(0, Some(&buffer)).unwrap();

        let first = fixture.pipeline(&[
            (0, VertexUsage::Position),
            (0, VertexUsage::Normal),
        ]);
        let second = fixture.pipeline(&[
            (0, VertexUsage::Position),
            (0, VertexUsage::TexCoord0),
        ]);

        fixture.bind(&pending, &first);
        assert_eq!(fixture.session.enabled_attributes(), 0b011);
        fixture.recording.take_calls();

        let disabled = fixture.bind(&pending, &second);
        let calls = fixture.recording.take_calls();
        assert_eq!(disabled, 1);
        assert_eq!(calls.iter().filter(|c| matches!(c, Call::EnableAttrib(_))).count(), 1);
        assert!(calls.contains(&Call::EnableAttrib(2)));
        assert!(calls.contains(&Call::DisableAttrib(1)));
        assert!(!calls.iter().any(|c| matches!(c, Call::BindBuffer { .. })));
        assert_eq!(fixture.session.enabled_attributes(), 0b101);
    }

    #[test]
    fn test_rebinding_same_layout_is_free() {
        let mut fixture = Fixture::new(RecordingDriver::es3());
        let buffer = fixture.vertex_buffer();
        let mut pending = PendingState::default();
        pending.set_vertex(0, Some(&buffer)).unwrap();
        let pipeline = fixture.pipeline(&[(0, VertexUsage::Position), (0, VertexUsage::Normal)]);

        fixture.bind(&pending, &pipeline);
        fixture.recording.take_calls();
        fixture.bind(&pending, &pipeline);
        assert!(fixture.recording.take_calls().is_empty());
    }

    #[test]
    fn test_two_stages_rebind_only_on_pointer_changes() {
        let mut fixture = Fixture::new(RecordingDriver::es3());
        let positions = fixture.vertex_buffer();
        let normals = fixture.vertex_buffer();
        let mut pending = PendingState::default();
        pending.set_vertex(0, Some(&positions)).unwrap();
        pending.set_vertex(1, Some(&normals)).unwrap();
        let pipeline = fixture.pipeline(&[(0, VertexUsage::Position), (1, VertexUsage::Normal)]);

        fixture.bind(&pending, &pipeline);
        assert!(Resource::ptr_eq(
            fixture.session.buffer(BufferTarget::Array).unwrap(),
            &normals
        ));
        fixture.recording.take_calls();

        fixture.bind(&pending, &pipeline);
        assert!(fixture.recording.take_calls().is_empty());

        let moved = fixture.vertex_buffer();
        fixture.recording.take_calls();
        pending.set_vertex(0, Some(&moved)).unwrap();
        fixture.bind(&pending, &pipeline);
        let calls = fixture.recording.take_calls();
        assert_eq!(calls.iter().filter(|c| matches!(c, Call::BindBuffer { .. })).count(), 1);
        assert_eq!(calls.iter().filter(|c| matches!(c, Call::AttribPointer { .. })).count(), 1);
    }

    #[test]
    fn test_unconsumed_usage_is_skipped() {
        let mut fixture = Fixture::new(RecordingDriver::es3());
        let buffer = fixture.vertex_buffer();
        let mut pending = PendingState::default();
        pending.set_vertex(0, Some(&buffer)).unwrap();
        let pipeline = fixture.pipeline(&[(0, VertexUsage::Tangent), (0, VertexUsage::Position)]);

        fixture.bind(&pending, &pipeline);
        assert_eq!(fixture.session.enabled_attributes(), 0b001);
        let binding = fixture.session.attribute(0).unwrap();
        assert_eq!(binding.offset, 12);
        assert_eq!(binding.stride, 24);
    }

    #[test]
    fn test_stage_without_pending_buffer_is_not_bound() {
        let mut fixture = Fixture::new(RecordingDriver::es3());
        let buffer = fixture.vertex_buffer();
        let mut pending = PendingState::default();
        pending.set_vertex(0, Some(&buffer)).unwrap();
        let pipeline = fixture.pipeline(&[(0, VertexUsage::Position), (1, VertexUsage::Normal)]);

        fixture.bind(&pending, &pipeline);
        assert_eq!(fixture.session.enabled_attributes(), 0b001);
    }

    #[test]
    fn test_cleanup_respects_small_attribute_limits() {
        let mut fixture = Fixture::new(RecordingDriver::es3());
        let driver = Rc::clone(&fixture.driver);
        fixture.session.enable_attribute(&*driver, 3);
        fixture.session.enable_attribute(&*driver, 30);
        fixture.recording.take_calls();

        let disabled = disable_stale_attributes(&*driver, &mut fixture.session, 0, 4);
        assert_eq!(disabled, 1);
        assert_eq!(fixture.recording.take_calls(), [Call::DisableAttrib(3)]);

        let disabled = disable_stale_attributes(&*driver, &mut fixture.session, 0, 64);
        assert_eq!(disabled, 1);
        assert_eq!(fixture.session.enabled_attributes(), 0);
    }
}
