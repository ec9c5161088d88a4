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

//! The OpenGL ES [`RenderDevice`].
//!
//! Setters write [`PendingState`]; `draw` commits it against [`SessionState`]
//! and then issues the draw call. Commit only emits calls for bindings that
//! differ from the cache, so a second draw with unchanged pending state costs
//! exactly one native call.

use super::binder;
use super::buffer::GlesBuffer;
use super::conversions::{index_type, IntoGl};
use super::driver::GlDriver;
use super::pending::PendingState;
use super::pipeline::GlesPipeline;
use super::shader::GlesShader;
use super::state::{BufferTarget, SessionState};
use ember_core::renderer::{
    ApiVersion, BindingError, Buffer, BufferDescriptor, BufferMapping, BufferObject, ClearFlags,
    DeviceInfo, DeviceSettings, DrawError, FrameError, GraphicsBackendType, PipelineDescriptor,
    PipelineObject, PixelFormat, PrimitiveTopology, RenderDevice, RenderError, RenderPipeline,
    ResourceError, Shader, ShaderError, ShaderObject, ShaderStage, UniformValue,
};
use std::rc::Rc;

/// Feature tier of the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Range mapping, uniform buffers and the copy-write binding point.
    pub es3: bool,
    /// 32-bit indices.
    pub element_index_uint: bool,
    /// Number of usable attribute slots.
    pub max_attributes: u32,
}

impl Capabilities {
    /// Probes the driver.
    pub fn query(driver: &dyn GlDriver) -> Self {
        let es3 = driver.api_version().0 >= 3;
        Self {
            es3,
            element_index_uint: es3 || driver.has_extension("GL_OES_element_index_uint"),
            max_attributes: driver.get_integer(glow::MAX_VERTEX_ATTRIBS).max(0) as u32,
        }
    }
}

/// A render device over one current OpenGL ES context.
#[derive(Debug)]
pub struct GlesDevice {
    driver: Rc<dyn GlDriver>,
    info: DeviceInfo,
    caps: Capabilities,
    session: SessionState,
    pending: PendingState,
    in_frame: bool,
    clear_color: [f32; 4],
    surface_size: (u32, u32),
}

impl GlesDevice {
    /// Wraps a driver whose context is current and brings it to the baseline state.
    pub fn new(
        driver: Rc<dyn GlDriver>,
        pixel_format: PixelFormat,
        settings: &DeviceSettings,
        surface_size: (u32, u32),
    ) -> Self {
        let caps = Capabilities::query(&*driver);
        let info = query_info(&*driver, pixel_format);
        log::info!(
            "OpenGL ES device: {} ({}), API {}, GLSL {}, {}",
            info.renderer,
            info.vendor,
            info.api_version,
            info.shading_language_version,
            info.pixel_format
        );

        let mut device = Self {
            driver,
            info,
            caps,
            session: SessionState::default(),
            pending: PendingState::default(),
            in_frame: false,
            clear_color: settings.clear_color,
            surface_size,
        };
        device.reset();
        device
    }

    /// The driver-visible state as of the last commit.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// The bindings the next draw will use.
    pub fn pending(&self) -> &PendingState {
        &self.pending
    }

    /// The capability tier of the context.
    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    fn commit(&mut self) -> Result<(), RenderError> {
        let Some(pipeline) = self.pending.pipeline().cloned() else {
            self.session.use_program(&*self.driver, None);
            return Err(DrawError::NoPipeline.into());
        };
        let gles_pipeline =
            GlesPipeline::downcast(&pipeline).ok_or(ResourceError::ForeignResource)?;
        let shader = pipeline.shader();
        let gles_shader = GlesShader::downcast(shader).ok_or(ResourceError::ForeignResource)?;
        if let Some(stage) = ShaderStage::ALL.into_iter().find(|s| !shader.has_stage(*s)) {
            return Err(DrawError::MissingShaderStage(stage).into());
        }

        gles_shader.link()?;
        let driver = &*self.driver;
        self.session.use_program(driver, Some(shader));
        self.session
            .apply_render_state(driver, pipeline.render_state());

        let touched = binder::bind_vertex_layout(
            driver,
            &mut self.session,
            &self.pending,
            gles_pipeline,
            gles_shader,
            self.caps.max_attributes,
        );
        binder::disable_stale_attributes(
            driver,
            &mut self.session,
            touched,
            self.caps.max_attributes,
        );

        self.session
            .bind_buffer(driver, BufferTarget::Element, self.pending.index());
        Ok(())
    }

    /// Infers a zero count from the pending index buffer, or else the first
    /// pending vertex buffer, rounded down to whole primitives.
    fn resolve_count(&self, topology: PrimitiveTopology, count: u32) -> Result<i32, DrawError> {
        let count = match count {
            0 => self.infer_count(topology)?,
            given => given,
        };
        i32::try_from(count).map_err(|_| DrawError::CountOutOfRange(count))
    }

    fn infer_count(&self, topology: PrimitiveTopology) -> Result<u32, DrawError> {
        let per_primitive = topology
            .vertices_per_primitive()
            .ok_or(DrawError::ZeroCount(topology))?;
        let available = self
            .pending
            .index()
            .or_else(|| self.pending.first_vertex())
            .map_or(0, |buffer| buffer.descriptor().count);
        match available - available % per_primitive {
            0 => Err(DrawError::NothingToInfer),
            inferred => Ok(inferred),
        }
    }

    fn gles_buffer(buffer: &Buffer) -> Result<&GlesBuffer, ResourceError> {
        GlesBuffer::downcast(buffer).ok_or(ResourceError::ForeignResource)
    }

    fn gles_shader(shader: &Shader) -> Result<&GlesShader, ResourceError> {
        GlesShader::downcast(shader).ok_or(ResourceError::ForeignResource)
    }
}

fn query_info(driver: &dyn GlDriver, pixel_format: PixelFormat) -> DeviceInfo {
    let (major, minor) = driver.api_version();
    let integer = |pname| driver.get_integer(pname).max(0) as u32;
    DeviceInfo {
        backend_type: GraphicsBackendType::OpenGlEs,
        renderer: driver.get_string(glow::RENDERER),
        vendor: driver.get_string(glow::VENDOR),
        version: driver.get_string(glow::VERSION),
        api_version: ApiVersion::new(major, minor),
        shading_language_version: parse_glsl_version(
            &driver.get_string(glow::SHADING_LANGUAGE_VERSION),
        ),
        max_vertex_attributes: integer(glow::MAX_VERTEX_ATTRIBS),
        max_texture_size: integer(glow::MAX_TEXTURE_SIZE),
        max_texture_units: integer(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS),
        max_render_targets: if major >= 3 {
            integer(glow::MAX_DRAW_BUFFERS)
        } else {
            1
        },
        pixel_format,
    }
}

/// Extracts `major.minor` from strings like `OpenGL ES GLSL ES 3.00`.
fn parse_glsl_version(version: &str) -> ApiVersion {
    version
        .split_whitespace()
        .filter_map(|token| token.split_once('.'))
        .find_map(|(major, minor)| {
            let major = major.parse().ok()?;
            let minor = minor.chars().next()?.to_digit(10)?;
            Some(ApiVersion::new(major, minor))
        })
        .unwrap_or_default()
}

impl RenderDevice for GlesDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        data: Option<&[u8]>,
    ) -> Result<Buffer, ResourceError> {
        GlesBuffer::create(&self.driver, &mut self.session, &self.caps, descriptor, data)
    }

    fn map_buffer<'a>(
        &'a mut self,
        buffer: &'a Buffer,
    ) -> Result<BufferMapping<'a>, ResourceError> {
        Ok(Self::gles_buffer(buffer)?.map(&mut self.session, buffer)?)
    }

    fn unmap_buffer(&mut self, buffer: &Buffer) -> Result<(), ResourceError> {
        Ok(Self::gles_buffer(buffer)?.unmap(&mut self.session, buffer)?)
    }

    fn update_buffer(&mut self, buffer: &Buffer, data: &[u8]) -> Result<(), ResourceError> {
        Ok(Self::gles_buffer(buffer)?.update(&mut self.session, buffer, data)?)
    }

    fn create_shader(&mut self, label: Option<&str>) -> Result<Shader, ResourceError> {
        GlesShader::create(&self.driver, label)
    }

    fn bind_module(
        &mut self,
        shader: &Shader,
        stage: ShaderStage,
        source: &str,
    ) -> Result<(), ResourceError> {
        Ok(Self::gles_shader(shader)?.bind_module(stage, source)?)
    }

    fn link(&mut self, shader: &Shader) -> Result<(), ResourceError> {
        Ok(Self::gles_shader(shader)?.link()?)
    }

    fn set_uniform(
        &mut self,
        shader: &Shader,
        name: &str,
        value: UniformValue,
    ) -> Result<(), ResourceError> {
        let gles = Self::gles_shader(shader)?;
        gles.link()?;
        let location = gles
            .uniform_location(name)
            .ok_or_else(|| ShaderError::UnknownUniform {
                name: name.to_owned(),
            })?;
        self.session.use_program(&*self.driver, Some(shader));
        self.driver.set_uniform(location, &value);
        Ok(())
    }

    fn create_pipeline(
        &mut self,
        descriptor: &PipelineDescriptor,
        shader: &Shader,
    ) -> Result<RenderPipeline, ResourceError> {
        GlesPipeline::create(descriptor, shader)
    }

    fn set_index(&mut self, buffer: Option<&Buffer>) -> Result<(), BindingError> {
        self.pending.set_index(buffer)
    }

    fn set_vertex(&mut self, stage: usize, buffer: Option<&Buffer>) -> Result<(), BindingError> {
        self.pending.set_vertex(stage, buffer)
    }

    fn set_pipeline(&mut self, pipeline: Option<&RenderPipeline>) {
        self.pending.set_pipeline(pipeline);
    }

    fn draw(&mut self, topology: PrimitiveTopology, count: u32) -> Result<(), RenderError> {
        let count = self.resolve_count(topology, count)?;
        self.commit()?;

        let mode = topology.into_gl();
        match self.pending.index() {
            Some(index) => {
                let stride = index.descriptor().stride;
                let index_type = index_type(stride).ok_or_else(|| {
                    RenderError::Internal(format!("index buffer with stride {stride}"))
                })?;
                self.driver.draw_elements(mode, count, index_type, 0);
            }
            None => self.driver.draw_arrays(mode, 0, count),
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.session
            .reset(&*self.driver, self.caps.max_attributes, self.caps.es3);
        let (width, height) = self.surface_size;
        self.driver.viewport(0, 0, width as i32, height as i32);
        log::debug!("Device state reset to defaults");
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.surface_size == (width, height) {
            return;
        }
        self.surface_size = (width, height);
        self.driver.viewport(0, 0, width as i32, height as i32);
    }

    fn clear(&mut self, flags: ClearFlags, color: Option<[f32; 4]>, stencil: i32, depth: f32) {
        let mut mask = 0;
        if flags.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            self.session.ensure_depth_writes(&*self.driver);
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::STENCIL) {
            mask |= glow::STENCIL_BUFFER_BIT;
        }
        if mask == 0 {
            return;
        }
        self.driver
            .clear(mask, color.unwrap_or(self.clear_color), depth, stencil);
    }

    fn begin(&mut self, clear: bool) -> Result<(), RenderError> {
        if self.in_frame {
            return Err(FrameError::AlreadyInFrame.into());
        }
        self.in_frame = true;
        if clear {
            self.clear(ClearFlags::ALL, None, 0, 1.0);
        }
        Ok(())
    }

    fn end(&mut self) -> Result<(), RenderError> {
        if !self.in_frame {
            return Err(FrameError::NotInFrame.into());
        }
        self.in_frame = false;
        self.driver
            .swap_buffers()
            .map_err(|reason| FrameError::PresentFailed(reason).into())
    }

    fn flush(&mut self) {
        self.driver.flush();
    }
}
