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


use anyhow::Context;
use ember_core::{
    config::JsonProperties,
    renderer::{
        Buffer, BufferDescriptor, BufferType, ClearFlags, DeviceSettings, PipelineDescriptor,
        PrimitiveTopology, RenderDevice, RenderPipeline, Shader, ShaderStage, UniformValue,
        VertexElementDescriptor, VertexFormat, VertexUsage,
    },
};
use ember_infra::{
    create_render_device,
    platform::window::WinitWindow,
};
use env_logger::{Builder, Env};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::WindowId,
};

const SETTINGS_PATH: &str = "ember.json";

const VERTEX_SOURCE: &str = r#"
attribute vec3 a_position;
attribute vec4 a_color;
varying vec4 v_tint;
void main() {
    v_tint = a_color;
    gl_Position = vec4(a_position, 1.0);
}
"#;

const FRAGMENT_SOURCE: &str = r#"
precision mediump float;
uniform vec4 u_tint;
varying vec4 v_tint;
void main() {
    gl_FragColor = v_tint * u_tint;
}
"#;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 4],
}

const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [0.0, 0.5, 0.0],
        color: [1.0, 0.0, 0.0, 1.0],
    },
    Vertex {
        position: [-0.5, -0.5, 0.0],
        color: [0.0, 1.0, 0.0, 1.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        color: [0.0, 0.0, 1.0, 1.0],
    },
];

/// The GPU objects drawn every frame.
struct Scene {
    _vertices: Buffer,
    _shader: Shader,
    _pipeline: RenderPipeline,
}

impl Scene {
    fn build(device: &mut dyn RenderDevice) -> anyhow::Result<Self> {
        let shader = device.create_shader(Some("triangle"))?;
        device.bind_module(&shader, ShaderStage::Vertex, VERTEX_SOURCE)?;
        device.bind_module(&shader, ShaderStage::Fragment, FRAGMENT_SOURCE)?;
        device.set_uniform(&shader, "u_tint", UniformValue::Vec4([1.0, 1.0, 1.0, 1.0]))?;

        let layout = [
            VertexElementDescriptor::new(0, VertexUsage::Position, VertexFormat::Float32x3),
            VertexElementDescriptor::new(0, VertexUsage::Color0, VertexFormat::Float32x4),
        ];
        let pipeline = device.create_pipeline(
            &PipelineDescriptor {
                label: Some("triangle".into()),
                layout: layout[..].into(),
                ..Default::default()
            },
            &shader,
        )?;

        let descriptor = BufferDescriptor::new(
            BufferType::Vertex,
            TRIANGLE.len() as u32,
            std::mem::size_of::<Vertex>() as u32,
        )
        .with_label("triangle vertices");
        let vertices = device.create_buffer(&descriptor, Some(bytemuck::cast_slice(&TRIANGLE)))?;

        device.set_pipeline(Some(&pipeline));
        device.set_vertex(0, Some(&vertices))?;

        Ok(Self {
            _vertices: vertices,
            _shader: shader,
            _pipeline: pipeline,
        })
    }
}

/// Application state driven by the `winit` event loop.
///
/// Fields drop in declaration order: the scene before the device that created
/// it, and the device before the window its surface was made for.
struct Sandbox {
    settings: DeviceSettings,
    scene: Option<Scene>,
    device: Option<Box<dyn RenderDevice>>,
    window: Option<WinitWindow>,
}

impl Sandbox {
    fn new(settings: DeviceSettings) -> Self {
        Self {
            settings,
            scene: None,
            device: None,
            window: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = WinitWindow::open(event_loop, "Ember Sandbox", 1024, 768)
            .context("failed to create the window")?;

        let mut device = create_render_device(&window, &self.settings)?;
        log::info!("Rendering with {}", device.info().renderer);

        let scene = Scene::build(device.as_mut())?;
        window.request_redraw();

        self.scene = Some(scene);
        self.device = Some(device);
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let Some(device) = self.device.as_deref_mut() else {
            return Ok(());
        };
        device.begin(true)?;
        device.clear(ClearFlags::DEPTH, None, 0, 1.0);
        device.draw(PrimitiveTopology::TriangleList, 0)?;
        device.end()?;
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.scene = None;
        self.device = None;
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for Sandbox {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            log::error!("Failed to start the sandbox: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down.");
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(device) = self.device.as_deref_mut() {
                    device.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    log::error!("Frame failed: {e}");
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn load_settings() -> DeviceSettings {
    match JsonProperties::from_file(SETTINGS_PATH) {
        Ok(props) => {
            log::info!("Loaded device settings from '{SETTINGS_PATH}'");
            DeviceSettings::from_properties(&props)
        }
        Err(e) => {
            log::info!("No usable '{SETTINGS_PATH}' ({e:#}), using default settings");
            DeviceSettings::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new()?;
    let mut app = Sandbox::new(load_settings());
    event_loop.run_app(&mut app)?;
    Ok(())
}
