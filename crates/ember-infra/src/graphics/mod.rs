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

//! Graphics backends and backend selection.

pub mod gles;

use anyhow::{anyhow, Context, Result};
use ember_core::platform::EmberWindow;
use ember_core::renderer::{DeviceSettings, GraphicsBackendType, RenderDevice, RenderError};

/// Creates a render device for `window`, trying each preferred backend in order.
///
/// The first backend that initializes wins. Failures are logged and the next
/// backend is tried.
pub fn create_render_device(
    window: &dyn EmberWindow,
    settings: &DeviceSettings,
) -> Result<Box<dyn RenderDevice>, RenderError> {
    log::info!("Starting render backend selection...");

    for &backend_type in &settings.preferred_backends {
        log::info!("Attempting to initialize {backend_type:?} backend...");
        match try_backend(backend_type, window, settings) {
            Ok(device) => {
                log::info!(
                    "Successfully selected {:?} backend with renderer \"{}\"",
                    backend_type,
                    device.info().renderer
                );
                return Ok(device);
            }
            Err(err) => {
                log::warn!("Failed to initialize {backend_type:?} backend: {err:#}");
            }
        }
    }

    log::error!(
        "All backend attempts failed. Attempted: {:?}",
        settings.preferred_backends
    );
    Err(RenderError::NoBackendAvailable)
}

fn try_backend(
    backend_type: GraphicsBackendType,
    window: &dyn EmberWindow,
    settings: &DeviceSettings,
) -> Result<Box<dyn RenderDevice>> {
    match backend_type {
        GraphicsBackendType::OpenGlEs => open_gles(window, settings),
        GraphicsBackendType::Unknown => Err(anyhow!("no implementation for this backend")),
    }
}

#[cfg(feature = "egl")]
fn open_gles(window: &dyn EmberWindow, settings: &DeviceSettings) -> Result<Box<dyn RenderDevice>> {
    let device = gles::create_egl_device(window, settings)
        .context("OpenGL ES device over EGL could not be created")?;
    Ok(Box::new(device))
}

#[cfg(not(feature = "egl"))]
fn open_gles(_window: &dyn EmberWindow, _settings: &DeviceSettings) -> Result<Box<dyn RenderDevice>> {
    anyhow::bail!("ember-infra was built without the `egl` feature")
}
