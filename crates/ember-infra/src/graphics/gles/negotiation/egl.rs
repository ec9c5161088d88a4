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

//! [`GlPlatform`] over a dynamically loaded `libEGL`.

use super::config::{ConfigCandidate, RenderableApi};
use super::GlPlatform;
use ember_core::platform::EmberWindow;
use ember_core::renderer::{ApiVersion, NegotiationError};
use khronos_egl as egl;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};
use std::ffi::c_void;

/// EGL loaded at runtime.
pub struct EglPlatform {
    egl: egl::DynamicInstance<egl::EGL1_4>,
}

impl EglPlatform {
    /// Loads the system EGL library.
    pub fn load() -> Result<Self, NegotiationError> {
        // SAFETY: loading libEGL runs its initializers, which have no
        // preconditions on our side.
        let egl = unsafe { egl::DynamicInstance::<egl::EGL1_4>::load_required() }
            .map_err(|err| NegotiationError::LibraryUnavailable(err.to_string()))?;
        log::debug!("Loaded libEGL");
        Ok(Self { egl })
    }

    fn attribute(
        &self,
        display: egl::Display,
        config: egl::Config,
        attribute: egl::Int,
    ) -> Result<egl::Int, NegotiationError> {
        self.egl
            .get_config_attrib(display, config, attribute)
            .map_err(|err| NegotiationError::ConfigQueryFailed(err.to_string()))
    }

    fn candidate(
        &self,
        display: egl::Display,
        config: egl::Config,
    ) -> Result<ConfigCandidate, NegotiationError> {
        let bits = |attribute| -> Result<u8, NegotiationError> {
            Ok(self.attribute(display, config, attribute)?.clamp(0, 255) as u8)
        };
        let surface_type = self.attribute(display, config, egl::SURFACE_TYPE)?;
        let renderable = self.attribute(display, config, egl::RENDERABLE_TYPE)?;
        Ok(ConfigCandidate {
            red: bits(egl::RED_SIZE)?,
            green: bits(egl::GREEN_SIZE)?,
            blue: bits(egl::BLUE_SIZE)?,
            alpha: bits(egl::ALPHA_SIZE)?,
            depth: bits(egl::DEPTH_SIZE)?,
            stencil: bits(egl::STENCIL_SIZE)?,
            samples: bits(egl::SAMPLES)?,
            window_capable: surface_type & egl::WINDOW_BIT != 0,
            renderable: RenderableApi::from_bits_truncate(renderable as u32),
        })
    }
}

fn native_window(window: &dyn EmberWindow) -> Result<egl::NativeWindowType, NegotiationError> {
    let handle = window
        .window_handle()
        .map_err(|err| NegotiationError::UnsupportedWindow(err.to_string()))?;
    native_window_of(handle.as_raw())
}

/// Maps a raw window handle to the `EGLNativeWindowType` of its platform.
///
/// Wayland surfaces need a `wl_egl_window` wrapper and are rejected.
fn native_window_of(handle: RawWindowHandle) -> Result<egl::NativeWindowType, NegotiationError> {
    match handle {
        RawWindowHandle::Xlib(h) => Ok(h.window as egl::NativeWindowType),
        RawWindowHandle::Xcb(h) => Ok(h.window.get() as usize as egl::NativeWindowType),
        RawWindowHandle::AndroidNdk(h) => Ok(h.a_native_window.as_ptr().cast()),
        RawWindowHandle::Win32(h) => Ok(h.hwnd.get() as egl::NativeWindowType),
        other => Err(NegotiationError::UnsupportedWindow(format!("{other:?}"))),
    }
}

fn native_display(window: &dyn EmberWindow) -> egl::NativeDisplayType {
    window
        .display_handle()
        .map_or(egl::DEFAULT_DISPLAY, |handle| native_display_of(handle.as_raw()))
}

fn native_display_of(handle: RawDisplayHandle) -> egl::NativeDisplayType {
    match handle {
        RawDisplayHandle::Xlib(h) => h
            .display
            .map_or(egl::DEFAULT_DISPLAY, |display| display.as_ptr()),
        _ => egl::DEFAULT_DISPLAY,
    }
}

impl GlPlatform for EglPlatform {
    type Display = egl::Display;
    type Config = egl::Config;
    type Context = egl::Context;
    type Surface = egl::Surface;

    fn open_display(&self, window: &dyn EmberWindow) -> Result<egl::Display, NegotiationError> {
        // SAFETY: the native display comes from a live window handle or is
        // EGL_DEFAULT_DISPLAY.
        unsafe { self.egl.get_display(native_display(window)) }
            .ok_or(NegotiationError::DisplayUnavailable)
    }

    fn initialize(&self, display: egl::Display) -> Result<ApiVersion, NegotiationError> {
        let (major, minor) = self
            .egl
            .initialize(display)
            .map_err(|err| NegotiationError::InitializeFailed(err.to_string()))?;
        Ok(ApiVersion::new(major as u32, minor as u32))
    }

    fn bind_api(&self, _display: egl::Display) -> Result<(), NegotiationError> {
        self.egl
            .bind_api(egl::OPENGL_ES_API)
            .map_err(|err| NegotiationError::BindApiFailed(err.to_string()))
    }

    fn configs(
        &self,
        display: egl::Display,
    ) -> Result<Vec<(egl::Config, ConfigCandidate)>, NegotiationError> {
        let count = self
            .egl
            .get_config_count(display)
            .map_err(|err| NegotiationError::ConfigQueryFailed(err.to_string()))?;
        let mut configs = Vec::with_capacity(count);
        self.egl
            .get_configs(display, &mut configs)
            .map_err(|err| NegotiationError::ConfigQueryFailed(err.to_string()))?;
        configs
            .into_iter()
            .map(|config| Ok((config, self.candidate(display, config)?)))
            .collect()
    }

    fn create_context(
        &self,
        display: egl::Display,
        config: egl::Config,
        major: u32,
    ) -> Result<egl::Context, NegotiationError> {
        let attributes = [egl::CONTEXT_CLIENT_VERSION, major as egl::Int, egl::NONE];
        self.egl
            .create_context(display, config, None, &attributes)
            .map_err(|err| NegotiationError::ContextCreationFailed {
                major,
                reason: err.to_string(),
            })
    }

    fn create_surface(
        &self,
        display: egl::Display,
        config: egl::Config,
        window: &dyn EmberWindow,
    ) -> Result<egl::Surface, NegotiationError> {
        let native = native_window(window)?;
        // SAFETY: `native` is the live window behind `window`, which outlives
        // the device built on this surface.
        unsafe { self.egl.create_window_surface(display, config, native, None) }
            .map_err(|err| NegotiationError::SurfaceCreationFailed(err.to_string()))
    }

    fn make_current(
        &self,
        display: egl::Display,
        target: Option<(egl::Surface, egl::Context)>,
    ) -> Result<(), NegotiationError> {
        let result = match target {
            Some((surface, context)) => {
                self.egl
                    .make_current(display, Some(surface), Some(surface), Some(context))
            }
            None => self.egl.make_current(display, None, None, None),
        };
        result.map_err(|err| NegotiationError::MakeCurrentFailed(err.to_string()))
    }

    fn swap_interval(&self, display: egl::Display, interval: i32) -> Result<(), String> {
        self.egl
            .swap_interval(display, interval)
            .map_err(|err| err.to_string())
    }

    fn swap_buffers(&self, display: egl::Display, surface: egl::Surface) -> Result<(), String> {
        self.egl
            .swap_buffers(display, surface)
            .map_err(|err| err.to_string())
    }

    fn destroy_context(&self, display: egl::Display, context: egl::Context) {
        if let Err(err) = self.egl.destroy_context(display, context) {
            log::warn!("eglDestroyContext failed: {err}");
        }
    }

    fn destroy_surface(&self, display: egl::Display, surface: egl::Surface) {
        if let Err(err) = self.egl.destroy_surface(display, surface) {
            log::warn!("eglDestroySurface failed: {err}");
        }
    }

    fn terminate(&self, display: egl::Display) {
        if let Err(err) = self.egl.terminate(display) {
            log::warn!("eglTerminate failed: {err}");
        }
    }

    fn get_proc_address(&self, name: &str) -> *const c_void {
        self.egl
            .get_proc_address(name)
            .map_or(std::ptr::null(), |f| f as *const c_void)
    }
}
