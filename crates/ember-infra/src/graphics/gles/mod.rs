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

//! The OpenGL ES render device.
//!
//! Layering, from the driver up:
//! - [`driver::GlDriver`]: the native entry points, implemented over `glow`.
//! - [`state::SessionState`] / [`pending::PendingState`]: bound vs. requested.
//! - [`buffer`], [`shader`], [`pipeline`]: resource objects.
//! - [`binder`]: vertex layout to attribute slots.
//! - [`device::GlesDevice`]: the [`RenderDevice`](ember_core::renderer::RenderDevice).
//! - [`negotiation`]: obtaining a current context for a window.

pub mod binder;
pub mod buffer;
pub mod conversions;
pub mod device;
pub mod driver;
pub mod glow_driver;
pub mod negotiation;
pub mod pending;
pub mod pipeline;
pub mod shader;
pub mod state;

#[cfg(test)]
mod mock;

pub use self::device::{Capabilities, GlesDevice};
pub use self::driver::GlDriver;
pub use self::glow_driver::{GlowDriver, Presenter};
pub use self::negotiation::{negotiate, GlPlatform, NegotiatedContext};

use ember_core::platform::EmberWindow;
use ember_core::renderer::DeviceSettings;
use std::rc::Rc;

/// Loads `glow` through `context` and wraps it in a device.
///
/// `context` must be current on the calling thread, which [`negotiate`]
/// guarantees for the context it returns.
pub fn open_device<P: GlPlatform + 'static>(
    context: NegotiatedContext<P>,
    window: &dyn EmberWindow,
    settings: &DeviceSettings,
) -> GlesDevice {
    // SAFETY: the context is current on this thread and the loader resolves
    // entry points for exactly that context.
    let gl = unsafe { glow::Context::from_loader_function(|name| context.get_proc_address(name)) };
    let pixel_format = context.pixel_format();
    let driver = GlowDriver::new(gl, Box::new(context));
    GlesDevice::new(Rc::new(driver), pixel_format, settings, window.inner_size())
}

/// Negotiates an EGL context for `window` and opens a device on it.
#[cfg(feature = "egl")]
pub fn create_egl_device(
    window: &dyn EmberWindow,
    settings: &DeviceSettings,
) -> Result<GlesDevice, ember_core::renderer::RenderError> {
    let platform = negotiation::egl::EglPlatform::load()?;
    let context = negotiate(platform, window, settings)?;
    Ok(open_device(context, window, settings))
}
