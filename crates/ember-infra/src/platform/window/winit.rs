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

//! [`EmberWindow`] over a `winit` window.

use ember_core::platform::EmberWindow;
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, WindowHandle,
};
use winit::{dpi::LogicalSize, error::OsError, event_loop::ActiveEventLoop, window::Window};

/// A `winit` window the render device can present into.
///
/// The window starts hidden. Negotiation shows it through
/// [`EmberWindow::show`] once a context is current on its surface.
#[derive(Debug)]
pub struct WinitWindow {
    inner: Window,
}

impl WinitWindow {
    /// Opens a hidden window with the given title and logical inner size.
    ///
    /// # Errors
    /// Returns an `OsError` if the platform refuses to create the window.
    pub fn open(
        event_loop: &ActiveEventLoop,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Self, OsError> {
        let attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(LogicalSize::new(width, height))
            .with_visible(false);
        let window = event_loop.create_window(attributes)?;
        log::info!("Opened hidden window '{title}' ({width}x{height}, id {:?})", window.id());
        Ok(Self { inner: window })
    }

    /// Schedules a `RedrawRequested` event for this window.
    pub fn request_redraw(&self) {
        self.inner.request_redraw();
    }
}

impl HasWindowHandle for WinitWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        self.inner.window_handle()
    }
}

impl HasDisplayHandle for WinitWindow {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        self.inner.display_handle()
    }
}

impl EmberWindow for WinitWindow {
    fn inner_size(&self) -> (u32, u32) {
        let size = self.inner.inner_size();
        (size.width, size.height)
    }

    fn show(&self) {
        log::debug!("Showing window {:?}", self.inner.id());
        self.inner.set_visible(true);
    }
}
