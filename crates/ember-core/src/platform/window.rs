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

//! The narrow window interface a backend negotiates against.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

/// A window a render device can present into.
///
/// Any windowing backend can implement this trait. The backend reads the
/// native window and display handles during negotiation and calls
/// [`EmberWindow::show`] once the presentation surface exists.
pub trait EmberWindow: HasWindowHandle + HasDisplayHandle {
    /// Returns the physical dimensions (width, height) of the window's inner area.
    fn inner_size(&self) -> (u32, u32);

    /// Makes the window visible.
    ///
    /// Called exactly once, after the native surface has been created. Showing
    /// the window earlier breaks surface creation on some native platforms.
    fn show(&self);
}
