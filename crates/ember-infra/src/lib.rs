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

//! # Ember Infra
//!
//! Concrete implementations of the contracts defined in `ember-core`.
//!
//! - [`graphics`]: the OpenGL ES render device, its EGL context negotiation and
//!   the backend selection entry point [`graphics::create_render_device`].
//! - [`platform`]: a `winit` window implementing [`ember_core::platform::EmberWindow`].

pub mod graphics;
#[cfg(feature = "platform")]
pub mod platform;

pub use graphics::create_render_device;
