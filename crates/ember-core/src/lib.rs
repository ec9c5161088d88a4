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

//! # Ember Core
//!
//! The backend-agnostic half of the ember render-device layer.
//!
//! This crate defines the contracts every graphics backend must satisfy: the
//! [`renderer::RenderDevice`] trait, the shared [`resource::Resource`] handle used
//! for buffers, shaders and pipelines, the descriptors that describe them, and the
//! error hierarchy returned by every fallible operation. It contains no native
//! graphics code; concrete backends live in `ember-infra`.

#![warn(missing_docs)]

pub mod config;
pub mod platform;
pub mod renderer;
pub mod resource;
pub mod utils;

pub use resource::{Resource, ResourceId};
