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

//! Provides the public, backend-agnostic rendering contracts for ember.
//!
//! This module defines the "common language" for all rendering operations: the
//! [`RenderDevice`] trait, the resource object traits behind [`Buffer`],
//! [`Shader`] and [`RenderPipeline`], the descriptors used to create them, and
//! the error types returned by every fallible call.
//!
//! The 'how' lives in a concrete backend in `ember-infra` which implements these
//! traits. Application code only ever talks to a `dyn RenderDevice`.

pub mod api;
pub mod error;
pub mod traits;

pub use self::api::*;
pub use self::error::{
    BindingError, BufferError, DrawError, FrameError, NegotiationError, PipelineError,
    RenderError, ResourceError, ShaderError,
};
pub use self::traits::{
    Buffer, BufferObject, PipelineObject, RenderDevice, RenderPipeline, Shader, ShaderObject,
};
