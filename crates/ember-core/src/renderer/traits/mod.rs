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

//! Defines the core architectural traits for the rendering subsystem.
//!
//! - [`RenderDevice`]: the single interface application code drives.
//! - [`BufferObject`], [`ShaderObject`], [`PipelineObject`]: the backend objects
//!   behind the shared [`Buffer`], [`Shader`] and [`RenderPipeline`] handles.

mod render_device;
mod resources;

pub use self::render_device::RenderDevice;
pub use self::resources::*;
