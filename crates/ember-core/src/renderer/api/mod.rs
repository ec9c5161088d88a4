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

//! Backend-agnostic rendering API types.
//!
//! - **[`core`]**: device information and startup settings.
//! - **[`buffer`]**: buffer descriptors and the mapped-region guard.
//! - **[`shader`]**: shader stages and the reflection tables of a linked shader.
//! - **[`vertex`]**: vertex usages, element formats and layout descriptions.
//! - **[`pipeline`]**: pipeline descriptors and fixed-function render state.
//! - **[`command`]**: draw topologies and clear flags.

pub mod buffer;
pub mod command;
pub mod core;
pub mod pipeline;
pub mod shader;
pub mod vertex;

pub use self::buffer::*;
pub use self::command::*;
pub use self::core::*;
pub use self::pipeline::*;
pub use self::shader::*;
pub use self::vertex::*;
