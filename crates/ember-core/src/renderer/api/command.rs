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

//! Draw topologies and clear flags.

use crate::ember_bitflags;

/// Defines how vertices are connected to form a geometric primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Vertices are rendered as a list of isolated points.
    PointList,
    /// Every two vertices form an isolated line.
    LineList,
    /// Vertices are rendered as a connected line strip.
    LineStrip,
    /// Every three vertices form an isolated triangle.
    TriangleList,
    /// Vertices are rendered as a connected triangle strip.
    TriangleStrip,
    /// Vertices are rendered as a fan around the first vertex.
    TriangleFan,
}

impl PrimitiveTopology {
    /// Vertices consumed per primitive for strictly list-based topologies.
    ///
    /// Only these topologies allow a draw count to be inferred from a buffer.
    pub const fn vertices_per_primitive(self) -> Option<u32> {
        match self {
            PrimitiveTopology::LineList => Some(2),
            PrimitiveTopology::TriangleList => Some(3),
            _ => None,
        }
    }
}

ember_bitflags! {
    /// Which attachments [`RenderDevice::clear`](crate::renderer::RenderDevice::clear) resets.
    pub struct ClearFlags: u32 {
        /// The color attachment.
        const COLOR = 1 << 0;
        /// The depth attachment.
        const DEPTH = 1 << 1;
        /// The stencil attachment.
        const STENCIL = 1 << 2;
        /// Every attachment.
        const ALL = 0b111;
    }
}
