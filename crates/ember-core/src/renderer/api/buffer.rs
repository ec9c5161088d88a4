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

//! Defines data structures related to GPU buffer resources.

use std::borrow::Cow;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// The binding point a buffer is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferType {
    /// Per-vertex attribute data.
    Vertex,
    /// Element indices for indexed draws.
    Index,
    /// Shader constants.
    Uniform,
}

/// How a buffer's contents may change after creation.
///
/// The usage is not chosen directly: a buffer created with initial data is
/// [`BufferUsage::Static`], a buffer created without is [`BufferUsage::Dynamic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Immutable after creation. Cannot be mapped or updated.
    Static,
    /// Mutable. Supports map/unmap and full-buffer updates.
    Dynamic,
}

/// A descriptor used to create a [`Buffer`](crate::renderer::Buffer).
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The binding point the buffer is created for.
    pub buffer_type: BufferType,
    /// Number of elements (vertices, indices or constant blocks).
    pub count: u32,
    /// Size of one element in bytes.
    pub stride: u32,
}

impl<'a> BufferDescriptor<'a> {
    /// Creates an unlabelled descriptor.
    pub fn new(buffer_type: BufferType, count: u32, stride: u32) -> Self {
        Self {
            label: None,
            buffer_type,
            count,
            stride,
        }
    }

    /// Attaches a debug label.
    pub fn with_label(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The total size in bytes, `count * stride`, or `None` on overflow.
    pub fn size(&self) -> Option<usize> {
        (self.count as usize).checked_mul(self.stride as usize)
    }

    /// Returns a copy with an owned label, detached from the borrowed lifetime.
    pub fn into_owned(self) -> BufferDescriptor<'static> {
        BufferDescriptor {
            label: self.label.map(|label| Cow::Owned(label.into_owned())),
            buffer_type: self.buffer_type,
            count: self.count,
            stride: self.stride,
        }
    }
}

/// A writable view of a mapped buffer.
///
/// Returned by [`RenderDevice::map_buffer`](crate::renderer::RenderDevice::map_buffer).
/// The guard borrows the device, so the buffer cannot be unmapped (or mapped
/// again) while the region is alive. Writes become visible to the GPU on
/// [`RenderDevice::unmap_buffer`](crate::renderer::RenderDevice::unmap_buffer).
pub struct BufferMapping<'a> {
    region: Box<dyn DerefMut<Target = [u8]> + 'a>,
}

impl<'a> BufferMapping<'a> {
    /// Wraps a backend-provided region.
    pub fn new(region: impl DerefMut<Target = [u8]> + 'a) -> Self {
        Self {
            region: Box::new(region),
        }
    }
}

impl Deref for BufferMapping<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &**self.region
    }
}

impl DerefMut for BufferMapping<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut **self.region
    }
}

impl fmt::Debug for BufferMapping<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferMapping")
            .field("len", &self.region.len())
            .finish()
    }
}
