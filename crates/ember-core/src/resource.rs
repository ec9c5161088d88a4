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

//! Shared ownership of graphics resources.
//!
//! Every buffer, shader and render pipeline handed out by a
//! [`RenderDevice`](crate::renderer::RenderDevice) is a [`Resource`]: a cheap,
//! clonable, reference-counted handle to a backend-owned object.
//!
//! The lifecycle maps directly onto Rust ownership:
//! - construction happens inside the device's `create_*` methods, which return
//!   the first handle (reference count 1);
//! - cloning a handle shares the object (load);
//! - dropping a handle releases it (unload);
//! - when the last handle is dropped the backend object's `Drop` implementation
//!   releases the native handle. It runs exactly once.
//!
//! Resources are deliberately `!Send` and `!Sync`: they are tied to the thread
//! that owns the graphics context.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// A stable identity for a live resource, derived from its allocation.
///
/// Two handles have the same `ResourceId` if and only if they point to the
/// same object. An id may be reused once every handle to the object is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub usize);

/// A reference-counted handle to a backend-owned graphics object.
pub struct Resource<T: ?Sized>(Rc<T>);

impl<T> Resource<T> {
    /// Wraps a freshly constructed object. The returned handle is its only owner.
    pub fn new(object: T) -> Self {
        Self(Rc::new(object))
    }
}

impl<T: ?Sized> Resource<T> {
    /// Wraps an existing shared allocation, typically an `Rc<Concrete>` coerced
    /// to `Rc<dyn Trait>`.
    pub fn from_rc(inner: Rc<T>) -> Self {
        Self(inner)
    }

    /// Number of live handles to this object.
    pub fn ref_count(this: &Self) -> usize {
        Rc::strong_count(&this.0)
    }

    /// `true` if both handles point to the same object.
    ///
    /// Only the data address is compared, so two handles to the same object seen
    /// through different trait-object metadata still compare equal.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&a.0), Rc::as_ptr(&b.0))
    }

    /// The identity of the object behind this handle.
    pub fn id(this: &Self) -> ResourceId {
        ResourceId(Rc::as_ptr(&this.0) as *const () as usize)
    }
}

/// Compares two optional handles by identity.
pub fn same_resource<T: ?Sized>(a: Option<&Resource<T>>, b: Option<&Resource<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Resource::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl<T: ?Sized> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Resource<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &Resource::id(self))
            .field("refs", &Resource::ref_count(self))
            .field("object", &&*self.0)
            .finish()
    }
}
