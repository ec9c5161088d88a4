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

//! OpenGL ES buffer objects.
//!
//! Uploads go through the copy-write binding point on ES 3 so the cached
//! array and element bindings stay untouched. ES 2 has no range mapping, so
//! mapping hands out a host shadow that `unmap` copies into the buffer.

use super::conversions::index_type;
use super::device::Capabilities;
use super::driver::GlDriver;
use super::state::{BufferTarget, SessionState};
use ember_core::renderer::{
    Buffer, BufferDescriptor, BufferError, BufferMapping, BufferObject, BufferType, BufferUsage,
    ResourceError,
};
use ember_core::Resource;
use std::any::Any;
use std::cell::{Cell, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapState {
    Unmapped,
    Native,
    Shadow,
}

/// A native buffer object owned by a [`Buffer`] handle.
pub struct GlesBuffer {
    driver: Rc<dyn GlDriver>,
    raw: u32,
    descriptor: BufferDescriptor<'static>,
    usage: BufferUsage,
    copy_write: bool,
    map_state: Cell<MapState>,
    shadow: RefCell<Vec<u8>>,
}

impl GlesBuffer {
    /// Validates `descriptor`, allocates the native buffer and uploads `data`.
    ///
    /// Buffers created with data are static; without, dynamic and zero-filled.
    pub(super) fn create(
        driver: &Rc<dyn GlDriver>,
        session: &mut SessionState,
        caps: &Capabilities,
        descriptor: &BufferDescriptor<'_>,
        data: Option<&[u8]>,
    ) -> Result<Buffer, ResourceError> {
        let size = validate(caps, descriptor, data)?;
        let raw = driver.create_buffer().map_err(ResourceError::BackendError)?;
        let usage = if data.is_some() {
            BufferUsage::Static
        } else {
            BufferUsage::Dynamic
        };

        let buffer: Buffer = Resource::from_rc(Rc::new(GlesBuffer {
            driver: Rc::clone(driver),
            raw,
            descriptor: descriptor.clone().into_owned(),
            usage,
            copy_write: caps.es3,
            map_state: Cell::new(MapState::Unmapped),
            shadow: RefCell::new(Vec::new()),
        }));
        let gles = GlesBuffer::downcast(&buffer).ok_or(ResourceError::ForeignResource)?;

        let target = gles.bind_for_upload(session, &buffer);
        match data {
            Some(bytes) => driver.buffer_data(target, bytes, glow::STATIC_DRAW),
            None => driver.buffer_storage(target, size, glow::DYNAMIC_DRAW),
        }

        log::debug!(
            "Created {:?} {:?} buffer {} ({} bytes){}",
            usage,
            descriptor.buffer_type,
            raw,
            size,
            descriptor
                .label
                .as_deref()
                .map(|l| format!(" '{l}'"))
                .unwrap_or_default()
        );
        Ok(buffer)
    }

    /// Recovers the concrete buffer behind a handle.
    pub(super) fn downcast(buffer: &Buffer) -> Option<&GlesBuffer> {
        buffer.as_any().downcast_ref()
    }

    /// The native buffer name.
    pub(super) fn raw(&self) -> u32 {
        self.raw
    }

    /// Maps the whole buffer for writing.
    pub(super) fn map<'a>(
        &'a self,
        session: &mut SessionState,
        handle: &Buffer,
    ) -> Result<BufferMapping<'a>, BufferError> {
        if self.usage == BufferUsage::Static {
            return Err(BufferError::MapStatic);
        }
        if self.map_state.get() != MapState::Unmapped {
            return Err(BufferError::AlreadyMapped);
        }

        let size = self.size();
        if self.copy_write {
            let target = self.bind_for_upload(session, handle);
            let access = glow::MAP_WRITE_BIT | glow::MAP_INVALIDATE_BUFFER_BIT;
            let ptr = self
                .driver
                .map_buffer_range(target, 0, size, access)
                .ok_or(BufferError::MapFailed)?;
            self.map_state.set(MapState::Native);
            // SAFETY: the driver returned a writable range of `size` bytes that
            // stays valid until `unmap_buffer`. The mapping borrows the device
            // mutably, so `unmap` cannot run while the slice is alive.
            let region = unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr(), size) };
            Ok(BufferMapping::new(region))
        } else {
            self.map_state.set(MapState::Shadow);
            let mut shadow = self.shadow.borrow_mut();
            shadow.clear();
            shadow.resize(size, 0);
            Ok(BufferMapping::new(RefMut::map(shadow, Vec::as_mut_slice)))
        }
    }

    /// Ends a mapping, publishing the written bytes to the native buffer.
    pub(super) fn unmap(&self, session: &mut SessionState, handle: &Buffer) -> Result<(), BufferError> {
        match self.map_state.get() {
            MapState::Unmapped => Err(BufferError::NotMapped),
            MapState::Native => {
                let target = self.bind_for_upload(session, handle);
                self.driver.unmap_buffer(target);
                self.map_state.set(MapState::Unmapped);
                Ok(())
            }
            MapState::Shadow => {
                let target = self.bind_for_upload(session, handle);
                let shadow = std::mem::take(&mut *self.shadow.borrow_mut());
                self.driver.buffer_sub_data(target, 0, &shadow);
                self.map_state.set(MapState::Unmapped);
                Ok(())
            }
        }
    }

    /// Replaces the whole contents of a dynamic buffer.
    pub(super) fn update(
        &self,
        session: &mut SessionState,
        handle: &Buffer,
        data: &[u8],
    ) -> Result<(), BufferError> {
        if self.usage == BufferUsage::Static {
            return Err(BufferError::UpdateStatic);
        }
        if self.map_state.get() != MapState::Unmapped {
            return Err(BufferError::UpdateWhileMapped);
        }
        if data.len() != self.size() {
            return Err(BufferError::SizeMismatch {
                expected: self.size(),
                actual: data.len(),
            });
        }
        let target = self.bind_for_upload(session, handle);
        self.driver.buffer_sub_data(target, 0, data);
        Ok(())
    }

    fn bind_for_upload(&self, session: &mut SessionState, handle: &Buffer) -> u32 {
        if self.copy_write {
            self.driver
                .bind_buffer(glow::COPY_WRITE_BUFFER, Some(self.raw));
            glow::COPY_WRITE_BUFFER
        } else {
            let target = BufferTarget::for_type(self.descriptor.buffer_type);
            session.bind_buffer(&*self.driver, target, Some(handle));
            target.gl()
        }
    }
}

fn validate(
    caps: &Capabilities,
    descriptor: &BufferDescriptor<'_>,
    data: Option<&[u8]>,
) -> Result<usize, BufferError> {
    let size = descriptor.size().ok_or(BufferError::SizeOverflow)?;
    if size == 0 {
        return Err(BufferError::ZeroSize);
    }
    match descriptor.buffer_type {
        BufferType::Uniform if !caps.es3 => {
            return Err(BufferError::UnsupportedType(BufferType::Uniform));
        }
        BufferType::Index => {
            let stride = descriptor.stride;
            if index_type(stride).is_none() || (stride == 4 && !caps.element_index_uint) {
                return Err(BufferError::UnsupportedIndexStride(stride));
            }
        }
        _ => {}
    }
    if let Some(bytes) = data {
        if bytes.len() != size {
            return Err(BufferError::SizeMismatch {
                expected: size,
                actual: bytes.len(),
            });
        }
    }
    Ok(size)
}

impl BufferObject for GlesBuffer {
    fn descriptor(&self) -> &BufferDescriptor<'static> {
        &self.descriptor
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }

    fn is_mapped(&self) -> bool {
        self.map_state.get() != MapState::Unmapped
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for GlesBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlesBuffer")
            .field("raw", &self.raw)
            .field("descriptor", &self.descriptor)
            .field("usage", &self.usage)
            .field("map_state", &self.map_state.get())
            .finish()
    }
}

impl Drop for GlesBuffer {
    fn drop(&mut self) {
        if self.map_state.get() == MapState::Native {
            self.driver.bind_buffer(glow::COPY_WRITE_BUFFER, Some(self.raw));
            self.driver.unmap_buffer(glow::COPY_WRITE_BUFFER);
        }
        self.driver.delete_buffer(self.raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gles::mock::{Call, RecordingDriver};

    fn setup(driver: RecordingDriver) -> (Rc<RecordingDriver>, Rc<dyn GlDriver>, Capabilities) {
        let recording = Rc::new(driver);
        let dynamic: Rc<dyn GlDriver> = recording.clone();
        let caps = Capabilities::query(&*dynamic);
        (recording, dynamic, caps)
    }

    fn vertex_desc() -> BufferDescriptor<'static> {
        BufferDescriptor::new(BufferType::Vertex, 3, 24)
    }

    fn buffer_error(result: Result<Buffer, ResourceError>) -> BufferError {
        match result {
            Err(ResourceError::Buffer(err)) => err,
            other => panic!("expected a buffer error, got {other:?}"),
        }
    }

    #[test]
    fn test_static_buffer_rejects_map_and_update() {
        let (_, driver, caps) = setup(RecordingDriver::es3());
        let mut session = SessionState::default();
        let data = [7u8; 72];
        let buffer =
            GlesBuffer::create(&driver, &mut session, &caps, &vertex_desc(), Some(&data)).unwrap();
        let gles = GlesBuffer::downcast(&buffer).unwrap();

        assert_eq!(buffer.usage(), BufferUsage::Static);
        assert_eq!(
            gles.map(&mut session, &buffer).err(),
            Some(BufferError::MapStatic)
        );
        assert_eq!(
            gles.update(&mut session, &buffer, &data),
            Err(BufferError::UpdateStatic)
        );
    }

    #[test]
    fn test_double_map_fails_and_unmap_publishes_contents() {
        for driver in [RecordingDriver::es3(), RecordingDriver::es2()] {
            let (recording, dynamic, caps) = setup(driver);
            let mut session = SessionState::default();
            let buffer =
                GlesBuffer::create(&dynamic, &mut session, &caps, &vertex_desc(), None).unwrap();
            let gles = GlesBuffer::downcast(&buffer).unwrap();

            {
                let mut region = gles.map(&mut session, &buffer).unwrap();
                assert_eq!(region.len(), 72);
                for (i, byte) in region.iter_mut().enumerate() {
                    *byte = i as u8;
                }
            }
            assert!(buffer.is_mapped());
            assert_eq!(
                gles.map(&mut session, &buffer).err(),
                Some(BufferError::AlreadyMapped)
            );

            gles.unmap(&mut session, &buffer).unwrap();
            assert!(!buffer.is_mapped());
            let expected: Vec<u8> = (0..72).collect();
            assert_eq!(recording.buffer_contents(gles.raw()), Some(expected));
            assert_eq!(gles.unmap(&mut session, &buffer), Err(BufferError::NotMapped));
        }
    }

    #[test]
    fn test_es3_upload_leaves_session_bindings_untouched() {
        let (recording, dynamic, caps) = setup(RecordingDriver::es3());
        let mut session = SessionState::default();
        let buffer =
            GlesBuffer::create(&dynamic, &mut session, &caps, &vertex_desc(), None).unwrap();

        assert!(session.buffer(BufferTarget::Array).is_none());
        assert_eq!(
            recording.count(|c| matches!(
                c,
                Call::BindBuffer {
                    target: glow::COPY_WRITE_BUFFER,
                    ..
                }
            )),
            1
        );
        drop(buffer);
    }

    #[test]
    fn test_es2_upload_updates_session_cache() {
        let (_, dynamic, caps) = setup(RecordingDriver::es2());
        let mut session = SessionState::default();
        let buffer =
            GlesBuffer::create(&dynamic, &mut session, &caps, &vertex_desc(), None).unwrap();

        assert!(session
            .buffer(BufferTarget::Array)
            .is_some_and(|bound| Resource::ptr_eq(bound, &buffer)));
    }

    #[test]
    fn test_update_replaces_contents() {
        let (recording, dynamic, caps) = setup(RecordingDriver::es3());
        let mut session = SessionState::default();
        let buffer =
            GlesBuffer::create(&dynamic, &mut session, &caps, &vertex_desc(), None).unwrap();
        let gles = GlesBuffer::downcast(&buffer).unwrap();

        assert_eq!(
            gles.update(&mut session, &buffer, &[1; 10]),
            Err(BufferError::SizeMismatch {
                expected: 72,
                actual: 10
            })
        );
        gles.update(&mut session, &buffer, &[9; 72]).unwrap();
        assert_eq!(recording.buffer_contents(gles.raw()), Some(vec![9; 72]));
    }

    #[test]
    fn test_creation_validation() {
        let (_, es3, es3_caps) = setup(RecordingDriver::es3());
        let (_, es2, es2_caps) = setup(RecordingDriver::es2());
        let mut session = SessionState::default();

        let zero = BufferDescriptor::new(BufferType::Vertex, 0, 12);
        assert_eq!(
            buffer_error(GlesBuffer::create(&es3, &mut session, &es3_caps, &zero, None)),
            BufferError::ZeroSize
        );

        let odd_index = BufferDescriptor::new(BufferType::Index, 6, 3);
        assert_eq!(
            buffer_error(GlesBuffer::create(&es3, &mut session, &es3_caps, &odd_index, None)),
            BufferError::UnsupportedIndexStride(3)
        );

        let wide_index = BufferDescriptor::new(BufferType::Index, 6, 4);
        assert!(GlesBuffer::create(&es3, &mut session, &es3_caps, &wide_index, None).is_ok());
        assert_eq!(
            buffer_error(GlesBuffer::create(&es2, &mut session, &es2_caps, &wide_index, None)),
            BufferError::UnsupportedIndexStride(4)
        );

        let uniform = BufferDescriptor::new(BufferType::Uniform, 1, 64);
        assert_eq!(
            buffer_error(GlesBuffer::create(&es2, &mut session, &es2_caps, &uniform, None)),
            BufferError::UnsupportedType(BufferType::Uniform)
        );

        assert_eq!(
            buffer_error(GlesBuffer::create(
                &es3,
                &mut session,
                &es3_caps,
                &vertex_desc(),
                Some(&[0; 8])
            )),
            BufferError::SizeMismatch {
                expected: 72,
                actual: 8
            }
        );
    }

    #[test]
    fn test_drop_releases_native_buffer() {
        let (recording, dynamic, caps) = setup(RecordingDriver::es3());
        let mut session = SessionState::default();
        let buffer =
            GlesBuffer::create(&dynamic, &mut session, &caps, &vertex_desc(), None).unwrap();
        let raw = GlesBuffer::downcast(&buffer).unwrap().raw();
        let shared = buffer.clone();

        drop(buffer);
        assert!(recording.is_live_buffer(raw));
        drop(shared);
        assert!(!recording.is_live_buffer(raw));
        assert_eq!(recording.count(|c| *c == Call::DeleteBuffer(raw)), 1);
    }
}
