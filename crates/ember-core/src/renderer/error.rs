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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Every failure is returned synchronously to the caller; nothing is retried.
//! Backends additionally log each failure through the `log` facade.

use crate::renderer::api::{BufferType, PrimitiveTopology, ShaderStage};
use std::fmt;

/// An error related to compiling, linking or reflecting a shader.
#[derive(Debug)]
pub enum ShaderError {
    /// A stage module was rejected by the driver's compiler.
    CompilationFailed {
        /// A descriptive label for the shader, if available.
        label: String,
        /// The stage that failed to compile.
        stage: ShaderStage,
        /// The driver's diagnostic log.
        log: String,
    },
    /// The driver failed to link the attached modules.
    LinkFailed {
        /// A descriptive label for the shader, if available.
        label: String,
        /// The driver's diagnostic log.
        log: String,
    },
    /// An operation required a stage module that is not attached.
    MissingStage {
        /// A descriptive label for the shader, if available.
        label: String,
        /// The missing stage.
        stage: ShaderStage,
    },
    /// No active uniform with this name exists in the linked shader.
    UnknownUniform {
        /// The requested uniform name.
        name: String,
    },
    /// The driver could not allocate a native shader or program object.
    ObjectCreationFailed(String),
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationFailed { label, stage, log } => {
                write!(f, "Shader compilation failed for '{label}' ({stage:?}): {log}")
            }
            ShaderError::LinkFailed { label, log } => {
                write!(f, "Shader link failed for '{label}': {log}")
            }
            ShaderError::MissingStage { label, stage } => {
                write!(f, "Shader '{label}' has no {stage:?} module attached")
            }
            ShaderError::UnknownUniform { name } => {
                write!(f, "No active uniform named '{name}'")
            }
            ShaderError::ObjectCreationFailed(msg) => {
                write!(f, "Failed to create native shader object: {msg}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation of a render pipeline.
#[derive(Debug)]
pub enum PipelineError {
    /// A layout element names a vertex stage beyond the fixed stage bound.
    StageOutOfRange {
        /// The label of the pipeline being created.
        label: Option<String>,
        /// The offending stage index.
        stage: usize,
        /// The number of stages available.
        max: usize,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::StageOutOfRange { label, stage, max } => {
                write!(
                    f,
                    "Vertex stage {} is out of range (max {}) in pipeline '{}'",
                    stage,
                    max,
                    label.as_deref().unwrap_or("Unknown")
                )
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// Misuse of a buffer's creation parameters or mapping state.
#[derive(Debug, PartialEq, Eq)]
pub enum BufferError {
    /// `count * stride` is zero.
    ZeroSize,
    /// `count * stride` does not fit in memory.
    SizeOverflow,
    /// Initial or update data does not cover the whole buffer.
    SizeMismatch {
        /// The buffer's byte size.
        expected: usize,
        /// The length of the supplied data.
        actual: usize,
    },
    /// The buffer is static and cannot be mapped.
    MapStatic,
    /// The buffer is static and cannot be updated.
    UpdateStatic,
    /// The buffer is already mapped.
    AlreadyMapped,
    /// `unmap` was called on a buffer that is not mapped.
    NotMapped,
    /// The buffer is mapped and cannot be updated until it is unmapped.
    UpdateWhileMapped,
    /// An index buffer stride other than 1, 2 or 4 bytes.
    UnsupportedIndexStride(u32),
    /// The device cannot create buffers of this type.
    UnsupportedType(BufferType),
    /// The driver failed to map the buffer.
    MapFailed,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::ZeroSize => write!(f, "Buffer size must be non-zero"),
            BufferError::SizeOverflow => write!(f, "Buffer size overflows the address space"),
            BufferError::SizeMismatch { expected, actual } => {
                write!(f, "Buffer data is {actual} bytes, expected {expected}")
            }
            BufferError::MapStatic => write!(f, "Cannot map a static buffer"),
            BufferError::UpdateStatic => write!(f, "Cannot update a static buffer"),
            BufferError::AlreadyMapped => write!(f, "Buffer is already mapped"),
            BufferError::NotMapped => write!(f, "Buffer is not mapped"),
            BufferError::UpdateWhileMapped => write!(f, "Cannot update a mapped buffer"),
            BufferError::UnsupportedIndexStride(stride) => {
                write!(f, "Index stride of {stride} bytes is not supported")
            }
            BufferError::UnsupportedType(buffer_type) => {
                write!(f, "{buffer_type:?} buffers are not supported by this device")
            }
            BufferError::MapFailed => write!(f, "The driver failed to map the buffer"),
        }
    }
}

impl std::error::Error for BufferError {}

/// A rejected pending-state assignment. Nothing is changed when it is returned.
#[derive(Debug, PartialEq, Eq)]
pub enum BindingError {
    /// The buffer's type does not match the slot.
    TypeMismatch {
        /// The type the slot accepts.
        expected: BufferType,
        /// The type of the supplied buffer.
        actual: BufferType,
    },
    /// The vertex stage index is beyond the fixed stage bound.
    StageOutOfRange {
        /// The offending stage index.
        stage: usize,
        /// The number of stages available.
        max: usize,
    },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::TypeMismatch { expected, actual } => {
                write!(f, "Expected a {expected:?} buffer, got a {actual:?} buffer")
            }
            BindingError::StageOutOfRange { stage, max } => {
                write!(f, "Vertex stage {stage} is out of range (max {max})")
            }
        }
    }
}

impl std::error::Error for BindingError {}

/// A draw rejected before any native call was issued.
#[derive(Debug, PartialEq, Eq)]
pub enum DrawError {
    /// No render pipeline is pending.
    NoPipeline,
    /// The pipeline's shader lacks a stage module.
    MissingShaderStage(ShaderStage),
    /// A zero count was given for a topology that cannot infer it.
    ZeroCount(PrimitiveTopology),
    /// A zero count was given but there is no buffer to infer it from.
    NothingToInfer,
    /// The count does not fit the driver's signed 32-bit draw count.
    CountOutOfRange(u32),
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawError::NoPipeline => write!(f, "No render pipeline is bound"),
            DrawError::MissingShaderStage(stage) => {
                write!(f, "The pipeline's shader has no {stage:?} module")
            }
            DrawError::ZeroCount(topology) => {
                write!(f, "A zero draw count cannot be inferred for {topology:?}")
            }
            DrawError::NothingToInfer => {
                write!(f, "A zero draw count needs a bound buffer to infer from")
            }
            DrawError::CountOutOfRange(count) => {
                write!(f, "Draw count {count} exceeds the native limit of {}", i32::MAX)
            }
        }
    }
}

impl std::error::Error for DrawError {}

/// Unbalanced or failed frame bracketing.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameError {
    /// `begin` was called while a frame is open.
    AlreadyInFrame,
    /// `end` was called without a matching `begin`.
    NotInFrame,
    /// The native surface failed to present.
    PresentFailed(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::AlreadyInFrame => write!(f, "A frame is already in progress"),
            FrameError::NotInFrame => write!(f, "No frame is in progress"),
            FrameError::PresentFailed(msg) => write!(f, "Failed to present the frame: {msg}"),
        }
    }
}

impl std::error::Error for FrameError {}

/// A failed step while obtaining a native rendering context.
///
/// Negotiation failures are fatal to device creation: no device is returned.
#[derive(Debug)]
pub enum NegotiationError {
    /// The native graphics library could not be loaded.
    LibraryUnavailable(String),
    /// The window exposes a handle type this platform cannot present into.
    UnsupportedWindow(String),
    /// No display connection could be opened.
    DisplayUnavailable,
    /// The display connection failed to initialize.
    InitializeFailed(String),
    /// The rendering API could not be bound.
    BindApiFailed(String),
    /// Native configurations could not be enumerated.
    ConfigQueryFailed(String),
    /// No configuration can present into a window with an acceptable API version.
    NoMatchingConfig,
    /// Context creation failed at every attempted API version.
    ContextCreationFailed {
        /// The last API major version attempted.
        major: u32,
        /// The native error.
        reason: String,
    },
    /// The window surface could not be created.
    SurfaceCreationFailed(String),
    /// The context could not be made current.
    MakeCurrentFailed(String),
}

impl fmt::Display for NegotiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationError::LibraryUnavailable(msg) => {
                write!(f, "Native graphics library unavailable: {msg}")
            }
            NegotiationError::UnsupportedWindow(msg) => {
                write!(f, "Unsupported window handle: {msg}")
            }
            NegotiationError::DisplayUnavailable => write!(f, "No native display available"),
            NegotiationError::InitializeFailed(msg) => {
                write!(f, "Failed to initialize the display: {msg}")
            }
            NegotiationError::BindApiFailed(msg) => {
                write!(f, "Failed to bind the rendering API: {msg}")
            }
            NegotiationError::ConfigQueryFailed(msg) => {
                write!(f, "Failed to enumerate configurations: {msg}")
            }
            NegotiationError::NoMatchingConfig => {
                write!(f, "No configuration matches the requested capabilities")
            }
            NegotiationError::ContextCreationFailed { major, reason } => {
                write!(f, "Failed to create an API {major}.x context: {reason}")
            }
            NegotiationError::SurfaceCreationFailed(msg) => {
                write!(f, "Failed to create the window surface: {msg}")
            }
            NegotiationError::MakeCurrentFailed(msg) => {
                write!(f, "Failed to make the context current: {msg}")
            }
        }
    }
}

impl std::error::Error for NegotiationError {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A pipeline-specific error occurred.
    Pipeline(PipelineError),
    /// A buffer-specific error occurred.
    Buffer(BufferError),
    /// The resource was created by a different backend.
    ForeignResource,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::Pipeline(err) => write!(f, "Pipeline resource error: {err}"),
            ResourceError::Buffer(err) => write!(f, "Buffer resource error: {err}"),
            ResourceError::ForeignResource => {
                write!(f, "Resource belongs to a different backend")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            ResourceError::Pipeline(err) => Some(err),
            ResourceError::Buffer(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

impl From<PipelineError> for ResourceError {
    fn from(err: PipelineError) -> Self {
        ResourceError::Pipeline(err)
    }
}

impl From<BufferError> for ResourceError {
    fn from(err: BufferError) -> Self {
        ResourceError::Buffer(err)
    }
}

/// A high-level error that can occur within a render device.
#[derive(Debug)]
pub enum RenderError {
    /// No native context could be negotiated.
    Negotiation(NegotiationError),
    /// None of the preferred backends produced a device.
    NoBackendAvailable,
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// A draw precondition failed.
    Draw(DrawError),
    /// A frame was bracketed incorrectly or failed to present.
    Frame(FrameError),
    /// An unexpected or internal error occurred.
    Internal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Negotiation(err) => write!(f, "Device negotiation failed: {err}"),
            RenderError::NoBackendAvailable => {
                write!(f, "No graphics backend could be initialized")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::Draw(err) => write!(f, "Draw rejected: {err}"),
            RenderError::Frame(err) => write!(f, "Frame error: {err}"),
            RenderError::Internal(msg) => {
                write!(f, "An internal or unexpected error occurred: {msg}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Negotiation(err) => Some(err),
            RenderError::ResourceError(err) => Some(err),
            RenderError::Draw(err) => Some(err),
            RenderError::Frame(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NegotiationError> for RenderError {
    fn from(err: NegotiationError) -> Self {
        RenderError::Negotiation(err)
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        RenderError::ResourceError(err.into())
    }
}

impl From<DrawError> for RenderError {
    fn from(err: DrawError) -> Self {
        RenderError::Draw(err)
    }
}

impl From<FrameError> for RenderError {
    fn from(err: FrameError) -> Self {
        RenderError::Frame(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn shader_error_display() {
        let err = ShaderError::CompilationFailed {
            label: "sprite".to_string(),
            stage: ShaderStage::Fragment,
            log: "0:3: syntax error".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Shader compilation failed for 'sprite' (Fragment): 0:3: syntax error"
        );
    }

    #[test]
    fn buffer_error_display() {
        let err = BufferError::SizeMismatch {
            expected: 72,
            actual: 64,
        };
        assert_eq!(format!("{err}"), "Buffer data is 64 bytes, expected 72");
    }

    #[test]
    fn resource_error_wraps_buffer_error() {
        let res_err: ResourceError = BufferError::MapStatic.into();
        assert_eq!(
            format!("{res_err}"),
            "Buffer resource error: Cannot map a static buffer"
        );
        assert!(res_err.source().is_some());
    }

    #[test]
    fn render_error_chains_to_shader_error() {
        let render_err: RenderError = ShaderError::LinkFailed {
            label: "mesh".to_string(),
            log: "missing main".to_string(),
        }
        .into();
        assert_eq!(
            format!("{render_err}"),
            "Graphics resource operation failed: Shader resource error: Shader link failed for 'mesh': missing main"
        );
        assert!(render_err.source().unwrap().source().is_some());
    }

    #[test]
    fn negotiation_error_display() {
        let err = NegotiationError::ContextCreationFailed {
            major: 2,
            reason: "EGL_BAD_MATCH".to_string(),
        };
        let render_err: RenderError = err.into();
        assert_eq!(
            format!("{render_err}"),
            "Device negotiation failed: Failed to create an API 2.x context: EGL_BAD_MATCH"
        );
    }
}
