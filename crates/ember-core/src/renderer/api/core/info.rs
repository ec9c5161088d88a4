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

//! Read-only information reported by a device after successful negotiation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumerates the graphics API backends ember can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GraphicsBackendType {
    /// OpenGL ES through a native context (EGL on Linux and Android).
    OpenGlEs,
    /// An unknown or unsupported backend.
    #[default]
    Unknown,
}

impl GraphicsBackendType {
    /// Parses a backend name as written in configuration files.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "gles" | "opengles" | "opengl_es" | "egl" => GraphicsBackendType::OpenGlEs,
            _ => GraphicsBackendType::Unknown,
        }
    }
}

/// A `major.minor` version pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ApiVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl ApiVersion {
    /// Creates a version pair.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The bit depths of a framebuffer configuration.
///
/// Used both for what the application requests and for what negotiation
/// actually resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelFormat {
    /// Red channel bits.
    pub red: u8,
    /// Green channel bits.
    pub green: u8,
    /// Blue channel bits.
    pub blue: u8,
    /// Alpha channel bits.
    pub alpha: u8,
    /// Depth buffer bits.
    pub depth: u8,
    /// Stencil buffer bits.
    pub stencil: u8,
    /// Multisample count, 0 when multisampling is off.
    pub samples: u8,
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R{}G{}B{}A{} D{}S{} x{}",
            self.red, self.green, self.blue, self.alpha, self.depth, self.stencil, self.samples
        )
    }
}

/// Standardized, backend-agnostic information about an initialized device.
#[derive(Debug, Clone, Default)]
pub struct DeviceInfo {
    /// The backend driving this device.
    pub backend_type: GraphicsBackendType,
    /// The renderer string reported by the driver.
    pub renderer: String,
    /// The vendor string reported by the driver.
    pub vendor: String,
    /// The full version string reported by the driver.
    pub version: String,
    /// The API version of the context.
    pub api_version: ApiVersion,
    /// The shading language version.
    pub shading_language_version: ApiVersion,
    /// Number of vertex attribute slots.
    pub max_vertex_attributes: u32,
    /// Largest texture dimension in texels.
    pub max_texture_size: u32,
    /// Number of combined texture image units.
    pub max_texture_units: u32,
    /// Number of simultaneous color render targets.
    pub max_render_targets: u32,
    /// The framebuffer format negotiation resolved to.
    pub pixel_format: PixelFormat,
}
