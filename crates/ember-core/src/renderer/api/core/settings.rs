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

//! Startup settings for a render device.

use super::info::{GraphicsBackendType, PixelFormat};
use crate::config::PropertySource;
use serde::{Deserialize, Serialize};

/// What the application asks of a device before it is created.
///
/// Negotiation treats the bit depths as preferences: the closest available
/// configuration is selected, not an exact match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Requested framebuffer bit depths and sample count.
    pub pixel_format: PixelFormat,
    /// Whether presentation waits for vertical sync.
    pub vsync: bool,
    /// The lowest acceptable API major version.
    pub min_api_major: u8,
    /// Backends to try, in order of preference.
    pub preferred_backends: Vec<GraphicsBackendType>,
    /// The color `begin(true)` clears to.
    pub clear_color: [f32; 4],
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat {
                red: 8,
                green: 8,
                blue: 8,
                alpha: 8,
                depth: 24,
                stencil: 8,
                samples: 0,
            },
            vsync: true,
            min_api_major: 2,
            preferred_backends: vec![GraphicsBackendType::OpenGlEs],
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl DeviceSettings {
    /// Reads settings from a property source, keeping defaults for absent keys
    /// and clamping out-of-range values.
    ///
    /// Recognized keys: `render.red_bits`, `render.green_bits`, `render.blue_bits`,
    /// `render.alpha_bits`, `render.depth_bits`, `render.stencil_bits`,
    /// `render.samples`, `render.vsync`, `render.min_api_major`, `render.backend`.
    pub fn from_properties(props: &dyn PropertySource) -> Self {
        let defaults = Self::default();
        let bits = |key: &str, default: u8, max: i64| -> u8 {
            props.get_int_clamped(key, i64::from(default), 0, max) as u8
        };

        let pixel_format = PixelFormat {
            red: bits("render.red_bits", defaults.pixel_format.red, 16),
            green: bits("render.green_bits", defaults.pixel_format.green, 16),
            blue: bits("render.blue_bits", defaults.pixel_format.blue, 16),
            alpha: bits("render.alpha_bits", defaults.pixel_format.alpha, 16),
            depth: bits("render.depth_bits", defaults.pixel_format.depth, 32),
            stencil: bits("render.stencil_bits", defaults.pixel_format.stencil, 8),
            samples: bits("render.samples", defaults.pixel_format.samples, 16),
        };

        let preferred_backends = props
            .get_str("render.backend")
            .map(|name| vec![GraphicsBackendType::from_name(&name)])
            .unwrap_or(defaults.preferred_backends);

        Self {
            pixel_format,
            vsync: props.get_bool("render.vsync").unwrap_or(defaults.vsync),
            min_api_major: props.get_int_clamped(
                "render.min_api_major",
                i64::from(defaults.min_api_major),
                2,
                3,
            ) as u8,
            preferred_backends,
            clear_color: defaults.clear_color,
        }
    }

    /// Deserializes settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
