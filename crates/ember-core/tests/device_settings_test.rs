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


use ember_core::config::JsonProperties;
use ember_core::renderer::{DeviceSettings, GraphicsBackendType};

#[test]
fn test_properties_override_defaults() {
    let props = JsonProperties::from_json(
        r#"{
            "render": {
                "depth_bits": 16,
                "stencil_bits": 0,
                "samples": 4,
                "vsync": false,
                "min_api_major": 3,
                "backend": "gles"
            }
        }"#,
    )
    .unwrap();

    let settings = DeviceSettings::from_properties(&props);
    assert_eq!(settings.pixel_format.depth, 16);
    assert_eq!(settings.pixel_format.stencil, 0);
    assert_eq!(settings.pixel_format.samples, 4);
    assert_eq!(settings.pixel_format.red, 8, "absent keys keep their default");
    assert!(!settings.vsync);
    assert_eq!(settings.min_api_major, 3);
    assert_eq!(settings.preferred_backends, vec![GraphicsBackendType::OpenGlEs]);
}

#[test]
fn test_out_of_range_properties_are_clamped() {
    let props = JsonProperties::from_json(
        r#"{ "render": { "stencil_bits": 24, "min_api_major": 7, "red_bits": -3 } }"#,
    )
    .unwrap();

    let settings = DeviceSettings::from_properties(&props);
    assert_eq!(settings.pixel_format.stencil, 8);
    assert_eq!(settings.min_api_major, 3);
    assert_eq!(settings.pixel_format.red, 0);
}

#[test]
fn test_unknown_backend_name() {
    let props = JsonProperties::from_json(r#"{ "render": { "backend": "vulkan" } }"#).unwrap();
    let settings = DeviceSettings::from_properties(&props);
    assert_eq!(settings.preferred_backends, vec![GraphicsBackendType::Unknown]);
}

#[test]
fn test_settings_deserialize_with_defaults() {
    let settings = DeviceSettings::from_json(r#"{ "vsync": false }"#).unwrap();
    assert!(!settings.vsync);
    assert_eq!(settings.min_api_major, DeviceSettings::default().min_api_major);
    assert_eq!(settings.pixel_format, DeviceSettings::default().pixel_format);
}
