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

//! Typed key-value property lookup.
//!
//! Backends read their startup configuration through [`PropertySource`] so the
//! origin of the values (a JSON file, command-line overrides, an editor panel)
//! stays outside the renderer.

use anyhow::Context;
use serde_json::Value;
use std::path::Path;

/// A read-only source of typed configuration values.
///
/// Every lookup returns `None` when the key is absent or holds a value of the
/// wrong type; callers supply their own defaults.
pub trait PropertySource {
    /// Reads an integer property.
    fn get_int(&self, key: &str) -> Option<i64>;
    /// Reads a boolean property.
    fn get_bool(&self, key: &str) -> Option<bool>;
    /// Reads a string property.
    fn get_str(&self, key: &str) -> Option<String>;
    /// Reads a floating-point property. Integers are widened.
    fn get_float(&self, key: &str) -> Option<f64>;

    /// Reads an integer property, falling back to `default` and clamping the
    /// result into `min..=max`.
    fn get_int_clamped(&self, key: &str, default: i64, min: i64, max: i64) -> i64 {
        let value = self.get_int(key).unwrap_or(default);
        let clamped = value.clamp(min, max);
        if clamped != value {
            log::warn!("Property '{key}' = {value} is out of range, clamped to {clamped}");
        }
        clamped
    }
}

/// A [`PropertySource`] backed by a JSON document.
///
/// Keys are dot-separated paths into nested objects: `"display.depth_bits"`
/// reads `{"display": {"depth_bits": 24}}`.
#[derive(Debug, Clone, Default)]
pub struct JsonProperties {
    root: Value,
}

impl JsonProperties {
    /// Wraps an already parsed JSON value.
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parses a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Loads and parses a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        Self::from_json(&content).with_context(|| format!("invalid JSON in '{}'", path.display()))
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.root, |node, segment| node.get(segment))
    }
}

impl PropertySource for JsonProperties {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.lookup(key)?.as_i64()
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.lookup(key)?.as_bool()
    }

    fn get_str(&self, key: &str) -> Option<String> {
        self.lookup(key)?.as_str().map(str::to_owned)
    }

    fn get_float(&self, key: &str) -> Option<f64> {
        self.lookup(key)?.as_f64()
    }
}
