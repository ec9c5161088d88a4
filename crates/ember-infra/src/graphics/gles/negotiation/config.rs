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

//! Framebuffer configuration scoring.

use ember_core::ember_bitflags;
use ember_core::renderer::PixelFormat;

ember_bitflags! {
    /// Client APIs a configuration can render with. Bit values match EGL's.
    pub struct RenderableApi: u32 {
        /// OpenGL ES 2.x.
        const ES2 = 0x0004;
        /// OpenGL ES 3.x.
        const ES3 = 0x0040;
    }
}

impl RenderableApi {
    /// The API bit of a major version, empty for unsupported majors.
    pub fn for_major(major: u32) -> Self {
        match major {
            2 => RenderableApi::ES2,
            3 => RenderableApi::ES3,
            _ => RenderableApi::EMPTY,
        }
    }

    /// Every API bit at or above `min_major`.
    pub fn at_least(min_major: u32) -> Self {
        let mut apis = RenderableApi::EMPTY;
        for major in min_major..=3 {
            apis.insert(Self::for_major(major));
        }
        apis
    }

    /// Supported majors at or above `min_major`, highest first.
    pub fn majors(self, min_major: u32) -> Vec<u32> {
        (min_major..=3)
            .rev()
            .filter(|major| {
                let api = Self::for_major(*major);
                !api.is_empty() && self.contains(api)
            })
            .collect()
    }
}

/// The attributes of one native configuration that scoring looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigCandidate {
    /// Red bits.
    pub red: u8,
    /// Green bits.
    pub green: u8,
    /// Blue bits.
    pub blue: u8,
    /// Alpha bits.
    pub alpha: u8,
    /// Depth bits.
    pub depth: u8,
    /// Stencil bits.
    pub stencil: u8,
    /// Multisample count.
    pub samples: u8,
    /// Whether the configuration can back a window surface.
    pub window_capable: bool,
    /// Client APIs the configuration supports.
    pub renderable: RenderableApi,
}

impl ConfigCandidate {
    /// The resolved pixel format of this configuration.
    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha: self.alpha,
            depth: self.depth,
            stencil: self.stencil,
            samples: self.samples,
        }
    }
}

/// Ordered by missing features, then color distance, then extra distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConfigScore {
    /// Requested capabilities the candidate lacks entirely.
    pub missing: u32,
    /// Squared RGB bit-depth distance.
    pub color_distance: u32,
    /// Squared alpha, depth, stencil and sample distance.
    pub extra_distance: u32,
}

impl ConfigScore {
    /// Scores `candidate` against `requested`.
    pub fn of(requested: &PixelFormat, candidate: &ConfigCandidate) -> Self {
        let lacks = |wanted: u8, has: u8| u32::from(wanted > 0 && has == 0);
        let squared = |wanted: u8, has: u8| {
            let d = i32::from(wanted) - i32::from(has);
            (d * d) as u32
        };

        Self {
            missing: lacks(requested.alpha, candidate.alpha)
                + lacks(requested.depth, candidate.depth)
                + lacks(requested.stencil, candidate.stencil)
                + lacks(requested.samples, candidate.samples),
            color_distance: squared(requested.red, candidate.red)
                + squared(requested.green, candidate.green)
                + squared(requested.blue, candidate.blue),
            extra_distance: squared(requested.alpha, candidate.alpha)
                + squared(requested.depth, candidate.depth)
                + squared(requested.stencil, candidate.stencil)
                + squared(requested.samples, candidate.samples),
        }
    }
}

/// Picks the index of the best candidate in one pass.
///
/// Candidates that cannot back a window or render any of `acceptable` are
/// skipped. On equal scores the first one seen wins.
pub fn select_config<'a>(
    requested: &PixelFormat,
    acceptable: RenderableApi,
    candidates: impl IntoIterator<Item = &'a ConfigCandidate>,
) -> Option<(usize, ConfigScore)> {
    let mut best: Option<(usize, ConfigScore)> = None;
    for (index, candidate) in candidates.into_iter().enumerate() {
        if !candidate.window_capable || !candidate.renderable.intersects(acceptable) {
            continue;
        }
        let score = ConfigScore::of(requested, candidate);
        if best.map_or(true, |(_, current)| score < current) {
            best = Some((index, score));
        }
    }
    best
}
