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

//! Obtains a current OpenGL ES context for a window.
//!
//! [`negotiate`] runs the same steps against any [`GlPlatform`]: open and
//! initialize the display, pick the best configuration, create a context at
//! the highest acceptable API major (retrying once one major lower), create
//! the window surface, make the context current, and only then show the window.
//!
//! Every acquired handle lives in a [`NegotiatedContext`] from the moment it
//! is created, so an early return releases what was acquired so far.

pub mod config;
#[cfg(feature = "egl")]
pub mod egl;

use self::config::{select_config, ConfigCandidate, RenderableApi};
use super::glow_driver::Presenter;
use ember_core::platform::EmberWindow;
use ember_core::renderer::{ApiVersion, DeviceSettings, NegotiationError, PixelFormat};
use std::ffi::c_void;

/// The native steps of context negotiation.
///
/// Implementations wrap one windowing-system API (EGL, ...). Handles are
/// plain copyable values; ownership is tracked by [`NegotiatedContext`].
pub trait GlPlatform {
    /// A connection to the display server.
    type Display: Copy;
    /// A framebuffer configuration.
    type Config: Copy;
    /// A rendering context.
    type Context: Copy;
    /// A window surface.
    type Surface: Copy;

    /// Opens the display `window` lives on.
    fn open_display(&self, window: &dyn EmberWindow) -> Result<Self::Display, NegotiationError>;
    /// Initializes the display, returning the platform API version.
    fn initialize(&self, display: Self::Display) -> Result<ApiVersion, NegotiationError>;
    /// Selects OpenGL ES as the client API.
    fn bind_api(&self, display: Self::Display) -> Result<(), NegotiationError>;
    /// Enumerates every configuration of the display.
    fn configs(
        &self,
        display: Self::Display,
    ) -> Result<Vec<(Self::Config, ConfigCandidate)>, NegotiationError>;
    /// Creates a context for API major version `major`.
    fn create_context(
        &self,
        display: Self::Display,
        config: Self::Config,
        major: u32,
    ) -> Result<Self::Context, NegotiationError>;
    /// Creates a surface rendering into `window`.
    fn create_surface(
        &self,
        display: Self::Display,
        config: Self::Config,
        window: &dyn EmberWindow,
    ) -> Result<Self::Surface, NegotiationError>;
    /// Makes `target` current on this thread, or releases the current context.
    fn make_current(
        &self,
        display: Self::Display,
        target: Option<(Self::Surface, Self::Context)>,
    ) -> Result<(), NegotiationError>;
    /// Sets the number of vblanks per swap.
    fn swap_interval(&self, display: Self::Display, interval: i32) -> Result<(), String>;
    /// Presents the back buffer of `surface`.
    fn swap_buffers(&self, display: Self::Display, surface: Self::Surface) -> Result<(), String>;
    /// Releases a context.
    fn destroy_context(&self, display: Self::Display, context: Self::Context);
    /// Releases a surface.
    fn destroy_surface(&self, display: Self::Display, surface: Self::Surface);
    /// Releases the display connection.
    fn terminate(&self, display: Self::Display);
    /// Resolves a client API entry point, null when absent.
    fn get_proc_address(&self, name: &str) -> *const c_void;
}

/// A negotiated display, context and surface.
///
/// Dropping it releases the context, then the surface, then the display.
pub struct NegotiatedContext<P: GlPlatform> {
    platform: P,
    display: P::Display,
    initialized: bool,
    context: Option<P::Context>,
    surface: Option<P::Surface>,
    current: bool,
    pixel_format: PixelFormat,
    api_version: ApiVersion,
}

impl<P: GlPlatform> NegotiatedContext<P> {
    /// The pixel format of the chosen configuration.
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// The API version the context was created for.
    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Resolves a client API entry point for the context.
    pub fn get_proc_address(&self, name: &str) -> *const c_void {
        self.platform.get_proc_address(name)
    }
}

impl<P: GlPlatform> Presenter for NegotiatedContext<P> {
    fn swap_buffers(&self) -> Result<(), String> {
        match self.surface {
            Some(surface) => self.platform.swap_buffers(self.display, surface),
            None => Err("no window surface".to_string()),
        }
    }
}

impl<P: GlPlatform> Drop for NegotiatedContext<P> {
    fn drop(&mut self) {
        if self.current {
            if let Err(err) = self.platform.make_current(self.display, None) {
                log::warn!("Failed to release the current context: {err}");
            }
        }
        if let Some(context) = self.context.take() {
            self.platform.destroy_context(self.display, context);
        }
        if let Some(surface) = self.surface.take() {
            self.platform.destroy_surface(self.display, surface);
        }
        if self.initialized {
            self.platform.terminate(self.display);
        }
        log::debug!("Released native context");
    }
}

/// Negotiates a current context for `window`.
pub fn negotiate<P: GlPlatform>(
    platform: P,
    window: &dyn EmberWindow,
    settings: &DeviceSettings,
) -> Result<NegotiatedContext<P>, NegotiationError> {
    let display = platform.open_display(window)?;
    let mut ctx = NegotiatedContext {
        platform,
        display,
        initialized: false,
        context: None,
        surface: None,
        current: false,
        pixel_format: PixelFormat::default(),
        api_version: ApiVersion::default(),
    };

    let platform_version = ctx.platform.initialize(display)?;
    ctx.initialized = true;
    log::debug!("Display initialized, platform API {platform_version}");
    ctx.platform.bind_api(display)?;

    let min_major = u32::from(settings.min_api_major);
    let configs = ctx.platform.configs(display)?;
    let (index, score) = select_config(
        &settings.pixel_format,
        RenderableApi::at_least(min_major),
        configs.iter().map(|(_, candidate)| candidate),
    )
    .ok_or(NegotiationError::NoMatchingConfig)?;
    let (config, candidate) = configs[index];
    log::debug!(
        "Selected config {} of {} ({}), score {:?}",
        index,
        configs.len(),
        candidate.pixel_format(),
        score
    );

    let (context, major) = create_context(&ctx.platform, display, config, &candidate, min_major)?;
    ctx.context = Some(context);
    ctx.api_version = ApiVersion::new(major, 0);
    ctx.pixel_format = candidate.pixel_format();

    let surface = ctx.platform.create_surface(display, config, window)?;
    ctx.surface = Some(surface);

    ctx.platform.make_current(display, Some((surface, context)))?;
    ctx.current = true;
    window.show();

    let interval = i32::from(settings.vsync);
    if let Err(err) = ctx.platform.swap_interval(display, interval) {
        log::warn!("Could not set swap interval {interval}: {err}");
    }

    log::info!(
        "Negotiated OpenGL ES {} context ({})",
        ctx.api_version,
        ctx.pixel_format
    );
    Ok(ctx)
}

/// Tries the highest acceptable major, then once the next lower one.
fn create_context<P: GlPlatform>(
    platform: &P,
    display: P::Display,
    config: P::Config,
    candidate: &ConfigCandidate,
    min_major: u32,
) -> Result<(P::Context, u32), NegotiationError> {
    let majors = candidate.renderable.majors(min_major);
    let mut last_error = NegotiationError::NoMatchingConfig;
    for &major in majors.iter().take(2) {
        match platform.create_context(display, config, major) {
            Ok(context) => return Ok((context, major)),
            Err(err) => {
                log::warn!("Failed to create an OpenGL ES {major} context: {err}");
                last_error = err;
            }
        }
    }
    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::config::tests::candidate;
    use super::*;
    use raw_window_handle::{
        DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, WindowHandle,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct MockWindow {
        log: Log,
    }

    impl HasWindowHandle for MockWindow {
        fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
            Err(HandleError::Unavailable)
        }
    }

    impl HasDisplayHandle for MockWindow {
        fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
            Err(HandleError::Unavailable)
        }
    }

    impl EmberWindow for MockWindow {
        fn inner_size(&self) -> (u32, u32) {
            (320, 240)
        }

        fn show(&self) {
            self.log.borrow_mut().push("show".into());
        }
    }

    #[derive(Default)]
    struct MockPlatform {
        log: Log,
        configs: Vec<ConfigCandidate>,
        failing_majors: Vec<u32>,
        fail_surface: bool,
        fail_make_current: bool,
    }

    impl MockPlatform {
        fn push(&self, entry: impl Into<String>) {
            self.log.borrow_mut().push(entry.into());
        }
    }

    impl GlPlatform for MockPlatform {
        type Display = u32;
        type Config = usize;
        type Context = u32;
        type Surface = u32;

        fn open_display(&self, _: &dyn EmberWindow) -> Result<u32, NegotiationError> {
            self.push("open_display");
            Ok(1)
        }

        fn initialize(&self, _: u32) -> Result<ApiVersion, NegotiationError> {
            self.push("initialize");
            Ok(ApiVersion::new(1, 5))
        }

        fn bind_api(&self, _: u32) -> Result<(), NegotiationError> {
            self.push("bind_api");
            Ok(())
        }

        fn configs(&self, _: u32) -> Result<Vec<(usize, ConfigCandidate)>, NegotiationError> {
            Ok(self.configs.iter().copied().enumerate().collect())
        }

        fn create_context(&self, _: u32, _: usize, major: u32) -> Result<u32, NegotiationError> {
            self.push(format!("create_context {major}"));
            if self.failing_majors.contains(&major) {
                Err(NegotiationError::ContextCreationFailed {
                    major,
                    reason: "unsupported".into(),
                })
            } else {
                Ok(10 + major)
            }
        }

        fn create_surface(
            &self,
            _: u32,
            _: usize,
            _: &dyn EmberWindow,
        ) -> Result<u32, NegotiationError> {
            self.push("create_surface");
            if self.fail_surface {
                Err(NegotiationError::SurfaceCreationFailed("bad window".into()))
            } else {
                Ok(20)
            }
        }

        fn make_current(
            &self,
            _: u32,
            target: Option<(u32, u32)>,
        ) -> Result<(), NegotiationError> {
            self.push(match target {
                Some(_) => "make_current",
                None => "release_current",
            });
            if target.is_some() && self.fail_make_current {
                return Err(NegotiationError::MakeCurrentFailed("context lost".into()));
            }
            Ok(())
        }

        fn swap_interval(&self, _: u32, interval: i32) -> Result<(), String> {
            self.push(format!("swap_interval {interval}"));
            Ok(())
        }

        fn swap_buffers(&self, _: u32, _: u32) -> Result<(), String> {
            self.push("swap_buffers");
            Ok(())
        }

        fn destroy_context(&self, _: u32, context: u32) {
            self.push(format!("destroy_context {context}"));
        }

        fn destroy_surface(&self, _: u32, _: u32) {
            self.push("destroy_surface");
        }

        fn terminate(&self, _: u32) {
            self.push("terminate");
        }

        fn get_proc_address(&self, _: &str) -> *const c_void {
            std::ptr::null()
        }
    }

    fn fixture() -> (Log, MockWindow, MockPlatform) {
        let log = Log::default();
        let window = MockWindow { log: log.clone() };
        let platform = MockPlatform {
            log: log.clone(),
            configs: vec![candidate(8, 8, 24, 8)],
            ..Default::default()
        };
        (log, window, platform)
    }

    fn entries(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[test]
    fn test_successful_negotiation_order() {
        let (log, window, platform) = fixture();
        let ctx = negotiate(platform, &window, &DeviceSettings::default()).unwrap();

        assert_eq!(ctx.api_version(), ApiVersion::new(3, 0));
        assert_eq!(ctx.pixel_format().depth, 24);
        assert_eq!(
            entries(&log),
            [
                "open_display",
                "initialize",
                "bind_api",
                "create_context 3",
                "create_surface",
                "make_current",
                "show",
                "swap_interval 1",
            ]
        );

        log.borrow_mut().clear();
        ctx.swap_buffers().unwrap();
        drop(ctx);
        assert_eq!(
            entries(&log),
            [
                "swap_buffers",
                "release_current",
                "destroy_context 13",
                "destroy_surface",
                "terminate",
            ]
        );
    }

    #[test]
    fn test_falls_back_one_major() {
        let (log, window, mut platform) = fixture();
        platform.failing_majors = vec![3];
        let ctx = negotiate(platform, &window, &DeviceSettings::default()).unwrap();

        assert_eq!(ctx.api_version(), ApiVersion::new(2, 0));
        let attempts: Vec<String> = entries(&log)
            .into_iter()
            .filter(|e| e.starts_with("create_context"))
            .collect();
        assert_eq!(attempts, ["create_context 3", "create_context 2"]);
    }

    #[test]
    fn test_no_fallback_below_minimum() {
        let (_, window, mut platform) = fixture();
        platform.failing_majors = vec![3];
        let settings = DeviceSettings {
            min_api_major: 3,
            ..Default::default()
        };

        let err = negotiate(platform, &window, &settings).err().unwrap();
        assert!(matches!(
            err,
            NegotiationError::ContextCreationFailed { major: 3, .. }
        ));
    }

    #[test]
    fn test_surface_failure_releases_in_order_and_never_shows() {
        let (log, window, mut platform) = fixture();
        platform.fail_surface = true;

        let err = negotiate(platform, &window, &DeviceSettings::default()).err().unwrap();
        assert!(matches!(err, NegotiationError::SurfaceCreationFailed(_)));
        let log = entries(&log);
        assert!(!log.iter().any(|e| e == "show"));
        assert_eq!(
            &log[log.len() - 2..],
            ["destroy_context 13".to_string(), "terminate".to_string()]
        );
    }

    #[test]
    fn test_make_current_failure_releases_everything_and_never_shows() {
        let (log, window, mut platform) = fixture();
        platform.fail_make_current = true;

        let err = negotiate(platform, &window, &DeviceSettings::default()).err().unwrap();
        assert!(matches!(err, NegotiationError::MakeCurrentFailed(_)));
        let log = entries(&log);
        assert!(!log.iter().any(|e| e == "show"));
        assert!(!log.iter().any(|e| e == "release_current"));
        assert_eq!(
            &log[log.len() - 4..],
            [
                "make_current".to_string(),
                "destroy_context 13".to_string(),
                "destroy_surface".to_string(),
                "terminate".to_string(),
            ]
        );
    }

    #[test]
    fn test_no_usable_config() {
        let (log, window, mut platform) = fixture();
        platform.configs[0].window_capable = false;

        let err = negotiate(platform, &window, &DeviceSettings::default()).err().unwrap();
        assert!(matches!(err, NegotiationError::NoMatchingConfig));
        assert_eq!(entries(&log).last().map(String::as_str), Some("terminate"));
    }
}
