//! Viewport size tracking and responsive breakpoints.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::settings::SettingsError;
use crate::util::Debouncer;

/// Delay between the last resize event of a burst and the viewport update.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);

/// Width thresholds, in CSS pixels, separating device classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    pub mobile_max: u32,
    pub tablet_min: u32,
    pub tablet_max: u32,
    pub desktop_min: u32,
    pub desktop_large_min: u32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            mobile_max: 767,
            tablet_min: 768,
            tablet_max: 991,
            desktop_min: 992,
            desktop_large_min: 1200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
}

impl Breakpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Breakpoint::Mobile => "mobile",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Desktop => "desktop",
        }
    }
}

impl Breakpoints {
    /// Checks that the thresholds are strictly ascending.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let ordered = [
            ("mobile_max", self.mobile_max),
            ("tablet_min", self.tablet_min),
            ("tablet_max", self.tablet_max),
            ("desktop_min", self.desktop_min),
            ("desktop_large_min", self.desktop_large_min),
        ];
        for pair in ordered.windows(2) {
            let (lower_name, lower) = pair[0];
            let (upper_name, upper) = pair[1];
            if lower >= upper {
                return Err(SettingsError::UnorderedBreakpoints {
                    lower: lower_name,
                    upper: upper_name,
                });
            }
        }
        Ok(())
    }

    pub fn classify(&self, width: u32) -> Breakpoint {
        if width < self.tablet_min {
            Breakpoint::Mobile
        } else if width < self.desktop_min {
            Breakpoint::Tablet
        } else {
            Breakpoint::Desktop
        }
    }

    pub fn is_mobile(&self, width: u32) -> bool {
        width < self.tablet_min
    }

    pub fn is_tablet(&self, width: u32) -> bool {
        width > self.mobile_max && width < self.desktop_min
    }

    /// Note that a width of exactly `desktop_min` classifies as desktop but
    /// is not reported by this predicate.
    pub fn is_desktop(&self, width: u32) -> bool {
        width > self.desktop_min
    }
}

/// Provides the current drawable size.
pub trait ViewportProvider: Send + Sync {
    fn viewport_size(&self) -> (u32, u32);

    fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.viewport_size();
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    fn breakpoint(&self, breakpoints: &Breakpoints) -> Breakpoint {
        breakpoints.classify(self.viewport_size().0)
    }
}

/// Simple viewport that always reports the same resolution.
#[derive(Debug, Clone, Copy)]
pub struct StaticViewport {
    pub width: u32,
    pub height: u32,
}

impl StaticViewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ViewportProvider for StaticViewport {
    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Viewport whose size is updated as the host window resizes.
#[derive(Debug)]
pub struct WindowViewport {
    size: RwLock<(u32, u32)>,
}

impl WindowViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new((width.max(1), height.max(1))),
        }
    }

    pub fn update(&self, width: u32, height: u32) {
        *self.size.write() = (width.max(1), height.max(1));
    }
}

impl ViewportProvider for WindowViewport {
    fn viewport_size(&self) -> (u32, u32) {
        *self.size.read()
    }
}

impl<T> ViewportProvider for Arc<T>
where
    T: ViewportProvider + ?Sized,
{
    fn viewport_size(&self) -> (u32, u32) {
        (**self).viewport_size()
    }
}

/// Applies window resizes to a viewport once a burst of events settles.
#[derive(Debug)]
pub struct ResizeHandler {
    viewport: Arc<WindowViewport>,
    debouncer: Debouncer,
    pending: Option<(u32, u32)>,
}

impl ResizeHandler {
    pub fn new(viewport: Arc<WindowViewport>) -> Self {
        Self::with_wait(viewport, RESIZE_DEBOUNCE)
    }

    pub fn with_wait(viewport: Arc<WindowViewport>, wait: Duration) -> Self {
        Self {
            viewport,
            debouncer: Debouncer::new(wait),
            pending: None,
        }
    }

    pub fn on_resize(&mut self, width: u32, height: u32, now: Instant) {
        self.pending = Some((width, height));
        self.debouncer.trigger(now);
    }

    /// Applies the latest size once the debounce interval elapsed. Returns the
    /// new aspect ratio when the viewport changed.
    pub fn poll(&mut self, now: Instant) -> Option<f32> {
        if !self.debouncer.poll(now) {
            return None;
        }
        let (width, height) = self.pending.take()?;
        self.viewport.update(width, height);
        debug!("viewport resized to {width}x{height}");
        Some(self.viewport.aspect_ratio())
    }
}

/// Detects iOS devices, including iPads that report a desktop Mac user agent.
pub fn is_ios(platform: &str, user_agent: &str, has_touch_end: bool) -> bool {
    const IOS_PLATFORMS: [&str; 6] = [
        "iPad Simulator",
        "iPhone Simulator",
        "iPod Simulator",
        "iPad",
        "iPhone",
        "iPod",
    ];
    IOS_PLATFORMS.contains(&platform) || (user_agent.contains("Mac") && has_touch_end)
}
