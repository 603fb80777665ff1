//! Scene-graphics helpers for a VR sketching application.
//!
//! The crate turns user drawing actions into drawable primitives: free-hand
//! line and ribbon strokes, straight lines, blocks and spheres. The 3D
//! engine itself stays outside of the crate behind [`SceneBackend`], so the
//! drawing logic can run headless against the in-memory [`SceneGraph`].

pub mod color;
pub mod geometry;
pub mod scene;
pub mod settings;
pub mod sketch;
pub mod stroke;
pub mod tools;
pub mod util;
pub mod viewport;

pub use color::Color;
pub use scene::{ArtifactHandle, MaterialHandle, SceneBackend, SceneGraph, SceneStats};
pub use settings::{GraphicsSettings, Settings, SettingsError};
pub use sketch::{ReplaySummary, Sketch, SketchItem};
pub use stroke::{advance, Stroke, StrokeMode, StrokeState, StrokeStyle};
pub use tools::Cursor;
pub use viewport::{Breakpoint, Breakpoints, StaticViewport, ViewportProvider, WindowViewport};
