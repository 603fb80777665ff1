//! Free-hand stroke building.
//!
//! A [`Stroke`] is created empty when a draw gesture begins and is fed one
//! cursor sample per tick through [`advance`]. Line strokes drop samples that
//! sit too close to the last committed point; ribbon strokes keep every
//! sample. After each change the drawable is rebuilt from the full sample
//! set while the material is created once and reused.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use glam::Vec3;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::{distance, translate};
use crate::scene::{ArtifactHandle, MaterialHandle, SceneBackend};

/// Minimum distance a line sample must move away from the last committed point.
pub const MIN_SAMPLE_DISTANCE: f32 = 0.05;
/// Vertical offset of each ribbon rail from the cursor.
pub const RIBBON_HALF_WIDTH: f32 = 0.05;
pub const DEFAULT_RIBBON_TEXTURE: &str = "img/grass.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeMode {
    Line,
    Ribbon,
}

impl FromStr for StrokeMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "line" => Ok(Self::Line),
            "ribbon" => Ok(Self::Ribbon),
            other => Err(anyhow!("unknown stroke mode: {other}")),
        }
    }
}

impl fmt::Display for StrokeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrokeMode::Line => "line",
            StrokeMode::Ribbon => "ribbon",
        })
    }
}

/// Sampling and appearance parameters shared by all strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    #[serde(default = "default_min_sample_distance")]
    pub min_sample_distance: f32,
    #[serde(default = "default_ribbon_half_width")]
    pub ribbon_half_width: f32,
    #[serde(default = "default_ribbon_texture")]
    pub ribbon_texture: Option<String>,
}

fn default_min_sample_distance() -> f32 {
    MIN_SAMPLE_DISTANCE
}

fn default_ribbon_half_width() -> f32 {
    RIBBON_HALF_WIDTH
}

fn default_ribbon_texture() -> Option<String> {
    Some(DEFAULT_RIBBON_TEXTURE.to_string())
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            min_sample_distance: default_min_sample_distance(),
            ribbon_half_width: default_ribbon_half_width(),
            ribbon_texture: default_ribbon_texture(),
        }
    }
}

impl StrokeStyle {
    fn rail_offset(&self) -> Vec3 {
        Vec3::new(0.0, self.ribbon_half_width, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeState {
    Empty,
    Seeded,
    Growing,
}

/// Material cached for the lifetime of a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeMaterial {
    pub handle: MaterialHandle,
    /// Color last written to the material.
    pub color: Color,
}

/// Samples and scene resources of a single draw gesture.
#[derive(Debug, Clone, Default)]
pub struct Stroke {
    mode: Option<StrokeMode>,
    path: Vec<Vec3>,
    rail_a: Vec<Vec3>,
    rail_b: Vec<Vec3>,
    sample_colors: Vec<Color>,
    artifact: Option<ArtifactHandle>,
    material: Option<StrokeMaterial>,
    style: StrokeStyle,
    grown: bool,
}

impl Stroke {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: StrokeStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> Option<StrokeMode> {
        self.mode
    }

    /// Committed line samples.
    pub fn path(&self) -> &[Vec3] {
        &self.path
    }

    pub fn rail_a(&self) -> &[Vec3] {
        &self.rail_a
    }

    pub fn rail_b(&self) -> &[Vec3] {
        &self.rail_b
    }

    pub fn sample_colors(&self) -> &[Color] {
        &self.sample_colors
    }

    pub fn artifact(&self) -> Option<ArtifactHandle> {
        self.artifact
    }

    pub fn material(&self) -> Option<StrokeMaterial> {
        self.material
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn state(&self) -> StrokeState {
        match (self.mode, self.grown) {
            (None, _) => StrokeState::Empty,
            (Some(_), false) => StrokeState::Seeded,
            (Some(_), true) => StrokeState::Growing,
        }
    }

    /// Number of samples committed so far in the stroke's mode.
    pub fn sample_count(&self) -> usize {
        self.sample_colors.len()
    }

    /// Hands the current artifact over to the caller, leaving the stroke without one.
    pub fn take_artifact(&mut self) -> Option<ArtifactHandle> {
        self.artifact.take()
    }
}

/// Feeds one cursor sample into `stroke` and rebuilds its artifact when the
/// geometry changed. Returns whether the sample was committed.
///
/// The first call fixes the stroke mode; `mode` must match it on every later
/// call.
pub fn advance<S>(
    stroke: &mut Stroke,
    scene: &mut S,
    cursor_position: Vec3,
    color: Color,
    mode: StrokeMode,
) -> bool
where
    S: SceneBackend + ?Sized,
{
    let seeding = stroke.mode.is_none();
    let mode = match stroke.mode {
        Some(current) => {
            debug_assert_eq!(current, mode, "stroke mode changed mid-gesture");
            current
        }
        None => {
            debug!("seeding {mode} stroke at {cursor_position}");
            stroke.mode = Some(mode);
            if mode == StrokeMode::Line {
                stroke.path.push(cursor_position);
                stroke.sample_colors.push(color);
            }
            mode
        }
    };

    let committed = match mode {
        StrokeMode::Line => push_line_sample(stroke, cursor_position, color),
        StrokeMode::Ribbon => {
            push_ribbon_sample(stroke, cursor_position, color);
            true
        }
    };

    if committed {
        // Only samples committed after the seed move the stroke to Growing.
        stroke.grown |= !seeding;
        rebuild_artifact(stroke, scene, mode, color);
    } else {
        trace!("dropping sample at {cursor_position}");
    }
    committed
}

fn push_line_sample(stroke: &mut Stroke, position: Vec3, color: Color) -> bool {
    let accept = match stroke.path.last() {
        Some(last) if stroke.path.len() >= 2 => {
            distance(position, *last) > stroke.style.min_sample_distance
        }
        _ => true,
    };
    if accept {
        stroke.path.push(position);
        stroke.sample_colors.push(color);
    }
    accept
}

fn push_ribbon_sample(stroke: &mut Stroke, position: Vec3, color: Color) {
    let offset = stroke.style.rail_offset();
    stroke.rail_a.push(translate(position, offset));
    stroke.rail_b.push(translate(position, -offset));
    stroke.sample_colors.push(color);
}

fn rebuild_artifact<S>(stroke: &mut Stroke, scene: &mut S, mode: StrokeMode, color: Color)
where
    S: SceneBackend + ?Sized,
{
    if let Some(previous) = stroke.artifact.take() {
        scene.release_artifact(previous);
    }

    let artifact = match mode {
        StrokeMode::Line => scene.create_line_artifact(&stroke.path, &stroke.sample_colors),
        StrokeMode::Ribbon => scene.create_ribbon_artifact(&stroke.rail_a, &stroke.rail_b),
    };

    let material = match stroke.material.as_mut() {
        Some(material) => {
            if material.color != color {
                scene.set_material_color(material.handle, color);
                material.color = color;
            }
            material.handle
        }
        None => {
            let handle = scene.create_material();
            scene.set_material_color(handle, color);
            if mode == StrokeMode::Ribbon {
                if let Some(texture) = stroke.style.ribbon_texture.as_deref() {
                    scene.set_material_texture(handle, texture);
                }
            }
            stroke.material = Some(StrokeMaterial { handle, color });
            handle
        }
    };

    scene.set_artifact_material(artifact, material);
    scene.set_artifact_pickable(artifact, false);
    scene.set_artifact_draggable(artifact, true);
    scene.set_artifact_user_flag(artifact, true);
    stroke.artifact = Some(artifact);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ArtifactShape, SceneGraph};

    const RED: Color = Color::from_rgb(1.0, 0.0, 0.0);
    const BLUE: Color = Color::from_rgb(0.0, 0.0, 1.0);

    fn at_x(x: f32) -> Vec3 {
        Vec3::new(x, 0.0, 0.0)
    }

    #[test]
    fn first_line_sample_seeds_two_points() {
        let mut scene = SceneGraph::new();
        let mut stroke = Stroke::new();
        assert_eq!(stroke.state(), StrokeState::Empty);

        assert!(advance(&mut stroke, &mut scene, at_x(0.0), RED, StrokeMode::Line));
        assert_eq!(stroke.state(), StrokeState::Seeded);
        assert_eq!(stroke.path(), &[at_x(0.0), at_x(0.0)]);
        assert_eq!(stroke.sample_colors().len(), 2);
        assert!(stroke.rail_a().is_empty());
    }

    #[test]
    fn line_samples_closer_than_threshold_are_dropped() {
        let mut scene = SceneGraph::new();
        let mut stroke = Stroke::new();
        advance(&mut stroke, &mut scene, at_x(0.0), RED, StrokeMode::Line);

        let accepted: Vec<bool> = [0.0, 0.01, 0.06, 0.08, 0.16]
            .into_iter()
            .map(|x| advance(&mut stroke, &mut scene, at_x(x), RED, StrokeMode::Line))
            .collect();

        assert_eq!(accepted, [false, false, true, false, true]);
        assert_eq!(
            stroke.path(),
            &[at_x(0.0), at_x(0.0), at_x(0.06), at_x(0.16)]
        );
        assert_eq!(stroke.path().len(), stroke.sample_colors().len());
        assert_eq!(stroke.state(), StrokeState::Growing);
    }

    #[test]
    fn rejected_line_sample_keeps_artifact() {
        let mut scene = SceneGraph::new();
        let mut stroke = Stroke::new();
        advance(&mut stroke, &mut scene, at_x(0.0), RED, StrokeMode::Line);
        let artifact = stroke.artifact();

        advance(&mut stroke, &mut scene, at_x(0.02), RED, StrokeMode::Line);
        assert_eq!(stroke.artifact(), artifact);
        assert_eq!(scene.stats().artifacts_created, 1);
    }

    #[test]
    fn ribbon_rails_grow_with_every_call() {
        let mut scene = SceneGraph::new();
        let mut stroke = Stroke::new();
        for n in 1..=5 {
            // Repeating the same position must still grow the rails.
            assert!(advance(&mut stroke, &mut scene, at_x(0.001), BLUE, StrokeMode::Ribbon));
            assert_eq!(stroke.rail_a().len(), n);
            assert_eq!(stroke.rail_b().len(), n);
            assert_eq!(stroke.sample_colors().len(), n);
        }
        assert!(stroke.path().is_empty());
        assert_eq!(stroke.rail_a()[0], Vec3::new(0.001, 0.05, 0.0));
        assert_eq!(stroke.rail_b()[0], Vec3::new(0.001, -0.05, 0.0));
    }

    #[test]
    fn rejected_sample_after_seed_keeps_stroke_seeded() {
        let mut scene = SceneGraph::new();
        let mut stroke = Stroke::new();
        advance(&mut stroke, &mut scene, at_x(0.0), RED, StrokeMode::Line);
        assert!(!advance(&mut stroke, &mut scene, at_x(0.01), RED, StrokeMode::Line));
        assert_eq!(stroke.path().len(), 2);
        assert_eq!(stroke.state(), StrokeState::Seeded);

        assert!(advance(&mut stroke, &mut scene, at_x(0.1), RED, StrokeMode::Line));
        assert_eq!(stroke.state(), StrokeState::Growing);
    }

    #[test]
    fn ribbon_grows_from_the_second_sample() {
        let mut scene = SceneGraph::new();
        let mut stroke = Stroke::new();
        advance(&mut stroke, &mut scene, at_x(0.0), RED, StrokeMode::Ribbon);
        assert_eq!(stroke.state(), StrokeState::Seeded);
        advance(&mut stroke, &mut scene, at_x(0.0), RED, StrokeMode::Ribbon);
        assert_eq!(stroke.state(), StrokeState::Growing);
    }

    #[test]
    fn ribbon_rebuild_releases_the_previous_artifact() {
        let mut scene = SceneGraph::new();
        let mut stroke = Stroke::new();
        for i in 1..=10 {
            advance(&mut stroke, &mut scene, at_x(0.01 * i as f32), BLUE, StrokeMode::Ribbon);
            let stats = scene.stats();
            assert_eq!(stats.live_artifacts(), 1);
            assert_eq!(stats.artifacts_created, i);
            assert_eq!(stats.artifacts_released, i - 1);
        }

        let live = scene.live_artifacts();
        assert_eq!(live.len(), 1);
        let (handle, artifact) = &live[0];
        assert_eq!(Some(*handle), stroke.artifact());
        match &artifact.shape {
            ArtifactShape::Ribbon { rail_a, rail_b } => {
                assert_eq!(rail_a.as_slice(), stroke.rail_a());
                assert_eq!(rail_b.as_slice(), stroke.rail_b());
            }
            other => panic!("expected ribbon, found {other:?}"),
        }
        assert!(!artifact.pickable);
        assert!(artifact.draggable);
        assert!(artifact.user_added);
    }

    #[test]
    fn each_rebuild_releases_the_previous_artifact() {
        let mut scene = SceneGraph::new();
        let mut stroke = Stroke::new();
        for i in 0..10 {
            advance(&mut stroke, &mut scene, at_x(i as f32), RED, StrokeMode::Line);
            let stats = scene.stats();
            assert_eq!(stats.live_artifacts(), 1);
            assert_eq!(stats.artifacts_released, stats.artifacts_created - 1);
        }

        let live = scene.live_artifacts();
        assert_eq!(live.len(), 1);
        let (handle, artifact) = &live[0];
        assert_eq!(Some(*handle), stroke.artifact());
        match &artifact.shape {
            ArtifactShape::Lines { points, colors } => {
                assert_eq!(points.as_slice(), stroke.path());
                assert_eq!(colors.len(), points.len());
            }
            other => panic!("expected lines, found {other:?}"),
        }
        assert!(!artifact.pickable);
        assert!(artifact.draggable);
        assert!(artifact.user_added);
    }

    #[test]
    fn material_is_created_once_and_recolored_on_change() {
        let mut scene = SceneGraph::new();
        let mut stroke = Stroke::new();
        let colors = [RED, RED, BLUE, BLUE, RED];
        for (i, color) in colors.into_iter().enumerate() {
            advance(&mut stroke, &mut scene, at_x(i as f32), color, StrokeMode::Ribbon);
        }

        let stats = scene.stats();
        assert_eq!(stats.materials_created, 1);
        // Initial write plus the two color changes.
        assert_eq!(stats.material_color_writes, 3);

        let material = stroke.material().unwrap();
        assert_eq!(material.color, RED);
        let stored = scene.material(material.handle).unwrap();
        assert_eq!(stored.color, RED);
        assert_eq!(stored.texture.as_deref(), Some(DEFAULT_RIBBON_TEXTURE));

        let artifact = scene.artifact(stroke.artifact().unwrap()).unwrap();
        assert_eq!(artifact.material, Some(material.handle));
    }

    #[test]
    fn line_material_has_no_texture() {
        let mut scene = SceneGraph::new();
        let mut stroke = Stroke::new();
        advance(&mut stroke, &mut scene, at_x(0.0), RED, StrokeMode::Line);
        let material = scene.material(stroke.material().unwrap().handle).unwrap();
        assert!(material.texture.is_none());
    }

    #[test]
    fn custom_style_changes_threshold_and_width() {
        let mut scene = SceneGraph::new();
        let style = StrokeStyle {
            min_sample_distance: 0.5,
            ribbon_half_width: 0.25,
            ribbon_texture: None,
        };
        let mut line = Stroke::with_style(style.clone());
        advance(&mut line, &mut scene, at_x(0.0), RED, StrokeMode::Line);
        assert!(!advance(&mut line, &mut scene, at_x(0.4), RED, StrokeMode::Line));
        assert!(advance(&mut line, &mut scene, at_x(0.6), RED, StrokeMode::Line));

        let mut ribbon = Stroke::with_style(style);
        advance(&mut ribbon, &mut scene, Vec3::ZERO, RED, StrokeMode::Ribbon);
        assert_eq!(ribbon.rail_a()[0], Vec3::new(0.0, 0.25, 0.0));
        let material = scene.material(ribbon.material().unwrap().handle).unwrap();
        assert!(material.texture.is_none());
    }

    #[test]
    fn stored_samples_are_independent_of_the_cursor() {
        let mut scene = SceneGraph::new();
        let mut stroke = Stroke::new();
        let mut cursor = at_x(0.0);
        advance(&mut stroke, &mut scene, cursor, RED, StrokeMode::Line);
        cursor.x = 5.0;
        advance(&mut stroke, &mut scene, cursor, RED, StrokeMode::Line);
        cursor.y = 9.0;

        assert_eq!(stroke.path(), &[at_x(0.0), at_x(0.0), at_x(5.0)]);
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("line".parse::<StrokeMode>().unwrap(), StrokeMode::Line);
        assert_eq!("ribbon".parse::<StrokeMode>().unwrap(), StrokeMode::Ribbon);
        assert!("spline".parse::<StrokeMode>().is_err());
        assert_eq!(StrokeMode::Ribbon.to_string(), "ribbon");
    }
}
