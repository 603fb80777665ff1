//! One-shot drawing tools: straight lines, preview ghosts, blocks, spheres
//! and debug markers.

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::translate;
use crate::scene::{ArtifactHandle, SceneBackend};
use crate::stroke::{StrokeMode, StrokeStyle};

/// Alpha applied to placed blocks and spheres.
pub const PLACED_SHAPE_ALPHA: f32 = 0.7;
pub const DEBUG_POINT_SIZE: f32 = 0.02;

/// Tracked controller cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub position: Vec3,
    /// Edge length of blocks and diameter of spheres placed at the cursor.
    pub size: f32,
}

impl Cursor {
    pub const fn new(position: Vec3, size: f32) -> Self {
        Self { position, size }
    }
}

/// Line from `origin` along `vector`. Defaults to white.
pub fn create_line<S>(
    scene: &mut S,
    origin: Vec3,
    vector: Vec3,
    color: Option<Color>,
) -> ArtifactHandle
where
    S: SceneBackend + ?Sized,
{
    create_line_from_points(scene, origin, translate(origin, vector), color)
}

pub fn create_line_from_points<S>(
    scene: &mut S,
    start: Vec3,
    end: Vec3,
    color: Option<Color>,
) -> ArtifactHandle
where
    S: SceneBackend + ?Sized,
{
    let color = color.unwrap_or(Color::WHITE).with_alpha(1.0);
    scene.create_line_artifact(&[start, end], &[color, color])
}

/// Line that the user can later select and drag.
pub fn create_line_art<S>(
    scene: &mut S,
    start: Vec3,
    end: Vec3,
    color: Option<Color>,
) -> ArtifactHandle
where
    S: SceneBackend + ?Sized,
{
    let line = create_line_from_points(scene, start, end, color);
    tag_user_artifact(scene, line);
    line
}

/// Preview of a line being placed, anchored at `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGhost {
    pub start: Vec3,
    pub artifact: Option<ArtifactHandle>,
}

impl LineGhost {
    pub fn new(start: Vec3) -> Self {
        Self {
            start,
            artifact: None,
        }
    }
}

/// Redraws the ghost line so that it ends at the cursor.
///
/// The ghost never takes part in picking so that it does not hide the
/// objects the user is aiming at.
pub fn update_line_ghost<S>(
    scene: &mut S,
    ghost: &mut LineGhost,
    cursor: &Cursor,
    color: Option<Color>,
)
where
    S: SceneBackend + ?Sized,
{
    if let Some(previous) = ghost.artifact.take() {
        scene.release_artifact(previous);
    }
    let artifact = create_line_from_points(scene, ghost.start, cursor.position, color);
    scene.set_artifact_pickable(artifact, false);
    ghost.artifact = Some(artifact);
}

/// Two-click line tool state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserLine {
    pub start: Option<Vec3>,
    pub end: Option<Vec3>,
    pub color: Option<Color>,
    pub artifact: Option<ArtifactHandle>,
    adding: bool,
}

impl UserLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the next click completes the line.
    pub fn awaiting_end(&self) -> bool {
        self.adding
    }
}

/// Handles one click of the two-click line tool.
///
/// The first click anchors the start at the cursor. The second click sets
/// the end and draws either a straight line or a short ribbon, depending on
/// `mode`. Returns the artifact drawn by this click, if any.
pub fn place_user_line<S>(
    scene: &mut S,
    line: &mut UserLine,
    cursor: &Cursor,
    color: Color,
    mode: StrokeMode,
    style: &StrokeStyle,
) -> Option<ArtifactHandle>
where
    S: SceneBackend + ?Sized,
{
    line.color = Some(color);
    if !line.adding {
        line.start = Some(cursor.position);
        line.end = None;
        line.adding = true;
        return None;
    }

    let start = line.start.unwrap_or(cursor.position);
    let end = cursor.position;
    let artifact = match mode {
        StrokeMode::Line => create_line_art(scene, start, end, Some(color)),
        StrokeMode::Ribbon => {
            let offset = Vec3::new(0.0, style.ribbon_half_width, 0.0);
            let rail_a = [translate(start, -offset), translate(end, -offset)];
            let rail_b = [translate(start, offset), translate(end, offset)];
            let ribbon = scene.create_ribbon_artifact(&rail_a, &rail_b);
            let material = scene.create_material();
            if let Some(texture) = style.ribbon_texture.as_deref() {
                scene.set_material_texture(material, texture);
            }
            scene.set_material_color(material, color);
            scene.set_artifact_material(ribbon, material);
            tag_user_artifact(scene, ribbon);
            ribbon
        }
    };
    debug!("placed {mode} from {start} to {end}");
    line.end = Some(end);
    line.artifact = Some(artifact);
    line.adding = false;
    Some(artifact)
}

/// Places a translucent box at the cursor.
pub fn create_user_block<S>(scene: &mut S, cursor: &Cursor, color: Color) -> ArtifactHandle
where
    S: SceneBackend + ?Sized,
{
    let block = scene.create_box_artifact(cursor.size);
    finish_placed_shape(scene, block, cursor.position, color);
    block
}

/// Places a translucent sphere at the cursor.
pub fn create_sphere<S>(scene: &mut S, cursor: &Cursor, color: Color) -> ArtifactHandle
where
    S: SceneBackend + ?Sized,
{
    let bubble = scene.create_sphere_artifact(cursor.size);
    finish_placed_shape(scene, bubble, cursor.position, color);
    bubble
}

/// Small marker box for debugging positions. Defaults to green.
pub fn show_point<S>(scene: &mut S, point: Vec3, color: Option<Color>) -> ArtifactHandle
where
    S: SceneBackend + ?Sized,
{
    let marker = scene.create_box_artifact(DEBUG_POINT_SIZE);
    scene.set_artifact_position(marker, point);
    let material = scene.create_material();
    scene.set_material_color(material, color.unwrap_or(Color::GREEN));
    scene.set_artifact_material(marker, material);
    marker
}

fn finish_placed_shape<S>(scene: &mut S, artifact: ArtifactHandle, position: Vec3, color: Color)
where
    S: SceneBackend + ?Sized,
{
    scene.set_artifact_position(artifact, position);
    let material = scene.create_material();
    scene.set_material_color(material, color);
    scene.set_material_alpha(material, PLACED_SHAPE_ALPHA);
    scene.set_artifact_material(artifact, material);
    tag_user_artifact(scene, artifact);
}

fn tag_user_artifact<S>(scene: &mut S, artifact: ArtifactHandle)
where
    S: SceneBackend + ?Sized,
{
    scene.set_artifact_user_flag(artifact, true);
    scene.set_artifact_draggable(artifact, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ArtifactShape, SceneGraph};

    #[test]
    fn create_line_ends_at_translated_origin() {
        let mut scene = SceneGraph::new();
        let line = create_line(&mut scene, Vec3::ONE, Vec3::new(0.0, 2.0, 0.0), None);
        let artifact = scene.artifact(line).unwrap();
        assert_eq!(
            artifact.shape,
            ArtifactShape::Lines {
                points: vec![Vec3::ONE, Vec3::new(1.0, 3.0, 1.0)],
                colors: vec![Color::WHITE, Color::WHITE],
            }
        );
        assert!(!artifact.user_added);
    }

    #[test]
    fn line_art_is_tagged() {
        let mut scene = SceneGraph::new();
        let line = create_line_art(&mut scene, Vec3::ZERO, Vec3::X, Some(Color::GREEN));
        let artifact = scene.artifact(line).unwrap();
        assert!(artifact.user_added);
        assert!(artifact.draggable);
    }

    #[test]
    fn ghost_replaces_previous_preview() {
        let mut scene = SceneGraph::new();
        let mut ghost = LineGhost::new(Vec3::ZERO);
        for x in 1..=3 {
            let cursor = Cursor::new(Vec3::new(x as f32, 0.0, 0.0), 0.1);
            update_line_ghost(&mut scene, &mut ghost, &cursor, None);
        }
        let live = scene.live_artifacts();
        assert_eq!(live.len(), 1);
        assert_eq!(Some(live[0].0), ghost.artifact);
        assert!(!live[0].1.pickable);
        assert_eq!(scene.stats().artifacts_released, 2);
    }

    fn click(
        scene: &mut SceneGraph,
        line: &mut UserLine,
        at: Vec3,
        mode: StrokeMode,
    ) -> Option<ArtifactHandle> {
        let red = Color::from_rgb(1.0, 0.0, 0.0);
        let style = StrokeStyle::default();
        place_user_line(scene, line, &Cursor::new(at, 0.1), red, mode, &style)
    }

    #[test]
    fn user_line_alternates_between_clicks() {
        let mut scene = SceneGraph::new();
        let mut line = UserLine::new();

        assert!(click(&mut scene, &mut line, Vec3::ZERO, StrokeMode::Line).is_none());
        assert!(line.awaiting_end());
        assert_eq!(line.start, Some(Vec3::ZERO));

        let drawn = click(&mut scene, &mut line, Vec3::X, StrokeMode::Line).unwrap();
        assert!(!line.awaiting_end());
        assert_eq!(line.end, Some(Vec3::X));
        assert!(scene.artifact(drawn).unwrap().user_added);

        // A third click starts a new line.
        assert!(click(&mut scene, &mut line, Vec3::X, StrokeMode::Line).is_none());
        assert_eq!(line.start, Some(Vec3::X));
    }

    #[test]
    fn ribbon_user_line_offsets_rails() {
        let mut scene = SceneGraph::new();
        let mut line = UserLine::new();
        click(&mut scene, &mut line, Vec3::ZERO, StrokeMode::Ribbon);
        let ribbon = click(&mut scene, &mut line, Vec3::X, StrokeMode::Ribbon).unwrap();

        let artifact = scene.artifact(ribbon).unwrap();
        match artifact.shape {
            ArtifactShape::Ribbon { rail_a, rail_b } => {
                let below = Vec3::new(0.0, -0.05, 0.0);
                let above = Vec3::new(0.0, 0.05, 0.0);
                assert_eq!(rail_a, vec![below, Vec3::X + below]);
                assert_eq!(rail_b, vec![above, Vec3::X + above]);
            }
            other => panic!("expected ribbon, found {other:?}"),
        }
        let material = scene.material(artifact.material.unwrap()).unwrap();
        assert_eq!(material.color, Color::from_rgb(1.0, 0.0, 0.0));
        assert!(material.texture.is_some());
    }

    #[test]
    fn blocks_and_spheres_are_translucent_and_positioned() {
        let mut scene = SceneGraph::new();
        let cursor = Cursor::new(Vec3::new(0.0, 1.5, -1.0), 0.25);
        let color = Color::from_rgb(0.2, 0.4, 0.6);

        let block_handle = create_user_block(&mut scene, &cursor, color);
        let sphere_handle = create_sphere(&mut scene, &cursor, color);
        let block = scene.artifact(block_handle).unwrap();
        assert_eq!(block.shape, ArtifactShape::Box { size: 0.25 });
        let sphere = scene.artifact(sphere_handle).unwrap();
        assert_eq!(sphere.shape, ArtifactShape::Sphere { diameter: 0.25 });

        for artifact in [block, sphere] {
            assert_eq!(artifact.position, cursor.position);
            assert!(artifact.user_added && artifact.draggable);
            let material = scene.material(artifact.material.unwrap()).unwrap();
            assert_eq!(material.alpha, PLACED_SHAPE_ALPHA);
            assert_eq!(material.color, color);
        }
    }

    #[test]
    fn debug_point_defaults_to_green() {
        let mut scene = SceneGraph::new();
        let marker_handle = show_point(&mut scene, Vec3::Y, None);
        let marker = scene.artifact(marker_handle).unwrap();
        assert_eq!(marker.position, Vec3::Y);
        assert_eq!(marker.shape, ArtifactShape::Box { size: DEBUG_POINT_SIZE });
        assert_eq!(scene.material(marker.material.unwrap()).unwrap().color, Color::GREEN);
    }
}
