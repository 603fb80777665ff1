//! Recorded drawing sessions.
//!
//! A sketch is an XML description of what a user drew: free-hand strokes as
//! ordered cursor samples plus placed lines, blocks, spheres and markers.
//! Replaying a sketch drives the same stroke builder and tools the live
//! input loop uses.

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use log::{debug, error, info};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::scene::SceneBackend;
use crate::settings::Settings;
use crate::stroke::{advance, Stroke, StrokeMode};
use crate::tools::{
    create_sphere, create_user_block, place_user_line, show_point, Cursor, UserLine,
};

const DEFAULT_CURSOR_SIZE: f32 = 0.1;

/// Step inside a recorded stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StrokeEvent {
    Color(Color),
    Sample(Vec3),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SketchItem {
    Stroke {
        mode: StrokeMode,
        events: Vec<StrokeEvent>,
    },
    Line {
        mode: StrokeMode,
        start: Vec3,
        end: Vec3,
        color: Color,
    },
    Block {
        position: Vec3,
        size: f32,
        color: Color,
    },
    Sphere {
        position: Vec3,
        size: f32,
        color: Color,
    },
    Point {
        position: Vec3,
        color: Option<Color>,
    },
}

impl SketchItem {
    pub fn kind(&self) -> &'static str {
        match self {
            SketchItem::Stroke { .. } => "stroke",
            SketchItem::Line { .. } => "line",
            SketchItem::Block { .. } => "block",
            SketchItem::Sphere { .. } => "sphere",
            SketchItem::Point { .. } => "point",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    pub settings: Settings,
    pub items: Vec<SketchItem>,
}

/// Outcome of replaying a single stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeSummary {
    pub mode: StrokeMode,
    pub samples_seen: usize,
    /// Samples `advance` accepted. The seed sample of a line counts once.
    pub samples_accepted: usize,
    /// Points stored in the finished path, or per ribbon rail.
    pub points: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub strokes: Vec<StrokeSummary>,
    pub lines: usize,
    pub blocks: usize,
    pub spheres: usize,
    pub points: usize,
}

impl Sketch {
    /// Parses a sketch document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid sketch XML")?;
        let root = document.root_element();
        if !root.has_tag_name("sketch") {
            return Err(anyhow!(
                "expected <sketch> root element, found <{}>",
                root.tag_name().name()
            ));
        }

        let mut settings = Settings::default();
        let mut items = Vec::new();
        for (index, node) in root.children().filter(Node::is_element).enumerate() {
            let tag = node.tag_name().name();
            let item = match tag {
                "settings" => {
                    parse_settings(&node, &mut settings).context("invalid <settings>")?;
                    continue;
                }
                "stroke" => parse_stroke(&node),
                "line" => parse_line(&node),
                "block" => parse_placed(&node).map(|(position, size, color)| SketchItem::Block {
                    position,
                    size,
                    color,
                }),
                "sphere" => parse_placed(&node).map(|(position, size, color)| SketchItem::Sphere {
                    position,
                    size,
                    color,
                }),
                "point" => parse_point(&node),
                other => Err(anyhow!("unknown sketch element <{other}>")),
            };
            items.push(item.with_context(|| format!("invalid <{tag}> (element {})", index + 1))?);
        }

        settings.validate().context("invalid <settings>")?;
        Ok(Self { settings, items })
    }

    /// Draws every item into `scene` in document order.
    pub fn replay<S>(&self, scene: &mut S) -> ReplaySummary
    where
        S: SceneBackend + ?Sized,
    {
        let style = &self.settings.graphics.stroke;
        let mut summary = ReplaySummary::default();

        for item in &self.items {
            debug!("replaying {}", item.kind());
            match item {
                SketchItem::Stroke { mode, events } => {
                    let mut stroke = Stroke::with_style(style.clone());
                    let mut color = Color::WHITE;
                    let mut samples_seen = 0;
                    let mut samples_accepted = 0;
                    for event in events {
                        match *event {
                            StrokeEvent::Color(next) => color = next,
                            StrokeEvent::Sample(position) => {
                                samples_seen += 1;
                                if advance(&mut stroke, scene, position, color, *mode) {
                                    samples_accepted += 1;
                                }
                            }
                        }
                    }
                    if samples_seen == 0 && self.settings.graphics.error_logging {
                        error!("stroke without samples was skipped");
                    }
                    // The finished artifact now belongs to the scene.
                    stroke.take_artifact();
                    summary.strokes.push(StrokeSummary {
                        mode: *mode,
                        samples_seen,
                        samples_accepted,
                        points: stroke.sample_count(),
                    });
                }
                SketchItem::Line {
                    mode,
                    start,
                    end,
                    color,
                } => {
                    let mut line = UserLine::new();
                    for position in [*start, *end] {
                        let cursor = Cursor::new(position, DEFAULT_CURSOR_SIZE);
                        let placed =
                            place_user_line(scene, &mut line, &cursor, *color, *mode, style);
                        if placed.is_some() {
                            summary.lines += 1;
                        }
                    }
                }
                SketchItem::Block {
                    position,
                    size,
                    color,
                } => {
                    create_user_block(scene, &Cursor::new(*position, *size), *color);
                    summary.blocks += 1;
                }
                SketchItem::Sphere {
                    position,
                    size,
                    color,
                } => {
                    create_sphere(scene, &Cursor::new(*position, *size), *color);
                    summary.spheres += 1;
                }
                SketchItem::Point { position, color } => {
                    show_point(scene, *position, *color);
                    summary.points += 1;
                }
            }
        }

        info!(
            "replayed {} stroke(s), {} line(s), {} block(s), {} sphere(s), {} point(s)",
            summary.strokes.len(),
            summary.lines,
            summary.blocks,
            summary.spheres,
            summary.points
        );
        summary
    }
}

fn parse_settings(node: &Node<'_, '_>, settings: &mut Settings) -> Result<()> {
    let stroke = &mut settings.graphics.stroke;
    stroke.min_sample_distance = parse_f32(
        optional_text(node, "min-sample-distance"),
        stroke.min_sample_distance,
    )?;
    stroke.ribbon_half_width = parse_f32(
        optional_text(node, "ribbon-half-width"),
        stroke.ribbon_half_width,
    )?;
    if let Some(texture) = optional_text(node, "ribbon-texture") {
        stroke.ribbon_texture = Some(texture);
    }
    settings.graphics.error_logging =
        parse_bool(optional_text(node, "error-logging"), settings.graphics.error_logging)?;
    Ok(())
}

fn parse_stroke(node: &Node<'_, '_>) -> Result<SketchItem> {
    let mode = parse_mode(optional_text(node, "mode"))?;
    let mut events = Vec::new();
    for child in node.children().filter(Node::is_element) {
        let text = child.text().map(str::trim).unwrap_or_default();
        match child.tag_name().name() {
            "mode" => {}
            "color" => events.push(StrokeEvent::Color(parse_color(text)?)),
            "sample" => events.push(StrokeEvent::Sample(
                parse_vec3(text).context("invalid <sample>")?,
            )),
            other => return Err(anyhow!("unexpected <{other}> inside <stroke>")),
        }
    }
    Ok(SketchItem::Stroke { mode, events })
}

fn parse_line(node: &Node<'_, '_>) -> Result<SketchItem> {
    Ok(SketchItem::Line {
        mode: parse_mode(optional_text(node, "mode"))?,
        start: parse_vec3(&required_text(node, "start")?)?,
        end: parse_vec3(&required_text(node, "end")?)?,
        color: optional_color(node)?.unwrap_or(Color::WHITE),
    })
}

fn parse_placed(node: &Node<'_, '_>) -> Result<(Vec3, f32, Color)> {
    let position = parse_vec3(&required_text(node, "position")?)?;
    let size = parse_f32(optional_text(node, "size"), DEFAULT_CURSOR_SIZE)?;
    if !size.is_finite() || size <= 0.0 {
        return Err(anyhow!("<size> must be a positive finite number, found {size}"));
    }
    let color = optional_color(node)?.unwrap_or(Color::WHITE);
    Ok((position, size, color))
}

fn parse_point(node: &Node<'_, '_>) -> Result<SketchItem> {
    Ok(SketchItem::Point {
        position: parse_vec3(&required_text(node, "position")?)?,
        color: optional_color(node)?,
    })
}

fn parse_mode(value: Option<String>) -> Result<StrokeMode> {
    value.map_or(Ok(StrokeMode::Line), |mode| mode.parse())
}

fn optional_color(node: &Node<'_, '_>) -> Result<Option<Color>> {
    optional_text(node, "color")
        .map(|text| parse_color(&text))
        .transpose()
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_components<const N: usize>(value: &str, what: &str) -> Result<[f32; N]> {
    let mut components = [0.0; N];
    let mut parts = value.split_whitespace();
    for component in &mut components {
        let part = parts
            .next()
            .ok_or_else(|| anyhow!("{what} is missing components: {value:?}"))?;
        *component = part
            .parse::<f32>()
            .with_context(|| format!("invalid {what} component {part:?}"))?;
        if !component.is_finite() {
            return Err(anyhow!("{what} component must be finite, found {part:?}"));
        }
    }
    if parts.next().is_some() {
        return Err(anyhow!("{what} has too many components: {value:?}"));
    }
    Ok(components)
}

fn parse_vec3(value: &str) -> Result<Vec3> {
    parse_components::<3>(value, "vector").map(Vec3::from_array)
}

/// Parses `r g b` with channels in `0..=255`.
fn parse_color(value: &str) -> Result<Color> {
    let [r, g, b] = parse_components::<3>(value, "color")?;
    if [r, g, b].iter().any(|channel| !(0.0..=255.0).contains(channel)) {
        return Err(anyhow!("color channels must be within 0..=255: {value:?}"));
    }
    Ok(Color::from_rgb(r / 255.0, g / 255.0, b / 255.0))
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float {value:?}: {err}")),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(anyhow!("expected true or false, found {other:?}")),
        None => Ok(default),
    }
}
