use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};
use log::info;

use vr_sketch::{SceneGraph, Sketch, StaticViewport, ViewportProvider};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let xml = fs::read_to_string(&options.path)
        .with_context(|| format!("failed to read sketch {}", options.path))?;
    let sketch = Sketch::from_xml(&xml).context("failed to parse sketch XML")?;

    println!("Loaded sketch with {} item(s)", sketch.items.len());
    if !options.summary_only {
        for item in &sketch.items {
            println!(" - {}", item.kind());
        }
    }

    let mut scene = SceneGraph::new();
    let summary = sketch.replay(&mut scene);
    info!("replay finished");

    for (index, stroke) in summary.strokes.iter().enumerate() {
        println!(
            "Stroke {} ({}): {} of {} sample(s) accepted, {} point(s)",
            index + 1,
            stroke.mode,
            stroke.samples_accepted,
            stroke.samples_seen,
            stroke.points
        );
    }

    let stats = scene.stats();
    println!(
        "Artifacts: {} created, {} released, {} live",
        stats.artifacts_created,
        stats.artifacts_released,
        stats.live_artifacts()
    );
    println!("Materials: {}", stats.materials_created);

    if !options.summary_only {
        for (handle, artifact) in scene.live_artifacts() {
            println!(
                " - #{} {} pos=({:.2}, {:.2}, {:.2}) pickable={} user={}",
                handle.id(),
                artifact.shape.kind(),
                artifact.position.x,
                artifact.position.y,
                artifact.position.z,
                artifact.pickable,
                artifact.user_added
            );
        }
    }

    if let Some(viewport) = options.viewport {
        let (width, height) = viewport.viewport_size();
        let breakpoint = viewport.breakpoint(&sketch.settings.breakpoints);
        println!(
            "Viewport {width}x{height}: {} (aspect {:.2})",
            breakpoint.as_str(),
            viewport.aspect_ratio()
        );
    }

    Ok(())
}

struct CliOptions {
    path: String,
    summary_only: bool,
    viewport: Option<StaticViewport>,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(path) = args.next() else {
            return Err(anyhow!(
                "Usage: vr-sketch <sketch.xml> [--summary-only] [--viewport=WIDTHxHEIGHT]"
            ));
        };
        let mut summary_only = false;
        let mut viewport = None;
        for arg in args {
            if arg == "--summary-only" {
                summary_only = true;
            } else if let Some(size) = arg.strip_prefix("--viewport=") {
                viewport = Some(parse_viewport(size)?);
            } else {
                return Err(anyhow!(
                    "Unknown argument: {arg}. Expected --summary-only or --viewport=WIDTHxHEIGHT"
                ));
            }
        }
        Ok(Self {
            path,
            summary_only,
            viewport,
        })
    }
}

fn parse_viewport(value: &str) -> Result<StaticViewport> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| anyhow!("viewport must look like 1280x720, found {value:?}"))?;
    let width = width
        .parse::<u32>()
        .with_context(|| format!("invalid viewport width {width:?}"))?;
    let height = height
        .parse::<u32>()
        .with_context(|| format!("invalid viewport height {height:?}"))?;
    Ok(StaticViewport::new(width, height))
}
