//! urdfview command-line front end.
//!
//! Provides two headless modes over the viewer core:
//! - `inspect`: print the model summary, joint controls, link poses, scene
//!   bounds and the auto-fitted camera
//! - `draw`: stream every backend call of one rendered frame as text

mod backend;
mod obj;
mod telemetry;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use urdfview_viz::{InputEvent, ViewerConfig, ViewerSession};

use crate::backend::TextBackend;
use crate::obj::ObjLoader;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Inspect and draw URDF robot descriptions.
#[derive(Parser)]
#[command(name = "urdfview", version, about)]
struct Cli {
    /// Viewer configuration file (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the model structure and its posed links.
    Inspect {
        /// Robot description file.
        file: PathBuf,

        /// Joint value as NAME=VALUE (radians or meters, `deg` suffix for degrees).
        #[arg(short, long = "joint", value_parser = parse_joint_arg)]
        joints: Vec<(String, f32)>,
    },

    /// Print the backend calls of one rendered frame.
    Draw {
        /// Robot description file.
        file: PathBuf,

        /// Joint value as NAME=VALUE (radians or meters, `deg` suffix for degrees).
        #[arg(short, long = "joint", value_parser = parse_joint_arg)]
        joints: Vec<(String, f32)>,

        /// Viewport width in pixels.
        #[arg(long, default_value_t = 800)]
        width: u32,

        /// Viewport height in pixels.
        #[arg(long, default_value_t = 600)]
        height: u32,
    },
}

fn parse_joint_arg(arg: &str) -> Result<(String, f32), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing joint name in '{arg}'"));
    }
    let value = value.trim();
    let parsed = match value.strip_suffix("deg") {
        Some(degrees) => degrees.trim().parse::<f32>().map(f32::to_radians),
        None => value.parse::<f32>(),
    }
    .map_err(|e| format!("invalid value '{value}' for joint '{name}': {e}"))?;
    Ok((name.to_owned(), parsed))
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

fn open_session(
    config: Option<&Path>,
    file: &Path,
    joints: Vec<(String, f32)>,
) -> Result<ViewerSession<ObjLoader>> {
    let config = match config {
        Some(path) => ViewerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    let mut session = ViewerSession::new(config, ObjLoader);
    session
        .load(file)
        .with_context(|| format!("loading {}", file.display()))?;
    for (name, value) in joints {
        session.handle(InputEvent::joint(name, value))?;
    }
    Ok(session)
}

fn run_inspect(session: &ViewerSession<ObjLoader>, out: &mut impl Write) -> Result<()> {
    let Some(model) = session.model() else {
        return Ok(());
    };

    writeln!(out, "robot: {}", model.name)?;
    writeln!(
        out,
        "links: {}  joints: {}  materials: {}  dof: {}",
        model.link_count(),
        model.joint_count(),
        model.material_count(),
        model.dof()
    )?;
    writeln!(out, "root: {}", model.root().unwrap_or("-"))?;
    let unreachable = model.unreachable_links();
    if !unreachable.is_empty() {
        writeln!(out, "unreachable: {}", unreachable.join(", "))?;
    }

    let mut materials: Vec<_> = model.materials().collect();
    materials.sort_by(|a, b| a.name.cmp(&b.name));
    if !materials.is_empty() {
        writeln!(out, "\nmaterials:")?;
    }
    for material in materials {
        let [r, g, b, a] = material.color;
        writeln!(out, "  {:<24} [{r:.3}, {g:.3}, {b:.3}, {a:.3}]", material.name)?;
    }

    writeln!(out, "\njoint controls:")?;
    for control in session.joint_controls() {
        writeln!(
            out,
            "  {:<24} {:<10} [{:.4}, {:.4}]  value={:.4}",
            control.name,
            control.joint_type.as_str(),
            control.range.0,
            control.range.1,
            control.value
        )?;
    }

    writeln!(out, "\nlink positions:")?;
    if let Some(frame) = session.frame() {
        for pose in frame.poses() {
            let p = urdfview_kinematics::math::translation_of(&pose.world);
            let shape = pose
                .link
                .visual
                .as_ref()
                .map_or("-", |v| v.geometry.kind());
            writeln!(
                out,
                "  {:<24} [{:.4}, {:.4}, {:.4}]  {shape}",
                pose.link.name, p.x, p.y, p.z
            )?;
        }
    }

    let bounds = session.bounds();
    let camera = session.camera();
    let eye = camera.eye();
    writeln!(
        out,
        "\nbounds: center=[{:.4}, {:.4}, {:.4}] radius={:.4}",
        bounds.center.x, bounds.center.y, bounds.center.z, bounds.radius
    )?;
    writeln!(
        out,
        "camera: distance={:.4} yaw={:.1} pitch={:.1} eye=[{:.4}, {:.4}, {:.4}]",
        camera.distance, camera.yaw, camera.pitch, eye.x, eye.y, eye.z
    )?;
    Ok(())
}

fn run_draw(
    session: &mut ViewerSession<ObjLoader>,
    width: u32,
    height: u32,
    out: &mut impl Write,
) -> Result<usize> {
    session.resize(width, height);
    let mut backend = TextBackend::new(out);
    let issued = session.render(&mut backend);
    backend.finish().context("writing draw output")?;
    Ok(issued)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Inspect { file, joints } => {
            let session = open_session(cli.config.as_deref(), &file, joints)?;
            run_inspect(&session, &mut out)?;
        }
        Commands::Draw {
            file,
            joints,
            width,
            height,
        } => {
            let mut session = open_session(cli.config.as_deref(), &file, joints)?;
            let issued = run_draw(&mut session, width, height, &mut out)?;
            tracing::info!(draws = issued, "frame complete");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
