//! vtkseq CLI - import VTK frame sequences and inspect single frames.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use vtkseq::color::ColorMapping;
use vtkseq::geom::extract_faces;
use vtkseq::import::{FrameSource, ImportReport, ImportSettings, Importer, JsonScene};
use vtkseq::util::Axis;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("VTKSEQ_BUILD_DATE"),
    " ",
    env!("VTKSEQ_BUILD_TIME"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "vtkseq", version = VERSION, about = "VTK frame sequence importer")]
struct Cli {
    /// Show debug output (-vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a frame sequence and write the animated scene as JSON.
    #[command(visible_alias = "i")]
    Import(ImportArgs),
    /// Parse one file and print its contents.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct ImportArgs {
    /// Directory holding `<stem><n>.<ext>` frames.
    #[arg(conflicts_with = "files")]
    dir: Option<PathBuf>,

    /// First frame number.
    #[arg(long)]
    start: Option<u32>,

    /// Last frame number, inclusive. Without it the directory is scanned.
    #[arg(long)]
    end: Option<u32>,

    /// Explicit frame files, in order.
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Output scene JSON.
    #[arg(short, long, default_value = "scene.json")]
    output: PathBuf,

    /// Settings JSON (defaults to the user config file).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// File name stem.
    #[arg(long)]
    stem: Option<String>,

    /// File extension.
    #[arg(long)]
    ext: Option<String>,

    /// Uniform scale applied to positions.
    #[arg(long)]
    scale: Option<f32>,

    /// Source forward axis (X, Y, Z, -X, -Y, -Z).
    #[arg(long, allow_hyphen_values = true)]
    forward: Option<Axis>,

    /// Source up axis.
    #[arg(long, allow_hyphen_values = true)]
    up: Option<Axis>,

    /// Disable smooth shading.
    #[arg(long)]
    flat: bool,

    /// Smoothing angle in degrees.
    #[arg(long)]
    angle: Option<f32>,

    /// Process frames one at a time.
    #[arg(long)]
    sequential: bool,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// VTK file.
    file: PathBuf,
}

#[cfg(feature = "chrome-trace")]
type TraceGuard = tracing_chrome::FlushGuard;
#[cfg(not(feature = "chrome-trace"))]
type TraceGuard = ();

/// Install the fmt subscriber. `RUST_LOG` overrides the verbosity flags.
/// With `chrome-trace` and `VTKSEQ_TRACE=1` a Chrome trace is written to
/// `trace.json` as well.
fn init_tracing(verbose: u8, quiet: bool) -> Option<TraceGuard> {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let fmt = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter).with(fmt);

    #[cfg(feature = "chrome-trace")]
    if std::env::var("VTKSEQ_TRACE").ok().as_deref() == Some("1") {
        let (chrome, guard) = tracing_chrome::ChromeLayerBuilder::new()
            .file("trace.json")
            .build();
        registry.with(chrome).init();
        return Some(guard);
    }

    registry.init();
    None
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose, cli.quiet);

    match cli.cmd {
        Command::Import(args) => cmd_import(args, cli.quiet),
        Command::Info(args) => cmd_info(&args.file),
    }
}

fn load_settings(args: &ImportArgs) -> anyhow::Result<ImportSettings> {
    let mut settings = match &args.settings {
        Some(path) => ImportSettings::from_file(path)
            .with_context(|| format!("read settings '{}'", path.display()))?,
        None => ImportSettings::load(),
    };

    if let Some(dir) = &args.dir {
        settings.directory = Some(dir.clone());
    }
    if let Some(start) = args.start {
        settings.start_frame = start;
    }
    if args.end.is_some() {
        settings.end_frame = args.end;
    }
    if let Some(stem) = &args.stem {
        settings.file_stem = stem.clone();
    }
    if let Some(ext) = &args.ext {
        settings.extension = ext.clone();
    }
    if let Some(scale) = args.scale {
        settings.scale_factor = scale;
    }
    if let Some(forward) = args.forward {
        settings.axis_forward = forward;
    }
    if let Some(up) = args.up {
        settings.axis_up = up;
    }
    if args.flat {
        settings.smooth_shading = false;
    }
    if let Some(angle) = args.angle {
        settings.smooth_angle = angle;
    }
    if args.sequential {
        settings.parallel = false;
    }
    Ok(settings)
}

fn cmd_import(args: ImportArgs, quiet: bool) -> anyhow::Result<()> {
    let settings = load_settings(&args)?;
    let importer = Importer::new(settings).context("invalid import settings")?;

    let source = if args.files.is_empty() {
        importer
            .settings_source()
            .context("no input directory given")?
    } else {
        FrameSource::Files(args.files.clone())
    };

    let report = importer.import(&source)?;
    if !quiet {
        print_report(&report);
    }

    let mut scene = JsonScene::new();
    report.document.realize(&mut scene)?;
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    scene
        .write(&args.output)
        .with_context(|| format!("write scene '{}'", args.output.display()))?;

    eprintln!("wrote {}", args.output.display());
    Ok(())
}

fn print_report(report: &ImportReport) {
    let doc = &report.document;
    for frame in 1..=report.requested() {
        if let Some(entry) = doc.frame(frame) {
            let mesh = &entry.mesh;
            let path = mesh
                .source_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!(
                "  {:>5}  ok      {:>8} verts {:>8} faces {:>2} fields  {}",
                frame,
                mesh.num_vertices(),
                mesh.num_faces(),
                entry.color_mappings.len(),
                path
            );
        } else if let Some(failure) = report.failures.iter().find(|f| f.frame == frame) {
            println!(
                "  {:>5}  FAILED  [{:?}] {}",
                frame,
                failure.error.kind(),
                failure.error
            );
        }
    }
    for warning in &report.warnings {
        println!("  {:>5}  warning {}", warning.frame, warning.error);
    }
    println!();
    println!(
        "Imported {} of {} frames ({} failed)",
        report.imported(),
        report.requested(),
        report.failures.len()
    );
}

fn cmd_info(path: &Path) -> anyhow::Result<()> {
    let frame = vtkseq::vtk::read_frame(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let header = &frame.header;
    let geometry = &frame.geometry;
    let faces = extract_faces(&geometry.cells);

    println!("File:     {}", path.display());
    println!("Version:  {}", header.version);
    println!("Title:    {}", header.title);
    println!("Encoding: {:?}", header.encoding);
    println!("Dataset:  {:?}", header.dataset);
    println!();
    println!("Points: {}", geometry.num_points());
    println!("Cells:  {}", geometry.num_cells());
    println!("Faces:  {}", faces.len());

    let unsupported = geometry
        .cells
        .iter()
        .filter(|c| !c.cell_type.is_supported())
        .count();
    if unsupported > 0 {
        println!("Skipped cells: {}", unsupported);
    }

    if !frame.attributes.is_empty() {
        println!();
        println!("Point attributes:");
        for attr in &frame.attributes {
            match ColorMapping::from_attribute(attr) {
                Some(m) => println!(
                    "  {:<24} scalar    [{}, {}]",
                    attr.name, m.min, m.max
                ),
                None => println!(
                    "  {:<24} vector{:<3} {} tuples",
                    attr.name,
                    attr.arity.components(),
                    attr.num_tuples()
                ),
            }
        }
    }
    Ok(())
}
