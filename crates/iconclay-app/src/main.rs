//! IconClay command-line shell.
//!
//! Exports `.clay` projects to SVG, wraps rasterized PNGs into ICO
//! containers and inspects project files.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use iconclay_core::project::PROJECT_EXTENSION;
use iconclay_core::style::material_presets;
use iconclay_core::{Editor, ElementKind, ProjectFile, Scene};
use iconclay_render::{ClayRenderer, convert_png_file, write_scene_svg};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "iconclay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Claymorphic icon designer", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a project as a single SVG document
    Svg {
        /// Project file
        project: PathBuf,

        /// Output path (defaults to the project path with an .svg extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Wrap a PNG image in an ICO container
    Ico {
        /// PNG image
        png: PathBuf,

        /// Output path (defaults to the image path with an .ico extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a summary of a project
    Info {
        /// Project file
        project: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a project holding one shape
    New {
        /// Output project path
        path: PathBuf,

        /// Shape type (rectangle, circle, rounded, squircle, triangle, star, hexagon, text, icon)
        #[arg(short, long, default_value = "rounded")]
        shape: String,

        /// Material preset id
        #[arg(short, long)]
        preset: Option<String>,
    },

    /// List material presets
    Presets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Svg { project, output } => {
            let output = output.unwrap_or_else(|| project.with_extension("svg"));
            export_svg(&project, &output)?;
            println!("{}", output.display());
        }
        Commands::Ico { png, output } => {
            let output = output.unwrap_or_else(|| png.with_extension("ico"));
            let (width, height) = convert_png_file(&png, &output)
                .with_context(|| format!("Failed to convert {}", png.display()))?;
            if width > 256 || height > 256 {
                log::warn!("{width}x{height} exceeds 256 pixels; stored as 0 in the directory entry");
            }
            println!("{}", output.display());
        }
        Commands::Info { project, json } => {
            let file = read_project(&project)?;
            let summary = summarize(&file);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for (key, value) in summary.as_object().into_iter().flatten() {
                    println!("{key}: {value}");
                }
            }
        }
        Commands::New { path, shape, preset } => {
            new_project(&path, &shape, preset.as_deref())?;
            println!("{}", path.display());
        }
        Commands::Presets => {
            for preset in material_presets() {
                println!("{:<16} {}", preset.id, preset.name);
            }
        }
    }

    Ok(())
}

#[cfg(feature = "native")]
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

#[cfg(not(feature = "native"))]
fn init_logging(_verbose: bool) {}

fn read_project(path: &Path) -> Result<ProjectFile> {
    if path.extension().is_some_and(|ext| ext != PROJECT_EXTENSION) {
        log::warn!("{} does not have a .{PROJECT_EXTENSION} extension", path.display());
    }
    ProjectFile::read(path).with_context(|| format!("Failed to read project {}", path.display()))
}

fn export_svg(project: &Path, output: &Path) -> Result<()> {
    let file = read_project(project)?;
    let settings = file.settings_over(&Default::default());
    let scene = Scene::from_elements(file.elements);
    write_scene_svg(output, &scene, &settings, &ClayRenderer::default())
        .with_context(|| format!("Failed to export {}", output.display()))
}

fn summarize(file: &ProjectFile) -> serde_json::Value {
    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for element in &file.elements {
        *kinds.entry(element.kind.label()).or_default() += 1;
    }
    let settings = file.settings_over(&Default::default());
    serde_json::json!({
        "version": file.version,
        "canvas": format!("{}x{}", settings.canvas_size.width, settings.canvas_size.height),
        "background": if settings.transparent_background { "transparent".to_string() } else { settings.background_color.to_string() },
        "elements": file.elements.len(),
        "kinds": kinds,
        "masked": file.elements.iter().filter(|el| el.mask_id.is_some()).count(),
        "unions": file.elements.iter().filter(|el| el.is_folder() && el.merge).count(),
    })
}

fn new_project(path: &Path, shape: &str, preset: Option<&str>) -> Result<()> {
    let kind: ElementKind = serde_json::from_value(serde_json::Value::String(shape.to_lowercase()))
        .with_context(|| format!("Unknown shape type `{shape}`"))?;
    if kind == ElementKind::Folder {
        bail!("A new project cannot start with an empty folder");
    }

    let mut editor = Editor::new();
    editor.add_element(kind);
    if let Some(preset) = preset {
        if !editor.apply_preset(preset) {
            bail!("Unknown preset `{preset}`");
        }
    }
    editor
        .to_project()
        .write(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
