#![deny(unsafe_code)]
//! CLI binary for the mask-forge procedural mask engine.
//!
//! Subcommands:
//! - `generate` rasterize a shape or field, optionally onto an existing mask
//! - `resize` content-aware resize onto a target canvas
//! - `select` pick connected regions by position or area
//! - `compare` score two masks and optionally write their difference
//! - `transform` resize, rotate, offset and crop in one pass
//! - `list` print every accepted option name

mod error;

use std::fmt::Display;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use error::CliError;
use mask_forge_core::{
    AaQuality, AlignMode, BlendMode, CompareMetric, GenerateOptions, GradientKind, Interpolation,
    NoiseKind, ResizeBasis, ResizeOptions, SelectOptions, Selection, ShapeKind, SortDirection,
    TransformOptions,
};
use mask_forge_io::{read_png, write_png};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mask-forge", about = "Procedural raster mask CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a mask and write it as a PNG.
    Generate {
        /// Output file path.
        #[arg(short, long, default_value = "mask.png")]
        output: PathBuf,

        /// Existing mask to blend onto; its size overrides width/height.
        #[arg(short, long)]
        existing: Option<PathBuf>,

        /// Generation options as a JSON object (shape, width, feather, blend, ...).
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Resize a mask's content onto a target canvas.
    Resize {
        input: PathBuf,

        #[arg(short, long, default_value = "resized.png")]
        output: PathBuf,

        /// Resize options as a JSON object (target_width, basis, align, ...).
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Select connected regions from a mask.
    Select {
        input: PathBuf,

        #[arg(short, long, default_value = "selected.png")]
        output: PathBuf,

        /// Selection options as a JSON object (direction, selection, index, ...).
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Compare two masks.
    Compare {
        a: PathBuf,
        b: PathBuf,

        /// Metric name (difference, similarity, iou, dice).
        #[arg(short, long, default_value = "difference")]
        metric: String,

        /// Where to write the absolute difference mask.
        #[arg(long)]
        diff: Option<PathBuf>,
    },
    /// Resize, rotate, offset and crop a mask.
    Transform {
        input: PathBuf,

        #[arg(short, long, default_value = "transformed.png")]
        output: PathBuf,

        /// Transform options as a JSON object (resize, rotation, offset_x, crop, ...).
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// List accepted option names.
    List,
}

fn parse_params(raw: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))
}

fn names<T: Copy + Display>(all: &[T]) -> Vec<String> {
    all.iter().map(ToString::to_string).collect()
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let groups = [
                ("shape", names(ShapeKind::ALL)),
                ("aa_quality", names(AaQuality::ALL)),
                ("blend", names(BlendMode::ALL)),
                ("gradient", names(GradientKind::ALL)),
                ("noise", names(NoiseKind::ALL)),
                ("interpolation", names(Interpolation::ALL)),
                ("basis", names(ResizeBasis::ALL)),
                ("align", names(AlignMode::ALL)),
                ("direction", names(SortDirection::ALL)),
                ("metric", names(CompareMetric::ALL)),
            ];
            if cli.json {
                let info: serde_json::Map<String, Value> = groups
                    .into_iter()
                    .map(|(key, values)| (key.to_owned(), json!(values)))
                    .collect();
                print_json(&Value::Object(info))?;
            } else {
                for (key, values) in groups {
                    println!("{key}:");
                    println!("  {}", values.join(", "));
                }
            }
        }
        Command::Generate {
            output,
            existing,
            params,
        } => {
            let options = GenerateOptions::from_json(&parse_params(&params)?)?;
            debug!(?options, "parsed generate options");
            let existing = existing.as_deref().map(read_png).transpose()?;
            let generated = mask_forge_core::generate(&options, existing.as_ref())?;
            write_png(&generated.mask, &output)?;
            info!(output = %output.display(), area = generated.stats.area, "wrote mask");

            if cli.json {
                print_json(&json!({
                    "shape": options.shape.kind().name(),
                    "blend": options.blend.name(),
                    "stats": generated.stats,
                    "output": output.display().to_string(),
                }))?;
            } else {
                eprintln!(
                    "generated {} ({}x{}) -> {}",
                    options.shape.kind(),
                    generated.stats.width,
                    generated.stats.height,
                    output.display()
                );
                println!("{}", generated.stats);
            }
        }
        Command::Resize {
            input,
            output,
            params,
        } => {
            let options = ResizeOptions::from_json(&parse_params(&params)?)?;
            debug!(?options, "parsed resize options");
            let mask = read_png(&input)?;
            let resized = mask_forge_core::resize(&mask, &options)?;
            write_png(&resized.mask, &output)?;
            info!(output = %output.display(), scale = resized.scale, "wrote resized mask");

            if cli.json {
                print_json(&json!({
                    "actual_width": resized.actual_width,
                    "actual_height": resized.actual_height,
                    "offset_x": resized.offset_x,
                    "offset_y": resized.offset_y,
                    "content_width": resized.content_width,
                    "content_height": resized.content_height,
                    "scale": resized.scale,
                    "output": output.display().to_string(),
                }))?;
            } else {
                eprintln!(
                    "resized {}x{} content by {:.3} -> {}x{} at ({}, {}) -> {}",
                    resized.content_width,
                    resized.content_height,
                    resized.scale,
                    resized.actual_width,
                    resized.actual_height,
                    resized.offset_x,
                    resized.offset_y,
                    output.display()
                );
            }
        }
        Command::Select {
            input,
            output,
            params,
        } => {
            let options = SelectOptions::from_json(&parse_params(&params)?)?;
            debug!(?options, "parsed select options");
            let mask = read_png(&input)?;
            let selected = mask_forge_core::select(&mask, &options)?;
            write_png(&selected.mask, &output)?;
            info!(
                output = %output.display(),
                regions = selected.regions.len(),
                "wrote selection"
            );
            if let Some(warning) = &selected.warning {
                warn!("{warning}");
            }

            if cli.json {
                let regions: Vec<Value> = selected
                    .regions
                    .iter()
                    .map(|r| {
                        json!({
                            "bounds": r.bounds,
                            "centroid": [r.centroid.x, r.centroid.y],
                            "area": r.area,
                        })
                    })
                    .collect();
                print_json(&json!({
                    "direction": options.direction.name(),
                    "regions": regions,
                    "warning": selected.warning,
                    "output": output.display().to_string(),
                }))?;
            } else {
                eprintln!(
                    "selected {} of {} regions ({}) -> {}",
                    selected_count(&options, selected.regions.len()),
                    selected.regions.len(),
                    options.direction,
                    output.display()
                );
                for (i, r) in selected.regions.iter().enumerate() {
                    println!(
                        "  #{i}: area {} px, centroid ({:.1}, {:.1})",
                        r.area, r.centroid.x, r.centroid.y
                    );
                }
            }
        }
        Command::Compare { a, b, metric, diff } => {
            let metric: CompareMetric = metric.parse()?;
            let comparison = mask_forge_core::compare(&read_png(&a)?, &read_png(&b)?, metric)?;
            if let Some(path) = &diff {
                write_png(&comparison.diff, path)?;
                info!(output = %path.display(), "wrote difference mask");
            }

            if cli.json {
                print_json(&json!({
                    "metric": comparison.metric.name(),
                    "score": comparison.score,
                    "area_a": comparison.area_a,
                    "area_b": comparison.area_b,
                    "intersection": comparison.intersection,
                    "union": comparison.union,
                    "diff": diff.as_deref().map(|p| p.display().to_string()),
                }))?;
            } else {
                println!("{}: {:.4}", comparison.metric, comparison.score);
                println!(
                    "area a: {} px, area b: {} px, intersection: {} px, union: {} px",
                    comparison.area_a, comparison.area_b, comparison.intersection, comparison.union
                );
            }
        }
        Command::Transform {
            input,
            output,
            params,
        } => {
            let options = TransformOptions::from_json(&parse_params(&params)?)?;
            debug!(?options, "parsed transform options");
            let mask = read_png(&input)?;
            let transformed = mask_forge_core::transform(&mask, &options)?;
            write_png(&transformed.mask, &output)?;
            info!(
                output = %output.display(),
                steps = transformed.steps.len(),
                "wrote transformed mask"
            );

            if cli.json {
                print_json(&json!({
                    "steps": transformed.steps,
                    "stats": transformed.stats,
                    "output": output.display().to_string(),
                }))?;
            } else {
                for step in &transformed.steps {
                    eprintln!("  {step}");
                }
                eprintln!("transformed {} -> {}", input.display(), output.display());
                println!("{}", transformed.stats);
            }
        }
    }

    Ok(())
}

fn selected_count(options: &SelectOptions, available: usize) -> usize {
    match options.selection {
        Selection::Single(_) => available.min(1),
        Selection::All => available,
        Selection::TopN(n) => available.min(n),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let report = serde_json::to_string_pretty(&e.to_json()).unwrap_or_default();
            eprintln!("{report}");
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
