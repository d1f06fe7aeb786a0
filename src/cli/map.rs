use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use tracing::{info, warn};

use crate::classify::SampleClassifier;
use crate::cli::run::print_map_outcome;
use crate::cli::{AllelicMapArgs, OutputFormat, RegexArgs};
use crate::core::config::{MapOptions, RoleRegexes};
use crate::pipeline::ProcessExecutor;
use crate::render::{generate_map, MapOutcome};

#[derive(Args)]
pub struct MapArgs {
    /// Read-count table produced by a previous run (plain or gzipped)
    #[arg(long, required = true)]
    pub counts: PathBuf,

    /// Output folder for the rendered map
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub regexes: RegexArgs,

    #[command(flatten)]
    pub map: AllelicMapArgs,

    /// Open the rendered PNG in the system viewer
    #[arg(long)]
    pub open: bool,
}

/// Execute map subcommand
///
/// # Errors
///
/// Returns an error if the counts table is missing or malformed, a row
/// cannot be assigned a sample role, or the output directory cannot be
/// written. A missing or failing circos is reported, not returned.
pub fn run(args: MapArgs, format: OutputFormat) -> anyhow::Result<()> {
    if !args.counts.is_file() {
        bail!("Read-count table not found: {}", args.counts.display());
    }

    std::fs::create_dir_all(&args.output).with_context(|| {
        format!("Failed to create output directory {}", args.output.display())
    })?;

    let regexes = RoleRegexes::from(args.regexes);
    let classifier = SampleClassifier::new(&regexes)?;
    let options = MapOptions::from(args.map);

    info!("Drawing allelic map from {}", args.counts.display());
    let outcome = generate_map(
        &ProcessExecutor,
        &args.counts,
        &args.output,
        &classifier,
        &options,
    )?;

    match format {
        OutputFormat::Text => print_map_outcome(&outcome),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Tsv => print_tsv_outcome(&outcome),
    }

    if args.open {
        match &outcome {
            MapOutcome::Rendered { png: Some(png), .. } => {
                if let Err(e) = open::that(png) {
                    warn!("Failed to open {}: {e}", png.display());
                }
            }
            _ => warn!("No PNG image to open"),
        }
    }

    Ok(())
}

fn print_tsv_outcome(outcome: &MapOutcome) {
    println!("status\tpath");
    match outcome {
        MapOutcome::Skipped => println!("skipped\t"),
        MapOutcome::Rendered { png, svg } => {
            for image in png.iter().chain(svg.iter()) {
                println!("rendered\t{}", image.display());
            }
        }
        MapOutcome::Warning { .. } => println!("warning\t"),
    }
}
