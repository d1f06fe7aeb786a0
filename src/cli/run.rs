use std::path::PathBuf;

use clap::Args;

use crate::cli::{AllelicMapArgs, OutputFormat, RegexArgs};
use crate::core::config::{
    Annotations, MapOptions, PipelineConfig, ReadCountOptions, ToolPaths,
};
use crate::pipeline::{Pipeline, RunReport};
use crate::render::MapOutcome;

#[derive(Args)]
pub struct RunArgs {
    /// Single-nucleotide-variant files (VCF, CSV, TSV, ...)
    #[arg(short = 's', long = "snvs", required = true, num_args = 1..)]
    pub snvs: Vec<PathBuf>,

    /// Read alignment files in indexed BAM format
    #[arg(short = 'r', long = "readalignments", required = true, num_args = 1..)]
    pub alignments: Vec<PathBuf>,

    /// Output folder
    #[arg(short, long)]
    pub output: PathBuf,

    /// Exon coordinates for SNV filtering
    #[arg(short = 'e', long = "exoncoords", help_heading = "Filtering")]
    pub exon_coords: Option<PathBuf>,

    // === Read counting ===
    /// Minimum number of good reads at SNV locus per alignment file
    #[arg(short = 'm', long = "minreads", default_value = "10", help_heading = "Read Counting")]
    pub min_reads: u32,

    /// Scale read counts at high-coverage loci to at most this many good
    /// reads per alignment file. Values greater than 1 are absolute read
    /// counts, otherwise a coverage distribution percentile.
    #[arg(short = 'M', long = "maxreads", help_heading = "Read Counting")]
    pub max_reads: Option<f64>,

    /// Turn off alignment filtering by length, edits, etc.
    #[arg(long = "no-alignment-filter", help_heading = "Read Counting")]
    pub no_alignment_filter: bool,

    /// Consider only distinct reads
    #[arg(short = 'U', long = "uniquereads", help_heading = "Read Counting")]
    pub unique_reads: bool,

    /// Worker threads per alignment file; 0 disables threading
    #[arg(short = 't', long = "threadsperbam", default_value = "1", help_heading = "Read Counting")]
    pub threads_per_bam: u32,

    #[command(flatten)]
    pub regexes: RegexArgs,

    // === SNV annotation ===
    /// DARNED annotations
    #[arg(short = 'd', long, help_heading = "SNV Annotation")]
    pub darned: Option<PathBuf>,

    /// COSMIC annotations
    #[arg(short = 'c', long, help_heading = "SNV Annotation")]
    pub cosmic: Option<PathBuf>,

    /// Generate the circular allelic map with circos
    #[arg(long = "map", help_heading = "Allelic Maps")]
    pub generate_map: bool,

    #[command(flatten)]
    pub map: AllelicMapArgs,

    // === Advanced ===
    /// Keep the intermediate workspace and report its location
    #[arg(long, help_heading = "Advanced")]
    pub keep_workspace: bool,

    /// Exon filter executable
    #[arg(long, default_value = "exonicFilter", help_heading = "Advanced")]
    pub exon_filter_bin: PathBuf,

    /// Read counting executable
    #[arg(long, default_value = "readCounts", help_heading = "Advanced")]
    pub read_counts_bin: PathBuf,

    /// SNV computation executable
    #[arg(long, default_value = "snv_computation", help_heading = "Advanced")]
    pub snv_computation_bin: PathBuf,
}

impl RunArgs {
    /// Build the pipeline configuration; `quiet` is forwarded to read counting
    #[must_use]
    pub fn into_config(self, quiet: bool) -> PipelineConfig {
        PipelineConfig {
            snv_files: self.snvs,
            alignment_files: self.alignments,
            output_dir: self.output,
            exon_coords: self.exon_coords,
            regexes: self.regexes.into(),
            read_counts: ReadCountOptions {
                min_reads: self.min_reads,
                max_reads: self.max_reads,
                alignment_filter: !self.no_alignment_filter,
                unique_reads: self.unique_reads,
                threads_per_bam: self.threads_per_bam,
                quiet,
            },
            annotations: Annotations {
                darned: self.darned,
                cosmic: self.cosmic,
            },
            map: self.generate_map.then(|| MapOptions::from(self.map)),
            tools: ToolPaths {
                exon_filter: self.exon_filter_bin,
                read_counts: self.read_counts_bin,
                snv_computation: self.snv_computation_bin,
            },
            keep_workspace: self.keep_workspace,
        }
    }
}

/// Execute run subcommand
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a fail-hard stage
/// fails.
pub fn run(args: RunArgs, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    let config = args.into_config(quiet);
    let report = Pipeline::new(config).run()?;

    match format {
        OutputFormat::Text => print_text_report(&report),
        OutputFormat::Json => print_json_report(&report)?,
        OutputFormat::Tsv => print_tsv_report(&report),
    }

    Ok(())
}

fn print_text_report(report: &RunReport) {
    println!("RNA2DNAlign Results");
    println!("{}", "=".repeat(60));

    println!("\nOutput: {}", report.output_dir.display());
    println!("  Read counts: {}", report.counts_table.display());
    println!("  Summary: {}", report.summary_file.display());

    if !report.filter_fallbacks.is_empty() {
        println!("\nExon filter failed; used unfiltered:");
        for path in &report.filter_fallbacks {
            println!("  - {}", path.display());
        }
    }

    println!("\nEvents:");
    if report.events.is_empty() {
        println!("  (none)");
    }
    for table in &report.events {
        println!("  {:<8} {:>8}  {}", table.event.code(), table.records, table.path.display());
    }
    println!("  {:<8} {:>8}", "Total", report.total_events());

    print_map_outcome(&report.map);

    if let Some(workspace) = &report.workspace {
        println!("\nIntermediate files: {}", workspace.display());
    }

    let elapsed = report.elapsed();
    println!(
        "\nCompleted in {}.{:03}s",
        elapsed.num_seconds(),
        elapsed.num_milliseconds() % 1000
    );
}

pub(crate) fn print_map_outcome(outcome: &MapOutcome) {
    match outcome {
        MapOutcome::Skipped => {}
        MapOutcome::Rendered { png, svg } => {
            println!("\nAllelic map:");
            for image in png.iter().chain(svg.iter()) {
                println!("  {}", image.display());
            }
        }
        MapOutcome::Warning { message, command } => {
            println!("\nAllelic map: not generated ({message})");
            if let Some(command) = command {
                println!("  Circos command:");
                println!("  {command}");
            }
        }
    }
}

fn print_json_report(report: &RunReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_tsv_report(report: &RunReport) {
    println!("event\trecords\tpath");
    for table in &report.events {
        println!(
            "{}\t{}\t{}",
            table.event.code(),
            table.records,
            table.path.display()
        );
    }
}
