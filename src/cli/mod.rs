//! Command-line interface for rna2dnalign.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **run**: Run the full pipeline (exon filter, read counts, SNV events, summary, map)
//! - **map**: Draw the allelic map from an existing read-count table
//!
//! ## Usage
//!
//! ```text
//! # Full pipeline with exonic filtering and an allelic map
//! rna2dnalign run -s pt01_*.vcf -r pt01_*.bam -e exons.txt -o results --map
//!
//! # Custom filename patterns
//! rna2dnalign run -s *.vcf -r *.bam -o results \
//!     --normaldnare GDNA --normaltransre NRNA --tumordnare SDNA --tumortransre TRNA
//!
//! # Map only, keeping the circos configuration
//! rna2dnalign map --counts results/readCounts.tsv -o results --save-conf
//!
//! # JSON report for scripting
//! rna2dnalign run -s pt01_NTex.vcf -r pt01_NTex.bam -o out --format json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::config::{MapOptions, RoleRegexes};

pub mod map;
pub mod run;

#[derive(Parser)]
#[command(name = "rna2dnalign")]
#[command(author = "HorvathLab")]
#[command(version)]
#[command(about = "Evaluate asymmetric allele distribution in matched DNA and RNA samples")]
#[command(
    long_about = "rna2dnalign evaluates evidence for asymmetric allele distribution in next-gen sequencing reads of DNA and RNA samples from the same individual.\n\nIt counts reads at each SNV locus in normal/tumor DNA and RNA alignments, reports RNA-editing, loss-of-heterozygosity, variant-specific expression/loss and somatic events, and can draw a circular allelic map with circos."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Report format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline on SNV and alignment files
    Run(run::RunArgs),

    /// Draw the allelic map from a read-count table
    Map(map::MapArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Filename matching options shared by all commands
#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Filename Matching")]
pub struct RegexArgs {
    /// Germline/normal DNA filename regular expression
    #[arg(long, default_value = "NTex")]
    pub normaldnare: String,

    /// Normal transcriptome filename regular expression
    #[arg(long, default_value = "NTtr")]
    pub normaltransre: String,

    /// Somatic/tumor DNA filename regular expression
    #[arg(long, default_value = "TPex")]
    pub tumordnare: String,

    /// Tumor transcriptome filename regular expression
    #[arg(long, default_value = "TPtr")]
    pub tumortransre: String,
}

impl From<RegexArgs> for RoleRegexes {
    fn from(args: RegexArgs) -> Self {
        RoleRegexes::new(
            args.normaldnare,
            args.normaltransre,
            args.tumordnare,
            args.tumortransre,
        )
    }
}

/// Allelic map options shared by `run --map` and `map`
#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Allelic Maps")]
pub struct AllelicMapArgs {
    /// Prefix for track files and the rendered map
    #[arg(long, default_value = "example")]
    pub sample_name: String,

    /// Save circos configuration and track files to the output directory
    #[arg(long)]
    pub save_conf: bool,

    /// Path to the circos executable (default: search PATH and ./circos*/bin)
    #[arg(long)]
    pub circos_path: Option<PathBuf>,
}

impl From<AllelicMapArgs> for MapOptions {
    fn from(args: AllelicMapArgs) -> Self {
        MapOptions {
            sample_name: args.sample_name,
            save_conf: args.save_conf,
            circos_path: args.circos_path,
        }
    }
}
