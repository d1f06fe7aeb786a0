//! # rna2dnalign
//!
//! Evaluates evidence for asymmetric allele distribution in sequencing reads
//! of DNA and RNA samples from the same individual.
//!
//! Given single-nucleotide-variant (SNV) files and read alignments for up to
//! four samples (normal DNA, normal RNA, tumor DNA, tumor RNA), a run counts
//! reference and variant reads at every SNV locus and reports the loci that
//! show one of the following events:
//!
//! - **RNA editing**: variant present only in the transcriptome (`RNAed`, `T-RNAed`)
//! - **Variant-specific expression / loss**: allele imbalance between DNA and RNA
//!   (`VSE`, `T-VSE`, `VSL`, `T-VSL`)
//! - **Loss of heterozygosity**: `LOH`
//! - **Somatic variants**: `SOM`, `SOM-E`, `SOM-L`
//!
//! Read counting and event computation are performed by external programs;
//! this crate orchestrates them, cleans up after them, merges their outputs
//! into a summary, and optionally draws a circular allelic map with circos.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rna2dnalign::{Pipeline, PipelineConfig, PipelineState};
//! use std::path::PathBuf;
//!
//! let mut config = PipelineConfig::new(
//!     vec![PathBuf::from("pt01_NTex.vcf"), PathBuf::from("pt01_TPex.vcf")],
//!     vec![PathBuf::from("pt01_NTex.bam"), PathBuf::from("pt01_TPtr.bam")],
//!     "results",
//! );
//! config.exon_coords = Some(PathBuf::from("exons.txt"));
//!
//! let mut pipeline = Pipeline::new(config);
//! let report = pipeline.run().unwrap();
//! assert_eq!(pipeline.state(), PipelineState::Done);
//!
//! for table in &report.events {
//!     println!("{}: {} records", table.event, table.records);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Sample roles, event types, chromosome ordering, configuration
//! - [`classify`]: Filename-to-role classification
//! - [`pipeline`]: Stage orchestration, workspace, summary
//! - [`tracks`]: Allelic track building from read-count tables
//! - [`render`]: Circos configuration and map rendering
//! - [`cli`]: Command-line interface implementation

pub mod classify;
pub mod cli;
pub mod core;
pub mod pipeline;
pub mod render;
pub mod tracks;

// Re-export commonly used types for convenience
pub use classify::SampleClassifier;
pub use core::config::PipelineConfig;
pub use core::types::*;
pub use pipeline::{Pipeline, PipelineError, PipelineState, RunReport};
pub use render::MapOutcome;
pub use tracks::AllelicTracks;
