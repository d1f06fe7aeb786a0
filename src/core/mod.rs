//! Core data types for the allelic evidence pipeline.
//!
//! - [`SampleRole`](types::SampleRole): normal/tumor × DNA/RNA sample categories
//! - [`EventType`](types::EventType): event categories reported by SNV computation
//! - [`VariantKey`](types::VariantKey): chromosome, position, reference and alternate allele
//! - [`PipelineConfig`](config::PipelineConfig): validated configuration for one run
//!
//! ## Chromosome Order
//!
//! Loci are ordered by the fixed human contig order, not lexicographically:
//!
//! | Rank | Contigs |
//! |------|---------|
//! | 1-22 | autosomes, numerically |
//! | 23   | X |
//! | 24   | Y |
//! | 25   | M (also `MT`, `chrM`) |
//!
//! UCSC (`chr1`) and NCBI (`1`) names rank identically.

pub mod chrom;
pub mod config;
pub mod types;
