//! Pipeline orchestration.
//!
//! A run is a single forward pass through the stages below. Each stage's
//! output is the next stage's input, and only one stage runs at a time.
//!
//! | State         | Collaborator     | On failure |
//! |---------------|------------------|------------|
//! | `Filtering`   | `exonicFilter`   | use the unfiltered SNV file |
//! | `Counting`    | `readCounts`     | abort the run |
//! | `Computing`   | `snv_computation`| abort the run |
//! | `Summarizing` | (in-process)     | - |
//! | `Mapping`     | `circos`         | warn; results stay valid |
//!
//! Intermediate artifacts live in a [`Workspace`](workspace::Workspace) that
//! is created once per run and removed when the run ends, however it ends.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rna2dnalign::{Pipeline, PipelineConfig};
//! use std::path::PathBuf;
//!
//! let config = PipelineConfig::new(
//!     vec![PathBuf::from("pt01_NTex.vcf")],
//!     vec![PathBuf::from("pt01_NTex.bam"), PathBuf::from("pt01_TPtr.bam")],
//!     "results",
//! );
//! let report = Pipeline::new(config).run().unwrap();
//! println!("{} event records", report.total_events());
//! ```

pub mod orchestrator;
pub mod report;
pub mod stage;
pub mod summary;
pub mod workspace;

pub use orchestrator::{Pipeline, PipelineContext, PipelineError, PipelineState};
pub use report::RunReport;
pub use stage::{ProcessExecutor, Stage, StageError, StageExecutor, StageInvocation};
