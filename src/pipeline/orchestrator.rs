use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classify::SampleClassifier;
use crate::core::config::{ConfigError, MapOptions, PipelineConfig};
use crate::core::types::SampleRole;
use crate::pipeline::report::RunReport;
use crate::pipeline::stage::{
    exon_filter_invocation, filtered_file_name, read_counts_invocation,
    snv_computation_invocation, ProcessExecutor, StageError, StageExecutor, StageOutcome,
    StageRunner,
};
use crate::pipeline::summary::{collect_event_tables, write_summary, EventTable, SUMMARY_FILE_NAME};
use crate::pipeline::workspace::{Workspace, WorkspaceError};
use crate::render::{generate_map, MapOutcome};

/// Name of the unified counts table, in the workspace and the output directory
pub const COUNTS_FILE_NAME: &str = "readCounts.tsv";

/// Position of a run in the forward-only stage sequence
///
/// `Failed` follows `Counting` or `Computing` when a fail-hard stage fails.
/// It also follows `Summarizing` when the summary cannot be written to the
/// output directory, since the run has no complete result to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    Filtering,
    Counting,
    Computing,
    Summarizing,
    Mapping,
    Done,
    Failed,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("Pipeline aborted: {0}")]
    Stage(#[from] StageError),

    #[error("IO error while {action}: {source}")]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Pipeline has already run")]
    AlreadyRun,
}

fn io_error(action: impl Into<String>) -> impl FnOnce(std::io::Error) -> PipelineError {
    let action = action.into();
    move |source| PipelineError::Io { action, source }
}

/// Mutable state threaded through one run
///
/// Owned by the orchestrator; stages receive copies of the fields they need.
#[derive(Debug)]
pub struct PipelineContext {
    pub config: PipelineConfig,
    /// SNV files for read counting (filtered where filtering succeeded)
    pub snv_files: Vec<PathBuf>,
    pub alignment_files: Vec<PathBuf>,
    pub workspace: PathBuf,
    pub filter_fallbacks: Vec<PathBuf>,
}

impl PipelineContext {
    fn new(config: PipelineConfig, workspace: &Path) -> Self {
        Self {
            snv_files: config.snv_files.clone(),
            alignment_files: config.alignment_files.clone(),
            config,
            workspace: workspace.to_path_buf(),
            filter_fallbacks: Vec::new(),
        }
    }
}

/// Products of the stages, assembled into a [`RunReport`]
struct Products {
    counts_table: PathBuf,
    events: Vec<EventTable>,
    summary_file: PathBuf,
    map: MapOutcome,
}

/// Single-pass orchestrator for one pipeline run
///
/// ```text
/// Init → [Filtering] → Counting → Computing → Summarizing → [Mapping] → Done
///                         └──────────┴───────────┴──→ Failed
/// ```
pub struct Pipeline<E = ProcessExecutor> {
    config: Option<PipelineConfig>,
    executor: E,
    workspace_parent: Option<PathBuf>,
    history: Vec<PipelineState>,
}

impl Pipeline<ProcessExecutor> {
    /// Pipeline that runs each stage as an external process
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_executor(config, ProcessExecutor)
    }
}

impl<E: StageExecutor> Pipeline<E> {
    pub fn with_executor(config: PipelineConfig, executor: E) -> Self {
        Self {
            config: Some(config),
            executor,
            workspace_parent: None,
            history: vec![PipelineState::Init],
        }
    }

    /// Create the workspace under `parent` instead of the system temp dir
    #[must_use]
    pub fn workspace_in(mut self, parent: impl Into<PathBuf>) -> Self {
        self.workspace_parent = Some(parent.into());
        self
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.history
            .last()
            .copied()
            .unwrap_or(PipelineState::Init)
    }

    /// Every state visited so far, in order
    #[must_use]
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("{:?} -> {next:?}", self.state());
        self.history.push(next);
    }

    /// Validate the configuration and run every stage
    ///
    /// The workspace is removed (or preserved, if configured) whether the run
    /// succeeds or fails.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Config` before any stage runs if the
    /// configuration is invalid, `PipelineError::Stage` if read counting
    /// or SNV computation fails, and `PipelineError::Io` if results cannot
    /// be written to the output directory. Exon filter and rendering
    /// failures are not errors.
    pub fn run(&mut self) -> Result<RunReport, PipelineError> {
        let config = self.config.take().ok_or(PipelineError::AlreadyRun)?;
        let started_at = Utc::now();

        let classifier = config.validate()?;
        log_roles(&classifier, &config);

        fs::create_dir_all(&config.output_dir).map_err(io_error(format!(
            "creating output directory {}",
            config.output_dir.display()
        )))?;

        let mut workspace = match &self.workspace_parent {
            Some(parent) => Workspace::acquire_in(parent, config.keep_workspace)?,
            None => Workspace::acquire(config.keep_workspace)?,
        };
        let mut ctx = PipelineContext::new(config, workspace.path());

        let result = self.execute(&mut ctx, &classifier);
        if let Err(e) = &result {
            warn!("{e}");
            self.transition(PipelineState::Failed);
        }

        let preserved = workspace.release().unwrap_or_else(|e| {
            warn!("{e}");
            None
        });

        let products = result?;
        info!("Pipeline complete; results in {}", ctx.config.output_dir.display());

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            states: self.history.clone(),
            output_dir: ctx.config.output_dir.clone(),
            counts_table: products.counts_table,
            events: products.events,
            summary_file: products.summary_file,
            filter_fallbacks: ctx.filter_fallbacks,
            map: products.map,
            workspace: preserved,
        })
    }

    fn execute(
        &mut self,
        ctx: &mut PipelineContext,
        classifier: &SampleClassifier,
    ) -> Result<Products, PipelineError> {
        if let Some(exon_coords) = ctx.config.exon_coords.clone() {
            self.transition(PipelineState::Filtering);
            self.filter(ctx, &exon_coords)?;
        }

        self.transition(PipelineState::Counting);
        let workspace_counts = self.count(ctx)?;
        let counts_table = copy_to_output(&workspace_counts, &ctx.config.output_dir)?;

        self.transition(PipelineState::Computing);
        let events = self.compute(ctx, &workspace_counts)?;

        self.transition(PipelineState::Summarizing);
        let summary_file = ctx.config.output_dir.join(SUMMARY_FILE_NAME);
        write_summary(&events, &summary_file)
            .map_err(io_error(format!("writing {}", summary_file.display())))?;
        info!(
            "Summarized {} event records from {} event tables",
            events.iter().map(|e| e.records).sum::<usize>(),
            events.len()
        );

        let map = match ctx.config.map.clone() {
            Some(options) => {
                self.transition(PipelineState::Mapping);
                self.map(ctx, &workspace_counts, classifier, &options)
            }
            None => MapOutcome::Skipped,
        };

        self.transition(PipelineState::Done);
        Ok(Products {
            counts_table,
            events,
            summary_file,
            map,
        })
    }

    /// Exon-filter each SNV file; a failure keeps that file unfiltered
    fn filter(&self, ctx: &mut PipelineContext, exon_coords: &Path) -> Result<(), PipelineError> {
        info!(
            "Filtering {} SNV files by exon coordinates",
            ctx.snv_files.len()
        );
        let runner = StageRunner::new(&self.executor, &ctx.workspace);
        let mut filtered = Vec::with_capacity(ctx.snv_files.len());

        for (index, input) in ctx.snv_files.iter().enumerate() {
            let output = ctx.workspace.join(filtered_file_name(index, input));
            let invocation = exon_filter_invocation(&ctx.config.tools, exon_coords, input, &output);
            match runner.run_or_substitute(&invocation, input)? {
                StageOutcome::Completed(path) => filtered.push(path),
                StageOutcome::Substituted { fallback, .. } => {
                    ctx.filter_fallbacks.push(fallback.clone());
                    filtered.push(fallback);
                }
            }
        }

        ctx.snv_files = filtered;
        Ok(())
    }

    fn count(&self, ctx: &PipelineContext) -> Result<PathBuf, PipelineError> {
        info!(
            "Counting reads at SNV loci in {} alignment files",
            ctx.alignment_files.len()
        );
        let output = ctx.workspace.join(COUNTS_FILE_NAME);
        let invocation = read_counts_invocation(
            &ctx.config.tools,
            &ctx.config.read_counts,
            &ctx.alignment_files,
            &ctx.snv_files,
            &output,
        );
        Ok(StageRunner::new(&self.executor, &ctx.workspace).run(&invocation)?)
    }

    /// Run SNV computation and copy the event tables it produced
    fn compute(
        &self,
        ctx: &PipelineContext,
        counts: &Path,
    ) -> Result<Vec<EventTable>, PipelineError> {
        info!("Computing SNV events");
        let invocation = snv_computation_invocation(
            &ctx.config.tools,
            counts,
            &ctx.config.annotations,
            &ctx.config.regexes,
        );
        StageRunner::new(&self.executor, &ctx.workspace).run(&invocation)?;

        let found = collect_event_tables(&ctx.workspace)
            .map_err(io_error("reading event tables"))?;
        let mut copied = Vec::with_capacity(found.len());
        for table in found {
            let path = copy_to_output(&table.path, &ctx.config.output_dir)?;
            copied.push(EventTable { path, ..table });
        }
        if copied.is_empty() {
            info!("No events were reported");
        }
        Ok(copied)
    }

    fn map(
        &self,
        ctx: &PipelineContext,
        counts: &Path,
        classifier: &SampleClassifier,
        options: &MapOptions,
    ) -> MapOutcome {
        info!("Generating allelic map");
        match generate_map(
            &self.executor,
            counts,
            &ctx.config.output_dir,
            classifier,
            options,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Allelic map not generated: {e}");
                MapOutcome::Warning {
                    message: e.to_string(),
                    command: None,
                }
            }
        }
    }
}

fn copy_to_output(path: &Path, output_dir: &Path) -> Result<PathBuf, PipelineError> {
    let name = path.file_name().unwrap_or(path.as_os_str());
    let dest = output_dir.join(name);
    fs::copy(path, &dest).map_err(io_error(format!(
        "copying {} to {}",
        path.display(),
        output_dir.display()
    )))?;
    Ok(dest)
}

fn log_roles(classifier: &SampleClassifier, config: &PipelineConfig) {
    // Already validated, so partitioning cannot fail here.
    let Ok(by_role) = classifier.partition(&config.alignment_files) else {
        return;
    };
    for role in SampleRole::ALL {
        match by_role.get(&role) {
            Some(files) => debug!("{role}: {} alignment files", files.len()),
            None => debug!("{role}: no alignment files"),
        }
    }
}
