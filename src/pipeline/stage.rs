use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::config::{Annotations, ReadCountOptions, RoleRegexes, ToolPaths};
use crate::core::types::SampleRole;

/// External collaborator invoked by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ExonFilter,
    ReadCounts,
    SnvComputation,
    Render,
}

/// How a stage failure affects the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log and substitute the unprocessed input
    Soft,
    /// Abort the run
    Hard,
    /// Report as a warning, keep results produced so far
    BestEffort,
}

impl Stage {
    #[must_use]
    pub fn policy(self) -> FailurePolicy {
        match self {
            Self::ExonFilter => FailurePolicy::Soft,
            Self::ReadCounts | Self::SnvComputation => FailurePolicy::Hard,
            Self::Render => FailurePolicy::BestEffort,
        }
    }

    /// Whether an existing output file may stand in for a fresh invocation
    ///
    /// Only single-file stages qualify. SNV computation writes a variable
    /// set of event files and always runs.
    #[must_use]
    pub fn caches_output(self) -> bool {
        matches!(self, Self::ExonFilter | Self::ReadCounts)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExonFilter => write!(f, "exon filter"),
            Self::ReadCounts => write!(f, "read counting"),
            Self::SnvComputation => write!(f, "SNV computation"),
            Self::Render => write!(f, "circos rendering"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StageError {
    #[error("Failed to launch {stage} ({program}): {source}")]
    Launch {
        stage: Stage,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} exited with {status}: {detail}")]
    Failed {
        stage: Stage,
        status: String,
        detail: String,
    },

    #[error("{stage} completed but did not produce {}", .path.display())]
    MissingOutput { stage: Stage, path: PathBuf },
}

impl StageError {
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Launch { stage, .. }
            | Self::Failed { stage, .. }
            | Self::MissingOutput { stage, .. } => *stage,
        }
    }
}

/// One fully-constructed call to an external stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInvocation {
    pub stage: Stage,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Artifact the stage must leave behind on success
    pub output: PathBuf,
}

impl StageInvocation {
    pub fn new(stage: Stage, program: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            stage,
            program: program.into(),
            args: Vec::new(),
            output: output.into(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Value following `flag` in the argument list, if present
    #[must_use]
    pub fn value_of(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }

    /// Shell-style rendering of the command line for diagnostics
    #[must_use]
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|a| {
                let s = a.to_string_lossy();
                if s.is_empty() || s.contains(char::is_whitespace) {
                    format!("'{s}'")
                } else {
                    s.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs stage invocations
///
/// The pipeline only depends on this trait, so collaborators can be
/// replaced in tests or wrapped (e.g. to run under a scheduler).
pub trait StageExecutor {
    /// Run the invocation to completion
    ///
    /// # Errors
    ///
    /// Returns `StageError::Launch` if the program cannot be started and
    /// `StageError::Failed` if it exits unsuccessfully.
    fn execute(&self, invocation: &StageInvocation) -> Result<(), StageError>;
}

impl<E: StageExecutor + ?Sized> StageExecutor for &E {
    fn execute(&self, invocation: &StageInvocation) -> Result<(), StageError> {
        (**self).execute(invocation)
    }
}

/// Executes stages as child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl StageExecutor for ProcessExecutor {
    fn execute(&self, invocation: &StageInvocation) -> Result<(), StageError> {
        debug!("Running {}: {}", invocation.stage, invocation.display_command());

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()
            .map_err(|source| StageError::Launch {
                stage: invocation.stage,
                program: invocation.program.display().to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stdout.is_empty() {
            debug!("{} stdout:\n{stdout}", invocation.stage);
        }

        if output.status.success() {
            if !stderr.is_empty() {
                debug!("{} stderr:\n{stderr}", invocation.stage);
            }
            return Ok(());
        }

        let detail = if !stderr.is_empty() {
            stderr
        } else if !stdout.is_empty() {
            stdout
        } else {
            "no diagnostic output".to_string()
        };
        Err(StageError::Failed {
            stage: invocation.stage,
            status: output.status.to_string(),
            detail,
        })
    }
}

/// Result of a fail-soft stage
#[derive(Debug)]
pub enum StageOutcome {
    Completed(PathBuf),
    /// The stage failed and its input stands in for the output
    Substituted { fallback: PathBuf, error: StageError },
}

/// Applies caching and output checks around a [`StageExecutor`]
pub struct StageRunner<'a, E: ?Sized> {
    executor: &'a E,
    workspace: &'a Path,
}

impl<'a, E: StageExecutor + ?Sized> StageRunner<'a, E> {
    pub fn new(executor: &'a E, workspace: &'a Path) -> Self {
        Self {
            executor,
            workspace,
        }
    }

    /// Run a stage whose failure is returned to the caller
    ///
    /// A cacheable stage whose output already exists inside this workspace
    /// is not invoked again.
    ///
    /// # Errors
    ///
    /// Returns the executor's error, or `StageError::MissingOutput` if the
    /// stage reported success without producing its output.
    pub fn run(&self, invocation: &StageInvocation) -> Result<PathBuf, StageError> {
        if invocation.stage.caches_output()
            && invocation.output.starts_with(self.workspace)
            && invocation.output.is_file()
        {
            debug!(
                "Skipping {}: {} already present",
                invocation.stage,
                invocation.output.display()
            );
            return Ok(invocation.output.clone());
        }

        self.executor.execute(invocation)?;

        if !invocation.output.exists() {
            return Err(StageError::MissingOutput {
                stage: invocation.stage,
                path: invocation.output.clone(),
            });
        }
        Ok(invocation.output.clone())
    }

    /// Run a stage, substituting `fallback` for its output if it fails
    ///
    /// Substitution only applies to stages with [`FailurePolicy::Soft`].
    ///
    /// # Errors
    ///
    /// Returns the stage error unchanged for any other policy.
    pub fn run_or_substitute(
        &self,
        invocation: &StageInvocation,
        fallback: &Path,
    ) -> Result<StageOutcome, StageError> {
        match self.run(invocation) {
            Ok(path) => Ok(StageOutcome::Completed(path)),
            Err(error) if invocation.stage.policy() == FailurePolicy::Soft => {
                warn!(
                    "{error}; continuing with unfiltered {}",
                    fallback.display()
                );
                Ok(StageOutcome::Substituted {
                    fallback: fallback.to_path_buf(),
                    error,
                })
            }
            Err(error) => Err(error),
        }
    }
}

/// Exon filter call for one SNV file
pub fn exon_filter_invocation(
    tools: &ToolPaths,
    exon_coords: &Path,
    input: &Path,
    output: &Path,
) -> StageInvocation {
    StageInvocation::new(Stage::ExonFilter, &tools.exon_filter, output)
        .arg("--exons")
        .arg(exon_coords)
        .arg("--input")
        .arg(input)
        .arg("--output")
        .arg(output)
}

/// Output name for a filtered SNV file; VCF stays VCF, everything else is
/// written as TSV
///
/// The index keeps inputs with equal file names apart.
#[must_use]
pub fn filtered_file_name(index: usize, input: &Path) -> String {
    let stem = input
        .file_stem()
        .map_or_else(|| "snvs".into(), |s| s.to_string_lossy());
    let extension = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("vcf") => "vcf",
        _ => "tsv",
    };
    format!("{index}.{stem}.filtered.{extension}")
}

fn join_paths(paths: &[PathBuf]) -> OsString {
    let mut joined = OsString::new();
    for (i, path) in paths.iter().enumerate() {
        if i > 0 {
            joined.push(" ");
        }
        joined.push(path.as_os_str());
    }
    joined
}

/// Read-count call over every SNV and alignment file
///
/// File lists are passed as single space-separated arguments.
pub fn read_counts_invocation(
    tools: &ToolPaths,
    options: &ReadCountOptions,
    alignments: &[PathBuf],
    snvs: &[PathBuf],
    output: &Path,
) -> StageInvocation {
    let mut invocation = StageInvocation::new(Stage::ReadCounts, &tools.read_counts, output)
        .arg("-F")
        .arg("-r")
        .arg(join_paths(alignments))
        .arg("-s")
        .arg(join_paths(snvs))
        .arg("-o")
        .arg(output)
        .arg("-m")
        .arg(options.min_reads.to_string());
    if let Some(max) = options.max_reads {
        invocation = invocation.arg("-M").arg(max.to_string());
    }
    invocation = invocation.arg("-t").arg(options.threads_per_bam.to_string());
    if !options.alignment_filter {
        invocation = invocation.arg("-f");
    }
    if options.unique_reads {
        invocation = invocation.arg("-U");
    }
    if options.quiet {
        invocation = invocation.arg("-q");
    }
    invocation
}

/// SNV computation call; event files land next to `counts`
pub fn snv_computation_invocation(
    tools: &ToolPaths,
    counts: &Path,
    annotations: &Annotations,
    regexes: &RoleRegexes,
) -> StageInvocation {
    let event_dir = counts.parent().unwrap_or_else(|| Path::new("."));
    let mut invocation =
        StageInvocation::new(Stage::SnvComputation, &tools.snv_computation, event_dir)
            .arg("--counts")
            .arg(counts);
    if let Some(darned) = &annotations.darned {
        invocation = invocation.arg("--darned").arg(darned);
    }
    if let Some(cosmic) = &annotations.cosmic {
        invocation = invocation.arg("--cosmic").arg(cosmic);
    }
    for role in SampleRole::ALL {
        invocation = invocation
            .arg(format!("--{}", role.option_name()))
            .arg(regexes.get(role));
    }
    invocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    struct Recording {
        calls: RefCell<Vec<Stage>>,
        fail: bool,
    }

    impl StageExecutor for Recording {
        fn execute(&self, invocation: &StageInvocation) -> Result<(), StageError> {
            self.calls.borrow_mut().push(invocation.stage);
            if self.fail {
                return Err(StageError::Failed {
                    stage: invocation.stage,
                    status: "exit status: 1".to_string(),
                    detail: "boom".to_string(),
                });
            }
            fs::write(&invocation.output, "out").unwrap();
            Ok(())
        }
    }

    fn recording(fail: bool) -> Recording {
        Recording {
            calls: RefCell::new(Vec::new()),
            fail,
        }
    }

    #[test]
    fn test_read_counts_arguments() {
        let options = ReadCountOptions {
            max_reads: Some(0.95),
            alignment_filter: false,
            unique_reads: true,
            threads_per_bam: 4,
            ..ReadCountOptions::default()
        };
        let inv = read_counts_invocation(
            &ToolPaths::default(),
            &options,
            &[PathBuf::from("a_NTex.bam"), PathBuf::from("b_TPtr.bam")],
            &[PathBuf::from("s.vcf")],
            Path::new("/ws/readCounts.tsv"),
        );
        assert_eq!(inv.value_of("-r").unwrap(), "a_NTex.bam b_TPtr.bam");
        assert_eq!(inv.value_of("-s").unwrap(), "s.vcf");
        assert_eq!(inv.value_of("-m").unwrap(), "10");
        assert_eq!(inv.value_of("-M").unwrap(), "0.95");
        assert_eq!(inv.value_of("-t").unwrap(), "4");
        assert!(inv.args.iter().any(|a| a == "-f"));
        assert!(inv.args.iter().any(|a| a == "-U"));
        assert!(!inv.args.iter().any(|a| a == "-q"));
        assert_eq!(inv.args[0], "-F");
    }

    #[test]
    fn test_snv_computation_arguments() {
        let annotations = Annotations {
            darned: Some(PathBuf::from("darned.txt")),
            cosmic: None,
        };
        let inv = snv_computation_invocation(
            &ToolPaths::default(),
            Path::new("/ws/readCounts.tsv"),
            &annotations,
            &RoleRegexes::default(),
        );
        assert_eq!(inv.output, PathBuf::from("/ws"));
        assert_eq!(inv.value_of("--darned").unwrap(), "darned.txt");
        assert!(inv.value_of("--cosmic").is_none());
        assert_eq!(inv.value_of("--tumortransre").unwrap(), "TPtr");
    }

    #[test]
    fn test_filtered_file_name() {
        assert_eq!(
            filtered_file_name(0, Path::new("/in/pt_NTex.vcf")),
            "0.pt_NTex.filtered.vcf"
        );
        assert_eq!(
            filtered_file_name(3, Path::new("pt_TPtr.csv")),
            "3.pt_TPtr.filtered.tsv"
        );
    }

    #[test]
    fn test_display_command_quotes_spaces() {
        let inv = StageInvocation::new(Stage::ReadCounts, "readCounts", "out.tsv")
            .arg("-r")
            .arg("a.bam b.bam");
        assert_eq!(inv.display_command(), "readCounts -r 'a.bam b.bam'");
    }

    #[test]
    fn test_runner_skips_cached_output() {
        let ws = tempfile::tempdir().unwrap();
        let output = ws.path().join("readCounts.tsv");
        fs::write(&output, "cached").unwrap();

        let executor = recording(false);
        let runner = StageRunner::new(&executor, ws.path());
        let inv = StageInvocation::new(Stage::ReadCounts, "readCounts", &output);
        assert_eq!(runner.run(&inv).unwrap(), output);
        assert!(executor.calls.borrow().is_empty());
    }

    #[test]
    fn test_runner_does_not_cache_outside_workspace() {
        let ws = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let output = elsewhere.path().join("readCounts.tsv");
        fs::write(&output, "stale").unwrap();

        let executor = recording(false);
        let runner = StageRunner::new(&executor, ws.path());
        let inv = StageInvocation::new(Stage::ReadCounts, "readCounts", &output);
        runner.run(&inv).unwrap();
        assert_eq!(executor.calls.borrow().len(), 1);
    }

    #[test]
    fn test_runner_missing_output() {
        struct Silent;
        impl StageExecutor for Silent {
            fn execute(&self, _: &StageInvocation) -> Result<(), StageError> {
                Ok(())
            }
        }
        let ws = tempfile::tempdir().unwrap();
        let runner = StageRunner::new(&Silent, ws.path());
        let inv = StageInvocation::new(Stage::ReadCounts, "readCounts", ws.path().join("x.tsv"));
        assert!(matches!(
            runner.run(&inv),
            Err(StageError::MissingOutput {
                stage: Stage::ReadCounts,
                ..
            })
        ));
    }

    #[test]
    fn test_soft_stage_substitutes_input() {
        let ws = tempfile::tempdir().unwrap();
        let executor = recording(true);
        let runner = StageRunner::new(&executor, ws.path());
        let input = PathBuf::from("pt_NTex.vcf");
        let inv = exon_filter_invocation(
            &ToolPaths::default(),
            Path::new("exons.txt"),
            &input,
            &ws.path().join("0.pt_NTex.filtered.vcf"),
        );
        match runner.run_or_substitute(&inv, &input).unwrap() {
            StageOutcome::Substituted { fallback, error } => {
                assert_eq!(fallback, input);
                assert_eq!(error.stage(), Stage::ExonFilter);
            }
            StageOutcome::Completed(path) => panic!("expected substitution, got {}", path.display()),
        }
    }

    #[test]
    fn test_hard_stage_is_never_substituted() {
        let ws = tempfile::tempdir().unwrap();
        let executor = recording(true);
        let runner = StageRunner::new(&executor, ws.path());
        let snvs = PathBuf::from("pt_NTex.vcf");
        let inv = read_counts_invocation(
            &ToolPaths::default(),
            &ReadCountOptions::default(),
            &[PathBuf::from("pt_NTex.bam")],
            &[snvs.clone()],
            &ws.path().join("readCounts.tsv"),
        );
        match runner.run_or_substitute(&inv, &snvs) {
            Err(StageError::Failed { stage, detail, .. }) => {
                assert_eq!(stage, Stage::ReadCounts);
                assert_eq!(detail, "boom");
            }
            other => panic!("expected read counting failure, got {other:?}"),
        }
        assert_eq!(*executor.calls.borrow(), vec![Stage::ReadCounts]);
    }

    #[test]
    fn test_process_executor_missing_program() {
        let inv = StageInvocation::new(
            Stage::ReadCounts,
            "rna2dnalign-no-such-program",
            "out.tsv",
        );
        assert!(matches!(
            ProcessExecutor.execute(&inv),
            Err(StageError::Launch { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_executor_nonzero_exit() {
        let inv = StageInvocation::new(Stage::SnvComputation, "sh", ".")
            .arg("-c")
            .arg("echo bad counts >&2; exit 3");
        match ProcessExecutor.execute(&inv) {
            Err(StageError::Failed { detail, .. }) => assert_eq!(detail, "bad counts"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_policies() {
        assert_eq!(Stage::ExonFilter.policy(), FailurePolicy::Soft);
        assert_eq!(Stage::ReadCounts.policy(), FailurePolicy::Hard);
        assert_eq!(Stage::SnvComputation.policy(), FailurePolicy::Hard);
        assert_eq!(Stage::Render.policy(), FailurePolicy::BestEffort);
    }
}
