use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::classify::{ClassifyError, SampleClassifier};
use crate::core::types::SampleRole;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No {0} provided")]
    MissingInput(&'static str),

    #[error("{what} not found: {}", .path.display())]
    FileNotFound { what: &'static str, path: PathBuf },

    #[error("Output path exists and is not a directory: {}", .0.display())]
    OutputNotDirectory(PathBuf),

    #[error("Invalid value for --{option}: {reason}")]
    InvalidValue { option: &'static str, reason: String },

    #[error("{}: {source}", .path.display())]
    Classification {
        path: PathBuf,
        #[source]
        source: ClassifyError,
    },

    #[error(transparent)]
    Regex(#[from] ClassifyError),
}

/// Filename regular expressions for the four sample roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRegexes {
    pub normal_dna: String,
    pub normal_rna: String,
    pub tumor_dna: String,
    pub tumor_rna: String,
}

impl RoleRegexes {
    pub fn new(
        normal_dna: impl Into<String>,
        normal_rna: impl Into<String>,
        tumor_dna: impl Into<String>,
        tumor_rna: impl Into<String>,
    ) -> Self {
        Self {
            normal_dna: normal_dna.into(),
            normal_rna: normal_rna.into(),
            tumor_dna: tumor_dna.into(),
            tumor_rna: tumor_rna.into(),
        }
    }

    #[must_use]
    pub fn get(&self, role: SampleRole) -> &str {
        match role {
            SampleRole::NormalDna => &self.normal_dna,
            SampleRole::NormalRna => &self.normal_rna,
            SampleRole::TumorDna => &self.tumor_dna,
            SampleRole::TumorRna => &self.tumor_rna,
        }
    }
}

impl Default for RoleRegexes {
    fn default() -> Self {
        Self::new("NTex", "NTtr", "TPex", "TPtr")
    }
}

/// Thresholds and toggles forwarded to the read-count stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadCountOptions {
    /// Minimum good reads at an SNV locus per alignment file
    pub min_reads: u32,
    /// Above 1: absolute read cap. At or below 1: coverage percentile.
    pub max_reads: Option<f64>,
    pub alignment_filter: bool,
    pub unique_reads: bool,
    /// Worker threads per alignment file, 0 disables threading
    pub threads_per_bam: u32,
    pub quiet: bool,
}

impl Default for ReadCountOptions {
    fn default() -> Self {
        Self {
            min_reads: 10,
            max_reads: None,
            alignment_filter: true,
            unique_reads: false,
            threads_per_bam: 1,
            quiet: false,
        }
    }
}

/// Optional annotation files for SNV computation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    pub darned: Option<PathBuf>,
    pub cosmic: Option<PathBuf>,
}

/// Allelic map generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapOptions {
    /// Prefix for track files and the rendered image
    pub sample_name: String,
    /// Write circos configuration and tracks to the output directory
    pub save_conf: bool,
    pub circos_path: Option<PathBuf>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            sample_name: "example".to_string(),
            save_conf: false,
            circos_path: None,
        }
    }
}

/// Executables for the external stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolPaths {
    pub exon_filter: PathBuf,
    pub read_counts: PathBuf,
    pub snv_computation: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            exon_filter: PathBuf::from("exonicFilter"),
            read_counts: PathBuf::from("readCounts"),
            snv_computation: PathBuf::from("snv_computation"),
        }
    }
}

/// Complete configuration for one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub snv_files: Vec<PathBuf>,
    pub alignment_files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Enables exonic filtering of the SNV files
    pub exon_coords: Option<PathBuf>,
    pub regexes: RoleRegexes,
    pub read_counts: ReadCountOptions,
    pub annotations: Annotations,
    /// `Some` when map generation was requested
    pub map: Option<MapOptions>,
    pub tools: ToolPaths,
    /// Skip workspace removal and report its path instead
    pub keep_workspace: bool,
}

impl PipelineConfig {
    pub fn new(
        snv_files: Vec<PathBuf>,
        alignment_files: Vec<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            snv_files,
            alignment_files,
            output_dir: output_dir.into(),
            exon_coords: None,
            regexes: RoleRegexes::default(),
            read_counts: ReadCountOptions::default(),
            annotations: Annotations::default(),
            map: None,
            tools: ToolPaths::default(),
            keep_workspace: false,
        }
    }

    /// Check the configuration before any stage runs
    ///
    /// Returns the compiled classifier so later stages reuse the same
    /// patterns that validated the inputs.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for missing inputs, inputs that do not exist,
    /// out-of-range values, invalid regexes, or any input file whose name
    /// matches zero or several role regexes.
    pub fn validate(&self) -> Result<SampleClassifier, ConfigError> {
        if self.snv_files.is_empty() {
            return Err(ConfigError::MissingInput("SNV files"));
        }
        if self.alignment_files.is_empty() {
            return Err(ConfigError::MissingInput("read alignment files"));
        }

        for path in &self.snv_files {
            require_file("SNV file", path)?;
        }
        for path in &self.alignment_files {
            require_file("Read alignment file", path)?;
        }
        if let Some(path) = &self.exon_coords {
            require_file("Exon coordinates file", path)?;
        }
        if let Some(path) = &self.annotations.darned {
            require_file("DARNED annotation file", path)?;
        }
        if let Some(path) = &self.annotations.cosmic {
            require_file("COSMIC annotation file", path)?;
        }

        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(ConfigError::OutputNotDirectory(self.output_dir.clone()));
        }

        if let Some(max) = self.read_counts.max_reads {
            if !(max.is_finite() && max > 0.0) {
                return Err(ConfigError::InvalidValue {
                    option: "maxreads",
                    reason: format!("{max} is not a positive number"),
                });
            }
        }

        if let Some(map) = &self.map {
            if map.sample_name.trim().is_empty() || map.sample_name.contains(['/', '\\']) {
                return Err(ConfigError::InvalidValue {
                    option: "sample-name",
                    reason: format!("'{}' is not a usable file prefix", map.sample_name),
                });
            }
        }

        let classifier = SampleClassifier::new(&self.regexes)?;
        for path in self.snv_files.iter().chain(&self.alignment_files) {
            classifier
                .classify_path(path)
                .map_err(|source| ConfigError::Classification {
                    path: path.clone(),
                    source,
                })?;
        }

        Ok(classifier)
    }
}

fn require_file(what: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::FileNotFound {
            what,
            path: path.to_path_buf(),
        })
    }
}
