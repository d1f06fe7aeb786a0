//! Allelic map generation with circos.
//!
//! Map generation is best-effort: the tabular results of a run are complete
//! without it, so a missing circos installation or a failed render is
//! reported as a [`MapOutcome::Warning`] together with the command line that
//! would have produced the map.
//!
//! ## Steps
//!
//! 1. Build the four per-role tracks from the counts table
//! 2. Write tracks and circos configuration into a scratch directory (or the
//!    output directory with `--save-conf`)
//! 3. Locate circos, clear images from an earlier render and run it; report
//!    `<prefix>.AllelicMap.png`/`.svg`

pub mod circos;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::classify::SampleClassifier;
use crate::core::config::MapOptions;
use crate::pipeline::stage::StageExecutor;
use crate::tracks::{AllelicTracks, TrackError};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to build allelic tracks: {0}")]
    Tracks(#[from] TrackError),

    #[error("Failed to prepare circos configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// What happened to the requested map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MapOutcome {
    /// Map generation was not requested
    Skipped,
    Rendered {
        png: Option<PathBuf>,
        svg: Option<PathBuf>,
    },
    /// The map could not be produced; results are otherwise complete
    Warning {
        message: String,
        command: Option<String>,
    },
}

/// Build tracks from `counts` and render the allelic map into `output_dir`
///
/// # Errors
///
/// Returns `RenderError::Tracks` if the counts table cannot be read or a row
/// cannot be assigned a role, and `RenderError::Io` if the configuration
/// directory cannot be prepared or an earlier image cannot be removed. Problems with circos itself are not errors;
/// they come back as [`MapOutcome::Warning`].
pub fn generate_map<E: StageExecutor + ?Sized>(
    executor: &E,
    counts: &Path,
    output_dir: &Path,
    classifier: &SampleClassifier,
    options: &MapOptions,
) -> Result<MapOutcome, RenderError> {
    let tracks = AllelicTracks::from_counts_file(counts, classifier)?;

    // Dropped (and removed) once rendering has finished.
    let scratch;
    let conf_dir = if options.save_conf {
        output_dir
    } else {
        scratch = tempfile::Builder::new()
            .prefix("rna2dnalign-circos.")
            .tempdir()?;
        scratch.path()
    };

    tracks.write_tracks(conf_dir, &options.sample_name)?;
    circos::write_config(conf_dir)?;

    let script = circos::locate_circos(options.circos_path.as_deref());
    let invocation =
        circos::render_invocation(script.as_deref(), conf_dir, &options.sample_name, output_dir);
    let command = invocation.display_command();

    if script.is_none() {
        warn!("Unable to locate circos. Circos command:\n{command}");
        return Ok(MapOutcome::Warning {
            message: "Unable to locate circos".to_string(),
            command: Some(command),
        });
    }

    circos::remove_stale_images(output_dir, &options.sample_name)?;
    info!("Running circos...");
    if let Err(e) = executor.execute(&invocation) {
        warn!("{e}\nCircos command:\n{command}");
        return Ok(MapOutcome::Warning {
            message: e.to_string(),
            command: Some(command),
        });
    }

    let (png, svg) = circos::rendered_images(output_dir, &options.sample_name);
    if png.is_none() && svg.is_none() {
        warn!("Circos completed without writing an image. Circos command:\n{command}");
        return Ok(MapOutcome::Warning {
            message: "circos completed without writing an image".to_string(),
            command: Some(command),
        });
    }
    info!("Circos complete.");
    for image in png.iter().chain(svg.iter()) {
        info!("{}", image.display());
    }
    Ok(MapOutcome::Rendered { png, svg })
}
