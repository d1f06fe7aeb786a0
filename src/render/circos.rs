use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::pipeline::stage::{Stage, StageInvocation};

/// Circos configuration files, embedded at compile time (checked by build.rs)
pub const CONFIG_FILES: [(&str, &str); 6] = [
    ("circos.conf", include_str!("../../circos/circos.conf")),
    ("ticks.conf", include_str!("../../circos/ticks.conf")),
    ("ideogram.conf", include_str!("../../circos/ideogram.conf")),
    (
        "ideogram.label.conf",
        include_str!("../../circos/ideogram.label.conf"),
    ),
    (
        "ideogram.position.conf",
        include_str!("../../circos/ideogram.position.conf"),
    ),
    ("bands.conf", include_str!("../../circos/bands.conf")),
];

/// Main configuration file passed to `-conf`
pub const MAIN_CONFIG: &str = "circos.conf";

const CIRCOS_EXECUTABLE: &str = "circos";

/// Write every configuration file into `dir`
///
/// # Errors
///
/// Returns an IO error if a file cannot be written.
pub fn write_config(dir: &Path) -> io::Result<()> {
    for (name, content) in CONFIG_FILES {
        fs::write(dir.join(name), content)?;
    }
    Ok(())
}

/// Base name (without extension) of the rendered image
#[must_use]
pub fn image_stem(sample_name: &str) -> String {
    format!("{sample_name}.AllelicMap")
}

/// Search `PATH` for an executable file name
fn which(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Look for exactly one unpacked `circos*/bin/circos` under `dir`
fn find_local_install(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("circos"))
        .map(|e| e.path().join("bin").join("circos"))
        .filter(|p| p.is_file())
        .collect();
    if found.len() == 1 {
        found.pop()
    } else {
        None
    }
}

/// Locate the circos script
///
/// An explicit path is used only if it exists. Otherwise `circos` is looked
/// up on `PATH`, then as a single unpacked distribution in the current
/// directory.
#[must_use]
pub fn locate_circos(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.is_file().then(|| absolutize(path));
    }
    which(CIRCOS_EXECUTABLE).or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|cwd| find_local_install(&cwd))
            .map(|p| absolutize(&p))
    })
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    }
}

/// Build the render invocation
///
/// A located circos script is run through `perl`; when none was found the
/// invocation names bare `circos` so it can be shown to the user.
pub fn render_invocation(
    circos: Option<&Path>,
    conf_dir: &Path,
    sample_name: &str,
    output_dir: &Path,
) -> StageInvocation {
    let stem = image_stem(sample_name);
    let invocation = match circos {
        Some(script) => StageInvocation::new(Stage::Render, "perl", output_dir).arg(script),
        None => StageInvocation::new(Stage::Render, CIRCOS_EXECUTABLE, output_dir),
    };
    invocation
        .arg("-conf")
        .arg(conf_dir.join(MAIN_CONFIG))
        .arg("-param")
        .arg(format!("sample_name={sample_name}"))
        .arg("-outputdir")
        .arg(output_dir)
        .arg("-outputfile")
        .arg(OsStr::new(&stem))
}

/// Rendered images present in `output_dir`
#[must_use]
pub fn rendered_images(output_dir: &Path, sample_name: &str) -> (Option<PathBuf>, Option<PathBuf>) {
    let stem = image_stem(sample_name);
    let png = output_dir.join(format!("{stem}.png"));
    let svg = output_dir.join(format!("{stem}.svg"));
    (png.is_file().then_some(png), svg.is_file().then_some(svg))
}

/// Remove images an earlier render left in `output_dir`
///
/// # Errors
///
/// Returns any I/O error other than a missing file.
pub fn remove_stale_images(output_dir: &Path, sample_name: &str) -> io::Result<()> {
    let stem = image_stem(sample_name);
    for extension in ["png", "svg"] {
        match fs::remove_file(output_dir.join(format!("{stem}.{extension}"))) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
            _ => {}
        }
    }
    Ok(())
}
