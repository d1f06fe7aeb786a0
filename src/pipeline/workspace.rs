use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Failed to create workspace: {0}")]
    Create(#[source] std::io::Error),

    #[error("Failed to remove workspace {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Scoped directory for intermediate artifacts of one pipeline run
///
/// The directory is removed by [`Workspace::release`], or on drop if
/// release was never reached (early return or unwinding). With `keep` set
/// the directory is left in place and its path reported instead.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
    keep: bool,
}

impl Workspace {
    const PREFIX: &'static str = "rna2dnalign.";

    /// Create a fresh, uniquely named directory in the system temp dir
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Create` if the directory cannot be created.
    pub fn acquire(keep: bool) -> Result<Self, WorkspaceError> {
        let dir = tempfile::Builder::new()
            .prefix(Self::PREFIX)
            .tempdir()
            .map_err(WorkspaceError::Create)?;
        Ok(Self::from_dir(dir, keep))
    }

    /// Create a fresh, uniquely named directory under `parent`
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Create` if the directory cannot be created.
    pub fn acquire_in(parent: &Path, keep: bool) -> Result<Self, WorkspaceError> {
        let dir = tempfile::Builder::new()
            .prefix(Self::PREFIX)
            .tempdir_in(parent)
            .map_err(WorkspaceError::Create)?;
        Ok(Self::from_dir(dir, keep))
    }

    fn from_dir(dir: TempDir, keep: bool) -> Self {
        let path = dir.path().to_path_buf();
        debug!("Acquired workspace {}", path.display());
        Self {
            dir: Some(dir),
            path,
            keep,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory, or hand it over when it is being kept
    ///
    /// Returns the preserved path when `keep` is set. Calling release again,
    /// or on a directory someone else already removed, is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Remove` if the directory exists but cannot be
    /// removed.
    pub fn release(&mut self) -> Result<Option<PathBuf>, WorkspaceError> {
        let Some(dir) = self.dir.take() else {
            return Ok(self.keep.then(|| self.path.clone()));
        };

        if self.keep {
            let path = dir.keep();
            info!("Intermediate files kept in {}", path.display());
            return Ok(Some(path));
        }

        if !self.path.exists() {
            let _ = dir.keep();
            return Ok(None);
        }

        match dir.close() {
            Ok(()) => {
                debug!("Removed workspace {}", self.path.display());
                Ok(None)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(WorkspaceError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.dir.is_some() {
            if let Err(e) = self.release() {
                warn!("{e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_creates_empty_directory() {
        let parent = tempfile::tempdir().unwrap();
        let ws = Workspace::acquire_in(parent.path(), false).unwrap();
        assert!(ws.path().is_dir());
        assert_eq!(std::fs::read_dir(ws.path()).unwrap().count(), 0);
        assert!(ws
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("rna2dnalign."));
    }

    #[test]
    fn test_each_acquire_is_unique() {
        let parent = tempfile::tempdir().unwrap();
        let a = Workspace::acquire_in(parent.path(), false).unwrap();
        let b = Workspace::acquire_in(parent.path(), false).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_release_removes_contents_and_is_idempotent() {
        let parent = tempfile::tempdir().unwrap();
        let mut ws = Workspace::acquire_in(parent.path(), false).unwrap();
        let path = ws.path().to_path_buf();
        std::fs::create_dir(path.join("nested")).unwrap();
        std::fs::write(path.join("nested/readCounts.tsv"), "x").unwrap();

        assert_eq!(ws.release().unwrap(), None);
        assert!(!path.exists());
        assert_eq!(ws.release().unwrap(), None);
    }

    #[test]
    fn test_release_tolerates_missing_directory() {
        let parent = tempfile::tempdir().unwrap();
        let mut ws = Workspace::acquire_in(parent.path(), false).unwrap();
        std::fs::remove_dir_all(ws.path()).unwrap();
        assert!(ws.release().is_ok());
    }

    #[test]
    fn test_keep_preserves_directory() {
        let parent = tempfile::tempdir().unwrap();
        let mut ws = Workspace::acquire_in(parent.path(), true).unwrap();
        let path = ws.path().to_path_buf();
        assert_eq!(ws.release().unwrap(), Some(path.clone()));
        assert!(path.is_dir());
        drop(ws);
        assert!(path.is_dir());
    }

    #[test]
    fn test_drop_removes_directory() {
        let parent = tempfile::tempdir().unwrap();
        let path = {
            let ws = Workspace::acquire_in(parent.path(), false).unwrap();
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_unwind_removes_directory() {
        let parent = tempfile::tempdir().unwrap();
        let parent_path = parent.path().to_path_buf();
        let result = std::panic::catch_unwind(move || {
            let _ws = Workspace::acquire_in(&parent_path, false).unwrap();
            panic!("stage crashed");
        });
        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }
}
