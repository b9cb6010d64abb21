//! RAII guard for an injected credential file.
//!
//! Parks any existing credential file at a backup path, writes generated
//! credentials in its place, and puts everything back exactly once.

use crate::error::{DepypiError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Owns a generated credential file until it is restored.
///
/// Call [`PypircGuard::restore`] on every path out of a publish operation. If
/// the guard is dropped without that (panic, early return) the restore runs
/// best-effort from `Drop`.
#[derive(Debug)]
pub struct PypircGuard {
    path: PathBuf,
    backup_path: PathBuf,
    had_original: bool,
    restored: bool,
}

impl PypircGuard {
    /// Back up `path` (if present) and write `contents` in its place
    pub fn inject(path: &Path, backup_path: &Path, contents: &str) -> Result<Self> {
        let had_original = path.is_file();
        if had_original {
            log::debug!("Backing up {} to {}", path.display(), backup_path.display());
            fs::rename(path, backup_path).map_err(|source| DepypiError::CredentialFile {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let mut guard = Self {
            path: path.to_path_buf(),
            backup_path: backup_path.to_path_buf(),
            had_original,
            restored: false,
        };

        if let Err(source) = write_private(path, contents) {
            // Nothing was generated; undo the backup before surfacing the error.
            guard.restored = true;
            if had_original && let Err(e) = fs::rename(backup_path, path) {
                log::error!(
                    "Failed to move {} back to {}: {}",
                    backup_path.display(),
                    path.display(),
                    e
                );
            } else if !had_original {
                let _ = fs::remove_file(path);
            }
            return Err(DepypiError::CredentialFile {
                path: path.to_path_buf(),
                source,
            });
        }

        log::info!("Injected temporary credentials into {}", path.display());
        Ok(guard)
    }

    /// Whether a credential file existed before injection
    pub fn had_original(&self) -> bool {
        self.had_original
    }

    /// Put the credential file back into its original state
    pub fn restore(mut self) -> Result<()> {
        self.restore_once()
    }

    fn restore_once(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        if self.had_original {
            log::debug!("Restoring {} from {}", self.path.display(), self.backup_path.display());
            fs::rename(&self.backup_path, &self.path).map_err(|source| {
                DepypiError::CredentialFile {
                    path: self.backup_path.clone(),
                    source,
                }
            })
        } else {
            log::debug!("Removing generated {}", self.path.display());
            match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(DepypiError::CredentialFile {
                    path: self.path.clone(),
                    source,
                }),
            }
        }
    }
}

impl Drop for PypircGuard {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        log::warn!(
            "Credential guard for {} dropped without restore; restoring now",
            self.path.display()
        );
        if let Err(e) = self.restore_once() {
            eprintln!("Warning: failed to restore {}: {}", self.path.display(), e);
        }
    }
}

fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}
