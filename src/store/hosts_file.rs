//! Reading, writing and committing the hosts file.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::error::LbError;
use crate::fs_abstraction::FileSystem;
use crate::reload::{validate_and_reload, Reloader};

/// The persisted hosts file, accessed through a [`FileSystem`].
pub struct HostsFile<'a> {
    path: PathBuf,
    fs: &'a dyn FileSystem,
}

impl<'a> HostsFile<'a> {
    pub fn new(path: impl Into<PathBuf>, fs: &'a dyn FileSystem) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_lines(&self) -> Result<Vec<String>, LbError> {
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| LbError::io(&self.path, e))?;
        Ok(content.lines().map(str::to_owned).collect())
    }

    /// Write `lines`, each terminated by a newline.
    pub fn write_lines(&self, lines: &[String]) -> Result<(), LbError> {
        let mut content = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        self.fs
            .write(&self.path, content.as_bytes())
            .map_err(|e| LbError::io(&self.path, e))
    }

    /// Persist `updated` and have the reloader accept it.
    ///
    /// If the write or the reload fails, `backup` is written back and the
    /// failure is returned as [`LbError::Reload`] (or [`LbError::Io`] for a
    /// failed write). If writing `backup` also fails the result is
    /// [`LbError::RollbackFailed`].
    pub async fn commit(
        &self,
        backup: &[String],
        updated: &[String],
        reloader: &dyn Reloader,
    ) -> Result<(), LbError> {
        debug!(
            "Writing {} lines to {}",
            updated.len(),
            self.path.display()
        );

        let failure = match self.write_lines(updated) {
            Ok(()) => match validate_and_reload(reloader).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            },
            Err(e) => e,
        };

        debug!("Commit failed: {}", failure);
        info!("Restoring {}...", self.path.display());

        match self.write_lines(backup) {
            Ok(()) => {
                info!("Hosts file successfully restored");
                Err(failure)
            }
            Err(rollback) => {
                error!("Failed to restore {}: {}", self.path.display(), rollback);
                let source = match rollback {
                    LbError::Io { source, .. } => source,
                    other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
                };
                let reason = match failure {
                    LbError::Reload(msg) => msg,
                    other => other.to_string(),
                };
                Err(LbError::RollbackFailed {
                    reason,
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }
}
