//! File-based locking to prevent concurrent execution.
//!
//! Uses flock-style advisory locking so two invocations never interleave
//! their read-modify-write cycles on the hosts file.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::debug;

use crate::error::LbError;

/// A guard that holds an exclusive lock on the lock file.
/// The lock is automatically released when the guard is dropped.
#[derive(Debug)]
pub struct LockGuard {
    _file: File,
}

impl LockGuard {
    /// Attempt to acquire an exclusive lock without blocking.
    ///
    /// Opens with create+read+write (no truncate) to avoid a race between
    /// file creation and lock acquisition.
    pub fn acquire(lock_path: &Path) -> Result<Self, LbError> {
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).ok();
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|e| LbError::io(lock_path, e))?;

        fs::set_permissions(lock_path, fs::Permissions::from_mode(0o600))
            .map_err(|e| LbError::io(lock_path, e))?;

        file.try_lock_exclusive()
            .map_err(|_| LbError::Locked(lock_path.to_path_buf()))?;

        debug!("Acquired lock {}", lock_path.display());
        Ok(Self { _file: file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_acquire_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("proxymanager.lock");

        let guard = LockGuard::acquire(&path).unwrap();
        drop(guard);
        LockGuard::acquire(&path).unwrap();
    }

    #[test]
    fn test_lock_is_exclusive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("proxymanager.lock");

        let _guard = LockGuard::acquire(&path).unwrap();
        let err = LockGuard::acquire(&path).unwrap_err();
        assert!(matches!(err, LbError::Locked(_)));
    }

    #[test]
    fn test_lock_file_permissions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run/proxymanager.lock");

        let _guard = LockGuard::acquire(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
