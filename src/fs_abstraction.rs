//! Filesystem abstraction layer for testability
//!
//! The hosts file is only touched through [`FileSystem`], so the
//! write/rollback paths can be exercised with `MockFileSystem` in tests.

use std::io;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

/// Trait abstracting filesystem operations for dependency injection.
///
/// # Example (testing)
/// ```ignore
/// use proxymanager::fs_abstraction::MockFileSystem;
///
/// let mut mock_fs = MockFileSystem::new();
/// mock_fs.expect_read_to_string()
///     .returning(|_| Ok("127.0.0.1 localhost\n".to_string()));
/// ```
#[cfg_attr(test, automock)]
pub trait FileSystem: Send + Sync {
    /// Read file contents as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write bytes to a file, creating it if it doesn't exist.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Real filesystem implementation using std::fs.
///
/// Writes go through `std::fs::write` rather than rename-into-place so the
/// inode is kept; `/etc/hosts` is often a bind mount.
#[derive(Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

static REAL_FS: RealFileSystem = RealFileSystem;

/// Get a reference to the global real filesystem instance.
pub fn real_fs() -> &'static RealFileSystem {
    &REAL_FS
}
