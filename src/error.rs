//! Error types for proxymanager.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad category of an [`LbError`], used to pick exit status and severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidState,
    InvalidInput,
    Io,
    Reload,
    RollbackFailed,
}

#[derive(Error, Debug)]
pub enum LbError {
    #[error("Cluster '{0}' does not exist.")]
    ClusterNotFound(String),

    #[error("Host '{0}' does not exist.")]
    HostNotFound(String),

    #[error("Host '{host}' does not exist in cluster '{cluster}'.")]
    HostNotInCluster { host: String, cluster: String },

    #[error("Cluster '{0}' already exists.")]
    ClusterExists(String),

    #[error("Host '{0}' exists in hosts file.")]
    HostExists(String),

    #[error("IP Address '{ip}' already exists in cluster '{cluster}'.")]
    IpInUse { ip: String, cluster: String },

    #[error("Can't move traffic from '{0}' to itself.")]
    SelfMove(String),

    #[error("Host '{0}' is already disabled.")]
    AlreadyDisabled(String),

    #[error("Host '{host}' is already handling traffic for: {absorbed}.")]
    AlreadyAbsorbing { host: String, absorbed: String },

    #[error("Host '{0}' is disabled and can't take traffic.")]
    TargetDisabled(String),

    #[error("Host '{0}' is already enabled.")]
    AlreadyEnabled(String),

    #[error("No host is holding traffic for '{0}'.")]
    HolderNotFound(String),

    #[error("Node count is {hosts} on cluster '{cluster}'. Remove canceled.")]
    NonEmptyCluster { cluster: String, hosts: usize },

    #[error("Cluster '{0}' has no end marker.")]
    UnterminatedBlock(String),

    #[error("Malformed host entry: '{0}'")]
    MalformedEntry(String),

    #[error("{0}")]
    Validation(String),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Another instance is already running (lock held on {}).", .0.display())]
    Locked(PathBuf),

    #[error("Nginx issue: {0}. Hosts file restored.")]
    Reload(String),

    #[error(
        "CRITICAL: nginx issue ({reason}) and restoring {} failed: {source}. \
         The hosts file may be inconsistent; fix it before restarting nginx.",
        path.display()
    )]
    RollbackFailed {
        reason: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LbError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ClusterNotFound(_) | Self::HostNotFound(_) | Self::HostNotInCluster { .. } => {
                ErrorKind::NotFound
            }
            Self::ClusterExists(_) | Self::HostExists(_) | Self::IpInUse { .. } => {
                ErrorKind::Conflict
            }
            Self::SelfMove(_)
            | Self::AlreadyDisabled(_)
            | Self::AlreadyAbsorbing { .. }
            | Self::TargetDisabled(_)
            | Self::AlreadyEnabled(_)
            | Self::HolderNotFound(_)
            | Self::NonEmptyCluster { .. } => ErrorKind::InvalidState,
            Self::UnterminatedBlock(_) | Self::MalformedEntry(_) | Self::Validation(_) => {
                ErrorKind::InvalidInput
            }
            Self::Io { .. } | Self::Locked(_) => ErrorKind::Io,
            Self::Reload(_) => ErrorKind::Reload,
            Self::RollbackFailed { .. } => ErrorKind::RollbackFailed,
        }
    }

    /// True when the hosts file may have been left in a state nginx rejects.
    pub fn is_critical(&self) -> bool {
        self.kind() == ErrorKind::RollbackFailed
    }
}
