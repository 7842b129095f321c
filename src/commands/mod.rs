//! CLI command implementations.
//!
//! Every command gets a [`Context`] describing where the hosts file lives
//! and who must accept changes to it, and returns the one-line result that
//! `main` prints.

pub mod lb;

use std::path::PathBuf;

use crate::error::LbError;
use crate::lock::LockGuard;
use crate::registry::{decode, encode, Registry};
use crate::reload::Reloader;
use crate::store::{find_block, replace_block, Block, HostsFile};

/// Everything a command needs besides its arguments.
pub struct Context<'a> {
    pub hosts: HostsFile<'a>,
    pub reloader: &'a dyn Reloader,
    pub lock_file: PathBuf,
}

impl<'a> Context<'a> {
    pub fn new(hosts: HostsFile<'a>, reloader: &'a dyn Reloader, lock_file: PathBuf) -> Self {
        Self {
            hosts,
            reloader,
            lock_file,
        }
    }

    /// Take the exclusive lock for a read-modify-write cycle.
    pub fn lock(&self) -> Result<LockGuard, LbError> {
        LockGuard::acquire(&self.lock_file)
    }

    /// Read the hosts file and decode `cluster`'s block.
    pub(crate) fn load_cluster(&self, cluster: &str) -> Result<ClusterSnapshot, LbError> {
        let lines = self.hosts.read_lines()?;
        let block = find_block(&lines, cluster)?;
        let registry = decode(block.entries(&lines))?;
        Ok(ClusterSnapshot {
            lines,
            block,
            registry,
        })
    }

    /// Write `registry` back into the snapshot's block and commit it, using
    /// the snapshot as the rollback copy.
    pub(crate) async fn save_cluster(
        &self,
        snapshot: &ClusterSnapshot,
        registry: &Registry,
    ) -> Result<(), LbError> {
        let updated = replace_block(&snapshot.lines, snapshot.block, encode(registry));
        self.hosts
            .commit(&snapshot.lines, &updated, self.reloader)
            .await
    }
}

/// The hosts file as read, plus one cluster's block and its registry.
pub(crate) struct ClusterSnapshot {
    pub lines: Vec<String>,
    pub block: Block,
    pub registry: Registry,
}
