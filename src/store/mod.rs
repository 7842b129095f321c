//! Cluster block storage in the hosts file.
//!
//! [`block`] holds the pure line operations (locate, create, remove and
//! replace a cluster block); [`hosts_file`] does the I/O and the
//! write-reload-rollback sequence around every change.

pub mod block;
pub mod hosts_file;

pub use block::{
    create_block, find_block, list_clusters, name_in_file, remove_block, replace_block, Block,
};
pub use hosts_file::HostsFile;
