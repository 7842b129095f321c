//! # proxymanager - hosts-file load balancer manager
//!
//! Maintains named clusters of backend hosts inside the hosts file that
//! nginx resolves upstreams from, and redirects traffic between hosts of a
//! cluster for failover.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       proxymanager                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── lb: list, new, remove, status, add, del, move, ...   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── hosts file, lock file, reload commands               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Store                                                      │
//! │    ├── block: ### LB_K8S(<cluster>) ... ### LB_K8S_END      │
//! │    └── hosts_file: write, reload, roll back on failure      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Registry                                                   │
//! │    ├── codec: block lines <-> hosts                         │
//! │    └── move / restore traffic                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Reload (Reloader trait)                                    │
//! │    ├── NginxReloader (nginx -t, systemctl restart nginx)    │
//! │    └── DevModeReloader                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use proxymanager::registry::{decode, encode};
//!
//! let registry = decode(&["10.0.0.1 a", "10.0.0.2 b"])?;
//! let moved = registry.move_traffic("a", "b")?;
//! assert_eq!(encode(&moved), vec!["#10.0.0.1 a", "10.0.0.2 b a"]);
//! # Ok::<(), proxymanager::error::LbError>(())
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - Command implementations
//! - [`config`] - Settings file parsing and validation
//! - [`registry`] - Host registry and traffic transitions
//! - [`store`] - Cluster blocks and committing the hosts file
//! - [`reload`] - nginx validation and restart
//! - [`validation`] - Input validation for names and addresses
//! - [`lock`] - Exclusive lock around modifications
//! - [`error`] - Error types

pub mod cli;
pub mod cmd_abstraction;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs_abstraction;
pub mod lock;
pub mod registry;
pub mod reload;
pub mod store;
pub mod utils;
pub mod validation;
